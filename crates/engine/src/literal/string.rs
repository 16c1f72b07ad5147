//! String and bytes lexing.

use super::cursor::Cursor;
use super::{LiteralError, LiteralErrorKind};

/// One quoted piece of a (possibly concatenated) string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum StringPiece {
    Text(String),
    Bytes(Vec<u8>),
}

/// Whether `prefix` is a string prefix such as `r`, `b` or `Rb`.
///
/// Format-string prefixes are recognized here so the lexer can reject them
/// with a string error instead of reporting an unknown name.
pub(super) fn is_string_prefix(prefix: &str) -> bool {
    matches!(
        prefix.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "br" | "rb" | "f" | "fr" | "rf"
    )
}

/// Lexes one quoted piece. The cursor must sit on the opening quote and
/// `prefix` is whatever prefix letters preceded it.
pub(super) fn lex_string(cursor: &mut Cursor<'_>, prefix: &str, start: usize) -> Result<StringPiece, LiteralError> {
    let invalid = |message: &'static str| LiteralError::new(LiteralErrorKind::InvalidString(message), start);

    let prefix = prefix.to_ascii_lowercase();
    if prefix.contains('f') {
        return Err(invalid("f-strings are not literals"));
    }
    let raw = prefix.contains('r');
    let mut buffer = if prefix.contains('b') { Buffer::Bytes(Vec::new()) } else { Buffer::Text(String::new()) };

    let Some(quote) = cursor.bump() else {
        return Err(LiteralError::new(LiteralErrorKind::UnexpectedEnd, cursor.position()));
    };
    let triple = at_quote_pair(cursor, quote);
    if triple {
        cursor.bump();
        cursor.bump();
    }

    loop {
        let Some(character) = cursor.bump() else {
            return Err(invalid("unterminated string literal"));
        };
        if character == quote {
            if !triple {
                break;
            }
            if at_quote_pair(cursor, quote) {
                cursor.bump();
                cursor.bump();
                break;
            }
            buffer.push_char(character, start)?;
            continue;
        }
        if character == '\n' && !triple {
            return Err(invalid("unterminated string literal"));
        }
        if character != '\\' {
            buffer.push_char(character, start)?;
            continue;
        }

        let Some(escaped) = cursor.bump() else {
            return Err(invalid("unterminated string literal"));
        };
        if raw {
            buffer.push_char('\\', start)?;
            buffer.push_char(escaped, start)?;
            continue;
        }
        match escaped {
            '\n' => {}
            '\\' | '\'' | '"' => buffer.push_char(escaped, start)?,
            'a' => buffer.push_char('\x07', start)?,
            'b' => buffer.push_char('\x08', start)?,
            'f' => buffer.push_char('\x0c', start)?,
            'n' => buffer.push_char('\n', start)?,
            'r' => buffer.push_char('\r', start)?,
            't' => buffer.push_char('\t', start)?,
            'v' => buffer.push_char('\x0b', start)?,
            '0'..='7' => {
                let mut value = escaped.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match cursor.first().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            cursor.bump();
                            value = value * 8 + digit;
                        }
                        None => break,
                    }
                }
                buffer.push_code(value, start)?;
            }
            'x' => {
                let value = hex_digits(cursor, 2).ok_or_else(|| invalid("truncated \\xXX escape"))?;
                buffer.push_code(value, start)?;
            }
            'u' | 'U' if buffer.is_text() => {
                let width = if escaped == 'u' { 4 } else { 8 };
                let value = hex_digits(cursor, width).ok_or_else(|| invalid("truncated \\uXXXX escape"))?;
                buffer.push_code(value, start)?;
            }
            'N' if buffer.is_text() => return Err(invalid("named unicode escapes are not supported")),
            other => {
                buffer.push_char('\\', start)?;
                buffer.push_char(other, start)?;
            }
        }
    }

    Ok(match buffer {
        Buffer::Text(text) => StringPiece::Text(text),
        Buffer::Bytes(bytes) => StringPiece::Bytes(bytes),
    })
}

fn at_quote_pair(cursor: &Cursor<'_>, quote: char) -> bool {
    cursor.first() == Some(quote) && cursor.second() == Some(quote)
}

fn hex_digits(cursor: &mut Cursor<'_>, width: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..width {
        let digit = cursor.first()?.to_digit(16)?;
        cursor.bump();
        value = value * 16 + digit;
    }
    Some(value)
}

enum Buffer {
    Text(String),
    Bytes(Vec<u8>),
}

impl Buffer {
    fn is_text(&self) -> bool {
        matches!(self, Buffer::Text(_))
    }

    fn push_char(&mut self, character: char, start: usize) -> Result<(), LiteralError> {
        match self {
            Buffer::Text(text) => text.push(character),
            Buffer::Bytes(bytes) => {
                if !character.is_ascii() {
                    return Err(LiteralError::new(
                        LiteralErrorKind::InvalidString("bytes can only contain ASCII literal characters"),
                        start,
                    ));
                }
                bytes.push(character as u8);
            }
        }
        Ok(())
    }

    /// Pushes the value of a numeric escape.
    fn push_code(&mut self, value: u32, start: usize) -> Result<(), LiteralError> {
        match self {
            Buffer::Text(text) => {
                let character = char::from_u32(value).ok_or_else(|| {
                    LiteralError::new(LiteralErrorKind::InvalidString("illegal unicode character in escape"), start)
                })?;
                text.push(character);
            }
            Buffer::Bytes(bytes) => {
                let byte = u8::try_from(value).map_err(|_| {
                    LiteralError::new(LiteralErrorKind::InvalidString("octal escape out of range for bytes"), start)
                })?;
                bytes.push(byte);
            }
        }
        Ok(())
    }
}
