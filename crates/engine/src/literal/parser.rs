//! Recursive-descent parser over literal displays.

use garg_types::LiteralValue;

use super::cursor::Cursor;
use super::number::lex_number;
use super::string::{StringPiece, is_string_prefix, lex_string};
use super::{LiteralError, LiteralErrorKind, MAX_NESTING_DEPTH};

const OPERATOR_CHARACTERS: &str = "+-*/%@&|^~<>=";

pub(super) struct Parser<'src> {
    cursor: Cursor<'src>,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub(super) fn new(source: &'src str) -> Self {
        Self { cursor: Cursor::new(source), depth: 0 }
    }

    /// Parses the whole input as exactly one literal.
    pub(super) fn parse_document(mut self) -> Result<LiteralValue, LiteralError> {
        self.cursor.skip_trivia();
        if self.cursor.is_eof() {
            return Err(self.error(LiteralErrorKind::Empty));
        }
        let value = self.parse_value()?;
        self.cursor.skip_trivia();
        match self.cursor.first() {
            None => Ok(value),
            Some(character) if OPERATOR_CHARACTERS.contains(character) => {
                Err(self.error(LiteralErrorKind::Operator(character)))
            }
            Some(_) => Err(self.error(LiteralErrorKind::TrailingInput)),
        }
    }

    fn parse_value(&mut self) -> Result<LiteralValue, LiteralError> {
        self.cursor.skip_trivia();
        if let Some(prefix_len) = self.string_start() {
            return self.parse_strings(prefix_len);
        }
        let Some(character) = self.cursor.first() else {
            return Err(self.error(LiteralErrorKind::UnexpectedEnd));
        };
        match character {
            '+' | '-' => self.parse_signed_number(),
            _ if self.at_number() => lex_number(&mut self.cursor, false),
            '[' => self.parse_list(),
            '(' => self.parse_parenthesized(),
            '{' => self.parse_braced(),
            _ if character.is_alphabetic() || character == '_' => self.parse_name(),
            _ => Err(self.error(LiteralErrorKind::UnexpectedCharacter(character))),
        }
    }

    fn at_number(&self) -> bool {
        match self.cursor.first() {
            Some(character) if character.is_ascii_digit() => true,
            Some('.') => self.cursor.second().is_some_and(|character| character.is_ascii_digit()),
            _ => false,
        }
    }

    fn parse_signed_number(&mut self) -> Result<LiteralValue, LiteralError> {
        let negative = self.cursor.bump() == Some('-');
        self.cursor.skip_trivia();
        if self.at_number() {
            return lex_number(&mut self.cursor, negative);
        }
        match self.cursor.first() {
            None => Err(self.error(LiteralErrorKind::UnexpectedEnd)),
            Some(sign @ ('+' | '-')) => Err(self.error(LiteralErrorKind::Operator(sign))),
            Some(_) => Err(self.error(LiteralErrorKind::Expected("a number after the sign"))),
        }
    }

    /// Length of the string prefix when a string literal starts here.
    fn string_start(&self) -> Option<usize> {
        let rest = self.cursor.rest();
        let prefix_len = rest
            .find(|character: char| !character.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let prefix = &rest[..prefix_len];
        let opens = rest[prefix_len..].starts_with(['\'', '"']);
        (opens && (prefix.is_empty() || is_string_prefix(prefix))).then_some(prefix_len)
    }

    /// Parses adjacent string pieces and concatenates them.
    fn parse_strings(&mut self, first_prefix_len: usize) -> Result<LiteralValue, LiteralError> {
        let mut combined: Option<StringPiece> = None;
        let mut prefix_len = Some(first_prefix_len);
        while let Some(len) = prefix_len {
            let start = self.cursor.position();
            let prefix = &self.cursor.rest()[..len];
            for _ in 0..len {
                self.cursor.bump();
            }
            let piece = lex_string(&mut self.cursor, prefix, start)?;
            combined = Some(match (combined, piece) {
                (None, piece) => piece,
                (Some(StringPiece::Text(mut text)), StringPiece::Text(more)) => {
                    text.push_str(&more);
                    StringPiece::Text(text)
                }
                (Some(StringPiece::Bytes(mut bytes)), StringPiece::Bytes(more)) => {
                    bytes.extend(more);
                    StringPiece::Bytes(bytes)
                }
                _ => return Err(LiteralError::new(LiteralErrorKind::MixedStringKinds, start)),
            });
            self.cursor.skip_trivia();
            prefix_len = self.string_start();
        }
        Ok(match combined {
            Some(StringPiece::Bytes(bytes)) => LiteralValue::Bytes(bytes),
            Some(StringPiece::Text(text)) => LiteralValue::Str(text),
            None => LiteralValue::Str(String::new()),
        })
    }

    fn parse_name(&mut self) -> Result<LiteralValue, LiteralError> {
        let start = self.cursor.position();
        let name = self
            .cursor
            .eat_while(|character| character.is_alphanumeric() || character == '_');
        match name {
            "None" => Ok(LiteralValue::None),
            "True" => Ok(LiteralValue::Bool(true)),
            "False" => Ok(LiteralValue::Bool(false)),
            "set" => {
                self.cursor.skip_trivia();
                if !self.cursor.eat('(') {
                    return Err(LiteralError::new(LiteralErrorKind::Name(name.to_string()), start));
                }
                self.cursor.skip_trivia();
                if !self.cursor.eat(')') {
                    return Err(self.error(LiteralErrorKind::Expected("')' to close set()")));
                }
                Ok(LiteralValue::Set(Vec::new()))
            }
            _ => Err(LiteralError::new(LiteralErrorKind::Name(name.to_string()), start)),
        }
    }

    fn parse_list(&mut self) -> Result<LiteralValue, LiteralError> {
        self.enter()?;
        let mut items = Vec::new();
        loop {
            self.cursor.skip_trivia();
            if self.cursor.eat(']') {
                break;
            }
            items.push(self.parse_value()?);
            if self.finish_item(']', "',' or ']'")? {
                break;
            }
        }
        self.depth -= 1;
        Ok(LiteralValue::List(items))
    }

    /// Parses `()`, a parenthesized value, or a tuple display.
    fn parse_parenthesized(&mut self) -> Result<LiteralValue, LiteralError> {
        self.enter()?;
        self.cursor.skip_trivia();
        if self.cursor.eat(')') {
            self.depth -= 1;
            return Ok(LiteralValue::Tuple(Vec::new()));
        }
        let first = self.parse_value()?;
        self.cursor.skip_trivia();
        if self.cursor.eat(')') {
            self.depth -= 1;
            return Ok(first);
        }
        if !self.cursor.eat(',') {
            return Err(self.expected("',' or ')'"));
        }
        let mut items = vec![first];
        loop {
            self.cursor.skip_trivia();
            if self.cursor.eat(')') {
                break;
            }
            items.push(self.parse_value()?);
            if self.finish_item(')', "',' or ')'")? {
                break;
            }
        }
        self.depth -= 1;
        Ok(LiteralValue::Tuple(items))
    }

    /// Parses a dict or set display; the first entry decides which.
    fn parse_braced(&mut self) -> Result<LiteralValue, LiteralError> {
        self.enter()?;
        self.cursor.skip_trivia();
        if self.cursor.eat('}') {
            self.depth -= 1;
            return Ok(LiteralValue::Dict(Vec::new()));
        }

        let first_start = self.cursor.position();
        let first = self.parse_value()?;
        self.cursor.skip_trivia();
        let value = if self.cursor.eat(':') {
            let mut entries = Vec::new();
            let value = self.parse_value()?;
            insert_entry(&mut entries, first, value, first_start)?;
            while !self.finish_item('}', "',' or '}'")? {
                self.cursor.skip_trivia();
                if self.cursor.eat('}') {
                    break;
                }
                let key_start = self.cursor.position();
                let key = self.parse_value()?;
                self.cursor.skip_trivia();
                if !self.cursor.eat(':') {
                    return Err(self.expected("':'"));
                }
                let value = self.parse_value()?;
                insert_entry(&mut entries, key, value, key_start)?;
            }
            LiteralValue::Dict(entries)
        } else {
            let mut members = Vec::new();
            insert_member(&mut members, first, first_start)?;
            while !self.finish_item('}', "',' or '}'")? {
                self.cursor.skip_trivia();
                if self.cursor.eat('}') {
                    break;
                }
                let member_start = self.cursor.position();
                let member = self.parse_value()?;
                insert_member(&mut members, member, member_start)?;
            }
            LiteralValue::Set(members)
        };
        self.depth -= 1;
        Ok(value)
    }

    /// Consumes the separator after a container item. Returns true once the
    /// closing delimiter has been consumed.
    fn finish_item(&mut self, close: char, expected: &'static str) -> Result<bool, LiteralError> {
        self.cursor.skip_trivia();
        if self.cursor.eat(',') {
            Ok(false)
        } else if self.cursor.eat(close) {
            Ok(true)
        } else {
            Err(self.expected(expected))
        }
    }

    fn enter(&mut self) -> Result<(), LiteralError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(self.error(LiteralErrorKind::TooDeep(MAX_NESTING_DEPTH)));
        }
        self.cursor.bump();
        Ok(())
    }

    fn expected(&self, expected: &'static str) -> LiteralError {
        if self.cursor.is_eof() {
            self.error(LiteralErrorKind::UnexpectedEnd)
        } else {
            self.error(LiteralErrorKind::Expected(expected))
        }
    }

    fn error(&self, kind: LiteralErrorKind) -> LiteralError {
        LiteralError::new(kind, self.cursor.position())
    }
}

/// Adds a dict entry; a repeated key keeps its first position and takes the
/// later value.
fn insert_entry(
    entries: &mut Vec<(LiteralValue, LiteralValue)>,
    key: LiteralValue,
    value: LiteralValue,
    key_start: usize,
) -> Result<(), LiteralError> {
    if !key.is_hashable() {
        return Err(LiteralError::new(LiteralErrorKind::Unhashable(key.type_name()), key_start));
    }
    match entries.iter_mut().find(|(existing, _)| existing.same_key(&key)) {
        Some((_, slot)) => *slot = value,
        None => entries.push((key, value)),
    }
    Ok(())
}

fn insert_member(members: &mut Vec<LiteralValue>, member: LiteralValue, start: usize) -> Result<(), LiteralError> {
    if !member.is_hashable() {
        return Err(LiteralError::new(LiteralErrorKind::Unhashable(member.type_name()), start));
    }
    if !members.iter().any(|existing| existing.same_key(&member)) {
        members.push(member);
    }
    Ok(())
}
