//! Integer and float lexing.

use garg_types::LiteralValue;

use super::cursor::Cursor;
use super::{LiteralError, LiteralErrorKind};

/// Lexes a number at the cursor and applies the optional leading sign.
///
/// The cursor must sit on a digit, or on a `.` followed by a digit.
pub(super) fn lex_number(cursor: &mut Cursor<'_>, negative: bool) -> Result<LiteralValue, LiteralError> {
    let start = cursor.position();
    let invalid = |message: &'static str| LiteralError::new(LiteralErrorKind::InvalidNumber(message), start);

    if cursor.first() == Some('0')
        && let Some(radix) = cursor.second().and_then(radix_for_prefix)
    {
        cursor.bump();
        cursor.bump();
        let digits = cursor.eat_while(|character| character.is_ascii_alphanumeric() || character == '_');
        let digits = digits.strip_prefix('_').unwrap_or(digits);
        if digits.is_empty() {
            return Err(invalid("missing digits after the radix prefix"));
        }
        if !underscores_are_separators(digits) {
            return Err(invalid("invalid underscore placement in number"));
        }
        let cleaned: String = digits.chars().filter(|character| *character != '_').collect();
        if !cleaned.chars().all(|character| character.is_digit(radix)) {
            return Err(invalid("invalid digit for the radix"));
        }
        let magnitude = i128::from_str_radix(&cleaned, radix)
            .map_err(|_| LiteralError::new(LiteralErrorKind::IntegerOutOfRange, start))?;
        return signed_integer(magnitude, negative, start);
    }

    let integer = cursor.eat_while(is_digit_or_underscore);
    let mut is_float = false;
    let mut fraction = "";
    if cursor.first() == Some('.') && (!integer.is_empty() || cursor.second().is_some_and(|c| c.is_ascii_digit())) {
        cursor.bump();
        fraction = cursor.eat_while(is_digit_or_underscore);
        is_float = true;
    }

    let mut exponent = None;
    if matches!(cursor.first(), Some('e' | 'E')) {
        cursor.bump();
        let sign = if cursor.eat('-') {
            "-"
        } else {
            cursor.eat('+');
            ""
        };
        let digits = cursor.eat_while(is_digit_or_underscore);
        if digits.is_empty() {
            return Err(invalid("invalid exponent in float literal"));
        }
        exponent = Some((sign, digits));
        is_float = true;
    }

    if matches!(cursor.first(), Some('j' | 'J')) {
        return Err(LiteralError::new(LiteralErrorKind::Complex, start));
    }
    if cursor.first().is_some_and(|character| character.is_alphanumeric() || character == '_') {
        return Err(invalid("invalid decimal literal"));
    }

    let groups_valid = underscores_are_separators(integer)
        && underscores_are_separators(fraction)
        && exponent.is_none_or(|(_, digits)| underscores_are_separators(digits));
    if !groups_valid {
        return Err(invalid("invalid underscore placement in number"));
    }

    let integer: String = integer.chars().filter(|character| *character != '_').collect();
    if !is_float {
        if integer.len() > 1 && integer.starts_with('0') && integer.chars().any(|character| character != '0') {
            return Err(invalid("leading zeros in decimal integer literals are not permitted"));
        }
        let magnitude = integer
            .parse::<i128>()
            .map_err(|_| LiteralError::new(LiteralErrorKind::IntegerOutOfRange, start))?;
        return signed_integer(magnitude, negative, start);
    }

    let fraction: String = fraction.chars().filter(|character| *character != '_').collect();
    let mut normalized = format!(
        "{}.{}",
        if integer.is_empty() { "0" } else { integer.as_str() },
        if fraction.is_empty() { "0" } else { fraction.as_str() }
    );
    if let Some((sign, digits)) = exponent {
        normalized.push('e');
        normalized.push_str(sign);
        normalized.extend(digits.chars().filter(|character| *character != '_'));
    }
    let magnitude = normalized.parse::<f64>().map_err(|_| invalid("invalid float literal"))?;
    Ok(LiteralValue::Float(if negative { -magnitude } else { magnitude }))
}

fn radix_for_prefix(character: char) -> Option<u32> {
    match character {
        'x' | 'X' => Some(16),
        'o' | 'O' => Some(8),
        'b' | 'B' => Some(2),
        _ => None,
    }
}

fn is_digit_or_underscore(character: char) -> bool {
    character.is_ascii_digit() || character == '_'
}

/// Underscores may only sit between two digits.
fn underscores_are_separators(digits: &str) -> bool {
    !digits.starts_with('_') && !digits.ends_with('_') && !digits.contains("__")
}

fn signed_integer(magnitude: i128, negative: bool, start: usize) -> Result<LiteralValue, LiteralError> {
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value)
        .map(LiteralValue::Int)
        .map_err(|_| LiteralError::new(LiteralErrorKind::IntegerOutOfRange, start))
}
