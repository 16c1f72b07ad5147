//! Literal values that can be typed into a form field.
//!
//! A [`LiteralValue`] is a self-contained value expressible in source text
//! without evaluating names or calls: numbers, strings, bytes, booleans,
//! `None`, and list/tuple/dict/set aggregates of those. The literal text
//! produced by [`LiteralValue::to_literal_text`] is what gets pre-seeded into a
//! field for a parameter default, so it must parse back to an equal value.

use std::fmt::{self, Write as _};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;

/// A parsed literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<LiteralValue>),
    Tuple(Vec<LiteralValue>),
    /// Key/value pairs in insertion order. Keys are unique.
    Dict(Vec<(LiteralValue, LiteralValue)>),
    /// Members in insertion order. Members are unique.
    Set(Vec<LiteralValue>),
}

/// A number normalized for key comparison. Integral floats inside the `i64`
/// range collapse onto the matching integer.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NumericKey {
    Int(i64),
    Float(f64),
}

impl NumericKey {
    fn from_float(value: f64) -> Self {
        // 2^63 is exactly representable; anything at or above it is out of range.
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value) {
            NumericKey::Int(value as i64)
        } else {
            NumericKey::Float(value)
        }
    }
}

impl LiteralValue {
    /// Name of the value's type as it appears in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::None => "NoneType",
            LiteralValue::Bool(_) => "bool",
            LiteralValue::Int(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::Str(_) => "str",
            LiteralValue::Bytes(_) => "bytes",
            LiteralValue::List(_) => "list",
            LiteralValue::Tuple(_) => "tuple",
            LiteralValue::Dict(_) => "dict",
            LiteralValue::Set(_) => "set",
        }
    }

    /// Whether the value may be used as a set member or a dict key.
    ///
    /// Mutable aggregates are unhashable, and so is any tuple containing one.
    pub fn is_hashable(&self) -> bool {
        match self {
            LiteralValue::List(_) | LiteralValue::Dict(_) | LiteralValue::Set(_) => false,
            LiteralValue::Tuple(items) => items.iter().all(LiteralValue::is_hashable),
            _ => true,
        }
    }

    /// Whether two hashable values name the same dict key or set member.
    ///
    /// Numbers compare by value across `Bool`, `Int` and `Float`, so `1`,
    /// `True` and `1.0` are one key. Tuples compare item by item; everything
    /// else compares structurally.
    pub fn same_key(&self, other: &LiteralValue) -> bool {
        match (self.numeric_key(), other.numeric_key()) {
            (Some(left), Some(right)) => return left == right,
            (Some(_), None) | (None, Some(_)) => return false,
            (None, None) => {}
        }
        match (self, other) {
            (LiteralValue::Tuple(left), LiteralValue::Tuple(right)) => {
                left.len() == right.len() && left.iter().zip(right).all(|(left, right)| left.same_key(right))
            }
            _ => self == other,
        }
    }

    fn numeric_key(&self) -> Option<NumericKey> {
        match self {
            LiteralValue::Bool(flag) => Some(NumericKey::Int(i64::from(*flag))),
            LiteralValue::Int(integer) => Some(NumericKey::Int(*integer)),
            LiteralValue::Float(value) => Some(NumericKey::from_float(*value)),
            _ => None,
        }
    }

    /// Renders the canonical literal text for this value.
    pub fn to_literal_text(&self) -> String {
        self.to_string()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Exports the value as JSON. See the `Serialize` impl for the mapping.
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::None => formatter.write_str("None"),
            LiteralValue::Bool(true) => formatter.write_str("True"),
            LiteralValue::Bool(false) => formatter.write_str("False"),
            LiteralValue::Int(value) => write!(formatter, "{value}"),
            LiteralValue::Float(value) => formatter.write_str(&format_float(*value)),
            LiteralValue::Str(text) => write_str_literal(formatter, text),
            LiteralValue::Bytes(bytes) => write_bytes_literal(formatter, bytes),
            LiteralValue::List(items) => {
                formatter.write_char('[')?;
                write_items(formatter, items)?;
                formatter.write_char(']')
            }
            LiteralValue::Tuple(items) => {
                formatter.write_char('(')?;
                write_items(formatter, items)?;
                if items.len() == 1 {
                    formatter.write_char(',')?;
                }
                formatter.write_char(')')
            }
            LiteralValue::Dict(entries) => {
                formatter.write_char('{')?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{key}: {value}")?;
                }
                formatter.write_char('}')
            }
            LiteralValue::Set(items) if items.is_empty() => formatter.write_str("set()"),
            LiteralValue::Set(items) => {
                formatter.write_char('{')?;
                write_items(formatter, items)?;
                formatter.write_char('}')
            }
        }
    }
}

fn write_items(formatter: &mut fmt::Formatter<'_>, items: &[LiteralValue]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            formatter.write_str(", ")?;
        }
        write!(formatter, "{item}")?;
    }
    Ok(())
}

/// Formats a float the way the literal parser reads it back.
///
/// Exponents carry an explicit sign and at least two digits (`1e+16`,
/// `1e-07`). Infinities are written as an overflowing exponent so that the
/// text still parses; NaN has no literal spelling.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "1e999".to_string() } else { "-1e999".to_string() };
    }
    let debug = format!("{value:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double { '"' } else { '\'' }
}

fn write_str_literal(formatter: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let quote = pick_quote(text.contains('\''), text.contains('"'));
    formatter.write_char(quote)?;
    for character in text.chars() {
        match character {
            '\\' => formatter.write_str("\\\\")?,
            '\n' => formatter.write_str("\\n")?,
            '\r' => formatter.write_str("\\r")?,
            '\t' => formatter.write_str("\\t")?,
            character if character == quote => write!(formatter, "\\{quote}")?,
            character if character.is_control() => {
                let code = character as u32;
                if code < 0x100 {
                    write!(formatter, "\\x{code:02x}")?;
                } else if code < 0x10000 {
                    write!(formatter, "\\u{code:04x}")?;
                } else {
                    write!(formatter, "\\U{code:08x}")?;
                }
            }
            character => formatter.write_char(character)?,
        }
    }
    formatter.write_char(quote)
}

fn write_bytes_literal(formatter: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    let quote = pick_quote(bytes.contains(&b'\''), bytes.contains(&b'"'));
    formatter.write_char('b')?;
    formatter.write_char(quote)?;
    for &byte in bytes {
        match byte {
            b'\\' => formatter.write_str("\\\\")?,
            b'\n' => formatter.write_str("\\n")?,
            b'\r' => formatter.write_str("\\r")?,
            b'\t' => formatter.write_str("\\t")?,
            byte if byte as char == quote => write!(formatter, "\\{quote}")?,
            0x20..=0x7e => formatter.write_char(byte as char)?,
            byte => write!(formatter, "\\x{byte:02x}")?,
        }
    }
    formatter.write_char(quote)
}

/// JSON export: sequences (list, tuple, set) become arrays, bytes an array of
/// integers, and dicts an object keyed by the string key or, for non-string
/// keys, the key's literal text.
impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::None => serializer.serialize_none(),
            LiteralValue::Bool(flag) => serializer.serialize_bool(*flag),
            LiteralValue::Int(value) => serializer.serialize_i64(*value),
            LiteralValue::Float(value) => serializer.serialize_f64(*value),
            LiteralValue::Str(text) => serializer.serialize_str(text),
            LiteralValue::Bytes(bytes) => {
                let mut sequence = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    sequence.serialize_element(byte)?;
                }
                sequence.end()
            }
            LiteralValue::List(items) | LiteralValue::Tuple(items) | LiteralValue::Set(items) => {
                let mut sequence = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    sequence.serialize_element(item)?;
                }
                sequence.end()
            }
            LiteralValue::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    match key {
                        LiteralValue::Str(text) => map.serialize_entry(text, value)?,
                        other => map.serialize_entry(&other.to_literal_text(), value)?,
                    }
                }
                map.end()
            }
        }
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        LiteralValue::Int(i64::from(value))
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Float(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::Str(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::Str(value)
    }
}

impl From<Vec<LiteralValue>> for LiteralValue {
    fn from(items: Vec<LiteralValue>) -> Self {
        LiteralValue::List(items)
    }
}
