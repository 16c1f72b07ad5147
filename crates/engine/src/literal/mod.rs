//! Literal-only parsing of user-entered text.
//!
//! Field text is turned into a [`LiteralValue`] by a small recursive-descent
//! parser that accepts numbers, strings, bytes, booleans, `None`, and list,
//! tuple, dict and set displays built from them. Names, calls (other than the
//! empty `set()`), and operators (other than a single sign in front of a
//! number) are rejected, so nothing typed into a form is ever evaluated.

mod cursor;
mod number;
mod parser;
mod string;

use thiserror::Error;

use garg_types::LiteralValue;

/// Maximum depth of nested containers.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Parses `text` as a single literal.
///
/// # Examples
///
/// ```rust
/// use garg_engine::literal::parse_literal;
/// use garg_types::LiteralValue;
///
/// assert_eq!(parse_literal("[1, 'two']")?, LiteralValue::List(vec![LiteralValue::Int(1), LiteralValue::from("two")]));
/// assert!(parse_literal("*+-2").is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_literal(text: &str) -> Result<LiteralValue, LiteralError> {
    parser::Parser::new(text).parse_document()
}

/// A parse failure and the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at offset {offset})")]
pub struct LiteralError {
    pub kind: LiteralErrorKind,
    pub offset: usize,
}

impl LiteralError {
    pub(crate) fn new(kind: LiteralErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// Whether the text is simply not a well-formed literal.
    ///
    /// The remaining failures (unhashable members, runaway nesting) come from
    /// well-formed input the parser refuses to build.
    pub fn is_syntax(&self) -> bool {
        !matches!(self.kind, LiteralErrorKind::Unhashable(_) | LiteralErrorKind::TooDeep(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralErrorKind {
    #[error("empty input is not a literal")]
    Empty,

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("expected {0}")]
    Expected(&'static str),

    #[error("name '{0}' is not a literal")]
    Name(String),

    #[error("operator '{0}' is only allowed as a single sign before a number")]
    Operator(char),

    #[error("{0}")]
    InvalidNumber(&'static str),

    #[error("integer literal does not fit in 64 bits")]
    IntegerOutOfRange,

    #[error("complex numbers are not supported")]
    Complex,

    #[error("{0}")]
    InvalidString(&'static str),

    #[error("cannot mix bytes and str literals")]
    MixedStringKinds,

    #[error("unexpected input after the literal")]
    TrailingInput,

    #[error("unhashable type: '{0}'")]
    Unhashable(&'static str),

    #[error("literal nesting exceeds {0} levels")]
    TooDeep(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> LiteralValue {
        LiteralValue::Int(value)
    }

    fn kind_of(text: &str) -> LiteralErrorKind {
        parse_literal(text).expect_err("expected a parse failure").kind
    }

    #[test]
    fn parses_keywords() {
        assert_eq!(parse_literal("None"), Ok(LiteralValue::None));
        assert_eq!(parse_literal("True"), Ok(LiteralValue::Bool(true)));
        assert_eq!(parse_literal(" False "), Ok(LiteralValue::Bool(false)));
    }

    #[test]
    fn parses_integers_in_every_radix() {
        assert_eq!(parse_literal("2"), Ok(int(2)));
        assert_eq!(parse_literal("-17"), Ok(int(-17)));
        assert_eq!(parse_literal("+5"), Ok(int(5)));
        assert_eq!(parse_literal("1_000_000"), Ok(int(1_000_000)));
        assert_eq!(parse_literal("0xff"), Ok(int(255)));
        assert_eq!(parse_literal("0o755"), Ok(int(0o755)));
        assert_eq!(parse_literal("0b1010"), Ok(int(10)));
        assert_eq!(parse_literal("0x_dead_beef"), Ok(int(0xdead_beef)));
        assert_eq!(parse_literal("000"), Ok(int(0)));
        assert_eq!(parse_literal("-9223372036854775808"), Ok(int(i64::MIN)));
    }

    #[test]
    fn rejects_malformed_integers() {
        assert_eq!(kind_of("9223372036854775808"), LiteralErrorKind::IntegerOutOfRange);
        assert!(matches!(kind_of("012"), LiteralErrorKind::InvalidNumber(_)));
        assert!(matches!(kind_of("1__0"), LiteralErrorKind::InvalidNumber(_)));
        assert!(matches!(kind_of("1_"), LiteralErrorKind::InvalidNumber(_)));
        assert!(matches!(kind_of("0x"), LiteralErrorKind::InvalidNumber(_)));
        assert!(matches!(kind_of("0b102"), LiteralErrorKind::InvalidNumber(_)));
        assert!(matches!(kind_of("12abc"), LiteralErrorKind::InvalidNumber(_)));
    }

    #[test]
    fn parses_floats() {
        assert_eq!(parse_literal("3.14"), Ok(LiteralValue::Float(3.14)));
        assert_eq!(parse_literal(".5"), Ok(LiteralValue::Float(0.5)));
        assert_eq!(parse_literal("2."), Ok(LiteralValue::Float(2.0)));
        assert_eq!(parse_literal("1e3"), Ok(LiteralValue::Float(1000.0)));
        assert_eq!(parse_literal("-2.5E-1"), Ok(LiteralValue::Float(-0.25)));
        assert_eq!(parse_literal("1_0.0_1"), Ok(LiteralValue::Float(10.01)));
        assert_eq!(parse_literal("1e999"), Ok(LiteralValue::Float(f64::INFINITY)));
    }

    #[test]
    fn rejects_complex_and_bad_exponents() {
        assert_eq!(kind_of("3j"), LiteralErrorKind::Complex);
        assert!(matches!(kind_of("1e"), LiteralErrorKind::InvalidNumber(_)));
        assert!(matches!(kind_of("1e+"), LiteralErrorKind::InvalidNumber(_)));
    }

    #[test]
    fn parses_strings_and_bytes() {
        assert_eq!(parse_literal("'test'"), Ok(LiteralValue::from("test")));
        assert_eq!(parse_literal("\"it's\""), Ok(LiteralValue::from("it's")));
        assert_eq!(parse_literal(r"'a\tb\n\x41é\101'"), Ok(LiteralValue::from("a\tb\nAéA")));
        assert_eq!(parse_literal(r"r'\d+\''"), Ok(LiteralValue::from(r"\d+\'")));
        assert_eq!(parse_literal("'''multi\nline'''"), Ok(LiteralValue::from("multi\nline")));
        assert_eq!(parse_literal("'con' \"cat\""), Ok(LiteralValue::from("concat")));
        assert_eq!(parse_literal(r"b'\x00\xffA'"), Ok(LiteralValue::Bytes(vec![0, 255, b'A'])));
        assert_eq!(parse_literal(r"'\q'"), Ok(LiteralValue::from(r"\q")));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(matches!(kind_of("'open"), LiteralErrorKind::InvalidString(_)));
        assert!(matches!(kind_of("'line\nbreak'"), LiteralErrorKind::InvalidString(_)));
        assert!(matches!(kind_of("f'{x}'"), LiteralErrorKind::InvalidString(_)));
        assert!(matches!(kind_of("b'é'"), LiteralErrorKind::InvalidString(_)));
        assert!(matches!(kind_of(r"'\x4'"), LiteralErrorKind::InvalidString(_)));
        assert_eq!(kind_of("b'a' 'b'"), LiteralErrorKind::MixedStringKinds);
    }

    #[test]
    fn parses_containers() {
        assert_eq!(parse_literal("[]"), Ok(LiteralValue::List(Vec::new())));
        assert_eq!(parse_literal("[1, 2,]"), Ok(LiteralValue::List(vec![int(1), int(2)])));
        assert_eq!(parse_literal("()"), Ok(LiteralValue::Tuple(Vec::new())));
        assert_eq!(parse_literal("(1)"), Ok(int(1)));
        assert_eq!(parse_literal("(1,)"), Ok(LiteralValue::Tuple(vec![int(1)])));
        assert_eq!(parse_literal("(1, (2, 3))"), Ok(LiteralValue::Tuple(vec![int(1), LiteralValue::Tuple(vec![int(2), int(3)])])));
        assert_eq!(parse_literal("{}"), Ok(LiteralValue::Dict(Vec::new())));
        assert_eq!(parse_literal("set()"), Ok(LiteralValue::Set(Vec::new())));
        assert_eq!(parse_literal("{1, 2, 1}"), Ok(LiteralValue::Set(vec![int(1), int(2)])));
        assert_eq!(
            parse_literal("{'a': 1, 'b': [None], 'a': 3}"),
            Ok(LiteralValue::Dict(vec![
                (LiteralValue::from("a"), int(3)),
                (LiteralValue::from("b"), LiteralValue::List(vec![LiteralValue::None])),
            ]))
        );
        assert_eq!(
            parse_literal("[\n  1,  # first\n  2\n]"),
            Ok(LiteralValue::List(vec![int(1), int(2)]))
        );
    }

    #[test]
    fn equal_numbers_collapse_to_one_key() {
        assert_eq!(parse_literal("{1, True, 1.0}"), Ok(LiteralValue::Set(vec![int(1)])));
        assert_eq!(
            parse_literal("{1: 'a', True: 'b', 2.5: 'c'}"),
            Ok(LiteralValue::Dict(vec![
                (int(1), LiteralValue::from("b")),
                (LiteralValue::Float(2.5), LiteralValue::from("c")),
            ]))
        );
        assert_eq!(
            parse_literal("{(0, 'x'), (False, 'x'), (0.0, 'y')}"),
            Ok(LiteralValue::Set(vec![
                LiteralValue::Tuple(vec![int(0), LiteralValue::from("x")]),
                LiteralValue::Tuple(vec![LiteralValue::Float(0.0), LiteralValue::from("y")]),
            ]))
        );
        assert_eq!(
            parse_literal("{'1', 1}"),
            Ok(LiteralValue::Set(vec![LiteralValue::from("1"), int(1)]))
        );
    }

    #[test]
    fn rejects_expressions() {
        assert_eq!(kind_of("*+-2"), LiteralErrorKind::UnexpectedCharacter('*'));
        assert_eq!(kind_of("+-2"), LiteralErrorKind::Operator('-'));
        assert_eq!(kind_of("1 + 2"), LiteralErrorKind::Operator('+'));
        assert_eq!(kind_of("-True"), LiteralErrorKind::Expected("a number after the sign"));
        assert_eq!(kind_of("os"), LiteralErrorKind::Name("os".into()));
        assert_eq!(kind_of("print('x')"), LiteralErrorKind::Name("print".into()));
        assert_eq!(kind_of("set([1])"), LiteralErrorKind::Expected("')' to close set()"));
        assert_eq!(kind_of("1 2"), LiteralErrorKind::TrailingInput);
        assert_eq!(kind_of(""), LiteralErrorKind::Empty);
        assert_eq!(kind_of("   "), LiteralErrorKind::Empty);
        assert_eq!(kind_of("[1, 2"), LiteralErrorKind::UnexpectedEnd);
        assert_eq!(kind_of("[1; 2]"), LiteralErrorKind::Expected("',' or ']'"));
    }

    #[test]
    fn reports_offsets() {
        let error = parse_literal("[1, @]").unwrap_err();
        assert_eq!(error.offset, 4);
        assert_eq!(error.to_string(), "unexpected character '@' (at offset 4)");
    }

    #[test]
    fn unhashable_members_are_not_syntax_errors() {
        let error = parse_literal("{[1]: 2}").unwrap_err();
        assert_eq!(error.kind, LiteralErrorKind::Unhashable("list"));
        assert!(!error.is_syntax());

        let error = parse_literal("{(1, {}), 2}").unwrap_err();
        assert_eq!(error.kind, LiteralErrorKind::Unhashable("tuple"));
    }

    #[test]
    fn limits_nesting_depth() {
        let text = format!("{}{}", "[".repeat(MAX_NESTING_DEPTH + 1), "]".repeat(MAX_NESTING_DEPTH + 1));
        let error = parse_literal(&text).unwrap_err();
        assert_eq!(error.kind, LiteralErrorKind::TooDeep(MAX_NESTING_DEPTH));
        assert!(!error.is_syntax());

        let text = format!("{}{}", "[".repeat(MAX_NESTING_DEPTH), "]".repeat(MAX_NESTING_DEPTH));
        assert!(parse_literal(&text).is_ok());
    }

    #[test]
    fn rendered_values_parse_back_to_equal_values() {
        let values = vec![
            LiteralValue::None,
            LiteralValue::Bool(false),
            int(-3),
            int(i64::MAX),
            LiteralValue::Float(2.5),
            LiteralValue::Float(-0.0),
            LiteralValue::Float(1e-9),
            LiteralValue::Float(6.02e23),
            LiteralValue::Float(f64::NEG_INFINITY),
            LiteralValue::from("quote ' and \" and \\ and \u{1}"),
            LiteralValue::Bytes(vec![0, b'\'', 200]),
            LiteralValue::Tuple(vec![int(1)]),
            LiteralValue::Set(Vec::new()),
            LiteralValue::Dict(vec![(LiteralValue::Tuple(vec![int(1), int(2)]), LiteralValue::List(vec![LiteralValue::None]))]),
        ];
        for value in values {
            let text = value.to_literal_text();
            assert_eq!(parse_literal(&text), Ok(value), "round trip through {text:?}");
        }
    }
}
