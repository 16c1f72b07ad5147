use garg_types::{ParameterDescriptor, ParameterKind, Signature};

use super::{IntrospectionError, SignatureSource};
use crate::literal::parse_literal;

/// A signature read from declaration text such as
/// `f(a, /, b='test', *args, c=3, **kw) -> None`.
///
/// A leading `def`/`async def` and a trailing `:` are tolerated so a line
/// copied from source works unchanged. Annotations are skipped; defaults must
/// be literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureText {
    text: String,
    callable: String,
}

impl SignatureText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let callable = declaration_body(&text)
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        Self { text, callable }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn invalid(&self, message: impl Into<String>) -> IntrospectionError {
        IntrospectionError::Declaration {
            text: self.text.clone(),
            message: message.into(),
        }
    }
}

impl SignatureSource for SignatureText {
    fn callable_name(&self) -> &str {
        &self.callable
    }

    fn signature(&self) -> Result<Signature, IntrospectionError> {
        let body = declaration_body(&self.text);
        let open = body.find('(').ok_or_else(|| self.invalid("missing '('"))?;
        let name = body[..open].trim();
        if !is_identifier(name) {
            return Err(self.invalid(format!("'{name}' is not a valid callable name")));
        }

        let close = matching_paren(body, open).ok_or_else(|| self.invalid("missing ')'"))?;
        let trailer = body[close + 1..].trim();
        let trailer = trailer.strip_suffix(':').unwrap_or(trailer).trim();
        if !trailer.is_empty() && !trailer.starts_with("->") {
            return Err(self.invalid(format!("unexpected text after the parameter list: '{trailer}'")));
        }

        let items = split_top_level(&body[open + 1..close], ',');
        let last = items.len().saturating_sub(1);
        let mut parameters: Vec<ParameterDescriptor> = Vec::new();
        let mut seen_slash = false;
        let mut keyword_only = false;
        let mut bare_star = false;
        for (index, item) in items.iter().enumerate() {
            let item = item.trim();
            if item.is_empty() {
                // A single trailing comma is allowed; `f()` yields one empty item.
                if index == last && (index > 0 || items.len() == 1) {
                    continue;
                }
                return Err(self.invalid("empty parameter"));
            }

            if item == "/" {
                if seen_slash || keyword_only || parameters.is_empty() {
                    return Err(self.invalid("'/' must follow at least one positional parameter"));
                }
                for parameter in &mut parameters {
                    parameter.kind = ParameterKind::PositionalOnly;
                }
                seen_slash = true;
                continue;
            }
            if item == "*" {
                if keyword_only {
                    return Err(self.invalid("'*' may appear only once"));
                }
                keyword_only = true;
                bare_star = true;
                continue;
            }
            if let Some(rest) = item.strip_prefix("**") {
                parameters.push(ParameterDescriptor::new(self.parameter_name(rest)?, ParameterKind::VarKeyword));
                continue;
            }
            if let Some(rest) = item.strip_prefix('*') {
                if keyword_only {
                    return Err(self.invalid("'*' may appear only once"));
                }
                keyword_only = true;
                parameters.push(ParameterDescriptor::new(self.parameter_name(rest)?, ParameterKind::VarPositional));
                continue;
            }

            let (declaration, default_text) = match split_top_level(item, '=').as_slice() {
                [declaration] => (*declaration, None),
                [declaration, default] => (*declaration, Some(default.trim())),
                _ => return Err(self.invalid(format!("malformed parameter '{item}'"))),
            };
            let name = self.parameter_name(declaration)?;
            let kind = if keyword_only { ParameterKind::KeywordOnly } else { ParameterKind::PositionalOrKeyword };
            let mut parameter = ParameterDescriptor::new(name, kind);
            if let Some(default_text) = default_text {
                let default = parse_literal(default_text).map_err(|source| IntrospectionError::Default {
                    parameter: parameter.name.clone(),
                    source,
                })?;
                parameter.default = Some(default);
            }
            bare_star &= kind != ParameterKind::KeywordOnly;
            parameters.push(parameter);
        }
        if bare_star {
            return Err(self.invalid("named parameters must follow a bare '*'"));
        }

        Ok(Signature::new(name, parameters)?)
    }
}

impl SignatureText {
    /// Name part of a parameter declaration, with any annotation removed.
    fn parameter_name(&self, declaration: &str) -> Result<String, IntrospectionError> {
        let name = split_top_level(declaration, ':')
            .first()
            .copied()
            .unwrap_or_default()
            .trim();
        if is_identifier(name) {
            Ok(name.to_string())
        } else {
            Err(self.invalid(format!("'{}' is not a valid parameter name", declaration.trim())))
        }
    }
}

fn declaration_body(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("async ").map(str::trim_start).unwrap_or(text);
    text.strip_prefix("def ").map(str::trim_start).unwrap_or(text)
}

fn is_identifier(name: &str) -> bool {
    let mut characters = name.chars();
    characters
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && characters.all(|character| character.is_alphanumeric() || character == '_')
}

/// Byte offset of the `)` closing the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut scanner = Scanner::default();
    for (index, character) in text[open..].char_indices() {
        if scanner.advance(character) && character == ')' && scanner.depth == 0 {
            return Some(open + index);
        }
    }
    None
}

/// Splits `text` on `delimiter` wherever it is outside brackets and quotes.
fn split_top_level(text: &str, delimiter: char) -> Vec<&str> {
    let mut scanner = Scanner::default();
    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, character) in text.char_indices() {
        let structural = scanner.advance(character);
        if structural && character == delimiter && scanner.depth == 0 {
            pieces.push(&text[start..index]);
            start = index + character.len_utf8();
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Tracks bracket depth and string state across a declaration.
#[derive(Default)]
struct Scanner {
    depth: usize,
    quote: Option<char>,
    escaped: bool,
}

impl Scanner {
    /// Feeds one character; returns whether it sits outside any string.
    fn advance(&mut self, character: char) -> bool {
        if let Some(quote) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if character == '\\' {
                self.escaped = true;
            } else if character == quote {
                self.quote = None;
            }
            return false;
        }
        match character {
            '\'' | '"' => {
                self.quote = Some(character);
                return false;
            }
            '(' | '[' | '{' => self.depth += 1,
            ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garg_types::{LiteralValue, SignatureError};

    fn kinds(signature: &Signature) -> Vec<(&str, ParameterKind)> {
        signature
            .parameters()
            .iter()
            .map(|parameter| (parameter.name.as_str(), parameter.kind))
            .collect()
    }

    #[test]
    fn parses_every_parameter_kind() {
        let source = SignatureText::new("f(x, /, a, b='test', *args, c=3, **options) -> None");
        assert_eq!(source.callable_name(), "f");
        let signature = source.signature().unwrap();
        assert_eq!(
            kinds(&signature),
            vec![
                ("x", ParameterKind::PositionalOnly),
                ("a", ParameterKind::PositionalOrKeyword),
                ("b", ParameterKind::PositionalOrKeyword),
                ("args", ParameterKind::VarPositional),
                ("c", ParameterKind::KeywordOnly),
                ("options", ParameterKind::VarKeyword),
            ]
        );
        assert_eq!(signature.get("b").unwrap().default, Some(LiteralValue::from("test")));
        assert_eq!(signature.get("c").unwrap().default, Some(LiteralValue::Int(3)));
    }

    #[test]
    fn skips_annotations_and_def_keyword() {
        let source = SignatureText::new("async def fetch(url: str, retries: dict[str, int] = {'a': 1}, *, timeout: float=2.5):");
        let signature = source.signature().unwrap();
        assert_eq!(signature.callable(), "fetch");
        assert_eq!(
            kinds(&signature),
            vec![
                ("url", ParameterKind::PositionalOrKeyword),
                ("retries", ParameterKind::PositionalOrKeyword),
                ("timeout", ParameterKind::KeywordOnly),
            ]
        );
        assert_eq!(signature.get("timeout").unwrap().default, Some(LiteralValue::Float(2.5)));
    }

    #[test]
    fn defaults_may_contain_delimiters() {
        let signature = SignatureText::new("g(sep=', ', pair=(1, 2), eq='a=b',)").signature().unwrap();
        assert_eq!(signature.get("sep").unwrap().default, Some(LiteralValue::from(", ")));
        assert_eq!(
            signature.get("pair").unwrap().default,
            Some(LiteralValue::Tuple(vec![LiteralValue::Int(1), LiteralValue::Int(2)]))
        );
        assert_eq!(signature.get("eq").unwrap().default, Some(LiteralValue::from("a=b")));
    }

    #[test]
    fn accepts_empty_parameter_lists() {
        let signature = SignatureText::new("noop()").signature().unwrap();
        assert!(signature.is_empty());
    }

    #[test]
    fn rejects_non_literal_defaults() {
        let error = SignatureText::new("f(a=object())").signature().unwrap_err();
        assert!(matches!(error, IntrospectionError::Default { ref parameter, .. } if parameter == "a"));
    }

    #[test]
    fn rejects_malformed_declarations() {
        assert!(matches!(SignatureText::new("f").signature(), Err(IntrospectionError::Declaration { .. })));
        assert!(matches!(SignatureText::new("f(a").signature(), Err(IntrospectionError::Declaration { .. })));
        assert!(matches!(SignatureText::new("f(a,,b)").signature(), Err(IntrospectionError::Declaration { .. })));
        assert!(matches!(SignatureText::new("f(/, a)").signature(), Err(IntrospectionError::Declaration { .. })));
        assert!(matches!(SignatureText::new("f(a) extra").signature(), Err(IntrospectionError::Declaration { .. })));
        assert!(matches!(SignatureText::new("1f(a)").signature(), Err(IntrospectionError::Declaration { .. })));
    }

    #[test]
    fn bare_star_needs_a_keyword_only_parameter() {
        for declaration in ["f(a, *)", "f(*, **options)", "f(a, *,)"] {
            match SignatureText::new(declaration).signature() {
                Err(IntrospectionError::Declaration { message, .. }) => assert!(message.contains("bare '*'"), "{message}"),
                other => panic!("{declaration} should be rejected, got {other:?}"),
            }
        }
        let signature = SignatureText::new("f(a, *, key, **options)").signature().unwrap();
        assert_eq!(signature.get("key").map(|parameter| parameter.kind), Some(ParameterKind::KeywordOnly));
    }

    #[test]
    fn surfaces_signature_validation_errors() {
        let error = SignatureText::new("f(a=1, b)").signature().unwrap_err();
        assert!(matches!(
            error,
            IntrospectionError::Invalid(SignatureError::RequiredAfterDefault { ref name }) if name == "b"
        ));
    }
}
