//! Parameter descriptors and validated signatures.
//!
//! A [`Signature`] is the ordered list of parameters a callable declares. The
//! order is load-bearing: it drives the form layout within each kind group and
//! the order in which positional arguments are reconstructed after binding.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::literal::LiteralValue;

/// Binding category of a declared parameter.
///
/// Variants are declared in the fixed display order used when grouping
/// parameters, so the derived `Ord` sorts kinds into that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParameterKind {
    /// Every kind, in display order.
    pub const ALL: [ParameterKind; 5] = [
        ParameterKind::PositionalOnly,
        ParameterKind::PositionalOrKeyword,
        ParameterKind::VarPositional,
        ParameterKind::KeywordOnly,
        ParameterKind::VarKeyword,
    ];

    /// Label used for the form group holding parameters of this kind.
    pub fn label(self) -> &'static str {
        match self {
            ParameterKind::PositionalOnly => "POSITIONAL_ONLY",
            ParameterKind::PositionalOrKeyword => "POSITIONAL_OR_KEYWORD",
            ParameterKind::VarPositional => "VAR_POSITIONAL",
            ParameterKind::KeywordOnly => "KEYWORD_ONLY",
            ParameterKind::VarKeyword => "VAR_KEYWORD",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ParameterKind::PositionalOnly => "positional-only",
            ParameterKind::PositionalOrKeyword => "positional-or-keyword",
            ParameterKind::VarPositional => "variadic positional",
            ParameterKind::KeywordOnly => "keyword-only",
            ParameterKind::VarKeyword => "variadic keyword",
        }
    }

    pub fn is_variadic(self) -> bool {
        matches!(self, ParameterKind::VarPositional | ParameterKind::VarKeyword)
    }

    /// Whether a single value can be passed to this parameter by position.
    pub fn accepts_positional(self) -> bool {
        matches!(self, ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword)
    }

    /// Whether a single value can be passed to this parameter by name.
    pub fn accepts_keyword(self) -> bool {
        matches!(self, ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub kind: ParameterKind,
    /// Default value, when the parameter declares one.
    pub default: Option<LiteralValue>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<LiteralValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A parameter is required when it must be supplied for a complete call.
    pub fn is_required(&self) -> bool {
        !self.kind.is_variadic() && self.default.is_none()
    }
}

impl fmt::Display for ParameterDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParameterKind::VarPositional => write!(formatter, "*{}", self.name),
            ParameterKind::VarKeyword => write!(formatter, "**{}", self.name),
            _ => match &self.default {
                Some(default) => write!(formatter, "{}={}", self.name, default),
                None => formatter.write_str(&self.name),
            },
        }
    }
}

/// Reasons a parameter list cannot belong to a real callable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("parameter names cannot be empty")]
    EmptyName,

    #[error("duplicate parameter '{name}'")]
    DuplicateParameter { name: String },

    #[error("{kind} parameter '{name}' cannot follow a {previous} parameter")]
    KindOutOfOrder {
        name: String,
        kind: ParameterKind,
        previous: ParameterKind,
    },

    #[error("only one {kind} parameter is allowed, found '{name}'")]
    DuplicateVariadic { name: String, kind: ParameterKind },

    #[error("variadic parameter '{name}' cannot declare a default")]
    VariadicDefault { name: String },

    #[error("parameter '{name}' without a default follows a parameter with a default")]
    RequiredAfterDefault { name: String },
}

/// Ordered, validated parameter list of one callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    callable: String,
    parameters: Vec<ParameterDescriptor>,
}

impl Signature {
    /// Validates `parameters` and builds the signature.
    pub fn new(callable: impl Into<String>, parameters: Vec<ParameterDescriptor>) -> Result<Self, SignatureError> {
        validate_parameters(&parameters)?;
        Ok(Self {
            callable: callable.into(),
            parameters,
        })
    }

    pub fn builder(callable: impl Into<String>) -> SignatureBuilder {
        SignatureBuilder::new(callable)
    }

    /// Name of the callable the signature was read from.
    pub fn callable(&self) -> &str {
        &self.callable
    }

    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn var_positional(&self) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|parameter| parameter.kind == ParameterKind::VarPositional)
    }

    pub fn var_keyword(&self) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|parameter| parameter.kind == ParameterKind::VarKeyword)
    }
}

/// Renders the declaration form, e.g. `f(a, /, b='test', *, c=3)`.
impl fmt::Display for Signature {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::with_capacity(self.parameters.len() + 2);
        let has_var_positional = self.var_positional().is_some();
        let mut star_written = false;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if parameter.kind == ParameterKind::KeywordOnly && !has_var_positional && !star_written {
                parts.push("*".to_string());
                star_written = true;
            }
            parts.push(parameter.to_string());
            let next_kind = self.parameters.get(index + 1).map(|next| next.kind);
            if parameter.kind == ParameterKind::PositionalOnly && next_kind != Some(ParameterKind::PositionalOnly) {
                parts.push("/".to_string());
            }
        }
        write!(formatter, "{}({})", self.callable, parts.join(", "))
    }
}

fn validate_parameters(parameters: &[ParameterDescriptor]) -> Result<(), SignatureError> {
    let mut seen_names: HashSet<&str> = HashSet::with_capacity(parameters.len());
    let mut previous_kind: Option<ParameterKind> = None;
    let mut positional_default_seen = false;

    for parameter in parameters {
        if parameter.name.trim().is_empty() {
            return Err(SignatureError::EmptyName);
        }
        if !seen_names.insert(parameter.name.as_str()) {
            return Err(SignatureError::DuplicateParameter {
                name: parameter.name.clone(),
            });
        }

        if let Some(previous) = previous_kind {
            if parameter.kind < previous {
                return Err(SignatureError::KindOutOfOrder {
                    name: parameter.name.clone(),
                    kind: parameter.kind,
                    previous,
                });
            }
            if parameter.kind == previous && parameter.kind.is_variadic() {
                return Err(SignatureError::DuplicateVariadic {
                    name: parameter.name.clone(),
                    kind: parameter.kind,
                });
            }
        }

        if parameter.kind.is_variadic() && parameter.has_default() {
            return Err(SignatureError::VariadicDefault {
                name: parameter.name.clone(),
            });
        }

        if parameter.kind.accepts_positional() {
            if parameter.has_default() {
                positional_default_seen = true;
            } else if positional_default_seen {
                return Err(SignatureError::RequiredAfterDefault {
                    name: parameter.name.clone(),
                });
            }
        }

        previous_kind = Some(parameter.kind);
    }
    Ok(())
}

/// Incremental construction of a [`Signature`].
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    callable: String,
    parameters: Vec<ParameterDescriptor>,
}

impl SignatureBuilder {
    pub fn new(callable: impl Into<String>) -> Self {
        Self {
            callable: callable.into(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn positional_only(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterDescriptor::new(name, ParameterKind::PositionalOnly))
    }

    pub fn positional_or_keyword(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterDescriptor::new(name, ParameterKind::PositionalOrKeyword))
    }

    pub fn var_positional(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterDescriptor::new(name, ParameterKind::VarPositional))
    }

    pub fn keyword_only(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterDescriptor::new(name, ParameterKind::KeywordOnly))
    }

    pub fn var_keyword(self, name: impl Into<String>) -> Self {
        self.parameter(ParameterDescriptor::new(name, ParameterKind::VarKeyword))
    }

    /// Attaches a default to the most recently added parameter.
    pub fn default(mut self, value: impl Into<LiteralValue>) -> Self {
        if let Some(last) = self.parameters.last_mut() {
            last.default = Some(value.into());
        }
        self
    }

    pub fn build(self) -> Result<Signature, SignatureError> {
        Signature::new(self.callable, self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_renders_declaration() {
        let signature = Signature::builder("f")
            .positional_only("x")
            .positional_or_keyword("a")
            .positional_or_keyword("b")
            .default("test")
            .keyword_only("c")
            .default(3)
            .var_keyword("options")
            .build()
            .expect("valid signature");

        assert_eq!(signature.len(), 5);
        assert_eq!(signature.to_string(), "f(x, /, a, b='test', *, c=3, **options)");
        assert_eq!(signature.var_keyword().map(|parameter| parameter.name.as_str()), Some("options"));
    }

    #[test]
    fn keyword_only_after_var_positional_has_no_bare_star() {
        let signature = Signature::builder("g")
            .var_positional("args")
            .keyword_only("flag")
            .default(false)
            .build()
            .expect("valid signature");
        assert_eq!(signature.to_string(), "g(*args, flag=False)");
    }

    #[test]
    fn rejects_duplicate_names() {
        let error = Signature::builder("f")
            .positional_or_keyword("a")
            .keyword_only("a")
            .build()
            .unwrap_err();
        assert_eq!(error, SignatureError::DuplicateParameter { name: "a".into() });
    }

    #[test]
    fn rejects_kinds_out_of_order() {
        let error = Signature::builder("f")
            .keyword_only("c")
            .positional_or_keyword("a")
            .build()
            .unwrap_err();
        assert!(matches!(error, SignatureError::KindOutOfOrder { ref name, .. } if name == "a"));
    }

    #[test]
    fn rejects_required_positional_after_default() {
        let error = Signature::builder("f")
            .positional_or_keyword("a")
            .default(1)
            .positional_or_keyword("b")
            .build()
            .unwrap_err();
        assert_eq!(error, SignatureError::RequiredAfterDefault { name: "b".into() });
    }

    #[test]
    fn keyword_only_parameters_may_be_required_after_defaults() {
        let signature = Signature::builder("f")
            .positional_or_keyword("a")
            .default(1)
            .keyword_only("b")
            .build();
        assert!(signature.is_ok());
    }

    #[test]
    fn rejects_second_variadic_and_variadic_defaults() {
        let duplicate = Signature::builder("f").var_positional("a").var_positional("b").build().unwrap_err();
        assert!(matches!(duplicate, SignatureError::DuplicateVariadic { .. }));

        let defaulted = Signature::builder("f").var_keyword("kw").default(1).build().unwrap_err();
        assert_eq!(defaulted, SignatureError::VariadicDefault { name: "kw".into() });
    }

    #[test]
    fn kinds_sort_in_display_order() {
        let mut kinds = vec![ParameterKind::VarKeyword, ParameterKind::PositionalOnly, ParameterKind::KeywordOnly];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![ParameterKind::PositionalOnly, ParameterKind::KeywordOnly, ParameterKind::VarKeyword]
        );
    }
}
