//! Tolerance and eligibility options for the argument binder.

use serde::{Deserialize, Serialize};

use crate::signature::ParameterKind;

/// Options controlling which parameters get form fields and which failures
/// are tolerated when field text is bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderOptions {
    /// Omit parameters whose text is not a valid literal instead of failing.
    pub ignore_syntax_errors: bool,
    /// Omit parameters that have no form field (for example positional-only
    /// parameters) instead of failing.
    pub ignore_positional_only: bool,
    /// Kinds that receive a form field. Variadic kinds never do.
    pub eligible_kinds: Vec<ParameterKind>,
    /// Close the form after a failed confirm instead of keeping it open for
    /// corrections.
    pub close_on_error: bool,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            ignore_syntax_errors: false,
            ignore_positional_only: false,
            eligible_kinds: vec![ParameterKind::PositionalOrKeyword, ParameterKind::KeywordOnly],
            close_on_error: false,
        }
    }
}

impl BinderOptions {
    /// Whether parameters of `kind` get a form field.
    pub fn is_eligible(&self, kind: ParameterKind) -> bool {
        !kind.is_variadic() && self.eligible_kinds.contains(&kind)
    }

    pub fn with_positional_only(mut self) -> Self {
        if !self.eligible_kinds.contains(&ParameterKind::PositionalOnly) {
            self.eligible_kinds.push(ParameterKind::PositionalOnly);
            self.eligible_kinds.sort();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_exclude_positional_only_and_variadics() {
        let options = BinderOptions::default();
        assert!(options.is_eligible(ParameterKind::PositionalOrKeyword));
        assert!(options.is_eligible(ParameterKind::KeywordOnly));
        assert!(!options.is_eligible(ParameterKind::PositionalOnly));
        assert!(!options.is_eligible(ParameterKind::VarPositional));
    }

    #[test]
    fn variadic_kinds_are_never_eligible() {
        let options = BinderOptions {
            eligible_kinds: ParameterKind::ALL.to_vec(),
            ..BinderOptions::default()
        };
        assert!(!options.is_eligible(ParameterKind::VarKeyword));
        assert!(options.is_eligible(ParameterKind::PositionalOnly));
    }

    #[test]
    fn deserializes_partial_documents() {
        let options: BinderOptions =
            serde_json::from_str(r#"{"ignore_syntax_errors": true, "eligible_kinds": ["KEYWORD_ONLY"]}"#).expect("parse options");
        assert!(options.ignore_syntax_errors);
        assert!(!options.ignore_positional_only);
        assert_eq!(options.eligible_kinds, vec![ParameterKind::KeywordOnly]);
    }
}
