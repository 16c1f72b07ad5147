use thiserror::Error;

use garg_types::{BindError, ParameterKind};

use crate::literal::LiteralError;
use crate::signature::IntrospectionError;

/// Failures surfaced by the argument binder.
#[derive(Debug, Error)]
pub enum BinderError {
    /// The callable's parameter list could not be determined.
    #[error("cannot determine the parameters of '{callable}'")]
    Introspection {
        callable: String,
        #[source]
        source: IntrospectionError,
    },

    /// A field's text is not a literal.
    #[error("parameter '{parameter}': {text:?} is not a valid literal")]
    Syntax {
        parameter: String,
        text: String,
        #[source]
        source: LiteralError,
    },

    /// A parameter has no field value to bind.
    #[error("parameter '{parameter}' ({kind}) is required but cannot be entered in the form")]
    BindingGap { parameter: String, kind: ParameterKind },

    /// Any other failure while turning a field's text into a value.
    #[error("parameter '{parameter}': failed to evaluate {text:?}: {reason}")]
    Unexpected {
        parameter: String,
        text: String,
        reason: String,
    },

    /// The parsed values do not bind to the signature.
    #[error(transparent)]
    Binding(#[from] BindError),
}

impl BinderError {
    /// Name of the parameter the failure is about, when there is one.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            BinderError::Syntax { parameter, .. }
            | BinderError::BindingGap { parameter, .. }
            | BinderError::Unexpected { parameter, .. } => Some(parameter),
            BinderError::Introspection { .. } | BinderError::Binding(_) => None,
        }
    }

    /// The message followed by every underlying cause, separated by `: `.
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::parse_literal;

    #[test]
    fn describe_includes_the_literal_error() {
        let source = parse_literal("*+-2").unwrap_err();
        let error = BinderError::Syntax {
            parameter: "a".into(),
            text: "*+-2".into(),
            source,
        };
        assert_eq!(error.parameter(), Some("a"));
        assert_eq!(
            error.describe(),
            "parameter 'a': \"*+-2\" is not a valid literal: unexpected character '*' (at offset 0)"
        );
    }

    #[test]
    fn binding_gap_names_the_kind() {
        let error = BinderError::BindingGap {
            parameter: "x".into(),
            kind: ParameterKind::PositionalOnly,
        };
        assert_eq!(
            error.to_string(),
            "parameter 'x' (POSITIONAL_ONLY) is required but cannot be entered in the form"
        );
    }
}
