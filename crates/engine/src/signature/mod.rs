//! Signature sources.
//!
//! A [`SignatureSource`] produces the ordered parameter list of one callable.
//! Hosts that know their parameters declare a [`Signature`] directly; the
//! command line reads a declaration with [`SignatureText`] or a YAML/JSON
//! [`SignatureManifest`].

mod manifest;
mod text;

use std::path::PathBuf;

use thiserror::Error;

use garg_types::{Signature, SignatureError};

use crate::literal::LiteralError;

pub use manifest::{ManifestCallable, ManifestParameter, SignatureManifest};
pub use text::SignatureText;

/// Produces the parameter descriptors of a callable.
pub trait SignatureSource {
    /// Name used in messages before the signature is known.
    fn callable_name(&self) -> &str;

    /// Extracts the signature. Fails when the parameter list cannot be
    /// determined.
    fn signature(&self) -> Result<Signature, IntrospectionError>;
}

impl SignatureSource for Signature {
    fn callable_name(&self) -> &str {
        self.callable()
    }

    fn signature(&self) -> Result<Signature, IntrospectionError> {
        Ok(self.clone())
    }
}

/// Why a callable's parameter list could not be determined.
#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("invalid signature declaration '{text}': {message}")]
    Declaration { text: String, message: String },

    #[error("default for parameter '{parameter}' is not a literal: {source}")]
    Default {
        parameter: String,
        #[source]
        source: LiteralError,
    },

    #[error("default for parameter '{parameter}' has no literal form: {reason}")]
    UnsupportedDefault { parameter: String, reason: String },

    #[error("parameter '{parameter}' declares both 'default' and 'default_literal'")]
    ConflictingDefaults { parameter: String },

    #[error("failed to read signature manifest {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse signature manifest {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("signature manifest declares no callables")]
    EmptyManifest,

    #[error("callable '{name}' is not declared (available: {})", available.join(", "))]
    UnknownCallable { name: String, available: Vec<String> },

    #[error("manifest declares several callables, choose one of: {}", available.join(", "))]
    AmbiguousCallable { available: Vec<String> },

    #[error(transparent)]
    Invalid(#[from] SignatureError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use garg_types::ParameterKind;

    #[test]
    fn declared_signatures_are_their_own_source() {
        let signature = Signature::builder("f").positional_or_keyword("a").build().unwrap();
        let source: &dyn SignatureSource = &signature;
        assert_eq!(source.callable_name(), "f");
        let extracted = source.signature().unwrap();
        assert_eq!(extracted.parameters()[0].kind, ParameterKind::PositionalOrKeyword);
    }

    #[test]
    fn unknown_callable_lists_the_alternatives() {
        let error = IntrospectionError::UnknownCallable {
            name: "h".into(),
            available: vec!["f".into(), "g".into()],
        };
        assert_eq!(error.to_string(), "callable 'h' is not declared (available: f, g)");
    }
}
