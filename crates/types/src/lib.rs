//! Shared type definitions for Garg.
//!
//! The model mirrors the pieces a callable exposes when its parameters are
//! assigned through a form: the ordered parameter descriptors that make up a
//! [`Signature`], the [`LiteralValue`]s a user may type, and the
//! [`BoundArguments`] produced once those values are bound back onto the
//! signature.

pub mod arguments;
pub mod literal;
pub mod options;
pub mod signature;

pub use arguments::{BindError, BoundArguments};
pub use literal::LiteralValue;
pub use options::BinderOptions;
pub use signature::{ParameterDescriptor, ParameterKind, Signature, SignatureBuilder, SignatureError};
