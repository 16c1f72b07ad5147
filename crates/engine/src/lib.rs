//! # Garg Engine
//!
//! The Garg Engine turns a callable's parameter list into a form and the
//! text typed into that form back into bound arguments.
//!
//! ## Key Features
//!
//! - **Literal Parsing**: A literal-only recursive-descent parser; nothing typed into a form is evaluated
//! - **Signature Sources**: Declared signatures, declaration text, and YAML/JSON manifests
//! - **Form Contract**: A presentation-agnostic form surface with confirm/cancel callbacks
//! - **Argument Binding**: Kind-aware grouping, tolerant parsing, and partial binding
//!
//! ## Usage
//!
//! ```rust
//! use garg_engine::{MemoryForm, SignatureText, prompt_arguments};
//! use garg_types::BinderOptions;
//!
//! let source = SignatureText::new("f(a, b='test', *, c=3)");
//! let mut form = MemoryForm::new();
//! // Fields are created by `prompt_arguments`; a headless form confirms with
//! // the pre-filled defaults, and `a` has none.
//! let result = prompt_arguments(&source, BinderOptions::default(), &mut form);
//! assert!(result.is_err());
//! assert_eq!(form.initial_text("b"), Some("'test'"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`literal`**: Text to [`LiteralValue`](garg_types::LiteralValue)
//! - **`signature`**: The [`SignatureSource`] trait and its implementations
//! - **`form`**: The [`FormSurface`] contract and [`MemoryForm`]
//! - **`binder`**: [`ArgumentBinder`] and [`prompt_arguments`]

pub mod binder;
pub mod error;
pub mod form;
pub mod literal;
pub mod signature;

// Re-export commonly used types for convenience
pub use binder::{ArgumentBinder, ParameterGroup, SessionOutcome, classify_parameters, prompt_arguments};
pub use error::BinderError;
pub use form::{ConfirmDecision, FormCallbacks, FormGroup, FormSurface, GroupHandle, InteractiveForm, MemoryForm};
pub use literal::{LiteralError, LiteralErrorKind, parse_literal};
pub use signature::{IntrospectionError, ManifestCallable, ManifestParameter, SignatureManifest, SignatureSource, SignatureText};
