//! The argument binder.
//!
//! [`ArgumentBinder`] turns one callable's signature into form fields, and
//! form text back into [`BoundArguments`]. It is used for exactly one
//! callable and one form session; a later confirm replaces the result of an
//! earlier one.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use garg_types::{BinderOptions, BoundArguments, LiteralValue, ParameterDescriptor, ParameterKind, Signature};

use crate::error::BinderError;
use crate::form::{ConfirmDecision, FormCallbacks, FormSurface, GroupHandle, InteractiveForm};
use crate::literal::parse_literal;
use crate::signature::SignatureSource;

/// Parameters of one kind, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup<'a> {
    pub kind: ParameterKind,
    pub parameters: Vec<&'a ParameterDescriptor>,
}

impl ParameterGroup<'_> {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// State of a form session as seen by the binder.
#[derive(Debug, Default)]
pub enum SessionOutcome {
    /// Neither confirmed nor cancelled yet.
    #[default]
    Pending,
    Bound(BoundArguments),
    /// The last confirm failed; the user may edit and confirm again.
    Failed(BinderError),
    Cancelled,
}

impl SessionOutcome {
    pub fn bound(&self) -> Option<&BoundArguments> {
        match self {
            SessionOutcome::Bound(bound) => Some(bound),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&BinderError> {
        match self {
            SessionOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Orders every parameter by kind, keeping declaration order within a kind.
///
/// Kinds are visited in display order: positional-only, positional-or-keyword,
/// variadic positional, keyword-only, variadic keyword.
pub fn classify_parameters(signature: &Signature) -> Vec<(ParameterKind, &ParameterDescriptor)> {
    let mut classified: Vec<_> = signature
        .parameters()
        .iter()
        .map(|parameter| (parameter.kind, parameter))
        .collect();
    classified.sort_by_key(|(kind, _)| *kind);
    classified
}

/// Drives a form for one callable and binds the confirmed text.
#[derive(Debug)]
pub struct ArgumentBinder {
    signature: Signature,
    options: BinderOptions,
    fields: IndexMap<String, GroupHandle>,
    outcome: SessionOutcome,
}

impl ArgumentBinder {
    /// Extracts the signature from `source`. Introspection failures surface
    /// here, before any form exists.
    pub fn new(source: &dyn SignatureSource, options: BinderOptions) -> Result<Self, BinderError> {
        let signature = source.signature().map_err(|error| BinderError::Introspection {
            callable: source.callable_name().to_string(),
            source: error,
        })?;
        Ok(Self::from_signature(signature, options))
    }

    pub fn from_signature(signature: Signature, options: BinderOptions) -> Self {
        for kind in options.eligible_kinds.iter().filter(|kind| kind.is_variadic()) {
            warn!(%kind, "variadic parameters cannot be entered in a form; ignoring eligible kind");
        }
        Self {
            signature,
            options,
            fields: IndexMap::new(),
            outcome: SessionOutcome::Pending,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    /// Parameters grouped by kind, with groups in display order. Only kinds
    /// that occur in the signature get a group.
    pub fn groups(&self) -> Vec<ParameterGroup<'_>> {
        let mut groups: Vec<ParameterGroup<'_>> = Vec::new();
        for (kind, parameter) in classify_parameters(&self.signature) {
            match groups.last_mut() {
                Some(group) if group.kind == kind => group.parameters.push(parameter),
                _ => groups.push(ParameterGroup {
                    kind,
                    parameters: vec![parameter],
                }),
            }
        }
        groups
    }

    /// Parameters that get a form field under the current options.
    pub fn eligible_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.signature
            .parameters()
            .iter()
            .filter(|parameter| self.options.is_eligible(parameter.kind))
    }

    /// Declares one field per eligible parameter on `form`.
    ///
    /// Groups are created on first use, so a kind without eligible
    /// parameters never shows up. Fields are pre-filled with the literal text
    /// of the parameter's default, or left empty.
    pub fn build_form(&mut self, form: &mut dyn FormSurface) {
        let Self {
            signature,
            options,
            fields,
            ..
        } = self;
        let mut groups: IndexMap<ParameterKind, GroupHandle> = IndexMap::new();
        for parameter in signature.parameters().iter().filter(|parameter| options.is_eligible(parameter.kind)) {
            let group = *groups
                .entry(parameter.kind)
                .or_insert_with(|| form.create_group(parameter.kind.label()));
            let initial_text = parameter
                .default
                .as_ref()
                .map(LiteralValue::to_literal_text)
                .unwrap_or_default();
            form.create_field(group, &parameter.name, &initial_text);
            fields.insert(parameter.name.clone(), group);
        }
        debug!(callable = signature.callable(), fields = fields.len(), "built argument form");
    }

    /// Names of the fields registered by [`build_form`](Self::build_form).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn field_group(&self, name: &str) -> Option<GroupHandle> {
        self.fields.get(name).copied()
    }

    /// Reads the current text of every registered field.
    pub fn collect_values(&self, form: &dyn FormSurface) -> IndexMap<String, String> {
        self.fields
            .keys()
            .filter_map(|name| form.field_text(name).map(|text| (name.clone(), text)))
            .collect()
    }

    /// Parses field text and binds it to the signature.
    ///
    /// Parameters are visited in declaration order and the first failure the
    /// options do not tolerate is returned:
    ///
    /// - text that is not a literal is a [`BinderError::Syntax`], skipped
    ///   when `ignore_syntax_errors` is set;
    /// - a parameter with no entry in `raw_values` (or an ineligible kind) is
    ///   a [`BinderError::BindingGap`], skipped when `ignore_positional_only`
    ///   is set; variadic parameters are never gaps;
    /// - unhashable members and runaway nesting are
    ///   [`BinderError::Unexpected`] and always surface.
    ///
    /// Positional-capable values go by position until the first omitted
    /// one; later values go by name. A positional-only value stranded behind
    /// an omitted one cannot be passed at all and is dropped.
    pub fn parse_and_bind(&self, raw_values: &IndexMap<String, String>) -> Result<BoundArguments, BinderError> {
        let mut parsed: IndexMap<&str, LiteralValue> = IndexMap::new();
        for parameter in self.signature.parameters() {
            let name = parameter.name.as_str();
            let text = raw_values
                .get(name)
                .filter(|_| self.options.is_eligible(parameter.kind));
            let Some(text) = text else {
                if parameter.kind.is_variadic() {
                    continue;
                }
                if self.options.ignore_positional_only {
                    debug!(parameter = name, kind = %parameter.kind, "omitting parameter without a field");
                    continue;
                }
                return Err(BinderError::BindingGap {
                    parameter: parameter.name.clone(),
                    kind: parameter.kind,
                });
            };

            match parse_literal(text) {
                Ok(value) => {
                    parsed.insert(name, value);
                }
                Err(error) if error.is_syntax() => {
                    if self.options.ignore_syntax_errors {
                        debug!(parameter = name, text = %text, %error, "omitting parameter with invalid literal");
                        continue;
                    }
                    return Err(BinderError::Syntax {
                        parameter: parameter.name.clone(),
                        text: text.clone(),
                        source: error,
                    });
                }
                Err(error) => {
                    return Err(BinderError::Unexpected {
                        parameter: parameter.name.clone(),
                        text: text.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        let mut positional = Vec::new();
        let mut keywords = IndexMap::new();
        let mut positional_gap = false;
        for parameter in self.signature.parameters() {
            let Some(value) = parsed.shift_remove(parameter.name.as_str()) else {
                positional_gap |= parameter.kind.accepts_positional();
                continue;
            };
            match parameter.kind {
                ParameterKind::PositionalOnly if positional_gap => {
                    warn!(
                        parameter = %parameter.name,
                        "dropping positional-only value that follows an omitted positional parameter"
                    );
                }
                ParameterKind::PositionalOnly => positional.push(value),
                ParameterKind::PositionalOrKeyword if !positional_gap => positional.push(value),
                _ => {
                    keywords.insert(parameter.name.clone(), value);
                }
            }
        }

        Ok(self.signature.bind_partial(positional, keywords)?)
    }

    pub fn outcome(&self) -> &SessionOutcome {
        &self.outcome
    }

    /// Takes the outcome, leaving the session pending.
    pub fn take_outcome(&mut self) -> SessionOutcome {
        std::mem::take(&mut self.outcome)
    }
}

impl FormCallbacks for ArgumentBinder {
    fn on_confirm(&mut self, form: &dyn FormSurface) -> ConfirmDecision {
        let raw_values = self.collect_values(form);
        match self.parse_and_bind(&raw_values) {
            Ok(bound) => {
                info!(callable = self.signature.callable(), bound = bound.len(), "arguments confirmed");
                self.outcome = SessionOutcome::Bound(bound);
                ConfirmDecision::Close
            }
            Err(error) => {
                let message = error.describe();
                warn!(callable = self.signature.callable(), %message, "confirm failed");
                self.outcome = SessionOutcome::Failed(error);
                if self.options.close_on_error {
                    ConfirmDecision::Close
                } else {
                    ConfirmDecision::KeepOpen { message }
                }
            }
        }
    }

    fn on_cancel(&mut self) {
        info!(callable = self.signature.callable(), "argument form cancelled");
        self.outcome = SessionOutcome::Cancelled;
    }
}

/// Builds a form for `source`, runs it, and returns the confirmed arguments.
///
/// Returns `Ok(None)` when the user cancels (or the form closes without a
/// confirm), and the binder error when the last confirm failed.
pub fn prompt_arguments(
    source: &dyn SignatureSource,
    options: BinderOptions,
    form: &mut dyn InteractiveForm,
) -> anyhow::Result<Option<BoundArguments>> {
    let mut binder = ArgumentBinder::new(source, options)?;
    binder.build_form(form);
    form.run(&mut binder)?;
    match binder.take_outcome() {
        SessionOutcome::Bound(bound) => Ok(Some(bound)),
        SessionOutcome::Failed(error) => Err(error.into()),
        SessionOutcome::Pending | SessionOutcome::Cancelled => Ok(None),
    }
}
