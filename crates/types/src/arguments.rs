//! Partial binding of argument values onto a signature.
//!
//! [`Signature::bind_partial`] assigns positional and keyword values to
//! parameters the same way a call would, except that unfilled required
//! parameters are left unbound. The resulting [`BoundArguments`] can be split
//! back into the positional sequence and keyword mapping a caller passes on.

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::literal::LiteralValue;
use crate::signature::{ParameterDescriptor, ParameterKind, Signature};

/// Reasons a set of values cannot be bound to a signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("{callable}() takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        callable: String,
        expected: usize,
        given: usize,
    },

    #[error("{callable}() got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { callable: String, name: String },

    #[error("{callable}() got positional-only argument '{name}' passed as keyword")]
    PositionalOnlyAsKeyword { callable: String, name: String },

    #[error("{callable}() got multiple values for argument '{name}'")]
    MultipleValues { callable: String, name: String },
}

impl Signature {
    /// Binds `positional` and `keywords` onto the parameters, leaving any
    /// parameter that received no value unbound.
    ///
    /// Positional values fill positional-only then positional-or-keyword
    /// parameters in declaration order; extras are collected into `*args` as a
    /// tuple when the signature has one. Keywords that match no nameable
    /// parameter are collected into `**kwargs` when present.
    pub fn bind_partial(
        &self,
        positional: Vec<LiteralValue>,
        keywords: IndexMap<String, LiteralValue>,
    ) -> Result<BoundArguments, BindError> {
        let mut assigned: IndexMap<String, LiteralValue> = IndexMap::new();

        let positional_slots: Vec<&ParameterDescriptor> =
            self.parameters().iter().filter(|parameter| parameter.kind.accepts_positional()).collect();
        let given = positional.len();
        let mut values = positional.into_iter();
        for slot in &positional_slots {
            let Some(value) = values.next() else {
                break;
            };
            assigned.insert(slot.name.clone(), value);
        }
        let overflow: Vec<LiteralValue> = values.collect();
        if !overflow.is_empty() {
            let Some(var_positional) = self.var_positional() else {
                return Err(BindError::TooManyPositional {
                    callable: self.callable().to_string(),
                    expected: positional_slots.len(),
                    given,
                });
            };
            assigned.insert(var_positional.name.clone(), LiteralValue::Tuple(overflow));
        }

        let mut collected_keywords: Vec<(LiteralValue, LiteralValue)> = Vec::new();
        for (name, value) in keywords {
            match self.get(&name) {
                Some(parameter) if parameter.kind.accepts_keyword() => {
                    if assigned.contains_key(&name) {
                        return Err(BindError::MultipleValues {
                            callable: self.callable().to_string(),
                            name,
                        });
                    }
                    assigned.insert(name, value);
                }
                Some(parameter) if parameter.kind == ParameterKind::PositionalOnly && self.var_keyword().is_none() => {
                    return Err(BindError::PositionalOnlyAsKeyword {
                        callable: self.callable().to_string(),
                        name,
                    });
                }
                _ => {
                    if self.var_keyword().is_none() {
                        return Err(BindError::UnexpectedKeyword {
                            callable: self.callable().to_string(),
                            name,
                        });
                    }
                    collected_keywords.push((LiteralValue::Str(name), value));
                }
            }
        }
        if let Some(var_keyword) = self.var_keyword()
            && !collected_keywords.is_empty()
        {
            assigned.insert(var_keyword.name.clone(), LiteralValue::Dict(collected_keywords));
        }

        let arguments = self
            .parameters()
            .iter()
            .filter_map(|parameter| assigned.shift_remove(&parameter.name).map(|value| (parameter.name.clone(), value)))
            .collect();

        Ok(BoundArguments {
            signature: self.clone(),
            arguments,
        })
    }
}

/// Values bound to a signature's parameters, ordered by declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArguments {
    signature: Signature,
    arguments: IndexMap<String, LiteralValue>,
}

impl BoundArguments {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Bound values keyed by parameter name.
    pub fn arguments(&self) -> &IndexMap<String, LiteralValue> {
        &self.arguments
    }

    pub fn get(&self, name: &str) -> Option<&LiteralValue> {
        self.arguments.get(name)
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Positional values: the leading run of bound positional parameters in
    /// declaration order, followed by the contents of `*args`.
    ///
    /// The run stops at the first positional parameter with no value; any
    /// positional-or-keyword values after it are reported by [`Self::kwargs`].
    pub fn args(&self) -> Vec<LiteralValue> {
        let mut values = Vec::new();
        for parameter in self.signature.parameters() {
            match parameter.kind {
                ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword => match self.arguments.get(&parameter.name) {
                    Some(value) => values.push(value.clone()),
                    None => break,
                },
                ParameterKind::VarPositional => {
                    if let Some(LiteralValue::Tuple(items) | LiteralValue::List(items)) = self.arguments.get(&parameter.name) {
                        values.extend(items.iter().cloned());
                    }
                }
                ParameterKind::KeywordOnly | ParameterKind::VarKeyword => break,
            }
        }
        values
    }

    /// Keyword values: keyword-only parameters, positional-or-keyword values
    /// not covered by [`Self::args`], and the flattened contents of `**kwargs`.
    pub fn kwargs(&self) -> IndexMap<String, LiteralValue> {
        let mut values = IndexMap::new();
        let mut keywords_started = false;
        for parameter in self.signature.parameters() {
            if !keywords_started {
                if matches!(parameter.kind, ParameterKind::KeywordOnly | ParameterKind::VarKeyword) {
                    keywords_started = true;
                } else {
                    if parameter.kind.accepts_positional() && !self.arguments.contains_key(&parameter.name) {
                        keywords_started = true;
                    }
                    continue;
                }
            }
            let Some(value) = self.arguments.get(&parameter.name) else {
                continue;
            };
            match parameter.kind {
                ParameterKind::VarKeyword => {
                    if let LiteralValue::Dict(entries) = value {
                        for (key, entry) in entries {
                            let key = key.as_str().map(str::to_string).unwrap_or_else(|| key.to_literal_text());
                            values.insert(key, entry.clone());
                        }
                    }
                }
                ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly => {
                    values.insert(parameter.name.clone(), value.clone());
                }
                ParameterKind::PositionalOnly | ParameterKind::VarPositional => {}
            }
        }
        values
    }

    /// Fills every unbound parameter that has a default, and binds empty
    /// collections to unbound variadic parameters.
    pub fn apply_defaults(&mut self) {
        let mut rebuilt = IndexMap::with_capacity(self.signature.len());
        for parameter in self.signature.parameters() {
            let value = match self.arguments.shift_remove(&parameter.name) {
                Some(value) => Some(value),
                None => match parameter.kind {
                    ParameterKind::VarPositional => Some(LiteralValue::Tuple(Vec::new())),
                    ParameterKind::VarKeyword => Some(LiteralValue::Dict(Vec::new())),
                    _ => parameter.default.clone(),
                },
            };
            if let Some(value) = value {
                rebuilt.insert(parameter.name.clone(), value);
            }
        }
        self.arguments = rebuilt;
    }

    /// Names of required parameters that are still unbound.
    pub fn missing_required(&self) -> Vec<&str> {
        self.signature
            .parameters()
            .iter()
            .filter(|parameter| parameter.is_required() && !self.arguments.contains_key(&parameter.name))
            .map(|parameter| parameter.name.as_str())
            .collect()
    }

    /// `{"args": [...], "kwargs": {...}}` view of the bound values.
    pub fn to_json(&self) -> JsonValue {
        let args = self.args().iter().map(LiteralValue::to_json).collect();
        let kwargs: Map<String, JsonValue> = self.kwargs().into_iter().map(|(name, value)| (name, value.to_json())).collect();
        let mut document = Map::new();
        document.insert("args".to_string(), JsonValue::Array(args));
        document.insert("kwargs".to_string(), JsonValue::Object(kwargs));
        JsonValue::Object(document)
    }
}
