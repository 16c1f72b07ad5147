use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Number as YamlNumber, Value as YamlValue};

use garg_types::{LiteralValue, ParameterDescriptor, ParameterKind, Signature};

use super::{IntrospectionError, SignatureSource};
use crate::literal::parse_literal;

/// Signatures declared in a YAML or JSON document.
///
/// Either a list under `callables:` or a single callable at the top level:
///
/// ```yaml
/// callables:
///   - name: resize
///     parameters:
///       - name: path
///       - name: width
///         default: 640
///       - name: mode
///         kind: KEYWORD_ONLY
///         default_literal: "'fit'"
/// ```
#[derive(Debug, Clone)]
pub struct SignatureManifest {
    path: PathBuf,
    callables: Vec<ManifestCallable>,
    selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestCallable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ManifestParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestParameter {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: ParameterKind,
    /// Default given as plain YAML/JSON data. `null` declares a `None` default.
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub default: Option<YamlValue>,
    /// Default given as literal text, for values JSON cannot express.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_literal: Option<String>,
}

fn default_kind() -> ParameterKind {
    ParameterKind::PositionalOrKeyword
}

/// Keeps an explicit `null` distinct from a missing key.
fn present_value<'de, D>(deserializer: D) -> Result<Option<YamlValue>, D::Error>
where
    D: Deserializer<'de>,
{
    YamlValue::deserialize(deserializer).map(Some)
}

/// Converts manifest data into a literal. Sequences become lists and
/// mappings become dicts; data with no exact literal form is rejected.
fn literal_from_yaml(value: &YamlValue) -> Result<LiteralValue, String> {
    Ok(match value {
        YamlValue::Null => LiteralValue::None,
        YamlValue::Bool(flag) => LiteralValue::Bool(*flag),
        YamlValue::Number(number) => literal_from_number(number)?,
        YamlValue::String(text) => LiteralValue::Str(text.clone()),
        YamlValue::Sequence(items) => LiteralValue::List(items.iter().map(literal_from_yaml).collect::<Result<_, _>>()?),
        YamlValue::Mapping(mapping) => {
            let mut entries: Vec<(LiteralValue, LiteralValue)> = Vec::new();
            for (key, value) in mapping {
                let key = literal_from_yaml(key)?;
                if !key.is_hashable() {
                    return Err(format!("a {} cannot be a dict key", key.type_name()));
                }
                let value = literal_from_yaml(value)?;
                match entries.iter_mut().find(|(existing, _)| existing.same_key(&key)) {
                    Some((_, slot)) => *slot = value,
                    None => entries.push((key, value)),
                }
            }
            LiteralValue::Dict(entries)
        }
        YamlValue::Tagged(tagged) => return Err(format!("tagged value {} is not supported", tagged.tag)),
    })
}

fn literal_from_number(number: &YamlNumber) -> Result<LiteralValue, String> {
    if let Some(integer) = number.as_i64() {
        return Ok(LiteralValue::Int(integer));
    }
    if !number.is_f64() {
        return Err(format!("integer {number} does not fit in 64 bits"));
    }
    match number.as_f64() {
        Some(value) if value.is_nan() => Err("NaN has no literal form".to_string()),
        Some(value) => Ok(LiteralValue::Float(value)),
        None => Err(format!("number {number} cannot be represented")),
    }
}

impl ManifestParameter {
    fn to_descriptor(&self) -> Result<ParameterDescriptor, IntrospectionError> {
        let default = match (&self.default, &self.default_literal) {
            (Some(_), Some(_)) => {
                return Err(IntrospectionError::ConflictingDefaults {
                    parameter: self.name.clone(),
                });
            }
            (Some(value), None) => Some(literal_from_yaml(value).map_err(|reason| IntrospectionError::UnsupportedDefault {
                parameter: self.name.clone(),
                reason,
            })?),
            (None, Some(text)) => Some(parse_literal(text).map_err(|source| IntrospectionError::Default {
                parameter: self.name.clone(),
                source,
            })?),
            (None, None) => None,
        };
        Ok(ParameterDescriptor {
            name: self.name.clone(),
            kind: self.kind,
            default,
        })
    }
}

impl ManifestCallable {
    pub fn to_signature(&self) -> Result<Signature, IntrospectionError> {
        let parameters = self
            .parameters
            .iter()
            .map(ManifestParameter::to_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Signature::new(self.name.clone(), parameters)?)
    }
}

impl SignatureManifest {
    /// Reads a manifest file. JSON is accepted as a subset of YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IntrospectionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| IntrospectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path.to_path_buf())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, IntrospectionError> {
        Self::parse(content, PathBuf::from("<inline>"))
    }

    fn parse(content: &str, path: PathBuf) -> Result<Self, IntrospectionError> {
        #[derive(Deserialize)]
        struct MultiCallableDocument {
            callables: Vec<ManifestCallable>,
        }

        let callables = match serde_yaml::from_str::<MultiCallableDocument>(content) {
            Ok(document) => document.callables,
            Err(multi_error) => match serde_yaml::from_str::<ManifestCallable>(content) {
                Ok(callable) => vec![callable],
                Err(_) => return Err(IntrospectionError::Parse { path, source: multi_error }),
            },
        };
        if callables.is_empty() {
            return Err(IntrospectionError::EmptyManifest);
        }
        Ok(Self {
            path,
            callables,
            selected: None,
        })
    }

    /// Chooses the callable to extract by name.
    pub fn select(mut self, name: impl Into<String>) -> Self {
        self.selected = Some(name.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn callables(&self) -> &[ManifestCallable] {
        &self.callables
    }

    pub fn callable_names(&self) -> Vec<String> {
        self.callables.iter().map(|callable| callable.name.clone()).collect()
    }

    fn resolve(&self) -> Result<&ManifestCallable, IntrospectionError> {
        match (&self.selected, self.callables.as_slice()) {
            (Some(name), callables) => callables
                .iter()
                .find(|callable| &callable.name == name)
                .ok_or_else(|| IntrospectionError::UnknownCallable {
                    name: name.clone(),
                    available: self.callable_names(),
                }),
            (None, [only]) => Ok(only),
            (None, _) => Err(IntrospectionError::AmbiguousCallable {
                available: self.callable_names(),
            }),
        }
    }
}

impl SignatureSource for SignatureManifest {
    fn callable_name(&self) -> &str {
        match &self.selected {
            Some(name) => name,
            None => match self.callables.as_slice() {
                [only] => &only.name,
                _ => "<manifest>",
            },
        }
    }

    fn signature(&self) -> Result<Signature, IntrospectionError> {
        self.resolve()?.to_signature()
    }
}
