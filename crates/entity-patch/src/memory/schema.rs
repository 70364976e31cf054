//! Declared models and form-style binding.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::binder::{Binder, Binding, ValidationErrors};
use crate::node::Entity;
use crate::schema::{FieldKind, SchemaAdapter};

const REQUIRED: &str = "This field is required.";
const NOT_EDITABLE: &str = "This field is not editable.";
const UNKNOWN_FIELD: &str = "Unknown field.";

/// Value type of a plain field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Integer,
    Float,
    Boolean,
    /// Any JSON value, stored as given.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Scalar { scalar: ScalarType },
    /// Holds the id of one `to` entity. `related_name` exposes the reverse
    /// collection on the `to` model.
    ForeignKey {
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        related_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(flatten)]
    pub ty: FieldType,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl FieldDef {
    fn scalar(scalar: ScalarType) -> Self {
        Self {
            ty: FieldType::Scalar { scalar },
            required: true,
            editable: true,
            max_length: None,
        }
    }

    pub fn string() -> Self {
        Self::scalar(ScalarType::String)
    }

    pub fn integer() -> Self {
        Self::scalar(ScalarType::Integer)
    }

    pub fn float() -> Self {
        Self::scalar(ScalarType::Float)
    }

    pub fn boolean() -> Self {
        Self::scalar(ScalarType::Boolean)
    }

    pub fn json() -> Self {
        Self::scalar(ScalarType::Json)
    }

    pub fn foreign_key(to: impl Into<String>) -> Self {
        Self {
            ty: FieldType::ForeignKey {
                to: to.into(),
                related_name: None,
            },
            required: true,
            editable: true,
            max_length: None,
        }
    }

    /// Names the reverse collection. No effect on scalar fields.
    pub fn related_name(mut self, name: impl Into<String>) -> Self {
        if let FieldType::ForeignKey { related_name, .. } = &mut self.ty {
            *related_name = Some(name.into());
        }
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    /// Validates and normalizes one raw value.
    fn clean(&self, raw: Option<&Value>) -> Result<Value, String> {
        let raw = match raw {
            None | Some(Value::Null) => {
                return if self.required {
                    Err(REQUIRED.into())
                } else {
                    Ok(Value::Null)
                };
            }
            Some(Value::String(s)) if s.is_empty() && self.required => {
                return Err(REQUIRED.into())
            }
            Some(raw) => raw,
        };
        match &self.ty {
            FieldType::Scalar { scalar } => self.clean_scalar(*scalar, raw),
            FieldType::ForeignKey { .. } => clean_id(raw)
                .map(Value::from)
                .ok_or_else(|| "Select a valid choice.".to_string()),
        }
    }

    fn clean_scalar(&self, scalar: ScalarType, raw: &Value) -> Result<Value, String> {
        match scalar {
            ScalarType::String => {
                let s = raw.as_str().ok_or("Enter a valid string.")?;
                let len = s.chars().count();
                match self.max_length {
                    Some(max) if len > max => Err(format!(
                        "Ensure this value has at most {max} characters (it has {len})."
                    )),
                    _ => Ok(raw.clone()),
                }
            }
            ScalarType::Integer => match raw {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| "Enter a whole number.".to_string()),
                _ => Err("Enter a whole number.".into()),
            },
            ScalarType::Float => {
                let f = match raw {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                f.and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| "Enter a number.".to_string())
            }
            ScalarType::Boolean => match raw {
                Value::Bool(_) => Ok(raw.clone()),
                _ => Err("Enter a boolean.".into()),
            },
            ScalarType::Json => Ok(raw.clone()),
        }
    }
}

fn clean_id(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One entity kind and its fields, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }
}

/// A set of models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub models: IndexMap<String, ModelDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: ModelDef) -> Self {
        self.models.insert(model.name.clone(), model);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&ModelDef> {
        self.models.get(kind)
    }

    /// The foreign key whose `related_name` on `kind` is `name`.
    fn reverse(&self, kind: &str, name: &str) -> Option<(&str, &str)> {
        self.models.values().find_map(|model| {
            model.fields.iter().find_map(|(field, def)| match &def.ty {
                FieldType::ForeignKey {
                    to,
                    related_name: Some(related),
                } if to == kind && related == name => Some((model.name.as_str(), field.as_str())),
                _ => None,
            })
        })
    }
}

impl SchemaAdapter for Schema {
    fn classify(&self, kind: &str, field: &str) -> FieldKind {
        let Some(model) = self.get(kind) else {
            return FieldKind::Unknown;
        };
        if field == "id" {
            return FieldKind::Scalar;
        }
        if let Some(def) = model.fields.get(field) {
            return match &def.ty {
                FieldType::Scalar { .. } => FieldKind::Scalar,
                FieldType::ForeignKey { to, .. } => FieldKind::ToOne {
                    related: to.clone(),
                },
            };
        }
        match self.reverse(kind, field) {
            Some((related, back_ref)) => FieldKind::ToMany {
                related: related.to_string(),
                back_ref: back_ref.to_string(),
            },
            None => FieldKind::Unknown,
        }
    }
}

impl Binder for Schema {
    fn bind(
        &self,
        target: &Entity,
        values: &Map<String, Value>,
        fields: Option<&[String]>,
    ) -> Binding {
        let mut errors = ValidationErrors::new();
        let mut data = Map::new();
        let Some(model) = self.get(&target.kind) else {
            errors.add("__all__", format!("Unknown model {}.", target.kind));
            return Binding { data, errors };
        };

        let selected: Vec<(&str, &FieldDef)> = match fields {
            Some(names) => {
                let mut selected = Vec::with_capacity(names.len());
                for name in names {
                    match model.fields.get_key_value(name.as_str()) {
                        Some((name, def)) if def.editable => selected.push((name.as_str(), def)),
                        Some(_) => errors.add(name.as_str(), NOT_EDITABLE),
                        None if name == "id" => errors.add(name.as_str(), NOT_EDITABLE),
                        None => errors.add(name.as_str(), UNKNOWN_FIELD),
                    }
                }
                selected
            }
            None => model
                .fields
                .iter()
                .filter(|(_, def)| def.editable)
                .map(|(name, def)| (name.as_str(), def))
                .collect(),
        };

        for (name, def) in selected {
            let raw = values.get(name).or_else(|| target.fields.get(name));
            match def.clean(raw) {
                Ok(value) => {
                    data.insert(name.to_string(), value);
                }
                Err(message) => errors.add(name, message),
            }
        }
        Binding { data, errors }
    }
}
