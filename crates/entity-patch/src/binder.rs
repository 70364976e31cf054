//! Binding raw patch values onto entities.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::node::Entity;

/// Field name to messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, messages)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

/// Outcome of [`Binder::bind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    /// Cleaned field values, ready to hand to the store.
    pub data: Map<String, Value>,
    pub errors: ValidationErrors,
}

impl Binding {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Converts raw patch values into typed field values for a target entity.
///
/// `fields` restricts binding to the named fields; `None` binds every
/// editable field of the target's kind. Nothing is persisted here.
pub trait Binder {
    fn bind(&self, target: &Entity, values: &Map<String, Value>, fields: Option<&[String]>)
        -> Binding;
}
