//! Core types for the patch module.

use std::fmt;
use std::str::FromStr;

use entity_pointer::Pointer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PatchError;
use crate::node::Entity;

// ── Verb ──────────────────────────────────────────────────────────────────

/// The fixed table of operation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Add,
    Copy,
    Move,
    Remove,
    Replace,
    Test,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Add,
        Verb::Copy,
        Verb::Move,
        Verb::Remove,
        Verb::Replace,
        Verb::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Add => "add",
            Verb::Copy => "copy",
            Verb::Move => "move",
            Verb::Remove => "remove",
            Verb::Replace => "replace",
            Verb::Test => "test",
        }
    }

    /// Whether the descriptor must carry a `value`.
    pub fn requires_value(&self) -> bool {
        matches!(self, Verb::Add | Verb::Replace | Verb::Test)
    }
}

impl FromStr for Verb {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| PatchError::Unsupported(s.to_string()))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A parsed patch operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Pointer, value: Value },
    Remove { path: Pointer },
    Replace { path: Pointer, value: Value },
    Test { path: Pointer, value: Value },
    /// Reserved; parses but is not applied.
    Move { path: Pointer, from: Option<Pointer> },
    /// Reserved; parses but is not applied.
    Copy { path: Pointer, from: Option<Pointer> },
}

impl Op {
    pub fn verb(&self) -> Verb {
        match self {
            Op::Add { .. } => Verb::Add,
            Op::Remove { .. } => Verb::Remove,
            Op::Replace { .. } => Verb::Replace,
            Op::Test { .. } => Verb::Test,
            Op::Move { .. } => Verb::Move,
            Op::Copy { .. } => Verb::Copy,
        }
    }

    pub fn op_name(&self) -> &'static str {
        self.verb().as_str()
    }

    pub fn path(&self) -> &Pointer {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Test { path, .. }
            | Op::Move { path, .. }
            | Op::Copy { path, .. } => path,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Op::Add { value, .. } | Op::Replace { value, .. } | Op::Test { value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }
}

// ── Result types ──────────────────────────────────────────────────────────

/// Result of applying a single operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OpResult {
    pub op: Verb,
    pub path: String,
    /// The created or updated entity for `add` and `replace`.
    pub entity: Option<Entity>,
}

/// Result of applying a full patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchResult {
    pub res: Vec<OpResult>,
}

/// Options for [`Patch::apply_with`](crate::Patch::apply_with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Persist changes. When false, values are bound and validated but
    /// nothing is written to the store or to the root.
    pub save: bool,
    /// Run the whole patch inside one store transaction and restore the
    /// root on failure.
    pub atomic: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            save: true,
            atomic: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_table() {
        for verb in Verb::ALL {
            assert_eq!(verb.as_str().parse::<Verb>(), Ok(verb));
        }
        assert_eq!(
            "xyz".parse::<Verb>(),
            Err(PatchError::Unsupported("xyz".into()))
        );
        assert!("ADD".parse::<Verb>().is_err());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ApplyOptions = serde_json::from_str(r#"{"atomic": true}"#).unwrap();
        assert_eq!(
            options,
            ApplyOptions {
                save: true,
                atomic: true
            }
        );
    }
}
