//! JSON codec for patch operations.
//!
//! Converts operations to and from `{"op", "path", "value", "from"}`
//! descriptors.

use entity_pointer::{validate_pointer, Pointer};
use serde_json::{Map, Value};

use crate::patch::types::{Op, Verb};
use crate::error::PatchError;

// ── Path helpers ──────────────────────────────────────────────────────────

fn decode_pointer(key: &str, v: &Value) -> Result<Pointer, PatchError> {
    let s = v
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp(format!("{key} must be a string")))?;
    validate_pointer(s).map_err(|e| PatchError::InvalidOp(format!("{key}: {e}")))?;
    Ok(Pointer::new(s))
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Parse one descriptor.
///
/// Checks run in a fixed order: shape, `op`, `path`, verb, then the
/// verb-specific keys.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op_str = obj
        .get("op")
        .ok_or(PatchError::MissingOp)?
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp("op must be a string".into()))?;
    let path = decode_pointer("path", obj.get("path").ok_or(PatchError::MissingPath)?)?;
    let verb: Verb = op_str.parse()?;

    let value = || -> Result<Value, PatchError> {
        obj.get("value")
            .cloned()
            .ok_or_else(|| PatchError::InvalidOp(format!("{verb} requires 'value'")))
    };
    let from = || -> Result<Option<Pointer>, PatchError> {
        obj.get("from").map(|f| decode_pointer("from", f)).transpose()
    };

    Ok(match verb {
        Verb::Add => Op::Add {
            path,
            value: value()?,
        },
        Verb::Remove => Op::Remove { path },
        Verb::Replace => Op::Replace {
            path,
            value: value()?,
        },
        Verb::Test => Op::Test {
            path,
            value: value()?,
        },
        Verb::Move => Op::Move { path, from: from()? },
        Verb::Copy => Op::Copy { path, from: from()? },
    })
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` back to its descriptor.
pub fn to_json(op: &Op) -> Value {
    let mut m = Map::new();
    m.insert("op".into(), Value::from(op.op_name()));
    m.insert("path".into(), Value::from(op.path().as_str()));
    if let Some(value) = op.value() {
        m.insert("value".into(), value.clone());
    }
    if let Op::Move {
        from: Some(from), ..
    }
    | Op::Copy {
        from: Some(from), ..
    } = op
    {
        m.insert("from".into(), Value::from(from.as_str()));
    }
    Value::Object(m)
}
