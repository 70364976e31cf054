//! Patch apply logic.

use entity_pointer::{parse_index, Pointer, PointerError};
use serde_json::{Map, Value};
use tracing::debug;

use super::types::{ApplyOptions, Op, OpResult, PatchResult};
use crate::context::Context;
use crate::error::{Error, PatchError};
use crate::node::{Entity, Node, Query, Sequence};
use crate::schema::FieldKind;

// ── Helpers ───────────────────────────────────────────────────────────────

/// Index parsing for mutating verbs, which report failures as patch errors.
fn index_of(segment: &str) -> Result<usize, PatchError> {
    parse_index(segment).map_err(|err| match err {
        PointerError::IndexNotInt(s) => PatchError::IndexNotInt(s),
        _ => PatchError::IndexOutOfRange(segment.to_string()),
    })
}

fn field_values<'v>(value: &'v Value, verb: &str) -> Result<&'v Map<String, Value>, PatchError> {
    value
        .as_object()
        .ok_or_else(|| PatchError::InvalidValue(format!("{verb} expects an object of field values")))
}

/// Binds `values` onto `target` and persists the result.
///
/// Unsaved targets are created, saved ones updated. With `save` off the
/// bound entity is returned without touching the store.
fn bind_and_save(
    ctx: &mut Context<'_>,
    target: Entity,
    values: &Map<String, Value>,
    fields: Option<&[String]>,
    options: &ApplyOptions,
) -> Result<Entity, Error> {
    let binding = ctx.binder.bind(&target, values, fields);
    if !binding.is_valid() {
        return Err(PatchError::FailedValidation(binding.errors).into());
    }
    if !options.save {
        let mut bound = target;
        bound.fields.extend(binding.data);
        return Ok(bound);
    }
    let saved = match target.id {
        Some(_) => ctx.store.update(&target, &binding.data)?,
        None => ctx.store.create(&target.kind, &binding.data)?,
    };
    Ok(saved)
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(
    root: &mut Node,
    path: &Pointer,
    value: &Value,
    ctx: &mut Context<'_>,
    options: &ApplyOptions,
) -> Result<Option<Entity>, Error> {
    let values = field_values(value, "add")?;
    let (mut parent, last) = ctx.resolver().to_last(path, root)?;

    if let Some(seq) = parent.sequence_mut() {
        if let Some(segment) = last.filter(|s| *s != "-") {
            let index = index_of(segment)?;
            if seq.get(&*ctx.store, index)?.is_some() {
                return Err(PatchError::EntryExists(segment.to_string()).into());
            }
        }
        let created = bind_and_save(ctx, seq.new_entity(), values, None, options)?;
        if options.save {
            if let Sequence::List { items, .. } = seq {
                items.push(created.clone());
            }
        }
        return Ok(Some(created));
    }

    let type_name = parent.type_name();
    let entity = parent
        .entity_mut()
        .ok_or_else(|| PatchError::InvalidTarget(format!("cannot add to {type_name}")))?;

    // No segment: the root entity itself takes the values.
    let Some(segment) = last else {
        let saved = bind_and_save(ctx, entity.clone(), values, None, options)?;
        if options.save {
            *entity = saved.clone();
        }
        return Ok(Some(saved));
    };

    // A named collection on the entity: append to it.
    match ctx.schema.classify(&entity.kind, segment) {
        FieldKind::ToMany { related, back_ref } => {
            let id = entity.id.ok_or_else(|| {
                PatchError::InvalidTarget(format!("{segment} of an unsaved {}", entity.kind))
            })?;
            let seq = Sequence::relation(Query::related(related, back_ref, id));
            let created = bind_and_save(ctx, seq.new_entity(), values, None, options)?;
            Ok(Some(created))
        }
        FieldKind::Unknown => Err(PointerError::UnknownField {
            kind: entity.kind.clone(),
            field: segment.to_string(),
        }
        .into()),
        FieldKind::Scalar | FieldKind::ToOne { .. } => Err(PatchError::InvalidTarget(format!(
            "cannot add to field {segment}; use replace"
        ))
        .into()),
    }
}

fn apply_replace(
    root: &mut Node,
    path: &Pointer,
    value: &Value,
    ctx: &mut Context<'_>,
    options: &ApplyOptions,
) -> Result<Option<Entity>, Error> {
    let (mut parent, last) = ctx.resolver().to_last(path, root)?;
    let segment =
        last.ok_or_else(|| PatchError::InvalidTarget("replace needs a field or index".into()))?;

    // A whole element of a sequence: bind the object onto the existing entity.
    if let Some(seq) = parent.sequence_mut() {
        let values = field_values(value, "replace")?;
        let index = index_of(segment)?;
        let existing = seq
            .get(&*ctx.store, index)?
            .ok_or_else(|| PatchError::IndexOutOfRange(segment.to_string()))?;
        let saved = bind_and_save(ctx, existing, values, None, options)?;
        if options.save {
            if let Sequence::List { items, .. } = seq {
                items[index] = saved.clone();
            }
        }
        return Ok(Some(saved));
    }

    let type_name = parent.type_name();
    let entity = parent
        .entity_mut()
        .ok_or_else(|| PointerError::ExpectedEntity(type_name.to_string()))?;
    match ctx.schema.classify(&entity.kind, segment) {
        FieldKind::Unknown => {
            return Err(PointerError::UnknownField {
                kind: entity.kind.clone(),
                field: segment.to_string(),
            }
            .into())
        }
        FieldKind::ToMany { .. } => {
            return Err(PatchError::InvalidTarget(format!(
                "{segment} is a to-many relation and cannot be replaced"
            ))
            .into())
        }
        FieldKind::Scalar | FieldKind::ToOne { .. } => {}
    }

    let mut values = Map::new();
    values.insert(segment.to_string(), value.clone());
    let fields = [segment.to_string()];
    let saved = bind_and_save(ctx, entity.clone(), &values, Some(&fields), options)?;
    if options.save {
        *entity = saved.clone();
    }
    Ok(Some(saved))
}

fn apply_remove(
    root: &mut Node,
    path: &Pointer,
    ctx: &mut Context<'_>,
    options: &ApplyOptions,
) -> Result<Option<Entity>, Error> {
    let (mut parent, last) = ctx.resolver().to_last(path, root)?;

    if let Some(seq) = parent.sequence_mut() {
        let segment = last
            .ok_or_else(|| PatchError::InvalidTarget("cannot remove a whole sequence".into()))?;
        let index = index_of(segment)?;
        let item = seq
            .get(&*ctx.store, index)?
            .ok_or_else(|| PatchError::IndexOutOfRange(segment.to_string()))?;
        if options.save {
            ctx.store.delete(&item)?;
            // Relation-backed sequences pick up the delete on their next fetch.
            if let Sequence::List { items, .. } = seq {
                items.remove(index);
            }
        }
        return Ok(None);
    }
    drop(parent);

    // Not a sequence element: delete whatever the full pointer lands on.
    let target = ctx.resolver().resolve(path, root)?;
    let entity = target.entity().ok_or_else(|| {
        PatchError::InvalidTarget(format!("cannot remove a {}", target.type_name()))
    })?;
    if options.save {
        ctx.store.delete(entity)?;
    }
    Ok(None)
}

fn apply_test(
    root: &mut Node,
    path: &Pointer,
    value: &Value,
    ctx: &mut Context<'_>,
) -> Result<Option<Entity>, Error> {
    let target = ctx.resolver().resolve(path, root)?;
    let actual = target.to_value(&*ctx.store)?;
    if actual != *value {
        return Err(PatchError::ValueMismatch {
            expected: value.clone(),
            actual,
        }
        .into());
    }
    Ok(None)
}

// ── Main apply function ───────────────────────────────────────────────────

/// Apply a single operation to `root`.
///
/// Returns the created or updated entity for `add` and `replace`.
pub fn apply_op(
    root: &mut Node,
    op: &Op,
    ctx: &mut Context<'_>,
    options: &ApplyOptions,
) -> Result<Option<Entity>, Error> {
    match op {
        Op::Add { path, value } => apply_add(root, path, value, ctx, options),
        Op::Remove { path } => apply_remove(root, path, ctx, options),
        Op::Replace { path, value } => apply_replace(root, path, value, ctx, options),
        Op::Test { path, value } => apply_test(root, path, value, ctx),
        Op::Move { .. } => Err(Error::NotImplemented("move")),
        Op::Copy { .. } => Err(Error::NotImplemented("copy")),
    }
}

/// Apply operations in order, stopping at the first failure.
///
/// Operations that already ran stay applied.
pub fn apply_ops(
    root: &mut Node,
    ops: &[Op],
    ctx: &mut Context<'_>,
    options: &ApplyOptions,
) -> Result<PatchResult, Error> {
    let mut res = Vec::with_capacity(ops.len());
    for (index, op) in ops.iter().enumerate() {
        debug!(index, op = op.op_name(), path = %op.path(), "applying operation");
        let entity = apply_op(root, op, ctx, options).map_err(|err| {
            debug!(index, op = op.op_name(), path = %op.path(), %err, "operation failed");
            err
        })?;
        res.push(OpResult {
            op: op.verb(),
            path: op.path().to_string(),
            entity,
        });
    }
    Ok(PatchResult { res })
}
