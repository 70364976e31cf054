//! JSON Patch over entity graphs.
//!
//! # Operations
//!
//! `add`, `remove`, `replace` and `test` are applied. `move` and `copy` are
//! reserved: they parse, and applying them fails with
//! [`Error::NotImplemented`].

pub mod apply;
pub mod codec;
pub mod types;

pub use apply::{apply_op, apply_ops};
pub use codec::{from_json, to_json};
pub use types::{ApplyOptions, Op, OpResult, PatchResult, Verb};

use serde_json::Value;
use tracing::{debug, warn};

use crate::context::{Context, TransactionScope};
use crate::error::{Error, PatchError};
use crate::node::Node;

/// An ordered batch of operation descriptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    descriptors: Vec<Value>,
}

impl Patch {
    pub fn new(descriptors: Vec<Value>) -> Self {
        Self { descriptors }
    }

    /// Builds a patch from a JSON array of descriptors.
    pub fn from_json(v: &Value) -> Result<Self, PatchError> {
        let arr = v
            .as_array()
            .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
        Ok(Self::new(arr.clone()))
    }

    /// Builds a patch from already parsed operations.
    pub fn from_ops(ops: &[Op]) -> Self {
        Self::new(ops.iter().map(to_json).collect())
    }

    pub fn descriptors(&self) -> &[Value] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Parses every descriptor, in order.
    pub fn operations(&self) -> Result<Vec<Op>, PatchError> {
        self.descriptors.iter().map(Self::operation).collect()
    }

    /// Parses one descriptor.
    pub fn operation(descriptor: &Value) -> Result<Op, PatchError> {
        from_json(descriptor)
    }

    /// Applies the patch with default options.
    pub fn apply(&self, root: &mut Node, ctx: &mut Context<'_>) -> Result<PatchResult, Error> {
        self.apply_with(root, ctx, &ApplyOptions::default())
    }

    /// Applies the patch to `root`.
    ///
    /// Every descriptor is parsed before anything runs. Without
    /// `options.atomic` a failure leaves earlier operations applied.
    pub fn apply_with(
        &self,
        root: &mut Node,
        ctx: &mut Context<'_>,
        options: &ApplyOptions,
    ) -> Result<PatchResult, Error> {
        let ops = self.operations()?;
        debug!(ops = ops.len(), save = options.save, atomic = options.atomic, "applying patch");
        if !options.atomic {
            return apply_ops(root, &ops, ctx, options);
        }

        let snapshot = root.clone();
        let mut scope = TransactionScope::begin(ctx)?;
        let outcome = match apply_ops(root, &ops, &mut scope, options) {
            // A failed commit leaves the scope open, so its drop rolls back.
            Ok(result) => scope.commit().map(|()| result).map_err(Error::from),
            Err(err) => {
                if let Err(rollback) = scope.rollback() {
                    warn!(%rollback, "rollback after failed patch did not complete");
                }
                Err(err)
            }
        };
        if outcome.is_err() {
            *root = snapshot;
        }
        outcome
    }
}

impl From<Vec<Value>> for Patch {
    fn from(descriptors: Vec<Value>) -> Self {
        Patch::new(descriptors)
    }
}
