//! Collaborators handed to every operation.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::binder::Binder;
use crate::error::StoreError;
use crate::resolve::Resolver;
use crate::schema::SchemaAdapter;
use crate::store::Store;

/// Storage, schema and binding capabilities for one apply call.
pub struct Context<'a> {
    pub store: &'a mut dyn Store,
    pub schema: &'a dyn SchemaAdapter,
    pub binder: &'a dyn Binder,
}

impl<'a> Context<'a> {
    pub fn new(
        store: &'a mut dyn Store,
        schema: &'a dyn SchemaAdapter,
        binder: &'a dyn Binder,
    ) -> Self {
        Self {
            store,
            schema,
            binder,
        }
    }

    /// A read-only resolver over this context's store and schema.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&*self.store, self.schema)
    }
}

/// A store transaction held open for the lifetime of the scope.
///
/// Dropping the scope without [`commit`](Self::commit) rolls back.
pub struct TransactionScope<'c, 'a> {
    ctx: &'c mut Context<'a>,
    open: bool,
}

impl<'c, 'a> TransactionScope<'c, 'a> {
    pub fn begin(ctx: &'c mut Context<'a>) -> Result<Self, StoreError> {
        ctx.store.begin()?;
        debug!("transaction opened");
        Ok(Self { ctx, open: true })
    }

    pub fn commit(mut self) -> Result<(), StoreError> {
        self.ctx.store.commit()?;
        self.open = false;
        debug!("transaction committed");
        Ok(())
    }

    pub fn rollback(mut self) -> Result<(), StoreError> {
        self.open = false;
        self.ctx.store.rollback()?;
        debug!("transaction rolled back");
        Ok(())
    }
}

impl<'a> Deref for TransactionScope<'_, 'a> {
    type Target = Context<'a>;

    fn deref(&self) -> &Context<'a> {
        &*self.ctx
    }
}

impl<'a> DerefMut for TransactionScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Context<'a> {
        &mut *self.ctx
    }
}

impl Drop for TransactionScope<'_, '_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(err) = self.ctx.store.rollback() {
                warn!(%err, "rollback of abandoned transaction failed");
            }
        }
    }
}
