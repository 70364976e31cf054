//! Storage collaborator.

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::node::{Entity, EntityId, Query};

/// Persistent storage for entities.
///
/// Each call is assumed atomic on its own. Transactions are optional; the
/// default hooks report [`StoreError::Unsupported`], which makes an atomic
/// apply fail up front instead of silently running without one.
pub trait Store {
    fn find(&self, kind: &str, id: EntityId) -> Result<Option<Entity>, StoreError>;

    /// All entities matching `query`, in storage order.
    fn query(&self, query: &Query) -> Result<Vec<Entity>, StoreError>;

    /// The entity at `index` within `query`, if any.
    fn get(&self, query: &Query, index: usize) -> Result<Option<Entity>, StoreError> {
        Ok(self.query(query)?.into_iter().nth(index))
    }

    fn count(&self, query: &Query) -> Result<usize, StoreError> {
        Ok(self.query(query)?.len())
    }

    /// Creates a record of `kind` and returns it with its new id.
    fn create(&mut self, kind: &str, values: &Map<String, Value>) -> Result<Entity, StoreError>;

    /// Writes `values` onto the stored record of `entity` and returns the result.
    fn update(&mut self, entity: &Entity, values: &Map<String, Value>)
        -> Result<Entity, StoreError>;

    fn delete(&mut self, entity: &Entity) -> Result<(), StoreError>;

    fn begin(&mut self) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("transactions".into()))
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("transactions".into()))
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("transactions".into()))
    }
}
