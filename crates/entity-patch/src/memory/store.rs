//! In-memory [`Store`] with nested snapshot transactions.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::StoreError;
use crate::node::{Entity, EntityId, Query};
use crate::store::Store;

#[derive(Debug, Clone, Default, PartialEq)]
struct Table {
    last_id: EntityId,
    rows: IndexMap<EntityId, Map<String, Value>>,
}

/// Tables of field maps keyed by kind, then id.
///
/// Ids are assigned per kind, starting at 1, and never reused. Queries
/// return rows in insertion order. Each [`begin`](Store::begin) pushes a
/// snapshot; `rollback` restores it and `commit` discards it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: IndexMap<String, Table>,
    snapshots: Vec<IndexMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row without validation and returns it.
    pub fn insert(&mut self, kind: &str, mut fields: Map<String, Value>) -> Entity {
        let table = self.tables.entry(kind.to_string()).or_default();
        table.last_id += 1;
        let id = table.last_id;
        fields.remove("id");
        table.rows.insert(id, fields.clone());
        trace!(kind, id, "row inserted");
        Entity {
            kind: kind.to_string(),
            id: Some(id),
            fields,
        }
    }

    /// Number of rows of `kind`.
    pub fn len(&self, kind: &str) -> usize {
        self.tables.get(kind).map_or(0, |t| t.rows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(|t| t.rows.is_empty())
    }

    /// Open transactions.
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    fn row_mut(&mut self, entity: &Entity) -> Result<&mut Map<String, Value>, StoreError> {
        let id = entity
            .id
            .ok_or_else(|| StoreError::Unsaved(entity.kind.clone()))?;
        self.tables
            .get_mut(&entity.kind)
            .and_then(|t| t.rows.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound {
                kind: entity.kind.clone(),
                id,
            })
    }
}

fn to_entity(kind: &str, id: EntityId, fields: &Map<String, Value>) -> Entity {
    Entity {
        kind: kind.to_string(),
        id: Some(id),
        fields: fields.clone(),
    }
}

impl Store for MemoryStore {
    fn find(&self, kind: &str, id: EntityId) -> Result<Option<Entity>, StoreError> {
        Ok(self
            .tables
            .get(kind)
            .and_then(|t| t.rows.get(&id))
            .map(|fields| to_entity(kind, id, fields)))
    }

    fn query(&self, query: &Query) -> Result<Vec<Entity>, StoreError> {
        let Some(table) = self.tables.get(&query.kind) else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .iter()
            .map(|(id, fields)| to_entity(&query.kind, *id, fields))
            .filter(|entity| query.matches(entity))
            .collect())
    }

    fn create(&mut self, kind: &str, values: &Map<String, Value>) -> Result<Entity, StoreError> {
        Ok(self.insert(kind, values.clone()))
    }

    fn update(
        &mut self,
        entity: &Entity,
        values: &Map<String, Value>,
    ) -> Result<Entity, StoreError> {
        let row = self.row_mut(entity)?;
        for (k, v) in values {
            if k != "id" {
                row.insert(k.clone(), v.clone());
            }
        }
        let updated = Entity {
            kind: entity.kind.clone(),
            id: entity.id,
            fields: row.clone(),
        };
        trace!(kind = %entity.kind, id = ?entity.id, "row updated");
        Ok(updated)
    }

    fn delete(&mut self, entity: &Entity) -> Result<(), StoreError> {
        self.row_mut(entity)?;
        if let (Some(table), Some(id)) = (self.tables.get_mut(&entity.kind), entity.id) {
            table.rows.shift_remove(&id);
        }
        trace!(kind = %entity.kind, id = ?entity.id, "row deleted");
        Ok(())
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.snapshots.push(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshots
            .pop()
            .map(drop)
            .ok_or_else(|| StoreError::Backend("commit without an open transaction".into()))
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let snapshot = self
            .snapshots
            .pop()
            .ok_or_else(|| StoreError::Backend("rollback without an open transaction".into()))?;
        self.tables = snapshot;
        Ok(())
    }
}
