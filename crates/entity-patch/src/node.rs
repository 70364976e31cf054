//! Traversal units: entities, sequences and the nodes wrapping them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::store::Store;

/// Storage identity of a saved entity.
pub type EntityId = u64;

/// A named-field record.
///
/// `id` is `None` until the store has created the record. Foreign keys live
/// in `fields` as the related entity's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: String,
    pub id: Option<EntityId>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entity {
    /// A new, unsaved entity with no field values.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            fields: Map::new(),
        }
    }

    /// Attribute access. `id` reads the storage identity.
    pub fn get(&self, field: &str) -> Value {
        if field == "id" {
            return self.id.map(Value::from).unwrap_or(Value::Null);
        }
        self.fields.get(field).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// The entity as a JSON object, `id` first.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 1);
        map.insert("id".into(), self.get("id"));
        for (k, v) in &self.fields {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

/// Equality filter on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

/// A lazily evaluated collection of entities of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl Query {
    /// Every entity of `kind`.
    pub fn all(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            filter: None,
        }
    }

    /// Entities of `kind` whose `back_ref` field points at `id`.
    pub fn related(kind: impl Into<String>, back_ref: impl Into<String>, id: EntityId) -> Self {
        Self {
            kind: kind.into(),
            filter: Some(Filter {
                field: back_ref.into(),
                value: Value::from(id),
            }),
        }
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        if entity.kind != self.kind {
            return false;
        }
        match &self.filter {
            Some(filter) => entity.get(&filter.field) == filter.value,
            None => true,
        }
    }
}

/// An ordered, integer-indexed container of entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    /// A plain materialized list. Removing from it also shrinks `items`.
    List { kind: String, items: Vec<Entity> },
    /// A relation-backed collection, fetched from the store on every access.
    Relation(Query),
}

impl Sequence {
    pub fn list(kind: impl Into<String>, items: Vec<Entity>) -> Self {
        Sequence::List {
            kind: kind.into(),
            items,
        }
    }

    pub fn relation(query: Query) -> Self {
        Sequence::Relation(query)
    }

    /// Element kind.
    pub fn kind(&self) -> &str {
        match self {
            Sequence::List { kind, .. } => kind,
            Sequence::Relation(query) => &query.kind,
        }
    }

    pub fn get(&self, store: &dyn Store, index: usize) -> Result<Option<Entity>, StoreError> {
        match self {
            Sequence::List { items, .. } => Ok(items.get(index).cloned()),
            Sequence::Relation(query) => store.get(query, index),
        }
    }

    pub fn len(&self, store: &dyn Store) -> Result<usize, StoreError> {
        match self {
            Sequence::List { items, .. } => Ok(items.len()),
            Sequence::Relation(query) => store.count(query),
        }
    }

    pub fn materialize(&self, store: &dyn Store) -> Result<Vec<Entity>, StoreError> {
        match self {
            Sequence::List { items, .. } => Ok(items.clone()),
            Sequence::Relation(query) => store.query(query),
        }
    }

    /// A blank element, with the relation's back-reference already set.
    pub fn new_entity(&self) -> Entity {
        let mut entity = Entity::new(self.kind());
        if let Sequence::Relation(Query {
            filter: Some(filter),
            ..
        }) = self
        {
            entity.set(filter.field.clone(), filter.value.clone());
        }
        entity
    }
}

/// The polymorphic traversal unit.
///
/// Only sequences and entities can be traversed further; scalars and nulls
/// appear as resolution results.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Sequence(Sequence),
    Entity(Entity),
    Scalar(Value),
    Null,
}

impl Node {
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Sequence(_) => "sequence",
            Node::Entity(_) => "entity",
            Node::Scalar(Value::Bool(_)) => "boolean",
            Node::Scalar(Value::Number(_)) => "number",
            Node::Scalar(Value::String(_)) => "string",
            Node::Scalar(Value::Array(_)) => "array",
            Node::Scalar(Value::Object(_)) => "object",
            Node::Scalar(Value::Null) | Node::Null => "null",
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Node::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// JSON view of the node, materializing relations through `store`.
    pub fn to_value(&self, store: &dyn Store) -> Result<Value, StoreError> {
        Ok(match self {
            Node::Sequence(seq) => Value::Array(
                seq.materialize(store)?
                    .iter()
                    .map(Entity::to_value)
                    .collect(),
            ),
            Node::Entity(entity) => entity.to_value(),
            Node::Scalar(value) => value.clone(),
            Node::Null => Value::Null,
        })
    }
}

impl From<Entity> for Node {
    fn from(entity: Entity) -> Self {
        Node::Entity(entity)
    }
}

impl From<Sequence> for Node {
    fn from(seq: Sequence) -> Self {
        Node::Sequence(seq)
    }
}
