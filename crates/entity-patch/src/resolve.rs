//! Pointer resolution over sequences and entities.
//!
//! Walking stays borrowed from the caller's root for as long as it can: the
//! root itself, and elements of a materialized [`Sequence::List`] root. Every
//! step that reaches into the store (relations, relation-backed sequences)
//! yields a detached, owned node instead.

use entity_pointer::{parse_index, Pointer, PointerError};
use serde_json::Value;
use tracing::trace;

use crate::error::{Error, StoreError};
use crate::node::{Entity, Node, Query, Sequence};
use crate::schema::{FieldKind, SchemaAdapter};
use crate::store::Store;

/// A resolved location.
#[derive(Debug)]
pub enum Target<'n> {
    /// The root node itself.
    Root(&'n mut Node),
    /// An element of a materialized list root.
    Element(&'n mut Entity),
    /// A node fetched from the store.
    Detached(Node),
}

impl Target<'_> {
    fn node(&self) -> Option<&Node> {
        match self {
            Target::Root(node) => Some(&**node),
            Target::Detached(node) => Some(node),
            Target::Element(_) => None,
        }
    }

    fn node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Target::Root(node) => Some(&mut **node),
            Target::Detached(node) => Some(node),
            Target::Element(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.node() {
            Some(node) => node.type_name(),
            None => "entity",
        }
    }

    pub fn sequence_mut(&mut self) -> Option<&mut Sequence> {
        match self.node_mut()? {
            Node::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn entity(&self) -> Option<&Entity> {
        match self {
            Target::Element(entity) => Some(&**entity),
            Target::Root(node) => node.as_entity(),
            Target::Detached(node) => node.as_entity(),
        }
    }

    pub fn entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Target::Element(entity) => Some(&mut **entity),
            Target::Root(node) => match &mut **node {
                Node::Entity(entity) => Some(entity),
                _ => None,
            },
            Target::Detached(Node::Entity(entity)) => Some(entity),
            Target::Detached(_) => None,
        }
    }

    /// JSON view of the target, as compared by `test`.
    pub fn to_value(&self, store: &dyn Store) -> Result<Value, StoreError> {
        match self {
            Target::Element(entity) => Ok(entity.to_value()),
            Target::Root(node) => node.to_value(store),
            Target::Detached(node) => node.to_value(store),
        }
    }
}

/// Walks pointers using a store for fetches and a schema for field kinds.
#[derive(Clone, Copy)]
pub struct Resolver<'s> {
    store: &'s dyn Store,
    schema: &'s dyn SchemaAdapter,
}

impl<'s> Resolver<'s> {
    pub fn new(store: &'s dyn Store, schema: &'s dyn SchemaAdapter) -> Self {
        Self { store, schema }
    }

    /// Resolves every part of `pointer`.
    pub fn resolve<'n>(&self, pointer: &Pointer, root: &'n mut Node) -> Result<Target<'n>, Error> {
        self.walk(root, pointer.parts())
    }

    /// Resolves all but the last part and hands that part back untouched.
    ///
    /// The last part is `None` when the pointer targets the root.
    pub fn to_last<'n, 'p>(
        &self,
        pointer: &'p Pointer,
        root: &'n mut Node,
    ) -> Result<(Target<'n>, Option<&'p str>), Error> {
        let (parent, last) = pointer.split_last();
        Ok((self.walk(root, parent)?, last))
    }

    fn walk<'n>(&self, root: &'n mut Node, parts: &[String]) -> Result<Target<'n>, Error> {
        let Some((first, rest)) = parts.split_first() else {
            return Ok(Target::Root(root));
        };
        let mut target = match root {
            Node::Sequence(Sequence::List { items, .. }) => {
                trace!(part = %first, node = "sequence", "pointer step");
                let index = parse_index(first)?;
                match items.get_mut(index) {
                    Some(entity) => Target::Element(entity),
                    None => return Err(PointerError::IndexOutOfRange(first.clone()).into()),
                }
            }
            node => Target::Detached(self.process_part(node, first)?),
        };
        for part in rest {
            let next = match &target {
                Target::Element(entity) => {
                    trace!(part = %part, node = "entity", "pointer step");
                    self.entity_part(entity, part)?
                }
                Target::Root(node) => self.process_part(node, part)?,
                Target::Detached(node) => self.process_part(node, part)?,
            };
            target = Target::Detached(next);
        }
        Ok(target)
    }

    /// Traverses a single part from `node`.
    pub fn process_part(&self, node: &Node, part: &str) -> Result<Node, Error> {
        trace!(part, node = node.type_name(), "pointer step");
        match node {
            Node::Sequence(seq) => self.sequence_part(seq, part),
            Node::Entity(entity) => self.entity_part(entity, part),
            other => Err(PointerError::ExpectedEntity(other.type_name().to_string()).into()),
        }
    }

    fn sequence_part(&self, seq: &Sequence, part: &str) -> Result<Node, Error> {
        let index = parse_index(part)?;
        match seq.get(self.store, index)? {
            Some(entity) => Ok(Node::Entity(entity)),
            None => Err(PointerError::IndexOutOfRange(part.to_string()).into()),
        }
    }

    fn entity_part(&self, entity: &Entity, part: &str) -> Result<Node, Error> {
        match self.schema.classify(&entity.kind, part) {
            FieldKind::ToMany { related, back_ref } => Ok(Node::Sequence(match entity.id {
                Some(id) => Sequence::Relation(Query::related(related, back_ref, id)),
                // Nothing can reference an unsaved entity yet.
                None => Sequence::list(related, Vec::new()),
            })),
            FieldKind::ToOne { related } => {
                let found = match entity.get(part).as_u64() {
                    Some(id) => self.store.find(&related, id)?,
                    None => None,
                };
                Ok(found.map(Node::Entity).unwrap_or(Node::Null))
            }
            FieldKind::Scalar => Ok(Node::Scalar(entity.get(part))),
            FieldKind::Unknown => Err(PointerError::UnknownField {
                kind: entity.kind.clone(),
                field: part.to_string(),
            }
            .into()),
        }
    }
}
