#![allow(dead_code)]

use entity_patch::memory::{FieldDef, MemoryStore, ModelDef, Schema};
use entity_patch::{
    ApplyOptions, Context, Entity, Error, Node, Patch, PatchResult, Query, Sequence, Store,
};
use serde_json::{Map, Value};

/// Authors with books, linked by `book.author` and exposed as `author.books`.
pub fn library() -> Schema {
    Schema::new()
        .model(ModelDef::new("author").field("name", FieldDef::string().max_length(255)))
        .model(
            ModelDef::new("book")
                .field("title", FieldDef::string())
                .field("author", FieldDef::foreign_key("author").related_name("books")),
        )
}

pub fn object(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

pub fn seed_authors(store: &mut MemoryStore, names: &[&str]) -> Vec<Entity> {
    names
        .iter()
        .map(|name| store.insert("author", object(serde_json::json!({ "name": name }))))
        .collect()
}

pub fn seed_books(store: &mut MemoryStore, author: &Entity, titles: &[&str]) -> Vec<Entity> {
    titles
        .iter()
        .map(|title| {
            store.insert(
                "book",
                object(serde_json::json!({ "title": title, "author": author.id })),
            )
        })
        .collect()
}

/// Every author, fetched lazily.
pub fn authors() -> Node {
    Node::Sequence(Sequence::relation(Query::all("author")))
}

/// Every author, materialized now.
pub fn author_list(store: &MemoryStore) -> Node {
    let items = store.query(&Query::all("author")).unwrap_or_default();
    Node::Sequence(Sequence::list("author", items))
}

pub fn names(store: &MemoryStore) -> Vec<Value> {
    store
        .query(&Query::all("author"))
        .unwrap_or_default()
        .iter()
        .map(|a| a.get("name"))
        .collect()
}

pub fn run(root: &mut Node, store: &mut MemoryStore, patch: Value) -> Result<PatchResult, Error> {
    run_with(root, store, patch, &ApplyOptions::default())
}

pub fn run_with(
    root: &mut Node,
    store: &mut MemoryStore,
    patch: Value,
    options: &ApplyOptions,
) -> Result<PatchResult, Error> {
    let schema = library();
    let mut ctx = Context::new(store, &schema, &schema);
    Patch::from_json(&patch)?.apply_with(root, &mut ctx, options)
}
