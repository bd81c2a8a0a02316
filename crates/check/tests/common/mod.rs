//! Shared fixtures for sift-check integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;
use sift_check::{Checker, Entity, EntityRef, EntityStore, HostObject, Value};

/// Persisted record with an owner and a visibility flag.
#[derive(Debug)]
pub struct Record {
    pub uri: String,
    pub owner: String,
    pub readable: bool,
}

impl Entity for Record {
    fn uri(&self) -> &str {
        &self.uri
    }

    /// Conditions look like `{"owner": "..."}`.
    fn matches_condition(&self, condition: &Value) -> bool {
        condition
            .get("owner")
            .and_then(Value::as_str)
            .is_none_or(|owner| owner == self.owner)
    }

    fn is_readable(&self) -> bool {
        self.readable
    }
}

/// In-memory store keyed by URI, with numeric ids in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<IndexMap<String, Arc<Record>>>,
    derived: AtomicUsize,
}

impl MemoryStore {
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str, bool)>,
    {
        let store = Self::default();
        for (uri, owner, readable) in records {
            store.insert(uri, owner, readable);
        }
        store
    }

    pub fn insert(&self, uri: &str, owner: &str, readable: bool) -> Arc<Record> {
        let record = Arc::new(Record {
            uri: uri.to_string(),
            owner: owner.to_string(),
            readable,
        });
        self.records.write().insert(uri.to_string(), Arc::clone(&record));
        record
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }
}

impl EntityStore for MemoryStore {
    fn resolve(&self, reference: &EntityRef) -> Option<Arc<dyn Entity>> {
        let record = match reference {
            EntityRef::Uri(uri) => self.records.read().get(uri).cloned(),
            EntityRef::Id(id) => {
                let index = id.parse::<usize>().ok()?;
                self.records.read().get_index(index).map(|(_, record)| Arc::clone(record))
            }
            EntityRef::Derive { proto, parent } => {
                let owner = self.records.read().get(proto)?.owner.clone();
                let n = self.derived.fetch_add(1, Ordering::SeqCst) + 1;
                let uri = format!("{}/new{n}", parent.as_deref().unwrap_or(""));
                Some(self.insert(&uri, &owner, true))
            }
        }?;
        Some(record)
    }
}

/// Host object with a single parent class.
#[derive(Debug)]
pub struct Upload {
    pub name: String,
}

impl HostObject for Upload {
    fn class_name(&self) -> &str {
        "Upload"
    }

    fn is_instance_of(&self, class: &str) -> bool {
        matches!(class, "Upload" | "File")
    }
}

/// Accepts maps whose values are scalars and wraps them as `{"where": ..}`.
pub fn normalize_condition(value: &Value) -> Option<Value> {
    let map = value.as_map()?;
    if !map.values().all(Value::is_scalar) {
        return None;
    }
    let mut normalized = IndexMap::new();
    normalized.insert("where".to_string(), value.clone());
    Some(Value::Map(normalized))
}

/// Checker wired to a library store and the condition normalizer.
pub fn checker() -> Checker {
    sift_log::init_test().expect("test logging should initialize");
    Checker::builder()
        .entity_store(MemoryStore::with_records([
            ("/library/books/1", "ann", true),
            ("/library/books/2", "bob", true),
            ("/library/books/3", "ann", false),
            ("/library/types/book", "admin", true),
        ]))
        .condition_normalizer(normalize_condition)
        .build()
}
