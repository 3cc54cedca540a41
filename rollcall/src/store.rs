//! The query cache shared by the client and its cache exchange.

use crate::{utils::progressive_hash, GraphQLQuery, QueryError};
use parking_lot::RwLock;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

/// How a top-level field of a cached result is combined with incoming data on write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldPolicy {
    /// Lists are concatenated, existing entries first. Non-list values are replaced.
    Concat,
    /// The incoming value always replaces the cached one.
    Replace
}

impl Default for FieldPolicy {
    fn default() -> Self {
        FieldPolicy::Concat
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to serialize result for the cache: {0}")]
    Serialize(#[from] serde_json::Error)
}

/// Results keyed by operation key (query key + variables hash). Values are kept as JSON, so
/// every read hands out a freshly deserialized copy that shares nothing with the cache.
#[derive(Default)]
pub struct Store {
    results: RwLock<HashMap<u64, Value>>,
    field_policies: RwLock<HashMap<String, FieldPolicy>>
}

pub(crate) fn operation_key<Q: GraphQLQuery>(variables: &Q::Variables) -> Result<u64, QueryError> {
    let (_, meta) = Q::build_query(variables.clone());
    progressive_hash(meta.query_key, variables)
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field_policy<F: Into<String>>(&self, field: F, policy: FieldPolicy) {
        self.field_policies.write().insert(field.into(), policy);
    }

    pub fn field_policy(&self, field: &str) -> FieldPolicy {
        self.field_policies
            .read()
            .get(field)
            .copied()
            .unwrap_or_default()
    }

    pub fn contains(&self, key: u64) -> bool {
        self.results.read().contains_key(&key)
    }

    pub fn read<Q: GraphQLQuery>(&self, key: u64) -> Option<Q::ResponseData> {
        let results = self.results.read();
        decode::<Q>(key, results.get(&key)?)
    }

    pub fn write<Q: GraphQLQuery>(&self, key: u64, data: &Q::ResponseData) -> Result<(), QueryError> {
        let incoming = serde_json::to_value(data).map_err(CacheError::from)?;
        let mut results = self.results.write();
        let merged = self.merge(results.remove(&key), incoming);
        results.insert(key, merged);
        debug!(key, "wrote query result to cache");
        Ok(())
    }

    /// Read-modify-write under a single write lock. Returning `None` from `updater` leaves
    /// the entry as it was.
    pub fn update<Q: GraphQLQuery, F>(&self, key: u64, updater: F) -> Result<(), QueryError>
    where
        F: FnOnce(Option<Q::ResponseData>) -> Option<Q::ResponseData>
    {
        let mut results = self.results.write();
        let current = results.get(&key).and_then(|value| decode::<Q>(key, value));
        if let Some(updated) = updater(current) {
            let incoming = serde_json::to_value(&updated).map_err(CacheError::from)?;
            let merged = self.merge(results.remove(&key), incoming);
            results.insert(key, merged);
            debug!(key, "updated cached query result");
        }
        Ok(())
    }

    fn merge(&self, existing: Option<Value>, incoming: Value) -> Value {
        let (mut existing, incoming) = match (existing, incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => (existing, incoming),
            (_, incoming) => return incoming
        };

        for (field, value) in incoming {
            let merged = match (self.field_policy(&field), existing.remove(&field), value) {
                (FieldPolicy::Concat, Some(Value::Array(mut old)), Value::Array(new)) => {
                    old.extend(new);
                    Value::Array(old)
                }
                (_, _, value) => value
            };
            existing.insert(field, merged);
        }

        Value::Object(existing)
    }
}

fn decode<Q: GraphQLQuery>(key: u64, value: &Value) -> Option<Q::ResponseData> {
    match serde_json::from_value(value.clone()) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(key, error = %e, "cached result does not match the requested shape");
            None
        }
    }
}

/// A handle to the client's cache, addressed by request document and variables.
#[derive(Clone, Default)]
pub struct QueryStore {
    pub(crate) store: Arc<Store>
}

impl QueryStore {
    /// The last cached result for `variables`, if there is one.
    pub fn read_query<Q: GraphQLQuery>(&self, _query: Q, variables: &Q::Variables) -> Option<Q::ResponseData> {
        let key = match operation_key::<Q>(variables) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "could not compute cache key");
                return None;
            }
        };
        self.store.read::<Q>(key)
    }

    /// Write `data` as the cached result for `variables`, merging it according to the field
    /// policies.
    pub fn write_query<Q: GraphQLQuery>(
        &self,
        _query: Q,
        variables: &Q::Variables,
        data: Q::ResponseData
    ) -> Result<(), QueryError> {
        let key = operation_key::<Q>(variables)?;
        self.store.write::<Q>(key, &data)
    }

    /// Run a custom update function against the cached result for `variables`.
    ///
    /// The updater receives the current state (`None` if nothing is cached) and returns the new
    /// state; `None` leaves the cache untouched. The read and the write happen under one lock.
    pub fn update_query<Q: GraphQLQuery, F>(
        &self,
        _query: Q,
        variables: Q::Variables,
        updater_fn: F
    ) -> Result<(), QueryError>
    where
        F: FnOnce(Option<Q::ResponseData>) -> Option<Q::ResponseData>
    {
        let key = operation_key::<Q>(&variables)?;
        self.store.update::<Q, _>(key, updater_fn)
    }

    /// Same as [`ClientBuilder::with_field_policy`](crate::ClientBuilder::with_field_policy),
    /// for a client that is already built. Only affects later writes.
    pub fn set_field_policy<F: Into<String>>(&self, field: F, policy: FieldPolicy) {
        self.store.set_field_policy(field, policy);
    }
}

impl From<Arc<Store>> for QueryStore {
    fn from(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{
        get_todos::{ResponseData, Todo, Variables},
        GetTodos
    };

    fn todo(id: &str) -> Todo {
        Todo {
            id: id.to_string(),
            title: format!("todo {}", id)
        }
    }

    fn variables() -> Variables {
        Variables {
            list: "inbox".to_string()
        }
    }

    #[test]
    fn read_of_missing_query_is_none() {
        let store = QueryStore::default();
        assert!(store.read_query(GetTodos, &variables()).is_none());
    }

    #[test]
    fn list_fields_concatenate_by_default() {
        let store = QueryStore::default();
        store
            .write_query(GetTodos, &variables(), ResponseData { todos: vec![todo("1")] })
            .unwrap();
        store
            .write_query(GetTodos, &variables(), ResponseData { todos: vec![todo("2")] })
            .unwrap();

        let cached = store.read_query(GetTodos, &variables()).unwrap();
        assert_eq!(cached.todos, vec![todo("1"), todo("2")]);
    }

    #[test]
    fn replace_policy_keeps_only_incoming() {
        let store = QueryStore::default();
        store.set_field_policy("todos", FieldPolicy::Replace);
        store
            .write_query(GetTodos, &variables(), ResponseData { todos: vec![todo("1")] })
            .unwrap();
        store
            .write_query(GetTodos, &variables(), ResponseData { todos: vec![todo("2")] })
            .unwrap();

        let cached = store.read_query(GetTodos, &variables()).unwrap();
        assert_eq!(cached.todos, vec![todo("2")]);
    }

    #[test]
    fn results_are_keyed_by_variables() {
        let store = QueryStore::default();
        let other = Variables {
            list: "archive".to_string()
        };
        store
            .write_query(GetTodos, &variables(), ResponseData { todos: vec![todo("1")] })
            .unwrap();

        assert!(store.read_query(GetTodos, &other).is_none());
    }

    #[test]
    fn update_query_none_leaves_entry() {
        let store = QueryStore::default();
        store.set_field_policy("todos", FieldPolicy::Replace);
        store
            .write_query(GetTodos, &variables(), ResponseData { todos: vec![todo("1")] })
            .unwrap();

        store
            .update_query(GetTodos, variables(), |_| None)
            .unwrap();
        store
            .update_query(GetTodos, variables(), |current| {
                current.map(|mut data| {
                    data.todos.push(todo("2"));
                    data
                })
            })
            .unwrap();

        let cached = store.read_query(GetTodos, &variables()).unwrap();
        assert_eq!(cached.todos, vec![todo("1"), todo("2")]);
    }

    #[test]
    fn reads_are_detached_copies() {
        let store = QueryStore::default();
        store
            .write_query(GetTodos, &variables(), ResponseData { todos: vec![todo("1")] })
            .unwrap();

        let mut first = store.read_query(GetTodos, &variables()).unwrap();
        first.todos.clear();

        let second = store.read_query(GetTodos, &variables()).unwrap();
        assert_eq!(second.todos.len(), 1);
    }
}
