use indexmap::IndexMap;
use parking_lot::RwLock;
use scopechain_api::{Key, Scope, ScopeRef, Value, keys};
use std::sync::Arc;

/// Insertion-ordered scope safe for concurrent reads and writes.
///
/// Persistent scopes (a template's `variables`, the runtime's `server`)
/// may be shared by several chains at once, so every scope takes the lock
/// itself and the context chain never locks around scope access.
#[derive(Debug)]
pub struct BaseScope {
    name: Key,
    entries: RwLock<IndexMap<Key, Value>>,
}

impl BaseScope {
    pub fn named(name: Key) -> Self {
        Self {
            name,
            entries: RwLock::new(IndexMap::new()),
        }
    }

    pub fn local() -> Self {
        Self::named(*keys::LOCAL)
    }

    pub fn variables() -> Self {
        Self::named(*keys::VARIABLES)
    }

    pub fn server() -> Self {
        Self::named(*keys::SERVER)
    }

    pub fn shared(self) -> ScopeRef {
        Arc::new(self)
    }

    /// Copy of the current bindings, in insertion order.
    pub fn snapshot(&self) -> Vec<(Key, Value)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }
}

impl Scope for BaseScope {
    fn name(&self) -> Key {
        self.name
    }

    fn get_raw(&self, key: &Key) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    fn assign(&self, key: Key, value: Value) -> Option<Value> {
        self.entries.write().insert(key, value)
    }

    fn remove(&self, key: &Key) -> Option<Value> {
        self.entries.write().shift_remove(key)
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn keys(&self) -> Vec<Key> {
        self.entries.read().keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn contains_key(&self, key: &Key) -> bool {
        self.entries.read().contains_key(key)
    }
}
