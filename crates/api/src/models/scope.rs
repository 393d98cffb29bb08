use super::key::Key;
use super::value::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Storage contract every scope implementation provides to the context chain.
///
/// `get_raw` is presence-aware: `None` means the key was never bound, while
/// `Some(Value::Null)` is an explicit null. Implementations must never turn a
/// missing key into a default value.
pub trait Scope: Send + Sync + Debug {
    /// Stable name used by `get_scope`/`get_scope_nearby` matching.
    fn name(&self) -> Key;

    fn get_raw(&self, key: &Key) -> Option<Value>;

    /// Bind `key`, returning the previous value if there was one.
    fn assign(&self, key: Key, value: Value) -> Option<Value>;

    fn remove(&self, key: &Key) -> Option<Value>;

    /// Drop every binding.
    fn clear(&self);

    /// Keys in insertion order.
    fn keys(&self) -> Vec<Key>;

    fn len(&self) -> usize;

    fn contains_key(&self, key: &Key) -> bool {
        self.get_raw(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type ScopeRef = Arc<dyn Scope>;

/// Identity comparison for scope handles.
pub fn same_scope(a: &ScopeRef, b: &ScopeRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Outcome of resolving an identifier against a context chain.
#[derive(Debug, Clone)]
pub struct ScopeSearchResult {
    /// Scope the identifier was found in, or the caller's default scope.
    pub scope: ScopeRef,
    /// Unwrapped value; `None` only for the default-scope fallback.
    pub value: Option<Value>,
    pub key: Key,
    /// The identifier named a scope and `value` is that scope.
    pub is_scope: bool,
}

impl ScopeSearchResult {
    pub fn found(scope: ScopeRef, value: Value, key: Key) -> Self {
        Self {
            scope,
            value: Some(value),
            key,
            is_scope: false,
        }
    }

    pub fn scope_itself(scope: ScopeRef, key: Key) -> Self {
        Self {
            value: Some(Value::Scope(scope.clone())),
            scope,
            key,
            is_scope: true,
        }
    }

    pub fn absent(default_scope: ScopeRef, key: Key) -> Self {
        Self {
            scope: default_scope,
            value: None,
            key,
            is_scope: false,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    pub fn scope_name(&self) -> Key {
        self.scope.name()
    }
}
