use super::{ContextKind, ExecutionContext};
use crate::error::{ContextError, Result};
use crate::function::Function;
use indexmap::IndexSet;
use scopechain_api::{ApiError, ApiResult, Key, Scope, ScopeRef, ScopeSearchResult, Value};
use std::sync::Arc;

/// Scope names reachable from a context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleScopes {
    /// Owned here or reachable through the global tier.
    pub contextual: Vec<Key>,
    /// Reachable only through closure declaring contexts.
    pub lexical: Vec<Key>,
}

impl ExecutionContext {
    /// Resolve `key` the way a bare identifier read does.
    ///
    /// Searches this context's own scopes, then escalates per variant. When
    /// nothing in the chain binds `key`, falls back to `default_scope` with
    /// an absent value, or fails with `KeyNotFound`.
    pub fn resolve_nearby(
        &self,
        key: &Key,
        default_scope: Option<&ScopeRef>,
    ) -> ApiResult<ScopeSearchResult> {
        let found = self.find_nearby(key, false, false);
        self.settle(key, found, default_scope)
    }

    /// Resolve `key` against scopes visible across encapsulation
    /// boundaries only.
    pub fn resolve_global(
        &self,
        key: &Key,
        default_scope: Option<&ScopeRef>,
    ) -> ApiResult<ScopeSearchResult> {
        let found = self.find_global(key, false);
        self.settle(key, found, default_scope)
    }

    /// Resolve `key` as the target of a write.
    ///
    /// Identical to [`ExecutionContext::resolve_nearby`] except that a stored
    /// null always counts as bound, so the write replaces it in place.
    pub fn resolve_for_assign(
        &self,
        key: &Key,
        default_scope: Option<&ScopeRef>,
    ) -> ApiResult<ScopeSearchResult> {
        let found = self.find_nearby(key, false, true);
        self.settle(key, found, default_scope)
    }

    /// Unscoped assignment: write into the scope that already binds `key`,
    /// else into this context's default assignment scope.
    pub fn assign(&self, key: Key, value: Value) -> Result<ScopeRef> {
        let default_scope = self.default_assignment_scope();
        let target = self.resolve_for_assign(&key, Some(&default_scope))?;
        if target.is_scope {
            return Err(ContextError::ScopeAssignment(key.name().to_string()));
        }
        target.scope.assign(key, value);
        Ok(target.scope)
    }

    /// Look up a function value by name.
    pub fn find_function(&self, name: &Key) -> Result<Arc<Function>> {
        let result = self.resolve_nearby(name, None)?;
        let value = result.value.unwrap_or(Value::Null);
        Function::from_value(&value).ok_or_else(|| ContextError::NotCallable {
            name: name.name().to_string(),
            type_name: value.type_name(),
        })
    }

    /// Scope called `name`, searching only the global tier of the chain.
    pub fn get_scope(&self, name: &Key) -> ApiResult<ScopeRef> {
        self.find_scope(name)
            .ok_or_else(|| ApiError::scope_not_found(name))
    }

    /// Scope called `name`, including scopes owned by this context.
    pub fn get_scope_nearby(&self, name: &Key) -> ApiResult<ScopeRef> {
        self.find_scope_nearby(name, false)
            .ok_or_else(|| ApiError::scope_not_found(name))
    }

    pub fn is_key_visible_scope(&self, key: &Key) -> bool {
        self.find_scope_nearby(key, false).is_some()
    }

    pub fn visible_scopes(&self) -> VisibleScopes {
        let mut contextual = IndexSet::new();
        contextual.extend(self.nearby_scopes().iter().map(|s| s.name()));
        if !matches!(self.kind, ContextKind::Runtime { .. }) {
            if let Some(parent) = &self.parent {
                parent.collect_global_names(&mut contextual);
            }
        }

        let mut lexical = IndexSet::new();
        self.collect_lexical_names(&mut lexical);

        VisibleScopes {
            contextual: contextual.into_iter().collect(),
            lexical: lexical.into_iter().collect(),
        }
    }

    fn settle(
        &self,
        key: &Key,
        found: Option<ScopeSearchResult>,
        default_scope: Option<&ScopeRef>,
    ) -> ApiResult<ScopeSearchResult> {
        if let Some(result) = found {
            return Ok(result);
        }
        match default_scope {
            Some(scope) => {
                tracing::trace!("{} unresolved, defaulting to {}", key, scope.name());
                Ok(ScopeSearchResult::absent(scope.clone(), *key))
            }
            None => {
                tracing::debug!("{} not found from {} context", key, self.kind_name());
                Err(ApiError::key_not_found(key))
            }
        }
    }

    /// Nearby search. A shallow search never leaves the chain of declaring
    /// contexts and never escalates to a parent.
    pub(crate) fn find_nearby(
        &self,
        key: &Key,
        shallow: bool,
        for_assign: bool,
    ) -> Option<ScopeSearchResult> {
        if let Some(hit) = self.search_own(key, for_assign) {
            return Some(hit);
        }

        match &self.kind {
            ContextKind::Runtime { .. } => None,
            ContextKind::Template { .. }
            | ContextKind::Scripting { .. }
            | ContextKind::Function(_) => {
                if shallow {
                    return None;
                }
                self.parent_global(key, for_assign)
            }
            ContextKind::Closure(_) => {
                if let Some(declaring) = self.declaring_context() {
                    if let Some(hit) = declaring.find_nearby(key, true, for_assign) {
                        return Some(hit);
                    }
                }
                if shallow {
                    return None;
                }
                // Resume at the dynamic caller, global tier only.
                tracing::trace!("{} not captured, escalating from closure", key);
                self.parent_global(key, for_assign)
            }
        }
    }

    pub(crate) fn find_global(&self, key: &Key, for_assign: bool) -> Option<ScopeSearchResult> {
        match &self.kind {
            ContextKind::Runtime { .. } => self.search_own(key, for_assign),
            ContextKind::Template { .. } => self
                .parent_global(key, for_assign)
                .or_else(|| self.search_own(key, for_assign)),
            ContextKind::Scripting { .. }
            | ContextKind::Function(_)
            | ContextKind::Closure(_) => self.parent_global(key, for_assign),
        }
    }

    fn parent_global(&self, key: &Key, for_assign: bool) -> Option<ScopeSearchResult> {
        self.parent.as_ref()?.find_global(key, for_assign)
    }

    /// Own scopes only: a key naming one of them yields the scope itself,
    /// otherwise each scope is probed in order.
    fn search_own(&self, key: &Key, for_assign: bool) -> Option<ScopeSearchResult> {
        let scopes = self.nearby_scopes();
        if let Some(scope) = scopes.iter().find(|s| s.name() == *key) {
            return Some(ScopeSearchResult::scope_itself(scope.clone(), *key));
        }
        scopes.iter().find_map(|scope| {
            scope
                .get_raw(key)
                .filter(|value| self.settings.is_defined(value, for_assign))
                .map(|value| ScopeSearchResult::found(scope.clone(), value, *key))
        })
    }

    fn own_scope_named(&self, name: &Key) -> Option<ScopeRef> {
        self.nearby_scopes()
            .iter()
            .find(|s| s.name() == *name)
            .cloned()
    }

    fn find_scope(&self, name: &Key) -> Option<ScopeRef> {
        match &self.kind {
            ContextKind::Runtime { .. } => self.own_scope_named(name),
            ContextKind::Template { .. } => self
                .parent
                .as_ref()
                .and_then(|parent| parent.find_scope(name))
                .or_else(|| self.own_scope_named(name)),
            ContextKind::Scripting { .. }
            | ContextKind::Function(_)
            | ContextKind::Closure(_) => self.parent.as_ref()?.find_scope(name),
        }
    }

    fn find_scope_nearby(&self, name: &Key, shallow: bool) -> Option<ScopeRef> {
        if let Some(scope) = self.own_scope_named(name) {
            return Some(scope);
        }
        if let Some(declaring) = self.declaring_context() {
            if let Some(scope) = declaring.find_scope_nearby(name, true) {
                return Some(scope);
            }
        }
        if shallow {
            return None;
        }
        self.find_scope(name)
    }

    fn collect_global_names(&self, out: &mut IndexSet<Key>) {
        match &self.kind {
            ContextKind::Runtime { server } => {
                out.insert(server.name());
            }
            ContextKind::Template { variables } => {
                if let Some(parent) = &self.parent {
                    parent.collect_global_names(out);
                }
                out.insert(variables.name());
            }
            _ => {
                if let Some(parent) = &self.parent {
                    parent.collect_global_names(out);
                }
            }
        }
    }

    fn collect_lexical_names(&self, out: &mut IndexSet<Key>) {
        if let Some(declaring) = self.declaring_context() {
            out.extend(declaring.nearby_scopes().iter().map(|s| s.name()));
            declaring.collect_lexical_names(out);
        }
    }
}
