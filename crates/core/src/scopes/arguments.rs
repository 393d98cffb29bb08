use super::base::BaseScope;
use crate::error::{ContextError, Result};
use crate::function::{Function, Param};
use scopechain_api::{Key, Scope, Value, keys};

/// Actual parameters of one call.
#[derive(Debug, Clone)]
pub enum Arguments {
    Positional(Vec<Value>),
    Named(Vec<(Key, Value)>),
}

impl Arguments {
    pub fn none() -> Self {
        Arguments::Positional(Vec::new())
    }
}

/// The `arguments` scope of a function-like context.
#[derive(Debug)]
pub struct ArgumentsScope {
    inner: BaseScope,
    positional: bool,
}

impl Default for ArgumentsScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgumentsScope {
    pub fn new() -> Self {
        Self {
            inner: BaseScope::named(*keys::ARGUMENTS),
            positional: false,
        }
    }

    /// Whether the call passed its arguments by position.
    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn bind(function: &Function, arguments: Arguments) -> Result<Self> {
        match arguments {
            Arguments::Positional(values) => Self::bind_positional(function, values),
            Arguments::Named(values) => Self::bind_named(function, values),
        }
    }

    /// Bind by position: argument `i` takes the name of parameter `i`, and
    /// surplus arguments keep their 1-based position as their key.
    pub fn bind_positional(function: &Function, values: Vec<Value>) -> Result<Self> {
        let scope = Self {
            inner: BaseScope::named(*keys::ARGUMENTS),
            positional: true,
        };
        let params = function.params();
        let supplied = values.len();

        for (i, value) in values.into_iter().enumerate() {
            match params.get(i) {
                Some(param) => {
                    let value = if value.is_null() {
                        param.default.clone().unwrap_or(value)
                    } else {
                        value
                    };
                    scope.inner.assign(param.name, value);
                }
                None => {
                    scope.inner.assign(Key::from_index(i + 1), value);
                }
            }
        }

        for param in params.iter().skip(supplied) {
            scope.inner.assign(param.name, fill_missing(function, param)?);
        }

        Ok(scope)
    }

    /// Bind by name; declared parameters that were not supplied, or were
    /// supplied as null, fall back to their defaults.
    pub fn bind_named(function: &Function, values: Vec<(Key, Value)>) -> Result<Self> {
        let scope = Self::new();
        for (key, value) in values {
            scope.inner.assign(key, value);
        }

        for param in function.params() {
            let present = scope
                .inner
                .get_raw(&param.name)
                .is_some_and(|value| !value.is_null());
            if !present {
                scope.inner.assign(param.name, fill_missing(function, param)?);
            }
        }

        Ok(scope)
    }
}

fn fill_missing(function: &Function, param: &Param) -> Result<Value> {
    match &param.default {
        Some(default) => Ok(default.clone()),
        None if param.required => Err(ContextError::MissingArgument {
            function: function.name().name().to_string(),
            argument: param.name.name().to_string(),
        }),
        None => Ok(Value::Null),
    }
}

impl Scope for ArgumentsScope {
    fn name(&self) -> Key {
        self.inner.name()
    }

    fn get_raw(&self, key: &Key) -> Option<Value> {
        self.inner.get_raw(key)
    }

    fn assign(&self, key: Key, value: Value) -> Option<Value> {
        self.inner.assign(key, value)
    }

    fn remove(&self, key: &Key) -> Option<Value> {
        self.inner.remove(key)
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn keys(&self) -> Vec<Key> {
        self.inner.keys()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn contains_key(&self, key: &Key) -> bool {
        self.inner.contains_key(key)
    }
}
