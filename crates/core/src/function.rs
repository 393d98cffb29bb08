use crate::context::ExecutionContext;
use scopechain_api::{Callable, Key, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A declared parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Key,
    pub required: bool,
    pub default: Option<Value>,
}

impl Param {
    pub fn required(name: Key) -> Self {
        Self {
            name,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: Key) -> Self {
        Self {
            name,
            required: false,
            default: None,
        }
    }

    pub fn with_default(name: Key, default: Value) -> Self {
        Self {
            name,
            required: false,
            default: Some(default),
        }
    }
}

pub enum FunctionKind {
    /// Named function; sees only its own scopes and the global tier.
    Udf,
    /// Closure over the context that was current when it was created.
    Closure { declaring: Arc<ExecutionContext> },
}

impl fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Udf => f.write_str("Udf"),
            FunctionKind::Closure { declaring } => f
                .debug_struct("Closure")
                .field("declaring", &declaring.kind_name())
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct Function {
    name: Key,
    params: Vec<Param>,
    kind: FunctionKind,
}

impl Function {
    pub fn udf(name: Key, params: Vec<Param>) -> Arc<Self> {
        Arc::new(Self {
            name,
            params,
            kind: FunctionKind::Udf,
        })
    }

    /// Capture `declaring` once; it is never reassigned and is read live on
    /// every lookup through this closure.
    ///
    /// The closure holds `declaring` strongly. Storing the closure in a scope
    /// that `declaring` or one of its ancestors owns forms a reference cycle,
    /// which stays alive until [`ExecutionContext::release_scopes`] runs on
    /// the context owning that scope.
    pub fn closure(name: Key, params: Vec<Param>, declaring: &Arc<ExecutionContext>) -> Arc<Self> {
        Arc::new(Self {
            name,
            params,
            kind: FunctionKind::Closure {
                declaring: declaring.clone(),
            },
        })
    }

    pub fn name(&self) -> Key {
        self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    pub fn is_closure(&self) -> bool {
        matches!(self.kind, FunctionKind::Closure { .. })
    }

    pub fn declaring_context(&self) -> Option<&Arc<ExecutionContext>> {
        match &self.kind {
            FunctionKind::Closure { declaring } => Some(declaring),
            FunctionKind::Udf => None,
        }
    }

    pub fn to_value(self: &Arc<Self>) -> Value {
        Value::Function(self.clone())
    }

    /// Recover the descriptor from a function value stored in a scope.
    pub fn from_value(value: &Value) -> Option<Arc<Function>> {
        value
            .as_function()
            .and_then(|callable| callable.clone().into_any().downcast::<Function>().ok())
    }
}

impl Callable for Function {
    fn name(&self) -> Key {
        self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
