pub mod config;
pub mod context;
pub mod error;
pub mod function;
pub mod logging;
pub mod scopes;

pub use config::ResolverConfig;
pub use context::{
    ContextKind, ExecutionContext, FunctionFrame, TemplateGuard, TemplatePath, VisibleScopes,
};
pub use error::{ContextError, Result};
pub use function::{Function, FunctionKind, Param};
pub use scopes::{Arguments, ArgumentsScope, BaseScope};
