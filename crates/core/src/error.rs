use scopechain_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Required argument [{argument}] is missing for function [{function}]")]
    MissingArgument { function: String, argument: String },
    #[error("Cannot assign to [{0}]: the name refers to a scope")]
    ScopeAssignment(String),
    #[error("Variable [{name}] of type [{type_name}] is not a function")]
    NotCallable { name: String, type_name: &'static str },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContextError {
    /// The resolution failure this error wraps, if any.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ContextError::Api(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContextError>;
