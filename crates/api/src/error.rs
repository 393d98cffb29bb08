#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("The requested key [{0}] was not located in any scope or it's undefined")]
    KeyNotFound(String),
    #[error("The requested scope name [{0}] was not located in any context")]
    ScopeNotFound(String),
}

impl ApiError {
    pub fn key_not_found(key: &crate::models::Key) -> Self {
        ApiError::KeyNotFound(key.name().to_string())
    }

    pub fn scope_not_found(name: &crate::models::Key) -> Self {
        ApiError::ScopeNotFound(name.name().to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
