use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("invalid capability: {0}")]
    InvalidCapability(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

pub type AuthzResult<T> = Result<T, AuthzError>;
