use thiserror::Error;

/// Top-level error type for org chart operations.
///
/// The API layer is the only place these are mapped to response statuses.
#[derive(Error, Debug)]
pub enum OrgError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Consistency violation: {0}")]
    Consistency(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrgError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<config::ConfigError> for OrgError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrgError>;
