use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("sheet error: {0}")]
    Sheet(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found.", entity)) }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self { Self::Sheet(e.to_string()) }
}
