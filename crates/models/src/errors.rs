use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("sheet header mismatch: expected [{expected}], found [{found}]")]
    HeaderMismatch { expected: String, found: String },
}
