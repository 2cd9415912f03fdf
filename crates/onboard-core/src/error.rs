use thiserror::Error;

#[derive(Debug, Error)]
pub enum OnboardError {
    #[error("checklist item not found: {0}")]
    ItemNotFound(String),
}

pub type Result<T> = std::result::Result<T, OnboardError>;
