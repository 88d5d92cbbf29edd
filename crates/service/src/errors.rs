use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn conflict(entity: &str) -> Self { Self::Conflict(format!("{} already exists", entity)) }

    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{context}: {err}"))
    }

    /// Input rejected by the model rules.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Model(_))
    }
}

impl From<csv::Error> for ServiceError {
    fn from(e: csv::Error) -> Self { Self::Storage(format!("csv: {e}")) }
}
