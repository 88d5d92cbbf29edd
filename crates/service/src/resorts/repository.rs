use crate::errors::ServiceError;
use async_trait::async_trait;
use models::{Resort, ResortCandidate};

/// Result of a delete. Deleting an unknown name is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyDeleted,
}

impl DeleteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted => "Resort deleted",
            DeleteOutcome::AlreadyDeleted => "Resort already deleted",
        }
    }
}

/// Trait abstraction for resort persistence.
/// Implementations can be file-backed or a transactional database; callers
/// rely on mutations being serialized by the implementation.
#[async_trait]
pub trait ResortRepository: Send + Sync {
    /// Every resort in insertion order.
    async fn list(&self) -> Vec<Resort>;
    /// Validate and persist a new resort; names are unique ignoring case.
    async fn create(&self, candidate: &ResortCandidate) -> Result<Resort, ServiceError>;
    /// Remove the resort whose name matches ignoring case.
    async fn delete(&self, name: &str) -> Result<DeleteOutcome, ServiceError>;
}
