use super::domain::{Poll, PollId};

/// Read access to polls owned by the administrative collaborator.
pub trait PollCatalog: Send + Sync {
    fn fetch(&self, id: PollId) -> Result<Option<Poll>, CatalogError>;
    fn list(&self) -> Result<Vec<Poll>, CatalogError>;
}

/// Catalog lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("poll catalog unavailable: {0}")]
    Unavailable(String),
}
