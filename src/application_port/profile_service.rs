use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(String),
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    async fn resolve_username(&self, username: &str) -> Result<ProfileId, ProfileError>;

    /// Summaries for the given ids, input order preserved.
    async fn get_summaries(&self, ids: &[ProfileId])
    -> Result<Vec<ProfileSummary>, ProfileError>;
}
