use crate::application_port::{ProfileError, ProfileService};
use crate::domain_model::{ProfileId, ProfileSummary};
use crate::domain_port::{ProfileRepo, TxManager};
use std::sync::Arc;

pub struct RealProfileService {
    profile_repo: Arc<dyn ProfileRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealProfileService {
    pub fn new(
        profile_repo: Arc<dyn ProfileRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> RealProfileService {
        RealProfileService {
            profile_repo,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl ProfileService for RealProfileService {
    async fn resolve_username(&self, username: &str) -> Result<ProfileId, ProfileError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| ProfileError::Store(e.to_string()))?;

        let profile_id = self
            .profile_repo
            .get_id_by_username_in_tx(&mut *tx, username)
            .await?;

        tx.commit()
            .await
            .map_err(|e| ProfileError::Store(e.to_string()))?;

        Ok(profile_id)
    }

    async fn get_summaries(
        &self,
        ids: &[ProfileId],
    ) -> Result<Vec<ProfileSummary>, ProfileError> {
        self.profile_repo.get_summaries(ids).await
    }
}
