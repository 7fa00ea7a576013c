use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;

/// Read-only view of the profile table. Profiles belong to the account
/// subsystem; the relationship core only resolves and projects them.
#[async_trait::async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get_id_by_username_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        username: &str,
    ) -> Result<ProfileId, ProfileError>;

    /// Summaries for the given ids, in the order the ids were given.
    /// Unknown or inactive ids are silently dropped.
    async fn get_summaries(
        &self,
        ids: &[ProfileId],
    ) -> Result<Vec<ProfileSummary>, ProfileError>;
}
