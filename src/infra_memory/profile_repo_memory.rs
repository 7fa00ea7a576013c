use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Mutex;

/// In-memory profile table. Accounts are owned by an external subsystem,
/// so this repo only needs enough surface to seed dev and test fixtures.
pub struct MemoryProfileRepo {
    state: Mutex<Vec<ProfileSummary>>,
}

impl MemoryProfileRepo {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Vec::new()),
        }
    }

    /// Test/dev fixture hook; the account subsystem does this in production.
    pub fn register(&self, username: &str) -> ProfileId {
        let profile_id = ProfileId(uuid::Uuid::new_v4());
        let mut state = self.state.lock().expect("memory profile store poisoned");
        state.push(ProfileSummary {
            profile_id,
            username: username.to_string(),
        });
        profile_id
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ProfileSummary>>, ProfileError> {
        self.state
            .lock()
            .map_err(|e| ProfileError::Store(format!("memory profile store poisoned: {e}")))
    }
}

impl Default for MemoryProfileRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProfileRepo for MemoryProfileRepo {
    async fn get_id_by_username_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        username: &str,
    ) -> Result<ProfileId, ProfileError> {
        let state = self.lock()?;
        state
            .iter()
            .find(|p| p.username == username)
            .map(|p| p.profile_id)
            .ok_or(ProfileError::NotFound)
    }

    async fn get_summaries(
        &self,
        ids: &[ProfileId],
    ) -> Result<Vec<ProfileSummary>, ProfileError> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.iter().find(|p| p.profile_id == *id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryTxManager;

    #[tokio::test]
    async fn resolves_registered_usernames() {
        let repo = MemoryProfileRepo::new();
        let manager = MemoryTxManager::new();
        let mut tx = manager.begin().await.unwrap();

        let id = repo.register("user1");
        assert_eq!(
            repo.get_id_by_username_in_tx(&mut *tx, "user1").await.unwrap(),
            id
        );
        assert!(matches!(
            repo.get_id_by_username_in_tx(&mut *tx, "missing").await,
            Err(ProfileError::NotFound)
        ));
    }

    #[tokio::test]
    async fn summaries_preserve_input_order_and_drop_unknown_ids() {
        let repo = MemoryProfileRepo::new();
        let u1 = repo.register("user1");
        let u2 = repo.register("user2");
        let stranger = ProfileId(uuid::Uuid::new_v4());

        let summaries = repo.get_summaries(&[u2, stranger, u1]).await.unwrap();
        let names: Vec<&str> = summaries.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(names, vec!["user2", "user1"]);
    }
}
