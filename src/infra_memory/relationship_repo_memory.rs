use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Mutex;

/// Mutex-guarded row store with the same observable semantics as the MySQL
/// backend: uniqueness conflicts, one-shot request transitions, no-op
/// deletes. Rows come back in insertion order.
pub struct MemoryRelationshipRepo {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    relationships: Vec<Relationship>,
    requests: Vec<FriendRequest>,
}

impl MemoryRelationshipRepo {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, RelationError> {
        self.state
            .lock()
            .map_err(|e| RelationError::Store(format!("memory store poisoned: {e}")))
    }
}

impl Default for MemoryRelationshipRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RelationshipRepo for MemoryRelationshipRepo {
    async fn find_relationship(
        &self,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Option<Relationship>, RelationError> {
        let state = self.lock()?;
        Ok(state
            .relationships
            .iter()
            .find(|r| r.from_profile == from && r.to_profile == to && r.status == status)
            .cloned())
    }

    async fn find_relationship_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Option<Relationship>, RelationError> {
        self.find_relationship(from, to, status).await
    }

    async fn create_relationship_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Relationship, RelationError> {
        let mut state = self.lock()?;
        if state
            .relationships
            .iter()
            .any(|r| r.from_profile == from && r.to_profile == to && r.status == status)
        {
            return Err(RelationError::Conflict);
        }

        let relationship = Relationship {
            id: RelationshipId(uuid::Uuid::new_v4()),
            created_at: Utc::now(),
            from_profile: from,
            to_profile: to,
            status,
        };
        state.relationships.push(relationship.clone());
        Ok(relationship)
    }

    async fn delete_relationship_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<(), RelationError> {
        let mut state = self.lock()?;
        state
            .relationships
            .retain(|r| !(r.from_profile == from && r.to_profile == to && r.status == status));
        Ok(())
    }

    async fn list_relationships(
        &self,
        profile: ProfileId,
        direction: Direction,
        status: RelationStatus,
    ) -> Result<Vec<Relationship>, RelationError> {
        let state = self.lock()?;
        Ok(state
            .relationships
            .iter()
            .filter(|r| {
                r.status == status
                    && match direction {
                        Direction::Outgoing => r.from_profile == profile,
                        Direction::Incoming => r.to_profile == profile,
                    }
            })
            .cloned()
            .collect())
    }

    async fn find_pending_request(
        &self,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        let state = self.lock()?;
        Ok(state
            .requests
            .iter()
            .find(|r| {
                r.from_profile == from && r.to_profile == to && r.status == RequestStatus::Pending
            })
            .cloned())
    }

    async fn find_pending_request_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        self.find_pending_request(from, to).await
    }

    async fn create_request_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<FriendRequest, RelationError> {
        let mut state = self.lock()?;
        if state.requests.iter().any(|r| {
            r.from_profile == from && r.to_profile == to && r.status == RequestStatus::Pending
        }) {
            return Err(RelationError::Conflict);
        }

        let request = FriendRequest {
            id: RequestId(uuid::Uuid::new_v4()),
            created_at: Utc::now(),
            from_profile: from,
            to_profile: to,
            status: RequestStatus::Pending,
        };
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn set_request_status_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        request_id: RequestId,
        status: RequestStatus,
    ) -> Result<(), RelationError> {
        let mut state = self.lock()?;
        let Some(request) = state.requests.iter_mut().find(|r| r.id == request_id) else {
            return Err(RelationError::NotFound);
        };
        if request.status.is_terminal() {
            return Err(RelationError::InvalidTransition);
        }
        request.status = status;
        Ok(())
    }

    async fn list_requests(
        &self,
        profile: ProfileId,
        direction: Direction,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, RelationError> {
        let state = self.lock()?;
        Ok(state
            .requests
            .iter()
            .filter(|r| {
                r.status == status
                    && match direction {
                        Direction::Outgoing => r.from_profile == profile,
                        Direction::Incoming => r.to_profile == profile,
                    }
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryTxManager;

    fn profile() -> ProfileId {
        ProfileId(uuid::Uuid::new_v4())
    }

    fn tx_manager() -> MemoryTxManager {
        MemoryTxManager::new()
    }

    #[tokio::test]
    async fn duplicate_relationship_row_is_a_conflict() {
        let repo = MemoryRelationshipRepo::new();
        let manager = tx_manager();
        let mut tx = manager.begin().await.unwrap();
        let (a, b) = (profile(), profile());

        repo.create_relationship_in_tx(&mut *tx, a, b, RelationStatus::Friend)
            .await
            .unwrap();
        assert!(matches!(
            repo.create_relationship_in_tx(&mut *tx, a, b, RelationStatus::Friend)
                .await,
            Err(RelationError::Conflict)
        ));

        // same pair under a different status is a different row
        repo.create_relationship_in_tx(&mut *tx, a, b, RelationStatus::Blocked)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_of_absent_row_is_a_noop() {
        let repo = MemoryRelationshipRepo::new();
        let manager = tx_manager();
        let mut tx = manager.begin().await.unwrap();

        repo.delete_relationship_in_tx(&mut *tx, profile(), profile(), RelationStatus::Friend)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn second_pending_request_for_a_pair_is_a_conflict() {
        let repo = MemoryRelationshipRepo::new();
        let manager = tx_manager();
        let mut tx = manager.begin().await.unwrap();
        let (a, b) = (profile(), profile());

        repo.create_request_in_tx(&mut *tx, a, b).await.unwrap();
        assert!(matches!(
            repo.create_request_in_tx(&mut *tx, a, b).await,
            Err(RelationError::Conflict)
        ));
    }

    #[tokio::test]
    async fn request_transition_is_one_shot() {
        let repo = MemoryRelationshipRepo::new();
        let manager = tx_manager();
        let mut tx = manager.begin().await.unwrap();
        let (a, b) = (profile(), profile());

        let request = repo.create_request_in_tx(&mut *tx, a, b).await.unwrap();
        repo.set_request_status_in_tx(&mut *tx, request.id, RequestStatus::Rejected)
            .await
            .unwrap();

        assert!(matches!(
            repo.set_request_status_in_tx(&mut *tx, request.id, RequestStatus::Accepted)
                .await,
            Err(RelationError::InvalidTransition)
        ));
    }

    #[tokio::test]
    async fn transition_of_unknown_request_is_not_found() {
        let repo = MemoryRelationshipRepo::new();
        let manager = tx_manager();
        let mut tx = manager.begin().await.unwrap();

        assert!(matches!(
            repo.set_request_status_in_tx(
                &mut *tx,
                RequestId(uuid::Uuid::new_v4()),
                RequestStatus::Canceled
            )
            .await,
            Err(RelationError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_splits_directions() {
        let repo = MemoryRelationshipRepo::new();
        let manager = tx_manager();
        let mut tx = manager.begin().await.unwrap();
        let (a, b, c) = (profile(), profile(), profile());

        repo.create_request_in_tx(&mut *tx, a, b).await.unwrap();
        repo.create_request_in_tx(&mut *tx, c, a).await.unwrap();

        let outgoing = repo
            .list_requests(a, Direction::Outgoing, RequestStatus::Pending)
            .await
            .unwrap();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].to_profile, b);

        let incoming = repo
            .list_requests(a, Direction::Incoming, RequestStatus::Pending)
            .await
            .unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].from_profile, c);
    }
}
