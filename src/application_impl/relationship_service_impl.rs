use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::collections::HashSet;
use std::sync::Arc;

pub struct RealRelationshipService {
    relationship_repo: Arc<dyn RelationshipRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealRelationshipService {
    pub fn new(
        relationship_repo: Arc<dyn RelationshipRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            relationship_repo,
            tx_manager,
        }
    }

    async fn blocked_either_way_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<bool, RelationError> {
        if self
            .relationship_repo
            .find_relationship_in_tx(&mut *tx, a, b, RelationStatus::Blocked)
            .await?
            .is_some()
        {
            return Ok(true);
        }
        Ok(self
            .relationship_repo
            .find_relationship_in_tx(&mut *tx, b, a, RelationStatus::Blocked)
            .await?
            .is_some())
    }

    /// Sole writer of FRIEND edges. Both directions go through here inside
    /// one transaction, so no caller can ever write one row without the
    /// other. No-op when the pair is already friends or a block exists in
    /// either direction.
    async fn add_friend_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<(), RelationError> {
        if self.blocked_either_way_in_tx(&mut *tx, a, b).await? {
            return Ok(());
        }
        if self
            .relationship_repo
            .find_relationship_in_tx(&mut *tx, a, b, RelationStatus::Friend)
            .await?
            .is_some()
        {
            return Ok(());
        }

        self.relationship_repo
            .create_relationship_in_tx(&mut *tx, a, b, RelationStatus::Friend)
            .await?;
        self.relationship_repo
            .create_relationship_in_tx(&mut *tx, b, a, RelationStatus::Friend)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl RelationshipService for RealRelationshipService {
    async fn is_friends_with(&self, a: ProfileId, b: ProfileId) -> Result<bool, RelationError> {
        // the symmetric invariant makes one direction enough
        Ok(self
            .relationship_repo
            .find_relationship(a, b, RelationStatus::Friend)
            .await?
            .is_some())
    }

    async fn is_blocking(&self, a: ProfileId, b: ProfileId) -> Result<bool, RelationError> {
        Ok(self
            .relationship_repo
            .find_relationship(a, b, RelationStatus::Blocked)
            .await?
            .is_some())
    }

    async fn is_blocked_by(&self, a: ProfileId, b: ProfileId) -> Result<bool, RelationError> {
        self.is_blocking(b, a).await
    }

    async fn has_pending_request_to(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<bool, RelationError> {
        Ok(self
            .relationship_repo
            .find_pending_request(a, b)
            .await?
            .is_some())
    }

    async fn has_pending_request_from(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<bool, RelationError> {
        Ok(self
            .relationship_repo
            .find_pending_request(b, a)
            .await?
            .is_some())
    }

    async fn get_friends(&self, a: ProfileId) -> Result<Vec<Relationship>, RelationError> {
        self.relationship_repo
            .list_relationships(a, Direction::Outgoing, RelationStatus::Friend)
            .await
    }

    async fn get_blocking(&self, a: ProfileId) -> Result<Vec<Relationship>, RelationError> {
        self.relationship_repo
            .list_relationships(a, Direction::Outgoing, RelationStatus::Blocked)
            .await
    }

    async fn get_incoming_pending(
        &self,
        a: ProfileId,
    ) -> Result<Vec<FriendRequest>, RelationError> {
        self.relationship_repo
            .list_requests(a, Direction::Incoming, RequestStatus::Pending)
            .await
    }

    async fn get_outgoing_pending(
        &self,
        a: ProfileId,
    ) -> Result<Vec<FriendRequest>, RelationError> {
        self.relationship_repo
            .list_requests(a, Direction::Outgoing, RequestStatus::Pending)
            .await
    }

    async fn filter_blockers(
        &self,
        viewer: ProfileId,
        candidates: Vec<ProfileId>,
    ) -> Result<Vec<ProfileId>, RelationError> {
        let blockers: HashSet<ProfileId> = self
            .relationship_repo
            .list_relationships(viewer, Direction::Incoming, RelationStatus::Blocked)
            .await?
            .into_iter()
            .map(|r| r.from_profile)
            .collect();

        Ok(candidates
            .into_iter()
            .filter(|candidate| !blockers.contains(candidate))
            .collect())
    }

    async fn send_request(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<FriendRequest, RelationError> {
        if a == b {
            return Err(RelationError::SelfReference);
        }

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        // blocks win over every in-flight state, so they are checked first
        if self.blocked_either_way_in_tx(&mut *tx, a, b).await? {
            return Err(RelationError::Blocked);
        }
        if self
            .relationship_repo
            .find_relationship_in_tx(&mut *tx, a, b, RelationStatus::Friend)
            .await?
            .is_some()
        {
            return Err(RelationError::AlreadyFriends);
        }
        if self
            .relationship_repo
            .find_pending_request_in_tx(&mut *tx, a, b)
            .await?
            .is_some()
            || self
                .relationship_repo
                .find_pending_request_in_tx(&mut *tx, b, a)
                .await?
                .is_some()
        {
            return Err(RelationError::AlreadyPendingRequest);
        }

        let request = self
            .relationship_repo
            .create_request_in_tx(&mut *tx, a, b)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(request)
    }

    async fn cancel_request(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<FriendRequest, RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let Some(mut request) = self
            .relationship_repo
            .find_pending_request_in_tx(&mut *tx, a, b)
            .await?
        else {
            return Err(RelationError::RequestNotFound);
        };

        self.relationship_repo
            .set_request_status_in_tx(&mut *tx, request.id, RequestStatus::Canceled)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        request.status = RequestStatus::Canceled;
        Ok(request)
    }

    async fn approve_request(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<FriendRequest, RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let Some(mut request) = self
            .relationship_repo
            .find_pending_request_in_tx(&mut *tx, b, a)
            .await?
        else {
            return Err(RelationError::RequestNotFound);
        };

        // status flip and friendship rows commit or roll back together
        self.relationship_repo
            .set_request_status_in_tx(&mut *tx, request.id, RequestStatus::Accepted)
            .await?;
        self.add_friend_in_tx(&mut *tx, a, b).await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        request.status = RequestStatus::Accepted;
        Ok(request)
    }

    async fn deny_request(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<FriendRequest, RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let Some(mut request) = self
            .relationship_repo
            .find_pending_request_in_tx(&mut *tx, b, a)
            .await?
        else {
            return Err(RelationError::RequestNotFound);
        };

        self.relationship_repo
            .set_request_status_in_tx(&mut *tx, request.id, RequestStatus::Rejected)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        request.status = RequestStatus::Rejected;
        Ok(request)
    }

    async fn add_friend(&self, a: ProfileId, b: ProfileId) -> Result<(), RelationError> {
        if a == b {
            return Err(RelationError::SelfReference);
        }

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        self.add_friend_in_tx(&mut *tx, a, b).await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))
    }

    async fn remove_friend(&self, a: ProfileId, b: ProfileId) -> Result<(), RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        let forward = self
            .relationship_repo
            .find_relationship_in_tx(&mut *tx, a, b, RelationStatus::Friend)
            .await?;
        let backward = self
            .relationship_repo
            .find_relationship_in_tx(&mut *tx, b, a, RelationStatus::Friend)
            .await?;
        if forward.is_none() && backward.is_none() {
            return Err(RelationError::NotFriends);
        }

        self.relationship_repo
            .delete_relationship_in_tx(&mut *tx, a, b, RelationStatus::Friend)
            .await?;
        self.relationship_repo
            .delete_relationship_in_tx(&mut *tx, b, a, RelationStatus::Friend)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))
    }

    async fn block(&self, a: ProfileId, b: ProfileId) -> Result<(), RelationError> {
        if a == b {
            return Err(RelationError::SelfReference);
        }

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        if self
            .relationship_repo
            .find_relationship_in_tx(&mut *tx, a, b, RelationStatus::Blocked)
            .await?
            .is_some()
        {
            return Err(RelationError::AlreadyBlocking);
        }

        // every sub-step is no-op-safe and runs regardless of the others:
        // drop the friendship, cancel a's outgoing request, deny b's
        // incoming one, then write the block itself
        self.relationship_repo
            .delete_relationship_in_tx(&mut *tx, a, b, RelationStatus::Friend)
            .await?;
        self.relationship_repo
            .delete_relationship_in_tx(&mut *tx, b, a, RelationStatus::Friend)
            .await?;

        if let Some(outgoing) = self
            .relationship_repo
            .find_pending_request_in_tx(&mut *tx, a, b)
            .await?
        {
            self.relationship_repo
                .set_request_status_in_tx(&mut *tx, outgoing.id, RequestStatus::Canceled)
                .await?;
        }
        if let Some(incoming) = self
            .relationship_repo
            .find_pending_request_in_tx(&mut *tx, b, a)
            .await?
        {
            self.relationship_repo
                .set_request_status_in_tx(&mut *tx, incoming.id, RequestStatus::Rejected)
                .await?;
        }

        self.relationship_repo
            .create_relationship_in_tx(&mut *tx, a, b, RelationStatus::Blocked)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))
    }

    async fn unblock(&self, a: ProfileId, b: ProfileId) -> Result<(), RelationError> {
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        self.relationship_repo
            .delete_relationship_in_tx(&mut *tx, a, b, RelationStatus::Blocked)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::{MemoryRelationshipRepo, MemoryTxManager};

    fn engine_with_repo() -> (RealRelationshipService, Arc<MemoryRelationshipRepo>) {
        let repo = Arc::new(MemoryRelationshipRepo::new());
        let engine = RealRelationshipService::new(repo.clone(), Arc::new(MemoryTxManager::new()));
        (engine, repo)
    }

    fn engine() -> RealRelationshipService {
        engine_with_repo().0
    }

    fn profile() -> ProfileId {
        ProfileId(uuid::Uuid::new_v4())
    }

    #[tokio::test]
    async fn add_friend_is_symmetric() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.add_friend(a, b).await.unwrap();

        assert!(engine.is_friends_with(a, b).await.unwrap());
        assert!(engine.is_friends_with(b, a).await.unwrap());

        let a_friends = engine.get_friends(a).await.unwrap();
        let b_friends = engine.get_friends(b).await.unwrap();
        assert!(a_friends.iter().any(|r| r.to_profile == b));
        assert!(b_friends.iter().any(|r| r.to_profile == a));
    }

    #[tokio::test]
    async fn add_friend_twice_keeps_one_edge_per_direction() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.add_friend(a, b).await.unwrap();
        engine.add_friend(a, b).await.unwrap();
        engine.add_friend(b, a).await.unwrap();

        assert_eq!(engine.get_friends(a).await.unwrap().len(), 1);
        assert_eq!(engine.get_friends(b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_friend_rejects_self() {
        let engine = engine();
        let a = profile();

        assert!(matches!(
            engine.add_friend(a, a).await,
            Err(RelationError::SelfReference)
        ));
    }

    #[tokio::test]
    async fn blocking_is_asymmetric() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.block(a, b).await.unwrap();

        assert!(engine.is_blocking(a, b).await.unwrap());
        assert!(!engine.is_blocking(b, a).await.unwrap());
        assert!(engine.is_blocked_by(b, a).await.unwrap());
    }

    #[tokio::test]
    async fn block_twice_is_an_error() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.block(a, b).await.unwrap();
        assert!(matches!(
            engine.block(a, b).await,
            Err(RelationError::AlreadyBlocking)
        ));
    }

    #[tokio::test]
    async fn block_removes_friendship_both_ways() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.add_friend(a, b).await.unwrap();
        engine.block(a, b).await.unwrap();

        assert!(!engine.is_friends_with(a, b).await.unwrap());
        assert!(!engine.is_friends_with(b, a).await.unwrap());
        assert!(engine.is_blocking(a, b).await.unwrap());
    }

    #[tokio::test]
    async fn block_cancels_outgoing_pending_request() {
        let (engine, repo) = engine_with_repo();
        let (a, b) = (profile(), profile());

        let request = engine.send_request(a, b).await.unwrap();
        engine.block(a, b).await.unwrap();

        assert!(engine.get_outgoing_pending(a).await.unwrap().is_empty());
        assert!(engine.get_incoming_pending(b).await.unwrap().is_empty());

        let canceled = repo
            .list_requests(a, Direction::Outgoing, RequestStatus::Canceled)
            .await
            .unwrap();
        assert!(canceled.iter().any(|r| r.id == request.id));
    }

    #[tokio::test]
    async fn block_denies_incoming_pending_request() {
        let (engine, repo) = engine_with_repo();
        let (a, b) = (profile(), profile());

        let request = engine.send_request(b, a).await.unwrap();
        engine.block(a, b).await.unwrap();

        assert!(engine.get_incoming_pending(a).await.unwrap().is_empty());

        let rejected = repo
            .list_requests(a, Direction::Incoming, RequestStatus::Rejected)
            .await
            .unwrap();
        assert!(rejected.iter().any(|r| r.id == request.id));
    }

    #[tokio::test]
    async fn unblock_when_not_blocking_is_a_noop() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.unblock(a, b).await.unwrap();
        assert!(!engine.is_blocking(a, b).await.unwrap());
    }

    #[tokio::test]
    async fn send_then_approve_round_trip() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        let request = engine.send_request(a, b).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(engine.has_pending_request_to(a, b).await.unwrap());
        assert!(engine.has_pending_request_from(b, a).await.unwrap());

        let approved = engine.approve_request(b, a).await.unwrap();
        assert_eq!(approved.id, request.id);
        assert_eq!(approved.status, RequestStatus::Accepted);

        assert!(engine.is_friends_with(a, b).await.unwrap());
        assert!(engine.is_friends_with(b, a).await.unwrap());
        assert!(engine.get_outgoing_pending(a).await.unwrap().is_empty());
        assert!(engine.get_incoming_pending(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_request_rejects_self() {
        let engine = engine();
        let a = profile();

        assert!(matches!(
            engine.send_request(a, a).await,
            Err(RelationError::SelfReference)
        ));
    }

    #[tokio::test]
    async fn send_request_while_blocked_creates_nothing() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.block(a, b).await.unwrap();

        // the blocked side cannot reach the blocker...
        assert!(matches!(
            engine.send_request(b, a).await,
            Err(RelationError::Blocked)
        ));
        // ...and the blocker cannot reach out either
        assert!(matches!(
            engine.send_request(a, b).await,
            Err(RelationError::Blocked)
        ));

        assert!(engine.get_outgoing_pending(a).await.unwrap().is_empty());
        assert!(engine.get_outgoing_pending(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_request_to_friend_fails() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.add_friend(a, b).await.unwrap();
        assert!(matches!(
            engine.send_request(a, b).await,
            Err(RelationError::AlreadyFriends)
        ));
    }

    #[tokio::test]
    async fn send_request_with_pending_in_either_direction_fails() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.send_request(a, b).await.unwrap();

        assert!(matches!(
            engine.send_request(a, b).await,
            Err(RelationError::AlreadyPendingRequest)
        ));
        assert!(matches!(
            engine.send_request(b, a).await,
            Err(RelationError::AlreadyPendingRequest)
        ));
    }

    #[tokio::test]
    async fn cancel_then_resend_creates_a_fresh_row() {
        let (engine, repo) = engine_with_repo();
        let (a, b) = (profile(), profile());

        let first = engine.send_request(a, b).await.unwrap();
        let canceled = engine.cancel_request(a, b).await.unwrap();
        assert_eq!(canceled.id, first.id);
        assert_eq!(canceled.status, RequestStatus::Canceled);

        let second = engine.send_request(a, b).await.unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(second.status, RequestStatus::Pending);

        // the canceled row stays in history untouched
        let history = repo
            .list_requests(a, Direction::Outgoing, RequestStatus::Canceled)
            .await
            .unwrap();
        assert!(history.iter().any(|r| r.id == first.id));
    }

    #[tokio::test]
    async fn deny_is_terminal() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.send_request(a, b).await.unwrap();
        let denied = engine.deny_request(b, a).await.unwrap();
        assert_eq!(denied.status, RequestStatus::Rejected);

        // no pending row remains, so both responses now miss
        assert!(matches!(
            engine.approve_request(b, a).await,
            Err(RelationError::RequestNotFound)
        ));
        assert!(matches!(
            engine.deny_request(b, a).await,
            Err(RelationError::RequestNotFound)
        ));
        assert!(!engine.is_friends_with(a, b).await.unwrap());
    }

    #[tokio::test]
    async fn cancel_without_pending_fails() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        assert!(matches!(
            engine.cancel_request(a, b).await,
            Err(RelationError::RequestNotFound)
        ));
    }

    #[tokio::test]
    async fn approve_only_matches_the_incoming_direction() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.send_request(a, b).await.unwrap();

        // a sent the request, so a cannot approve it
        assert!(matches!(
            engine.approve_request(a, b).await,
            Err(RelationError::RequestNotFound)
        ));
    }

    #[tokio::test]
    async fn remove_friend_when_not_friends_fails() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        assert!(matches!(
            engine.remove_friend(a, b).await,
            Err(RelationError::NotFriends)
        ));
    }

    #[tokio::test]
    async fn remove_friend_deletes_both_directions() {
        let engine = engine();
        let (a, b) = (profile(), profile());

        engine.add_friend(a, b).await.unwrap();
        engine.remove_friend(b, a).await.unwrap();

        assert!(engine.get_friends(a).await.unwrap().is_empty());
        assert!(engine.get_friends(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filter_blockers_hides_blockers_and_preserves_order() {
        let engine = engine();
        let viewer = profile();
        let (p1, p2, p3) = (profile(), profile(), profile());

        engine.block(p2, viewer).await.unwrap();

        let filtered = engine
            .filter_blockers(viewer, vec![p1, p2, p3])
            .await
            .unwrap();
        assert_eq!(filtered, vec![p1, p3]);
    }

    #[tokio::test]
    async fn filter_blockers_keeps_profiles_the_viewer_blocks() {
        let engine = engine();
        let viewer = profile();
        let other = profile();

        // viewer blocking someone does not hide that someone from viewer
        engine.block(viewer, other).await.unwrap();

        let filtered = engine.filter_blockers(viewer, vec![other]).await.unwrap();
        assert_eq!(filtered, vec![other]);
    }
}
