use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;

/// Row-level store for relationship edges and friend requests.
///
/// The store enforces the uniqueness invariants (one row per ordered
/// (from, to, status) triple; one Pending request per ordered pair) and
/// the one-shot request transition; every graph-level rule lives in the
/// engine on top. Writes take a [`StorageTx`] so the engine can scope a
/// whole command in one transaction; plain reads run on the pool.
#[async_trait::async_trait]
pub trait RelationshipRepo: Send + Sync {
    async fn find_relationship(
        &self,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Option<Relationship>, RelationError>;

    async fn find_relationship_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Option<Relationship>, RelationError>;

    /// Fails with [`RelationError::Conflict`] when the (from, to, status)
    /// row already exists.
    async fn create_relationship_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<Relationship, RelationError>;

    /// No-op when the row is absent.
    async fn delete_relationship_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
        status: RelationStatus,
    ) -> Result<(), RelationError>;

    async fn list_relationships(
        &self,
        profile: ProfileId,
        direction: Direction,
        status: RelationStatus,
    ) -> Result<Vec<Relationship>, RelationError>;

    async fn find_pending_request(
        &self,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<Option<FriendRequest>, RelationError>;

    async fn find_pending_request_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<Option<FriendRequest>, RelationError>;

    /// Creates a Pending request. Fails with [`RelationError::Conflict`]
    /// when a Pending row for (from, to) already exists.
    async fn create_request_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        from: ProfileId,
        to: ProfileId,
    ) -> Result<FriendRequest, RelationError>;

    /// One-shot transition out of Pending. Fails with
    /// [`RelationError::NotFound`] when the row is missing and
    /// [`RelationError::InvalidTransition`] when it is no longer Pending.
    async fn set_request_status_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        request_id: RequestId,
        status: RequestStatus,
    ) -> Result<(), RelationError>;

    async fn list_requests(
        &self,
        profile: ProfileId,
        direction: Direction,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, RelationError>;
}
