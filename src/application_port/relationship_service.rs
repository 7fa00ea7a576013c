use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("a profile cannot relate to itself")]
    SelfReference,
    #[error("relationship not found")]
    NotFound,
    #[error("relationship already exists")]
    Conflict,
    #[error("request has already been resolved")]
    InvalidTransition,
    #[error("profiles are already friends")]
    AlreadyFriends,
    #[error("profiles are not friends")]
    NotFriends,
    #[error("already blocking this profile")]
    AlreadyBlocking,
    #[error("not blocking this profile")]
    NotBlocking,
    #[error("a block exists between these profiles")]
    Blocked,
    #[error("a friend request is already pending")]
    AlreadyPendingRequest,
    #[error("friend request not found")]
    RequestNotFound,
    #[error("store error: {0}")]
    Store(String),
}

/// The relationship state machine.
///
/// All operations take already-resolved profile ids; the transport layer
/// owns username resolution and the "may the caller act as `a`" check. The
/// first argument is always the acting profile. The engine is stateless
/// between calls: every fact is read from, and written to, the store.
#[async_trait::async_trait]
pub trait RelationshipService: Send + Sync {
    // query predicates, no side effects

    async fn is_friends_with(&self, a: ProfileId, b: ProfileId) -> Result<bool, RelationError>;
    async fn is_blocking(&self, a: ProfileId, b: ProfileId) -> Result<bool, RelationError>;
    async fn is_blocked_by(&self, a: ProfileId, b: ProfileId) -> Result<bool, RelationError>;
    async fn has_pending_request_to(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<bool, RelationError>;
    async fn has_pending_request_from(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<bool, RelationError>;

    async fn get_friends(&self, a: ProfileId) -> Result<Vec<Relationship>, RelationError>;
    async fn get_blocking(&self, a: ProfileId) -> Result<Vec<Relationship>, RelationError>;
    async fn get_incoming_pending(&self, a: ProfileId)
    -> Result<Vec<FriendRequest>, RelationError>;
    async fn get_outgoing_pending(&self, a: ProfileId)
    -> Result<Vec<FriendRequest>, RelationError>;

    /// Drops from `candidates` every profile that is blocking `viewer`,
    /// preserving order. Used to keep a blocker out of lists shown to the
    /// people they blocked.
    async fn filter_blockers(
        &self,
        viewer: ProfileId,
        candidates: Vec<ProfileId>,
    ) -> Result<Vec<ProfileId>, RelationError>;

    // mutating commands

    /// Creates a Pending request a→b. Rejects self-reference, a block in
    /// either direction, an existing friendship, and a pending request in
    /// either direction; nothing is written on any rejection.
    async fn send_request(&self, a: ProfileId, b: ProfileId)
    -> Result<FriendRequest, RelationError>;

    /// Cancels the Pending request a→b.
    async fn cancel_request(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<FriendRequest, RelationError>;

    /// `a` accepts the Pending request from `b`: the request becomes
    /// Accepted and the symmetric friendship is materialized in the same
    /// transaction.
    async fn approve_request(
        &self,
        a: ProfileId,
        b: ProfileId,
    ) -> Result<FriendRequest, RelationError>;

    /// `a` rejects the Pending request from `b`.
    async fn deny_request(&self, a: ProfileId, b: ProfileId)
    -> Result<FriendRequest, RelationError>;

    /// Writes the FRIEND edge in both directions. No-op when the pair is
    /// already friends or a block exists either way.
    async fn add_friend(&self, a: ProfileId, b: ProfileId) -> Result<(), RelationError>;

    /// Deletes both directions of the FRIEND edge.
    async fn remove_friend(&self, a: ProfileId, b: ProfileId) -> Result<(), RelationError>;

    /// Blocks `b`: removes any friendship, cancels a's outgoing pending
    /// request, denies b's incoming one, then writes the BLOCKED a→b row.
    async fn block(&self, a: ProfileId, b: ProfileId) -> Result<(), RelationError>;

    /// Deletes the BLOCKED a→b row; no-op when absent. Callers that want
    /// "not blocking" to be an error pre-check with [`Self::is_blocking`].
    async fn unblock(&self, a: ProfileId, b: ProfileId) -> Result<(), RelationError>;
}
