use crate::domain_model::ProfileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct RequestId(pub uuid::Uuid);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Canceled,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// One initiation of a friendship, kept as history.
///
/// Rows are append-only: a request is created Pending and makes exactly one
/// transition, to Accepted, Rejected, or Canceled. Terminal rows are never
/// deleted and never reopened; asking again means a fresh row.
#[derive(Debug, Clone, Serialize)]
pub struct FriendRequest {
    pub id: RequestId,
    pub created_at: DateTime<Utc>,
    pub from_profile: ProfileId,
    pub to_profile: ProfileId,
    pub status: RequestStatus,
}
