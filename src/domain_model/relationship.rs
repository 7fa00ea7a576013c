use crate::domain_model::ProfileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct RelationshipId(pub uuid::Uuid);

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationStatus {
    Friend,
    Blocked,
}

/// One directed edge of the relationship graph.
///
/// A FRIEND edge is always stored twice, once per direction, and the two
/// rows are written and deleted together. A BLOCKED edge is a single row:
/// `from_profile` blocks `to_profile`, nothing is implied the other way.
#[derive(Debug, Clone, Serialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub created_at: DateTime<Utc>,
    pub from_profile: ProfileId,
    pub to_profile: ProfileId,
    pub status: RelationStatus,
}

/// Which end of an edge a list operation anchors on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Outgoing,
    Incoming,
}
