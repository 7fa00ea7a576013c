use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity reference for one account's profile. Profile rows are owned by
/// the account subsystem; this crate never creates or deletes them.
#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct ProfileId(pub uuid::Uuid);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProfileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(ProfileId)
    }
}

/// Public projection of a profile, the only shape the API ever returns for
/// other people's profiles.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub profile_id: ProfileId,
    pub username: String,
}
