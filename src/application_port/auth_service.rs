use crate::domain_model::ProfileId;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token invalid")]
    TokenInvalid,
    #[error("store error: {0}")]
    Store(String),
}

/// Boundary to the account subsystem. Token issuance, passwords, and
/// sessions all live on the other side of it; this crate only needs to
/// turn a bearer token into the acting profile.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<ProfileId, AuthError>;
}
