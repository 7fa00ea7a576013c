use crate::application_port::*;
use crate::domain_model::ProfileId;
use std::str::FromStr;

/// Dev-only stand-in for the account subsystem's token verifier: the
/// bearer token is `profile-token:<uuid>` and the uuid is taken at face
/// value. A deployment wires a real verifier in front of this service's
/// port instead.
#[derive(Debug)]
pub struct FakeAuthService;

impl FakeAuthService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FakeAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AuthService for FakeAuthService {
    async fn verify_token(&self, token: &str) -> Result<ProfileId, AuthError> {
        let Some(raw) = token.strip_prefix("profile-token:") else {
            return Err(AuthError::TokenInvalid);
        };
        ProfileId::from_str(raw).map_err(|_| AuthError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_prefixed_profile_uuid() {
        let service = FakeAuthService::new();
        let id = uuid::Uuid::new_v4();

        let verified = service
            .verify_token(&format!("profile-token:{id}"))
            .await
            .unwrap();
        assert_eq!(verified, ProfileId(id));
    }

    #[tokio::test]
    async fn rejects_other_tokens() {
        let service = FakeAuthService::new();

        assert!(matches!(
            service.verify_token("profile-token:not-a-uuid").await,
            Err(AuthError::TokenInvalid)
        ));
        assert!(matches!(
            service.verify_token("some-jwt").await,
            Err(AuthError::TokenInvalid)
        ));
    }
}
