use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err.clone(), err.to_string()));
        Ok(warp::reply::with_status(json, StatusCode::OK))
    } else {
        let json = warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                code: ApiErrorCode::InternalError,
                message: format!("Unhandled error: {:?}", err),
            }),
        });
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Profile does not exist")]
    ProfileNotFound,
    #[error("A profile cannot target itself")]
    SelfReference,
    #[error("Relationship does not exist")]
    NotFound,
    #[error("Relationship already exists")]
    Conflict,
    #[error("Request has already been resolved")]
    InvalidTransition,
    #[error("You are already friends with this profile")]
    AlreadyFriends,
    #[error("This profile is not on your friends list")]
    NotFriends,
    #[error("You are already blocking this profile")]
    AlreadyBlocking,
    #[error("You are not blocking this profile")]
    NotBlocking,
    #[error("A block prevents this action")]
    Blocked,
    #[error("A friend request is already pending")]
    AlreadyPendingRequest,
    #[error("Friend request does not exist")]
    RequestNotFound,
    #[error("Invalid query parameter")]
    InvalidQuery,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<RelationError> for ApiErrorCode {
    fn from(error: RelationError) -> Self {
        match error {
            RelationError::SelfReference => ApiErrorCode::SelfReference,
            RelationError::NotFound => ApiErrorCode::NotFound,
            RelationError::Conflict => ApiErrorCode::Conflict,
            RelationError::InvalidTransition => ApiErrorCode::InvalidTransition,
            RelationError::AlreadyFriends => ApiErrorCode::AlreadyFriends,
            RelationError::NotFriends => ApiErrorCode::NotFriends,
            RelationError::AlreadyBlocking => ApiErrorCode::AlreadyBlocking,
            RelationError::NotBlocking => ApiErrorCode::NotBlocking,
            RelationError::Blocked => ApiErrorCode::Blocked,
            RelationError::AlreadyPendingRequest => ApiErrorCode::AlreadyPendingRequest,
            RelationError::RequestNotFound => ApiErrorCode::RequestNotFound,
            RelationError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<ProfileError> for ApiErrorCode {
    fn from(error: ProfileError) -> Self {
        match error {
            ProfileError::NotFound => ApiErrorCode::ProfileNotFound,
            ProfileError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::TokenInvalid => ApiErrorCode::InvalidToken,
            AuthError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}
