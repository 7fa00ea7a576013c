use super::error::*;
use crate::application_port::{ProfileService, RelationshipService};
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// A friend request with both endpoints resolved to usernames.
#[derive(Debug, Serialize)]
pub struct RequestView {
    pub request_id: RequestId,
    pub from_user: String,
    pub to_user: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

async fn request_views(
    requests: Vec<FriendRequest>,
    profile_service: &Arc<dyn ProfileService>,
) -> Result<Vec<RequestView>, warp::Rejection> {
    let mut ids: Vec<ProfileId> = Vec::with_capacity(requests.len() * 2);
    for request in &requests {
        ids.push(request.from_profile);
        ids.push(request.to_profile);
    }
    ids.sort();
    ids.dedup();

    let usernames: HashMap<ProfileId, String> = profile_service
        .get_summaries(&ids)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?
        .into_iter()
        .map(|s| (s.profile_id, s.username))
        .collect();

    // a request whose endpoint has been deactivated is not shown
    Ok(requests
        .into_iter()
        .filter_map(|request| {
            let from_user = usernames.get(&request.from_profile)?.clone();
            let to_user = usernames.get(&request.to_profile)?.clone();
            Some(RequestView {
                request_id: request.id,
                from_user,
                to_user,
                status: request.status,
                created_at: request.created_at,
            })
        })
        .collect())
}

async fn request_view(
    request: FriendRequest,
    profile_service: &Arc<dyn ProfileService>,
) -> Result<RequestView, warp::Rejection> {
    request_views(vec![request], profile_service)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| reject::custom(ApiErrorCode::ProfileNotFound))
}

pub async fn list_friends(
    username: String,
    viewer: ProfileId,
    relationship_service: Arc<dyn RelationshipService>,
    profile_service: Arc<dyn ProfileService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let target = profile_service
        .resolve_username(&username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let friends = relationship_service
        .get_friends(target)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let candidates: Vec<ProfileId> = friends.iter().map(|r| r.to_profile).collect();
    let visible = relationship_service
        .filter_blockers(viewer, candidates)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let summaries = profile_service
        .get_summaries(&visible)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(summaries)))
}

#[derive(Debug, Deserialize)]
pub struct FriendBody {
    pub username: String,
}

pub async fn send_friend_request(
    body: FriendBody,
    me: ProfileId,
    profile_service: Arc<dyn ProfileService>,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let other = profile_service
        .resolve_username(&body.username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let request = relationship_service
        .send_request(me, other)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let view = request_view(request, &profile_service).await?;
    Ok(warp::reply::json(&ApiResponse::ok(view)))
}

#[derive(Debug, Serialize)]
pub struct RemoveFriendResponse;

pub async fn remove_friend(
    body: FriendBody,
    me: ProfileId,
    profile_service: Arc<dyn ProfileService>,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let other = profile_service
        .resolve_username(&body.username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    relationship_service
        .remove_friend(me, other)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(RemoveFriendResponse)))
}

#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    pub outgoing: Option<String>,
}

pub async fn list_requests(
    query: RequestListQuery,
    me: ProfileId,
    relationship_service: Arc<dyn RelationshipService>,
    profile_service: Arc<dyn ProfileService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let outgoing = match query.outgoing.as_deref() {
        Some("1") => true,
        Some("0") | None => false,
        Some(_) => return Err(reject::custom(ApiErrorCode::InvalidQuery)),
    };

    let requests = if outgoing {
        relationship_service.get_outgoing_pending(me).await
    } else {
        relationship_service.get_incoming_pending(me).await
    }
    .map_err(ApiErrorCode::from)
    .map_err(reject::custom)?;

    let views = request_views(requests, &profile_service).await?;
    Ok(warp::reply::json(&ApiResponse::ok(views)))
}

#[derive(Debug, Deserialize)]
pub struct RespondBody {
    pub username: String,
    pub accepted: bool,
}

pub async fn respond_to_request(
    body: RespondBody,
    me: ProfileId,
    profile_service: Arc<dyn ProfileService>,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let other = profile_service
        .resolve_username(&body.username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let request = if body.accepted {
        relationship_service.approve_request(me, other).await
    } else {
        relationship_service.deny_request(me, other).await
    }
    .map_err(ApiErrorCode::from)
    .map_err(reject::custom)?;

    let view = request_view(request, &profile_service).await?;
    Ok(warp::reply::json(&ApiResponse::ok(view)))
}

pub async fn cancel_request(
    body: FriendBody,
    me: ProfileId,
    profile_service: Arc<dyn ProfileService>,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let other = profile_service
        .resolve_username(&body.username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let request = relationship_service
        .cancel_request(me, other)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let view = request_view(request, &profile_service).await?;
    Ok(warp::reply::json(&ApiResponse::ok(view)))
}

pub async fn list_blocking(
    me: ProfileId,
    relationship_service: Arc<dyn RelationshipService>,
    profile_service: Arc<dyn ProfileService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let blocking = relationship_service
        .get_blocking(me)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let candidates: Vec<ProfileId> = blocking.iter().map(|r| r.to_profile).collect();
    let visible = relationship_service
        .filter_blockers(me, candidates)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let summaries = profile_service
        .get_summaries(&visible)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(summaries)))
}

#[derive(Debug, Serialize)]
pub struct BlockResponse;

pub async fn create_block(
    body: FriendBody,
    me: ProfileId,
    profile_service: Arc<dyn ProfileService>,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let other = profile_service
        .resolve_username(&body.username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    relationship_service
        .block(me, other)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(BlockResponse)))
}

#[derive(Debug, Serialize)]
pub struct UnblockResponse;

pub async fn remove_block(
    body: FriendBody,
    me: ProfileId,
    profile_service: Arc<dyn ProfileService>,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let other = profile_service
        .resolve_username(&body.username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    // the engine's unblock is a no-op when absent; the API promises an error
    if !relationship_service
        .is_blocking(me, other)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?
    {
        return Err(reject::custom(ApiErrorCode::NotBlocking));
    }

    relationship_service
        .unblock(me, other)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(UnblockResponse)))
}
