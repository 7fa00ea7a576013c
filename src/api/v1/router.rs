use super::error::*;
use super::handler;
use super::handler::RequestListQuery;
use crate::application_port::AuthService;
use crate::domain_model::ProfileId;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let friend_list = warp::get()
        .and(warp::path("profiles"))
        .and(warp::path::param::<String>())
        .and(warp::path("friends"))
        .and(warp::path::end())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and(with(server.profile_service.clone()))
        .and_then(handler::list_friends);

    let send_request = warp::post()
        .and(warp::path("friends"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.profile_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::send_friend_request);

    let remove_friend = warp::delete()
        .and(warp::path("friends"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.profile_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::remove_friend);

    let request_list = warp::get()
        .and(warp::path("requests"))
        .and(warp::path::end())
        .and(warp::query::<RequestListQuery>())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and(with(server.profile_service.clone()))
        .and_then(handler::list_requests);

    let respond_request = warp::post()
        .and(warp::path("requests"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.profile_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::respond_to_request);

    let cancel_request = warp::delete()
        .and(warp::path("requests"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.profile_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::cancel_request);

    let blocking_list = warp::get()
        .and(warp::path("blocking"))
        .and(warp::path::end())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and(with(server.profile_service.clone()))
        .and_then(handler::list_blocking);

    let block = warp::post()
        .and(warp::path("blocking"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.profile_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::create_block);

    let unblock = warp::delete()
        .and(warp::path("blocking"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_verification(server.auth_service.clone()))
        .and(with(server.profile_service.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::remove_block);

    friend_list
        .or(send_request)
        .or(remove_friend)
        .or(request_list)
        .or(respond_request)
        .or(cancel_request)
        .or(blocking_list)
        .or(block)
        .or(unblock)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (ProfileId,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |token: String| {
        let auth_service = auth_service.clone();
        async move {
            if let Some(token) = token.strip_prefix("Bearer ") {
                let profile_id = auth_service
                    .verify_token(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok(profile_id)
            } else {
                Err(reject::custom(ApiErrorCode::InvalidToken))
            }
        }
    })
}
