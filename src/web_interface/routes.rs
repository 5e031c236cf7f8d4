use std::convert::Infallible;
use std::sync::Arc;

use log::error;
use serde::Serialize;
use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use super::auth::{self, SESSION_COOKIE};
use super::handlers;
use super::types::{
    AccountResponse, ApiError, LoginRequest, PostsQuery, ProfileUpdateRequest, RegisterRequest,
    UsersQuery,
};
use crate::error_handling::types::WebError;
use crate::storage::storage_trait::Storage;
use crate::storage::types::{Account, AccountId, NewMessage, NewPost, PostId};

const BODY_LIMIT: u64 = 64 * 1024;

fn status_of(err: &WebError) -> StatusCode {
    match err {
        WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
        WebError::Unauthorized => StatusCode::UNAUTHORIZED,
        WebError::Forbidden => StatusCode::FORBIDDEN,
        WebError::NotFound(_) => StatusCode::NOT_FOUND,
        WebError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        WebError::Conflict(_) => StatusCode::CONFLICT,
        WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_reply(err: WebError) -> reply::Response {
    if let WebError::Internal(ref e) = err {
        error!("Request failed: {}", e);
    }
    reply::with_status(
        reply::json(&ApiError {
            message: err.to_string(),
        }),
        status_of(&err),
    )
    .into_response()
}

fn json_reply<T: Serialize>(result: Result<T, WebError>, status: StatusCode) -> reply::Response {
    match result {
        Ok(body) => reply::with_status(reply::json(&body), status).into_response(),
        Err(e) => error_reply(e),
    }
}

/// Replies with the account and sets the session cookie.
fn login_reply(result: Result<(Account, String), WebError>, status: StatusCode) -> reply::Response {
    match result {
        Ok((account, sid)) => reply::with_header(
            reply::with_status(reply::json(&AccountResponse::from(account)), status),
            "set-cookie",
            auth::session_cookie(&sid),
        )
        .into_response(),
        Err(e) => error_reply(e),
    }
}

fn with_storage(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = (Arc<dyn Storage>,), Error = Infallible> + Clone {
    warp::any().map(move || storage.clone())
}

fn session_id() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE)
}

fn json_body<T: serde::de::DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(BODY_LIMIT).and(warp::body::json())
}

/// POST /api/register
pub fn register_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "register")
        .and(warp::post())
        .and(with_storage(storage))
        .and(json_body::<RegisterRequest>())
        .and_then(|storage: Arc<dyn Storage>, req: RegisterRequest| async move {
            Ok::<_, Rejection>(login_reply(
                handlers::register(storage.as_ref(), req),
                StatusCode::CREATED,
            ))
        })
}

/// POST /api/login
pub fn login_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "login")
        .and(warp::post())
        .and(with_storage(storage))
        .and(json_body::<LoginRequest>())
        .and_then(|storage: Arc<dyn Storage>, req: LoginRequest| async move {
            Ok::<_, Rejection>(login_reply(
                handlers::login(storage.as_ref(), req),
                StatusCode::OK,
            ))
        })
}

/// POST /api/logout
pub fn logout_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "logout")
        .and(warp::post())
        .and(with_storage(storage))
        .and(session_id())
        .and_then(|storage: Arc<dyn Storage>, sid: Option<String>| async move {
            handlers::logout(storage.as_ref(), sid.as_deref());
            Ok::<_, Rejection>(reply::with_header(
                StatusCode::OK,
                "set-cookie",
                auth::expired_session_cookie(),
            ))
        })
}

/// GET /api/user
pub fn current_user_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "user")
        .and(warp::get())
        .and(with_storage(storage))
        .and(session_id())
        .and_then(|storage: Arc<dyn Storage>, sid: Option<String>| async move {
            let result = handlers::current_user(storage.as_ref(), sid.as_deref())
                .map(AccountResponse::from);
            Ok::<_, Rejection>(json_reply(result, StatusCode::OK))
        })
}

/// GET /api/users?role=
pub fn list_users_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "users")
        .and(warp::get())
        .and(with_storage(storage))
        .and(warp::query::<UsersQuery>())
        .and_then(|storage: Arc<dyn Storage>, query: UsersQuery| async move {
            let result = handlers::list_users(storage.as_ref(), query).map(|list| {
                list.into_iter()
                    .map(AccountResponse::from)
                    .collect::<Vec<_>>()
            });
            Ok::<_, Rejection>(json_reply(result, StatusCode::OK))
        })
}

/// PATCH /api/users/:id
pub fn update_profile_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "users" / AccountId)
        .and(warp::patch())
        .and(with_storage(storage))
        .and(session_id())
        .and(json_body::<ProfileUpdateRequest>())
        .and_then(
            |id: AccountId,
             storage: Arc<dyn Storage>,
             sid: Option<String>,
             req: ProfileUpdateRequest| async move {
                let result = handlers::update_profile(storage.as_ref(), sid.as_deref(), id, req)
                    .map(AccountResponse::from);
                Ok::<_, Rejection>(json_reply(result, StatusCode::OK))
            },
        )
}

/// POST /api/messages
pub fn send_message_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "messages")
        .and(warp::post())
        .and(with_storage(storage))
        .and(session_id())
        .and(json_body::<NewMessage>())
        .and_then(|storage: Arc<dyn Storage>, sid: Option<String>, msg: NewMessage| async move {
            let result = handlers::send_message(storage.as_ref(), sid.as_deref(), msg);
            Ok::<_, Rejection>(json_reply(result, StatusCode::CREATED))
        })
}

/// GET /api/messages
pub fn list_messages_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "messages")
        .and(warp::get())
        .and(with_storage(storage))
        .and(session_id())
        .and_then(|storage: Arc<dyn Storage>, sid: Option<String>| async move {
            let result = handlers::list_messages(storage.as_ref(), sid.as_deref());
            Ok::<_, Rejection>(json_reply(result, StatusCode::OK))
        })
}

/// POST /api/posts
pub fn create_post_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "posts")
        .and(warp::post())
        .and(with_storage(storage))
        .and(session_id())
        .and(json_body::<NewPost>())
        .and_then(|storage: Arc<dyn Storage>, sid: Option<String>, post: NewPost| async move {
            let result = handlers::create_post(storage.as_ref(), sid.as_deref(), post);
            Ok::<_, Rejection>(json_reply(result, StatusCode::CREATED))
        })
}

/// GET /api/posts?kind=
pub fn list_posts_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "posts")
        .and(warp::get())
        .and(with_storage(storage))
        .and(warp::query::<PostsQuery>())
        .and_then(|storage: Arc<dyn Storage>, query: PostsQuery| async move {
            let result = handlers::list_posts(storage.as_ref(), query);
            Ok::<_, Rejection>(json_reply(result, StatusCode::OK))
        })
}

/// GET /api/posts/:id
pub fn get_post_route(
    storage: Arc<dyn Storage>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api" / "posts" / PostId)
        .and(warp::get())
        .and(with_storage(storage))
        .and_then(|id: PostId, storage: Arc<dyn Storage>| async move {
            let result = handlers::get_post(storage.as_ref(), id);
            Ok::<_, Rejection>(json_reply(result, StatusCode::OK))
        })
}

/// Turns unmatched routes and malformed requests into JSON errors.
///
/// Every route's rejection is combined, so request-level problems are
/// checked before `MethodNotAllowed`, which a sibling route on the same
/// path will usually have added.
pub async fn handle_rejection(err: Rejection) -> Result<reply::Response, Infallible> {
    let web_error = if err.is_not_found() {
        WebError::NotFound(String::from("Route not found"))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        WebError::BadRequest(e.to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        WebError::BadRequest(String::from("Expected an application/json body"))
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        WebError::BadRequest(String::from("Content-Length required"))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        WebError::BadRequest(String::from("Payload too large"))
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        WebError::BadRequest(e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        WebError::MethodNotAllowed
    } else {
        WebError::Internal(format!("unhandled rejection: {:?}", err))
    };
    Ok(error_reply(web_error))
}
