use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use warp::{Filter, Reply};

use super::routes::*;
use crate::storage::storage_trait::Storage;

/// JSON API server in front of the storage contract
pub struct WebServer {
    storage: Arc<dyn Storage>,
}

impl WebServer {
    /// Create a new WebServer instance
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// All API routes composed, with rejections rendered as JSON errors
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        let storage = &self.storage;
        register_route(storage.clone())
            .or(login_route(storage.clone()))
            .or(logout_route(storage.clone()))
            .or(current_user_route(storage.clone()))
            .or(list_users_route(storage.clone()))
            .or(update_profile_route(storage.clone()))
            .or(send_message_route(storage.clone()))
            .or(list_messages_route(storage.clone()))
            .or(create_post_route(storage.clone()))
            .or(list_posts_route(storage.clone()))
            .or(get_post_route(storage.clone()))
            .recover(handle_rejection)
    }

    /// Serve until `shutdown` resolves
    pub async fn start(&self, addr: SocketAddr, shutdown: impl Future<Output = ()>) {
        info!("Web server listening on http://{}", addr);
        tokio::select! {
            _ = warp::serve(self.routes()).run(addr) => {},
            _ = shutdown => info!("Shutdown requested"),
        }
        info!("Web server stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStorage;
    use serde_json::{json, Value};
    use warp::http::{Response, StatusCode};
    use warp::test::request;

    fn server() -> WebServer {
        WebServer::new(Arc::new(MemStorage::default()))
    }

    fn body<B: AsRef<[u8]>>(res: &Response<B>) -> Value {
        serde_json::from_slice(res.body().as_ref()).unwrap()
    }

    fn cookie_of<B>(res: &Response<B>) -> String {
        let header = res
            .headers()
            .get("set-cookie")
            .expect("set-cookie header")
            .to_str()
            .unwrap();
        header.split(';').next().unwrap().to_string()
    }

    async fn register(server: &WebServer, handle: &str) -> (Value, String) {
        let res = request()
            .method("POST")
            .path("/api/register")
            .json(&json!({
                "handle": handle,
                "password": "hunter22",
                "role": "entrepreneur",
                "display_name": format!("{} display", handle),
            }))
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        (body(&res), cookie_of(&res))
    }

    #[tokio::test]
    async fn register_sets_cookie_for_current_user() {
        let server = server();
        let (account, cookie) = register(&server, "new_founder").await;
        assert!(cookie.starts_with("founderlink.sid="));
        assert!(account.get("credential").is_none());

        let res = request()
            .path("/api/user")
            .header("cookie", cookie.as_str())
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(&res)["handle"], "new_founder");

        let res = request().path("/api/user").reply(&server.routes()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_invalidates_session() {
        let server = server();
        let (_, cookie) = register(&server, "leaving").await;

        let res = request()
            .method("POST")
            .path("/api/logout")
            .header("cookie", cookie.as_str())
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(cookie_of(&res).starts_with("founderlink.sid="));

        let res = request()
            .path("/api/user")
            .header("cookie", cookie.as_str())
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_handle_is_conflict() {
        let server = server();
        register(&server, "taken").await;
        let res = request()
            .method("POST")
            .path("/api/register")
            .json(&json!({
                "handle": "taken",
                "password": "hunter22",
                "role": "investor",
                "display_name": "Other",
            }))
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(body(&res)["message"], "Username already exists");
    }

    #[tokio::test]
    async fn profile_edit_is_owner_only() {
        let server = server();
        let (alice, alice_cookie) = register(&server, "alice").await;
        let (bob, _) = register(&server, "bob").await;
        let edit = json!({ "display_name": "Alice R." });

        let res = request()
            .method("PATCH")
            .path(&format!("/api/users/{}", bob["id"]))
            .header("cookie", alice_cookie.as_str())
            .json(&edit)
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = request()
            .method("PATCH")
            .path(&format!("/api/users/{}", alice["id"]))
            .json(&edit)
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = request()
            .method("PATCH")
            .path(&format!("/api/users/{}", alice["id"]))
            .header("cookie", alice_cookie.as_str())
            .json(&edit)
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(&res)["display_name"], "Alice R.");
    }

    #[tokio::test]
    async fn messages_round_trip() {
        let server = server();
        let (_, alice_cookie) = register(&server, "alice").await;
        let (bob, bob_cookie) = register(&server, "bob").await;

        let res = request()
            .method("POST")
            .path("/api/messages")
            .json(&json!({ "receiver_id": bob["id"], "content": "Coffee?" }))
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = request()
            .method("POST")
            .path("/api/messages")
            .header("cookie", alice_cookie.as_str())
            .json(&json!({ "receiver_id": bob["id"], "content": "Coffee?" }))
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = request()
            .path("/api/messages")
            .header("cookie", bob_cookie.as_str())
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(&res)[0]["content"], "Coffee?");
    }

    #[tokio::test]
    async fn posts_statuses() {
        let server = server();
        let (_, cookie) = register(&server, "writer").await;

        let res = request()
            .method("POST")
            .path("/api/posts")
            .header("cookie", cookie.as_str())
            .json(&json!({ "title": "Hello", "content": "First post", "kind": "blog" }))
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let id = body(&res)["id"].clone();

        let res = request().path("/api/posts?kind=blog").reply(&server.routes()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(&res)[0]["id"], id);

        let res = request().path("/api/posts").reply(&server.routes()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(&res)["message"], "Bad request: Kind is required");

        let res = request().path(&format!("/api/posts/{}", id)).reply(&server.routes()).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = request().path("/api/posts/999").reply(&server.routes()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&res)["message"], "Post not found");
    }

    #[tokio::test]
    async fn malformed_requests_map_to_json_errors() {
        let server = server();

        let res = request()
            .method("POST")
            .path("/api/posts")
            .header("content-type", "text/plain")
            .body("hello")
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = request()
            .method("POST")
            .path("/api/login")
            .header("content-type", "application/json")
            .body("{not json")
            .reply(&server.routes())
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = request().path("/api/login").reply(&server.routes()).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body(&res)["message"], "Method not allowed");

        let res = request().path("/api/nowhere").reply(&server.routes()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&res)["message"], "Route not found");
    }
}
