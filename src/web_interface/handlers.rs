//! Request handling behind the HTTP routes.
//!
//! Each function takes the injected storage plus the already extracted
//! request parts and returns either the payload or the `WebError` that
//! decides the response status. The warp filters in `routes` only wire
//! these up.

use log::{info, warn};

use crate::error_handling::types::WebError;
use crate::storage::account_filter;
use crate::storage::types::{Account, AccountId, Message, NewMessage, NewPost, Post, PostId, PostKind};
use crate::storage::Storage;
use crate::web_interface::auth;
use crate::web_interface::types::{
    LoginRequest, PostsQuery, ProfileUpdateRequest, RegisterRequest, UsersQuery,
};
use crate::web_interface::validation;

/// Creates an account and logs it in. Returns the account and the new session id.
pub fn register(
    storage: &dyn Storage,
    req: RegisterRequest,
) -> Result<(Account, String), WebError> {
    let req = validation::validate_registration(req)?;
    if storage.get_account_by_handle(&req.handle).is_some() {
        return Err(WebError::Conflict(String::from("Username already exists")));
    }
    let credential = auth::hash_credential(&req.password)?;
    let account = storage.create_account(req.into_new_account(credential))?;
    let sid = auth::open_session(storage, account.id);
    info!("Registered account {} ({})", account.id, account.handle);
    Ok((account, sid))
}

pub fn login(storage: &dyn Storage, req: LoginRequest) -> Result<(Account, String), WebError> {
    let account = storage
        .get_account_by_handle(&req.handle)
        .ok_or(WebError::Unauthorized)?;
    if !auth::verify_credential(&req.password, &account.credential)? {
        warn!("Failed login for '{}'", req.handle);
        return Err(WebError::Unauthorized);
    }
    let sid = auth::open_session(storage, account.id);
    Ok((account, sid))
}

pub fn logout(storage: &dyn Storage, sid: Option<&str>) {
    if let Some(sid) = sid {
        auth::close_session(storage, sid);
    }
}

pub fn current_user(storage: &dyn Storage, sid: Option<&str>) -> Result<Account, WebError> {
    auth::current_account(storage, sid)
}

pub fn list_users(storage: &dyn Storage, query: UsersQuery) -> Result<Vec<Account>, WebError> {
    let filter = account_filter::from_query(query.role.as_deref()).map_err(WebError::BadRequest)?;
    Ok(storage.list_accounts(filter))
}

/// Applies a profile edit. Only the logged-in owner may edit an account;
/// anyone else, anonymous callers included, gets `Forbidden`.
pub fn update_profile(
    storage: &dyn Storage,
    sid: Option<&str>,
    id: AccountId,
    req: ProfileUpdateRequest,
) -> Result<Account, WebError> {
    let caller = auth::current_account(storage, sid).map_err(|e| match e {
        WebError::Unauthorized => WebError::Forbidden,
        other => other,
    })?;
    if caller.id != id {
        return Err(WebError::Forbidden);
    }
    let req = validation::validate_profile_update(req)?;
    Ok(storage.update_account(id, req.into())?)
}

pub fn send_message(
    storage: &dyn Storage,
    sid: Option<&str>,
    message: NewMessage,
) -> Result<Message, WebError> {
    let caller = auth::current_account(storage, sid)?;
    let message = validation::validate_new_message(message)?;
    Ok(storage.create_message(caller.id, message))
}

pub fn list_messages(storage: &dyn Storage, sid: Option<&str>) -> Result<Vec<Message>, WebError> {
    let caller = auth::current_account(storage, sid)?;
    Ok(storage.list_messages(caller.id))
}

pub fn create_post(
    storage: &dyn Storage,
    sid: Option<&str>,
    post: NewPost,
) -> Result<Post, WebError> {
    let caller = auth::current_account(storage, sid)?;
    let post = validation::validate_new_post(post)?;
    Ok(storage.create_post(caller.id, post))
}

pub fn list_posts(storage: &dyn Storage, query: PostsQuery) -> Result<Vec<Post>, WebError> {
    let kind = query
        .kind
        .filter(|k| !k.is_empty())
        .ok_or_else(|| WebError::BadRequest(String::from("Kind is required")))?
        .parse::<PostKind>()
        .map_err(WebError::BadRequest)?;
    Ok(storage.list_posts(kind))
}

pub fn get_post(storage: &dyn Storage, id: PostId) -> Result<Post, WebError> {
    storage
        .get_post(id)
        .ok_or_else(|| WebError::NotFound(String::from("Post not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::demo_accounts::{seed_demo_accounts, DEMO_PASSWORD};
    use crate::storage::types::Role;
    use crate::storage::MemStorage;

    fn registration(handle: &str, role: Role) -> RegisterRequest {
        RegisterRequest {
            handle: handle.into(),
            password: "hunter22".into(),
            role,
            display_name: format!("{} display", handle),
            bio: Some("Bio".into()),
            interests: vec!["GreenTech".into()],
            expertise: vec![],
        }
    }

    fn logged_in(storage: &MemStorage, handle: &str) -> (Account, String) {
        register(storage, registration(handle, Role::Entrepreneur)).unwrap()
    }

    #[test]
    fn register_then_login() {
        let storage = MemStorage::default();
        let (account, sid) = register(&storage, registration("new_founder", Role::Entrepreneur)).unwrap();
        assert_ne!(account.credential, "hunter22");
        assert_eq!(current_user(&storage, Some(sid.as_str())).unwrap(), account);

        let (again, other_sid) = login(
            &storage,
            LoginRequest {
                handle: "new_founder".into(),
                password: "hunter22".into(),
            },
        )
        .unwrap();
        assert_eq!(again.id, account.id);
        assert_ne!(sid, other_sid);

        let bad = login(
            &storage,
            LoginRequest {
                handle: "new_founder".into(),
                password: "wrong".into(),
            },
        );
        assert_eq!(bad.unwrap_err(), WebError::Unauthorized);
    }

    #[test]
    fn register_rejects_taken_handle() {
        let storage = MemStorage::default();
        register(&storage, registration("taken", Role::Investor)).unwrap();
        let err = register(&storage, registration("taken", Role::Entrepreneur)).unwrap_err();
        assert_eq!(err, WebError::Conflict("Username already exists".into()));
    }

    #[test]
    fn demo_accounts_can_log_in() {
        let storage = MemStorage::default();
        let hash = auth::hash_credential(DEMO_PASSWORD).unwrap();
        seed_demo_accounts(&storage, &hash).unwrap();
        let (account, _) = login(
            &storage,
            LoginRequest {
                handle: "tech_investor".into(),
                password: DEMO_PASSWORD.into(),
            },
        )
        .unwrap();
        assert_eq!(account.display_name, "Sarah Johnson");
    }

    #[test]
    fn logout_ends_session() {
        let storage = MemStorage::default();
        let (_, sid) = logged_in(&storage, "leaving");
        logout(&storage, Some(sid.as_str()));
        assert_eq!(current_user(&storage, Some(sid.as_str())).unwrap_err(), WebError::Unauthorized);
        logout(&storage, None);
    }

    #[test]
    fn list_users_by_role() {
        let storage = MemStorage::default();
        register(&storage, registration("inv", Role::Investor)).unwrap();
        register(&storage, registration("ent", Role::Entrepreneur)).unwrap();

        let investors = list_users(&storage, UsersQuery { role: Some("investor".into()) }).unwrap();
        assert_eq!(investors.len(), 1);
        assert_eq!(investors[0].handle, "inv");
        assert_eq!(list_users(&storage, UsersQuery::default()).unwrap().len(), 2);
        assert!(matches!(
            list_users(&storage, UsersQuery { role: Some("admin".into()) }),
            Err(WebError::BadRequest(_))
        ));
    }

    #[test]
    fn only_owner_can_update_profile() {
        let storage = MemStorage::default();
        let (alice, alice_sid) = logged_in(&storage, "alice");
        let (bob, _) = logged_in(&storage, "bob");

        let req = ProfileUpdateRequest {
            display_name: Some("Alice R.".into()),
            bio: Some(String::new()),
            ..Default::default()
        };
        let updated = update_profile(&storage, Some(alice_sid.as_str()), alice.id, req.clone()).unwrap();
        assert_eq!(updated.display_name, "Alice R.");
        assert_eq!(updated.bio, None);
        assert_eq!(updated.role, alice.role);
        assert_eq!(updated.interests, alice.interests);

        assert_eq!(
            update_profile(&storage, Some(alice_sid.as_str()), bob.id, req.clone()).unwrap_err(),
            WebError::Forbidden
        );
        assert_eq!(
            update_profile(&storage, None, alice.id, req).unwrap_err(),
            WebError::Forbidden
        );
    }

    #[test]
    fn messaging_requires_login_and_content() {
        let storage = MemStorage::default();
        let (alice, alice_sid) = logged_in(&storage, "alice");
        let (bob, bob_sid) = logged_in(&storage, "bob");

        let msg = NewMessage {
            receiver_id: bob.id,
            content: "Coffee next week?".into(),
        };
        assert_eq!(
            send_message(&storage, None, msg.clone()).unwrap_err(),
            WebError::Unauthorized
        );
        let sent = send_message(&storage, Some(alice_sid.as_str()), msg).unwrap();
        assert_eq!(sent.sender_id, alice.id);

        let blank = NewMessage {
            receiver_id: bob.id,
            content: "".into(),
        };
        assert!(matches!(
            send_message(&storage, Some(alice_sid.as_str()), blank),
            Err(WebError::BadRequest(_))
        ));

        assert_eq!(list_messages(&storage, Some(bob_sid.as_str())).unwrap(), vec![sent]);
        assert_eq!(list_messages(&storage, None).unwrap_err(), WebError::Unauthorized);
    }

    #[test]
    fn posts_flow() {
        let storage = MemStorage::default();
        let (alice, sid) = logged_in(&storage, "alice");
        let post = create_post(
            &storage,
            Some(sid.as_str()),
            NewPost {
                title: "Ask: intros to climate funds".into(),
                content: "Looking for warm intros.".into(),
                kind: PostKind::Forum,
                tags: Some(vec!["climate".into()]),
            },
        )
        .unwrap();
        assert_eq!(post.author_id, alice.id);

        let forum = list_posts(&storage, PostsQuery { kind: Some("forum".into()) }).unwrap();
        assert_eq!(forum, vec![post.clone()]);
        assert!(list_posts(&storage, PostsQuery { kind: Some("blog".into()) })
            .unwrap()
            .is_empty());
        assert_eq!(
            list_posts(&storage, PostsQuery::default()).unwrap_err(),
            WebError::BadRequest("Kind is required".into())
        );

        assert_eq!(get_post(&storage, post.id).unwrap(), post);
        assert_eq!(
            get_post(&storage, post.id + 1).unwrap_err(),
            WebError::NotFound("Post not found".into())
        );
    }
}
