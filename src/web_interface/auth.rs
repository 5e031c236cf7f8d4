//! Credential hashing and login sessions.
//!
//! Credentials are hashed with Argon2id before they reach the store. A login
//! opens a session in the store's `SessionStore` whose data carries the
//! account id; the session id travels in the `founderlink.sid` cookie.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::debug;
use serde_json::json;
use uuid::Uuid;

use crate::error_handling::types::WebError;
use crate::storage::types::{Account, AccountId};
use crate::storage::Storage;

pub const SESSION_COOKIE: &str = "founderlink.sid";

/// Hash a credential using Argon2id, returning the PHC string.
pub fn hash_credential(password: &str) -> Result<String, WebError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| WebError::Internal(format!("Failed to hash credential: {e}")))
}

pub fn verify_credential(password: &str, hash: &str) -> Result<bool, WebError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| WebError::Internal(format!("Invalid credential hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Opens a session for `account_id` and returns its id.
pub fn open_session(storage: &dyn Storage, account_id: AccountId) -> String {
    let sid = Uuid::new_v4().simple().to_string();
    storage
        .session_store()
        .set(&sid, json!({ "account_id": account_id }));
    debug!("Opened session for account {}", account_id);
    sid
}

pub fn close_session(storage: &dyn Storage, sid: &str) -> bool {
    storage.session_store().destroy(sid)
}

/// Resolves the caller's account from the session cookie.
///
/// A successful lookup refreshes the session expiry.
pub fn current_account(storage: &dyn Storage, sid: Option<&str>) -> Result<Account, WebError> {
    let sid = sid.ok_or(WebError::Unauthorized)?;
    let store = storage.session_store();
    let session = store.get(sid).ok_or(WebError::Unauthorized)?;
    let account_id = session
        .data
        .get("account_id")
        .and_then(|v| v.as_u64())
        .ok_or(WebError::Unauthorized)?;
    let account = storage
        .get_account(account_id)
        .ok_or(WebError::Unauthorized)?;
    store.touch(sid);
    Ok(account)
}

pub fn session_cookie(sid: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, sid)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
