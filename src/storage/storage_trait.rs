//! Storage Trait
//!
//! This module defines the `Storage` trait, the contract between the route
//! layer and whatever keeps accounts, messages and posts.
//!
//! Implementors of this trait are responsible for:
//! - Assigning identities (one strictly increasing counter per entity kind)
//! - Stamping messages and posts with their creation time
//! - Answering lookups and filtered listings
//! - Owning the session store used by the authentication layer
//!
//! Lookups never fail: an unknown id yields `None` or an empty list.

use std::sync::Arc;

use crate::error_handling::types::StorageError;
use crate::session_management::SessionStore;
use crate::storage::types::{
    Account, AccountFilter, AccountId, AccountUpdate, Message, NewAccount, NewMessage, NewPost,
    Post, PostId, PostKind,
};

/// The `Storage` trait defines the interface for account, message and post storage backends.
///
/// Listing order is part of the contract: accounts and messages come back in
/// insertion order, posts newest first.
pub trait Storage: Send + Sync {
    fn get_account(&self, id: AccountId) -> Option<Account>;

    /// Finds the account owning `handle`. Handles are unique, so there is at most one.
    fn get_account_by_handle(&self, handle: &str) -> Option<Account>;

    /// Stores a new account under the next account id.
    ///
    /// Fails with `StorageError::Conflict` if the handle is already taken.
    fn create_account(&self, account: NewAccount) -> Result<Account, StorageError>;

    /// Merges `update` into the stored account and returns the result.
    ///
    /// Fails with `StorageError::NotFound` if no account has this id, and
    /// with `StorageError::Conflict` if the update renames the handle to one
    /// already in use.
    fn update_account(&self, id: AccountId, update: AccountUpdate)
        -> Result<Account, StorageError>;

    /// Lists accounts in insertion order, optionally restricted by role.
    fn list_accounts(&self, filter: Option<AccountFilter>) -> Vec<Account>;

    /// Stores a message from `sender_id`, stamped with the current time.
    ///
    /// Neither the sender nor the receiver has to exist.
    fn create_message(&self, sender_id: AccountId, message: NewMessage) -> Message;

    /// Every message sent or received by `account_id`, in insertion order.
    fn list_messages(&self, account_id: AccountId) -> Vec<Message>;

    /// Stores a post by `author_id`, stamped with the current time.
    fn create_post(&self, author_id: AccountId, post: NewPost) -> Post;

    /// Posts of the given kind, most recent first.
    fn list_posts(&self, kind: PostKind) -> Vec<Post>;

    fn get_post(&self, id: PostId) -> Option<Post>;

    /// The session store owned by this backend.
    fn session_store(&self) -> Arc<dyn SessionStore>;
}
