use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error_handling::types::StorageError;
use crate::session_management::{MemorySessionStore, SessionStore};
use crate::storage::storage_trait::Storage;
use crate::storage::types::{
    Account, AccountFilter, AccountId, AccountUpdate, Message, NewAccount, NewMessage, NewPost,
    Post, PostId, PostKind,
};

/// Records of one entity kind plus the counter that names them.
///
/// Ids only grow, so iterating the map yields insertion order.
struct Collection<T> {
    next_id: u64,
    records: BTreeMap<u64, T>,
    last_created_at: Option<DateTime<Utc>>,
}

impl<T> Collection<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
            last_created_at: None,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Current time, clamped so stamps never go backwards in id order.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(stamp);
        stamp
    }
}

fn guard<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    // no mutation here can panic halfway, poisoned data is still consistent
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory storage engine.
///
/// Each collection and its id counter sit behind their own lock, which makes
/// assign-id-then-insert atomic without serializing unrelated entity kinds.
pub struct MemStorage {
    accounts: Mutex<Collection<Account>>,
    messages: Mutex<Collection<Message>>,
    posts: Mutex<Collection<Post>>,
    session_store: Arc<dyn SessionStore>,
}

impl MemStorage {
    /// Creates an empty store together with its session store.
    pub fn new(check_period: std::time::Duration, session_max_age: chrono::Duration) -> Self {
        Self::with_session_store(Arc::new(MemorySessionStore::new(
            check_period,
            session_max_age,
        )))
    }

    pub fn with_session_store(session_store: Arc<dyn SessionStore>) -> Self {
        info!("MemStorage initialized");
        Self {
            accounts: Mutex::new(Collection::new()),
            messages: Mutex::new(Collection::new()),
            posts: Mutex::new(Collection::new()),
            session_store,
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::with_session_store(Arc::new(MemorySessionStore::default()))
    }
}

impl Storage for MemStorage {
    fn get_account(&self, id: AccountId) -> Option<Account> {
        guard(&self.accounts).records.get(&id).cloned()
    }

    fn get_account_by_handle(&self, handle: &str) -> Option<Account> {
        guard(&self.accounts)
            .records
            .values()
            .find(|a| a.handle == handle)
            .cloned()
    }

    fn create_account(&self, account: NewAccount) -> Result<Account, StorageError> {
        let mut accounts = guard(&self.accounts);
        if accounts.records.values().any(|a| a.handle == account.handle) {
            debug!("Rejected duplicate handle '{}'", account.handle);
            return Err(StorageError::Conflict(format!(
                "handle '{}' already exists",
                account.handle
            )));
        }

        let id = accounts.allocate_id();
        let stored = Account {
            id,
            handle: account.handle,
            credential: account.credential,
            role: account.role,
            display_name: account.display_name,
            bio: account.bio,
            interests: account.interests,
            expertise: account.expertise,
        };
        accounts.records.insert(id, stored.clone());
        info!("Created account {} ({}, {})", id, stored.handle, stored.role);
        Ok(stored)
    }

    fn update_account(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, StorageError> {
        let mut accounts = guard(&self.accounts);
        if let Some(ref handle) = update.handle {
            if accounts
                .records
                .values()
                .any(|a| a.id != id && &a.handle == handle)
            {
                return Err(StorageError::Conflict(format!(
                    "handle '{}' already exists",
                    handle
                )));
            }
        }

        let account = accounts
            .records
            .get_mut(&id)
            .ok_or_else(|| StorageError::NotFound(format!("account {}", id)))?;
        update.merge_into(account);
        debug!("Updated account {}", id);
        Ok(account.clone())
    }

    fn list_accounts(&self, filter: Option<AccountFilter>) -> Vec<Account> {
        let filter = filter.unwrap_or_default();
        let accounts = guard(&self.accounts);
        let list: Vec<Account> = accounts
            .records
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        debug!(
            "Listed {} of {} account(s)",
            list.len(),
            accounts.records.len()
        );
        list
    }

    fn create_message(&self, sender_id: AccountId, message: NewMessage) -> Message {
        let mut messages = guard(&self.messages);
        let id = messages.allocate_id();
        let stored = Message {
            id,
            sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            created_at: messages.stamp(),
        };
        messages.records.insert(id, stored.clone());
        debug!(
            "Stored message {} ({} -> {})",
            id, stored.sender_id, stored.receiver_id
        );
        stored
    }

    fn list_messages(&self, account_id: AccountId) -> Vec<Message> {
        guard(&self.messages)
            .records
            .values()
            .filter(|m| m.involves(account_id))
            .cloned()
            .collect()
    }

    fn create_post(&self, author_id: AccountId, post: NewPost) -> Post {
        let mut posts = guard(&self.posts);
        let id = posts.allocate_id();
        let stored = Post {
            id,
            author_id,
            title: post.title,
            content: post.content,
            kind: post.kind,
            tags: post.tags,
            created_at: posts.stamp(),
        };
        posts.records.insert(id, stored.clone());
        debug!("Stored {} post {} by {}", stored.kind, id, author_id);
        stored
    }

    fn list_posts(&self, kind: PostKind) -> Vec<Post> {
        let mut list: Vec<Post> = guard(&self.posts)
            .records
            .values()
            .filter(|p| p.kind == kind)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        list
    }

    fn get_post(&self, id: PostId) -> Option<Post> {
        guard(&self.posts).records.get(&id).cloned()
    }

    fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.session_store)
    }
}
