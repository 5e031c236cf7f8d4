use serde::{Deserialize, Serialize};

use crate::storage::types::{Account, AccountId, AccountUpdate, NewAccount, Role};

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

/// Public view of an account; the credential never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub handle: String,
    pub role: Role,
    pub display_name: String,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub expertise: Vec<String>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            handle: account.handle,
            role: account.role,
            display_name: account.display_name,
            bio: account.bio,
            interests: account.interests,
            expertise: account.expertise,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub handle: String,
    pub password: String,
    pub role: Role,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
}

impl RegisterRequest {
    pub fn into_new_account(self, credential: String) -> NewAccount {
        NewAccount {
            handle: self.handle,
            credential,
            role: self.role,
            display_name: self.display_name,
            bio: self.bio,
            interests: self.interests,
            expertise: self.expertise,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

/// Editable profile fields. An empty `bio` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub expertise: Option<Vec<String>>,
}

impl From<ProfileUpdateRequest> for AccountUpdate {
    fn from(req: ProfileUpdateRequest) -> Self {
        AccountUpdate {
            display_name: req.display_name,
            bio: req.bio.map(|b| if b.is_empty() { None } else { Some(b) }),
            interests: req.interests,
            expertise: req.expertise,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersQuery {
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostsQuery {
    pub kind: Option<String>,
}
