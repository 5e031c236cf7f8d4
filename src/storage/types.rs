//! Entity records and the inputs accepted by the storage contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type AccountId = u64;
pub type MessageId = u64;
pub type PostId = u64;

/// Which side of the platform an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Entrepreneur,
    Investor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Entrepreneur => "entrepreneur",
            Role::Investor => "investor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entrepreneur" => Ok(Role::Entrepreneur),
            "investor" => Ok(Role::Investor),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Discriminates blog entries from forum discussions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Blog,
    Forum,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Blog => "blog",
            PostKind::Forum => "forum",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" => Ok(PostKind::Blog),
            "forum" => Ok(PostKind::Forum),
            other => Err(format!("unknown post kind '{}'", other)),
        }
    }
}

/// A registered user.
///
/// `credential` is an opaque, already hashed string; the store never
/// inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub handle: String,
    pub credential: String,
    pub role: Role,
    pub display_name: String,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub expertise: Vec<String>,
}

/// Fields accepted by `Storage::create_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub handle: String,
    pub credential: String,
    pub role: Role,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
}

/// Partial account update; `None` leaves the stored field untouched.
///
/// `bio` is doubly optional so that a caller can clear it
/// (`Some(None)`) as well as leave it alone (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub handle: Option<String>,
    pub credential: Option<String>,
    pub role: Option<Role>,
    pub display_name: Option<String>,
    pub bio: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
    pub expertise: Option<Vec<String>>,
}

impl AccountUpdate {
    /// Applies every present field onto `account`. The id is never touched.
    pub fn merge_into(self, account: &mut Account) {
        if let Some(handle) = self.handle {
            account.handle = handle;
        }
        if let Some(credential) = self.credential {
            account.credential = credential;
        }
        if let Some(role) = self.role {
            account.role = role;
        }
        if let Some(display_name) = self.display_name {
            account.display_name = display_name;
        }
        if let Some(bio) = self.bio {
            account.bio = bio;
        }
        if let Some(interests) = self.interests {
            account.interests = interests;
        }
        if let Some(expertise) = self.expertise {
            account.expertise = expertise;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFilter {
    pub role: Option<Role>,
}

impl AccountFilter {
    pub fn matches(&self, account: &Account) -> bool {
        match self.role {
            Some(role) => account.role == role,
            None => true,
        }
    }
}

/// A direct message, sender to receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: AccountId,
    pub receiver_id: AccountId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.sender_id == account_id || self.receiver_id == account_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub receiver_id: AccountId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: AccountId,
    pub title: String,
    pub content: String,
    pub kind: PostKind,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub kind: PostKind,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            id: 7,
            handle: "ai_startup".into(),
            credential: "hash".into(),
            role: Role::Entrepreneur,
            display_name: "Alex Rivera".into(),
            bio: Some("Building things".into()),
            interests: vec!["AI/ML".into()],
            expertise: vec!["Machine Learning".into()],
        }
    }

    #[test]
    fn role_and_kind_parse_their_wire_names() {
        assert_eq!("investor".parse::<Role>(), Ok(Role::Investor));
        assert_eq!("entrepreneur".parse::<Role>(), Ok(Role::Entrepreneur));
        assert!("founder".parse::<Role>().is_err());
        assert_eq!("forum".parse::<PostKind>(), Ok(PostKind::Forum));
        assert!("news".parse::<PostKind>().is_err());
        assert_eq!(serde_json::to_string(&PostKind::Blog).unwrap(), "\"blog\"");
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let mut a = account();
        AccountUpdate {
            display_name: Some("X".into()),
            ..Default::default()
        }
        .merge_into(&mut a);

        let mut expected = account();
        expected.display_name = "X".into();
        assert_eq!(a, expected);
    }

    #[test]
    fn merge_can_clear_bio() {
        let mut a = account();
        AccountUpdate {
            bio: Some(None),
            ..Default::default()
        }
        .merge_into(&mut a);
        assert_eq!(a.bio, None);
        assert_eq!(a.id, 7);
    }

    #[test]
    fn filter_matches_role() {
        let a = account();
        assert!(AccountFilter::default().matches(&a));
        assert!(AccountFilter { role: Some(Role::Entrepreneur) }.matches(&a));
        assert!(!AccountFilter { role: Some(Role::Investor) }.matches(&a));
    }
}
