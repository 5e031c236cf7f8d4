//! Helpers for building `AccountFilter` values.
//!
//! This module re-exports `AccountFilter` and provides convenience builders
//! for the role filters the profile browser uses.

pub use crate::storage::types::AccountFilter;
use crate::storage::types::Role;

/// Build an `AccountFilter` that matches accounts by exact role.
pub fn by_role(role: Role) -> AccountFilter {
    AccountFilter { role: Some(role) }
}

/// Build an optional filter from a raw `role` query value.
///
/// An absent or empty value means "no filter"; anything else must name a role.
pub fn from_query(role: Option<&str>) -> Result<Option<AccountFilter>, String> {
    match role {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<Role>().map(|r| Some(by_role(r))),
    }
}
