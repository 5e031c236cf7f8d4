//! Request validation performed before anything reaches the store.

use std::sync::OnceLock;

use regex::Regex;

use crate::error_handling::types::ValidationError;
use crate::storage::types::{NewMessage, NewPost};
use crate::web_interface::types::{ProfileUpdateRequest, RegisterRequest};

const HANDLE_PATTERN: &str = r"^[A-Za-z0-9_.-]{3,32}$";

fn handle_regex() -> &'static Regex {
    static HANDLE: OnceLock<Regex> = OnceLock::new();
    HANDLE.get_or_init(|| Regex::new(HANDLE_PATTERN).expect("handle pattern is valid"))
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Trims every tag and drops the blank ones, keeping order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn validate_registration(req: RegisterRequest) -> Result<RegisterRequest, ValidationError> {
    if !handle_regex().is_match(&req.handle) {
        return Err(ValidationError::new(
            "handle",
            "3 to 32 letters, digits, '_', '.' or '-'",
        ));
    }
    if req.password.is_empty() {
        return Err(ValidationError::new("password", "must not be empty"));
    }
    require_text("display_name", &req.display_name)?;
    Ok(RegisterRequest {
        interests: normalize_tags(req.interests),
        expertise: normalize_tags(req.expertise),
        ..req
    })
}

pub fn validate_profile_update(
    req: ProfileUpdateRequest,
) -> Result<ProfileUpdateRequest, ValidationError> {
    if let Some(ref name) = req.display_name {
        require_text("display_name", name)?;
    }
    Ok(ProfileUpdateRequest {
        interests: req.interests.map(normalize_tags),
        expertise: req.expertise.map(normalize_tags),
        ..req
    })
}

pub fn validate_new_message(message: NewMessage) -> Result<NewMessage, ValidationError> {
    require_text("content", &message.content)?;
    Ok(message)
}

pub fn validate_new_post(post: NewPost) -> Result<NewPost, ValidationError> {
    require_text("title", &post.title)?;
    require_text("content", &post.content)?;
    Ok(NewPost {
        tags: post.tags.map(normalize_tags),
        ..post
    })
}
