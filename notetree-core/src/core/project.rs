//! Project metadata and title rules.

use crate::{NotetreeError, Result};
use serde::{Deserialize, Serialize};

/// A named container for one note forest.
///
/// Soft-deleted projects carry a `deleted_at` timestamp and are excluded
/// from listings; exactly one project is "current" at a time, tracked by
/// the store rather than on the project itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub user_id: String,
    pub note_count: usize,
    /// Unix timestamp (seconds) when the project was created.
    pub created_at: i64,
    /// Unix timestamp (seconds) of the last content modification.
    pub last_modified_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// Validates and normalizes a project title.
///
/// Returns the trimmed title on success.
///
/// # Errors
///
/// Returns [`NotetreeError::ValidationFailed`] if the trimmed title is empty,
/// longer than 50 characters, or contains characters outside letters, digits,
/// whitespace and basic punctuation (`- _ . , ! ? ( )`).
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(NotetreeError::ValidationFailed(
            "Title cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > 50 {
        return Err(NotetreeError::ValidationFailed(
            "Title cannot be longer than 50 characters".to_string(),
        ));
    }
    let allowed = |c: char| {
        c.is_ascii_alphanumeric() || c.is_whitespace() || "-_.,!?()".contains(c)
    };
    if !trimmed.chars().all(allowed) {
        return Err(NotetreeError::ValidationFailed(
            "Title can only contain letters, numbers, spaces, and basic punctuation".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Derives a title not already used by any of the given projects.
///
/// Tries `base` first, then `"{base} (2)"`, `"{base} (3)"`, and so on.
/// Comparison is exact (titles are already normalized by [`validate_title`]).
pub fn unique_title(base: &str, existing: &[Project]) -> String {
    let taken = |t: &str| existing.iter().any(|p| p.title == t);
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base} ({n})");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(title: &str) -> Project {
        Project {
            id: format!("id-{title}"),
            title: title.to_string(),
            description: String::new(),
            user_id: "u1".to_string(),
            note_count: 0,
            created_at: 0,
            last_modified_at: 0,
            deleted_at: None,
        }
    }

    #[test]
    fn test_validate_title_trims() {
        assert_eq!(validate_title("  My Notes  ").unwrap(), "My Notes");
    }

    #[test]
    fn test_validate_title_rejects_empty() {
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn test_validate_title_rejects_over_50_chars() {
        let long = "a".repeat(51);
        assert!(validate_title(&long).is_err());
        assert!(validate_title(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_validate_title_charset() {
        assert!(validate_title("Plan B - draft (v2)!?").is_ok());
        assert!(validate_title("no/slashes").is_err());
        assert!(validate_title("no<html>").is_err());
    }

    #[test]
    fn test_unique_title_appends_counter() {
        let existing = vec![project("Trip (Copy)"), project("Trip (Copy) (2)")];
        assert_eq!(unique_title("Trip (Copy)", &existing), "Trip (Copy) (3)");
        assert_eq!(unique_title("Fresh", &existing), "Fresh");
    }
}
