//! Error types for the Notetree core library.

use thiserror::Error;

/// All errors that can occur within the Notetree core library.
#[derive(Debug, Error)]
pub enum NotetreeError {
    /// A note ID was requested that does not exist in the current forest.
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// A parent ID passed to an insert or add operation does not resolve.
    #[error("Parent note not found: {0}")]
    ParentNotFound(String),

    /// A project ID does not resolve to a live project.
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// An operation requiring project context ran with no current project.
    #[error("No active project")]
    NoActiveProject,

    /// A move operation would create a cycle or is otherwise invalid.
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// Input failed validation before any persistence call was made.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Midpoint key allocation ran out of room between two sibling keys.
    #[error("Ordering key space exhausted between siblings")]
    AllocationExhausted,

    /// A backend call failed — network, constraint violation, auth.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Stored note data could not be deserialized from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`NotetreeError`].
pub type Result<T> = std::result::Result<T, NotetreeError>;

impl NotetreeError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoteNotFound(_) => "Note no longer exists".to_string(),
            Self::ParentNotFound(_) => "The target note no longer exists".to_string(),
            Self::ProjectNotFound(_) => "Project no longer exists".to_string(),
            Self::NoActiveProject => "Select a project first".to_string(),
            Self::InvalidMove(msg) => msg.clone(),
            Self::ValidationFailed(msg) => msg.clone(),
            Self::AllocationExhausted => "Could not reorder notes — please try again".to_string(),
            Self::Persistence(e) => format!("Failed to save: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_move_message_passes_through() {
        let e = NotetreeError::InvalidMove("A note cannot be its own parent".to_string());
        assert_eq!(e.user_message(), "A note cannot be its own parent");
    }

    #[test]
    fn test_persistence_variant_formats_cause() {
        let e = NotetreeError::Persistence("connection reset".to_string());
        assert!(e.to_string().contains("connection reset"));
        assert!(e.user_message().starts_with("Failed to save"));
    }
}
