use serde::{Deserialize, Serialize};

/// An image attached to a note, ordered among its siblings by `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteImage {
    pub id: String,
    pub note_id: String,
    pub url: String,
    pub position: i32,
}

/// A single node in the note forest.
///
/// `children` are owned exclusively by the parent and their order is the
/// display order. `unsaved_content` holds the in-progress draft while the
/// editor is open; `None` means no pending draft. `is_editing` is transient
/// UI state and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsaved_content: Option<String>,
    pub children: Vec<Note>,
    pub is_editing: bool,
    pub is_discussion: bool,
    pub images: Vec<NoteImage>,
    pub project_id: String,
    pub user_id: String,
}

impl Note {
    /// Creates an empty note in the editing state, as produced by the add
    /// operation: no content, an empty draft, no children.
    pub fn new_empty(id: String, project_id: String, user_id: String) -> Self {
        Self {
            id,
            content: String::new(),
            unsaved_content: Some(String::new()),
            children: Vec::new(),
            is_editing: true,
            is_discussion: false,
            images: Vec::new(),
            project_id,
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty_note_is_editing_with_blank_draft() {
        let note = Note::new_empty("n1".to_string(), "p1".to_string(), "u1".to_string());
        assert!(note.is_editing);
        assert_eq!(note.unsaved_content.as_deref(), Some(""));
        assert_eq!(note.content, "");
        assert!(note.children.is_empty());
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let mut note = Note::new_empty("n1".to_string(), "p1".to_string(), "u1".to_string());
        note.unsaved_content = None;
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"isDiscussion\":false"));
        assert!(json.contains("\"projectId\":\"p1\""));
        // Absent draft is omitted entirely, not serialized as null.
        assert!(!json.contains("unsavedContent"));
    }
}
