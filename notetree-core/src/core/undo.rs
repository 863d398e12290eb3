//! Single-step undo for content and flag edits.
//!
//! The stack holds data commands rather than closures: each command records
//! the inverse edit, and [`NoteStore`](crate::NoteStore) interprets it by
//! re-entering its own operations so the inverse is persisted like any other
//! edit. Structural operations (add/delete/move) are deliberately not
//! captured — structural undo would have to re-derive ordering keys and is
//! out of scope by design.

use serde::{Deserialize, Serialize};

/// The inverse edit a command applies when undone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UndoAction {
    /// Restore a note's committed content to a previous value.
    RestoreContent { note_id: String, content: String },
    /// Set the discussion flag back to a previous value.
    SetDiscussion { note_id: String, value: bool },
}

/// One entry on the undo stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoCommand {
    pub description: String,
    pub action: UndoAction,
}

impl UndoCommand {
    pub fn restore_content(note_id: &str, content: String) -> Self {
        Self {
            description: "Update note content".to_string(),
            action: UndoAction::RestoreContent {
                note_id: note_id.to_string(),
                content,
            },
        }
    }

    pub fn set_discussion(note_id: &str, value: bool) -> Self {
        Self {
            description: "Toggle discussion flag".to_string(),
            action: UndoAction::SetDiscussion {
                note_id: note_id.to_string(),
                value,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_carry_descriptions() {
        let cmd = UndoCommand::restore_content("n1", "old".to_string());
        assert_eq!(cmd.description, "Update note content");
        match cmd.action {
            UndoAction::RestoreContent { note_id, content } => {
                assert_eq!(note_id, "n1");
                assert_eq!(content, "old");
            }
            _ => panic!("wrong action variant"),
        }
    }

    #[test]
    fn test_action_serializes_tagged() {
        let cmd = UndoCommand::set_discussion("n1", true);
        let json = serde_json::to_string(&cmd.action).unwrap();
        assert!(json.contains("\"type\":\"SetDiscussion\""));
    }
}
