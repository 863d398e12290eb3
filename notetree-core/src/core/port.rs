//! The persistence port — the abstract boundary to the external backend.
//!
//! [`NoteStore`](crate::NoteStore) never talks to the network itself; every
//! durable change goes through this trait, and only after a call succeeds is
//! the equivalent change applied to the in-memory forest. The backend owns
//! cascade semantics: deleting a subtree is a single call, never a per-child
//! loop from the client.
//!
//! The backend stores notes flat (parent pointer + sequence key); the store
//! assembles [`NoteRow`]s into a forest on fetch.

use crate::{NoteImage, Project, Result};
use serde::{Deserialize, Serialize};

/// The durable fields of a note, as sent to the backend on create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    pub content: String,
    pub parent_id: Option<String>,
    pub project_id: String,
    pub user_id: String,
    pub is_discussion: bool,
}

/// One row of a project's flat note listing, as fetched from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRow {
    pub id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub is_discussion: bool,
    /// Ordering key among siblings; rows without one sort as 0.
    pub sequence: Option<i64>,
    pub images: Vec<NoteImage>,
    pub project_id: String,
    pub user_id: String,
}

/// An ordering-key record for one note under one parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRecord {
    pub note_id: String,
    pub sequence: i64,
}

/// Abstract persistence operations consumed by the mutation orchestrator.
///
/// Implementations map these onto the real backend (tables `notes`,
/// `note_sequences`, `note_images`, `settings` in the reference schema).
/// Every method either fully succeeds or returns an error with no partial
/// local effect expected of the caller.
pub trait Persistence {
    // ── notes ──────────────────────────────────────────────────────────

    fn create_note(&mut self, record: &NoteRecord) -> Result<()>;

    fn update_note_content(&mut self, note_id: &str, content: &str) -> Result<()>;

    fn update_note_flag(&mut self, note_id: &str, is_discussion: bool) -> Result<()>;

    /// Deletes the note and its entire subtree. Cascade is the backend's
    /// responsibility.
    fn delete_note_subtree(&mut self, note_id: &str) -> Result<()>;

    /// Rewrites the note's parent pointer and ordering key in one call.
    fn reparent_note(
        &mut self,
        note_id: &str,
        new_parent_id: Option<&str>,
        sequence: i64,
    ) -> Result<()>;

    /// All note rows of a project, flat. Order is unspecified; sequence keys
    /// define sibling order after assembly.
    fn fetch_forest(&self, project_id: &str) -> Result<Vec<NoteRow>>;

    // ── ordering keys ──────────────────────────────────────────────────

    /// Creates or replaces the ordering record for one note.
    fn set_sequence(
        &mut self,
        project_id: &str,
        note_id: &str,
        parent_id: Option<&str>,
        sequence: i64,
    ) -> Result<()>;

    /// The ordering records of one sibling group, sorted ascending by key.
    fn sibling_sequences(
        &self,
        project_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<SequenceRecord>>;

    /// Bulk-rewrites the keys of one sibling group, used when midpoint
    /// allocation is exhausted.
    fn resequence(
        &mut self,
        project_id: &str,
        parent_id: Option<&str>,
        assignments: &[(String, i64)],
    ) -> Result<()>;

    // ── images ─────────────────────────────────────────────────────────

    fn add_image_record(&mut self, note_id: &str, url: &str, position: i32) -> Result<NoteImage>;

    fn remove_image_record(&mut self, image_id: &str) -> Result<()>;

    // ── projects ───────────────────────────────────────────────────────

    /// Live (non-deleted) projects for a user, most recently modified first.
    /// Callers rely on the ordering: the first entry is the project loaded
    /// on startup and the fallback after the current project is deleted.
    fn list_projects(&self, user_id: &str) -> Result<Vec<Project>>;

    fn create_project(&mut self, user_id: &str, title: &str) -> Result<Project>;

    fn update_project_title(&mut self, project_id: &str, title: &str) -> Result<()>;

    /// Soft-deletes a project; its notes stay in place but the project
    /// disappears from listings.
    fn delete_project(&mut self, project_id: &str) -> Result<()>;
}
