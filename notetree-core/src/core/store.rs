//! High-level note and project operations over a persistence port.

use crate::core::tree;
use crate::{
    format_as_text, unique_title, validate_title, Note, NoteImage, NoteRecord, NoteRow,
    NotetreeError, OutlineView, Persistence, Project, Result, UndoAction, UndoCommand,
};
use crate::{allocate_sequence, spread_keys, SEQUENCE_BASE, SEQUENCE_GAP};
use log::warn;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// The mutation orchestrator: owns the in-memory note forest for the current
/// project and mirrors every change to the backend through a [`Persistence`]
/// port.
///
/// Each operation validates its inputs first, persists the change, and only
/// on success applies the equivalent transformation to the in-memory tree —
/// a failed persistence call leaves the forest untouched and surfaces the
/// error to the caller. The forest is mutated by exactly one owner (`&mut
/// self`), so observers never see a note in neither or both locations during
/// a move.
pub struct NoteStore<P: Persistence> {
    port: P,
    user_id: String,
    notes: Vec<Note>,
    view: OutlineView,
    undo_stack: Vec<UndoCommand>,
    can_undo: bool,
    is_edit_mode: bool,
    projects: Vec<Project>,
    current_project: Option<String>,
    title: String,
}

impl<P: Persistence> NoteStore<P> {
    /// Creates a store with no project loaded. Call [`Self::load`] to resolve
    /// (or create) the user's projects and populate the forest.
    pub fn new(port: P, user_id: &str) -> Self {
        Self {
            port,
            user_id: user_id.to_string(),
            notes: Vec::new(),
            view: OutlineView::new(),
            undo_stack: Vec::new(),
            can_undo: false,
            is_edit_mode: false,
            projects: Vec::new(),
            current_project: None,
            title: String::new(),
        }
    }

    // ── accessors ──────────────────────────────────────────────────────

    /// Root-level notes of the current project, in display order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_project(&self) -> Option<&str> {
        self.current_project.as_deref()
    }

    /// Title of the current project.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn can_undo(&self) -> bool {
        self.can_undo
    }

    pub fn is_edit_mode(&self) -> bool {
        self.is_edit_mode
    }

    /// The derived expand/collapse view state.
    pub fn view(&self) -> &OutlineView {
        &self.view
    }

    /// The underlying persistence port.
    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    // ── project lifecycle ──────────────────────────────────────────────

    /// Resolves the user's projects and loads the most recently modified one.
    /// First-time users get a fresh "New Project" so there is always at
    /// least one project.
    ///
    /// # Errors
    ///
    /// Returns [`NotetreeError::Persistence`] if any backend call fails.
    pub fn load(&mut self) -> Result<()> {
        let projects = self.port.list_projects(&self.user_id)?;
        let first_id = match projects.first() {
            Some(project) => project.id.clone(),
            None => self.port.create_project(&self.user_id, "New Project")?.id,
        };
        self.switch_project(&first_id)
    }

    /// Makes `project_id` the current project and replaces the forest with
    /// its assembled note tree. Transient state (expansion, undo history,
    /// edit mode) is reset — it refers to the previous forest.
    ///
    /// # Errors
    ///
    /// Returns [`NotetreeError::ProjectNotFound`] if `project_id` is not one
    /// of the user's live projects.
    pub fn switch_project(&mut self, project_id: &str) -> Result<()> {
        let projects = self.port.list_projects(&self.user_id)?;
        let project = projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| NotetreeError::ProjectNotFound(project_id.to_string()))?;

        let rows = self.port.fetch_forest(project_id)?;

        self.title = project.title.clone();
        self.current_project = Some(project.id.clone());
        self.projects = projects;
        self.notes = assemble_forest(rows);
        self.view.reset();
        self.undo_stack.clear();
        self.can_undo = false;
        self.is_edit_mode = false;
        Ok(())
    }

    /// Refreshes the local project list from the backend.
    pub fn load_projects(&mut self) -> Result<()> {
        self.projects = self.port.list_projects(&self.user_id)?;
        Ok(())
    }

    /// Creates a project with a validated, unique title and switches to it.
    ///
    /// # Errors
    ///
    /// Returns [`NotetreeError::ValidationFailed`] for format violations and
    /// duplicate titles; nothing is created on a validation failure.
    pub fn create_project(&mut self, title: &str) -> Result<Project> {
        let trimmed = validate_title(title)?;
        let projects = self.port.list_projects(&self.user_id)?;
        if projects.iter().any(|p| p.title == trimmed) {
            return Err(NotetreeError::ValidationFailed(
                "A project with this title already exists".to_string(),
            ));
        }
        let project = self.port.create_project(&self.user_id, &trimmed)?;
        self.switch_project(&project.id)?;
        Ok(project)
    }

    /// Renames the current project after validating and checking uniqueness
    /// among the user's live projects.
    ///
    /// # Errors
    ///
    /// Returns [`NotetreeError::NoActiveProject`] with no project loaded, or
    /// [`NotetreeError::ValidationFailed`] for format violations and
    /// duplicate titles. Validation runs before any write.
    pub fn update_title(&mut self, title: &str) -> Result<()> {
        let project_id = self
            .current_project
            .clone()
            .ok_or(NotetreeError::NoActiveProject)?;
        let trimmed = validate_title(title)?;

        let projects = self.port.list_projects(&self.user_id)?;
        if projects.iter().any(|p| p.id != project_id && p.title == trimmed) {
            return Err(NotetreeError::ValidationFailed(
                "A project with this title already exists".to_string(),
            ));
        }

        self.port.update_project_title(&project_id, &trimmed)?;

        self.title = trimmed.clone();
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) {
            project.title = trimmed;
        }
        Ok(())
    }

    /// Soft-deletes a project. When the current project is deleted the store
    /// switches to the most recently modified remaining project, creating a
    /// fresh "New Project" if none remain — the user always has at least one.
    pub fn delete_project(&mut self, project_id: &str) -> Result<()> {
        self.port.delete_project(project_id)?;

        let was_current = self.current_project.as_deref() == Some(project_id);
        let remaining = self.port.list_projects(&self.user_id)?;

        if was_current {
            let next_id = match remaining.first() {
                Some(project) => project.id.clone(),
                None => self.port.create_project(&self.user_id, "New Project")?.id,
            };
            self.switch_project(&next_id)?;
        } else {
            self.projects = remaining;
        }
        Ok(())
    }

    /// Deep-copies a project: fresh project row, every note cloned under a
    /// new id with parent pointers remapped, sequence and image records
    /// carried over. Switches to the copy and returns it.
    ///
    /// The copy's title is derived from the source (`"Trip (Copy)"`, then
    /// `"Trip (Copy) (2)"`, …) to stay unique per user.
    pub fn copy_project(&mut self, project_id: &str) -> Result<Project> {
        let projects = self.port.list_projects(&self.user_id)?;
        let source = projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| NotetreeError::ProjectNotFound(project_id.to_string()))?;

        let title = unique_title(&format!("{} (Copy)", source.title), &projects);
        let copy = self.port.create_project(&self.user_id, &title)?;

        let rows = self.port.fetch_forest(project_id)?;
        let id_map: HashMap<String, String> = rows
            .iter()
            .map(|row| (row.id.clone(), Uuid::new_v4().to_string()))
            .collect();

        for row in &rows {
            let new_id = id_map[&row.id].clone();
            // Parent pointers outside the project (corrupt rows) fall back
            // to root level, matching forest assembly.
            let new_parent = row
                .parent_id
                .as_ref()
                .and_then(|pid| id_map.get(pid).cloned());
            self.port.create_note(&NoteRecord {
                id: new_id.clone(),
                content: row.content.clone(),
                parent_id: new_parent.clone(),
                project_id: copy.id.clone(),
                user_id: self.user_id.clone(),
                is_discussion: row.is_discussion,
            })?;
            self.port.set_sequence(
                &copy.id,
                &new_id,
                new_parent.as_deref(),
                row.sequence.unwrap_or(0),
            )?;
            for image in &row.images {
                self.port
                    .add_image_record(&new_id, &image.url, image.position)?;
            }
        }

        self.switch_project(&copy.id)?;
        Ok(copy)
    }

    // ── note operations ────────────────────────────────────────────────

    /// Creates an empty note under `parent_id` (root level when `None`),
    /// appended after the parent's current children, and opens it for
    /// editing. Returns a clone of the inserted note.
    ///
    /// The note record and its ordering record are persisted before the
    /// local insert; if the ordering insert fails the note record is deleted
    /// best-effort so the backend is not left with an unordered note.
    ///
    /// # Errors
    ///
    /// Returns [`NotetreeError::NoActiveProject`] with no project loaded,
    /// [`NotetreeError::ParentNotFound`] if `parent_id` does not resolve, or
    /// [`NotetreeError::Persistence`] for backend failures.
    pub fn add_note(&mut self, parent_id: Option<&str>) -> Result<Note> {
        let project_id = self
            .current_project
            .clone()
            .ok_or(NotetreeError::NoActiveProject)?;
        if let Some(pid) = parent_id {
            if tree::find_note(&self.notes, pid).is_none() {
                return Err(NotetreeError::ParentNotFound(pid.to_string()));
            }
        }

        // Append: one past the last sibling key.
        let siblings = self.port.sibling_sequences(&project_id, parent_id)?;
        let sequence = match siblings.last() {
            Some(last) => last.sequence + SEQUENCE_GAP,
            None => SEQUENCE_BASE,
        };

        let note_id = Uuid::new_v4().to_string();
        self.port.create_note(&NoteRecord {
            id: note_id.clone(),
            content: String::new(),
            parent_id: parent_id.map(str::to_string),
            project_id: project_id.clone(),
            user_id: self.user_id.clone(),
            is_discussion: false,
        })?;

        if let Err(e) = self
            .port
            .set_sequence(&project_id, &note_id, parent_id, sequence)
        {
            // Best-effort cleanup of the half-created note; the original
            // error is the one that matters to the caller.
            if let Err(cleanup) = self.port.delete_note_subtree(&note_id) {
                warn!("failed to clean up note {note_id} after sequence insert error: {cleanup}");
            }
            return Err(e);
        }

        let note = Note::new_empty(note_id, project_id, self.user_id.clone());
        match parent_id {
            None => self.notes.push(note.clone()),
            Some(pid) => {
                // Existence was validated above; the forest has not changed since.
                if let Some(parent) = tree::find_note_mut(&mut self.notes, pid) {
                    parent.children.push(note.clone());
                }
            }
        }
        self.is_edit_mode = true;
        Ok(note)
    }

    /// Stages `content` as the note's draft. No network call — drafts are
    /// committed by [`Self::save_note`]. Pushes an undo command capturing the
    /// previous committed content.
    pub fn update_note(&mut self, note_id: &str, content: &str) -> Result<()> {
        let previous = tree::find_note(&self.notes, note_id)
            .ok_or_else(|| NotetreeError::NoteNotFound(note_id.to_string()))?
            .content
            .clone();

        self.undo_stack
            .push(UndoCommand::restore_content(note_id, previous));
        self.can_undo = true;

        if let Some(note) = tree::find_note_mut(&mut self.notes, note_id) {
            note.unsaved_content = Some(content.to_string());
        }
        Ok(())
    }

    /// Commits the note's draft and closes the editor.
    ///
    /// Special rule: a note whose trimmed draft and committed content are
    /// both empty is deleted instead of saved — an empty leaf note is never
    /// persisted. A note with no draft (or an empty draft over non-empty
    /// committed content) just closes the editor without a network call.
    pub fn save_note(&mut self, note_id: &str) -> Result<()> {
        let (committed, draft) = {
            let note = tree::find_note(&self.notes, note_id)
                .ok_or_else(|| NotetreeError::NoteNotFound(note_id.to_string()))?;
            (note.content.clone(), note.unsaved_content.clone())
        };

        let draft_empty = draft.as_deref().is_none_or(|d| d.trim().is_empty());
        if draft_empty && committed.trim().is_empty() {
            self.port.delete_note_subtree(note_id)?;
            tree::remove_note(&mut self.notes, note_id);
            self.is_edit_mode = false;
            return Ok(());
        }

        if let Some(draft) = draft.filter(|d| !d.trim().is_empty()) {
            self.port.update_note_content(note_id, &draft)?;
            if let Some(note) = tree::find_note_mut(&mut self.notes, note_id) {
                note.content = draft;
                note.unsaved_content = None;
                note.is_editing = false;
            }
        } else if let Some(note) = tree::find_note_mut(&mut self.notes, note_id) {
            note.unsaved_content = None;
            note.is_editing = false;
        }
        self.is_edit_mode = false;
        Ok(())
    }

    /// Deletes the note and its entire subtree. The backend cascades; the
    /// client issues exactly one delete call and one local removal.
    pub fn delete_note(&mut self, note_id: &str) -> Result<()> {
        if tree::find_note(&self.notes, note_id).is_none() {
            return Err(NotetreeError::NoteNotFound(note_id.to_string()));
        }
        self.port.delete_note_subtree(note_id)?;
        tree::remove_note(&mut self.notes, note_id);
        Ok(())
    }

    /// Moves a note (with its subtree) to position `index` under
    /// `new_parent_id`, allocating a fresh ordering key against the
    /// destination's sibling keys. When midpoint allocation is exhausted the
    /// destination group is re-sequenced with evenly spaced keys and the
    /// allocation retried.
    ///
    /// # Errors
    ///
    /// Returns [`NotetreeError::InvalidMove`] if the destination is the note
    /// itself or inside its subtree, [`NotetreeError::NoteNotFound`] /
    /// [`NotetreeError::ParentNotFound`] for unresolved ids, and
    /// [`NotetreeError::Persistence`] for backend failures (the forest is
    /// unchanged in every error case).
    pub fn move_note(
        &mut self,
        note_id: &str,
        new_parent_id: Option<&str>,
        index: usize,
    ) -> Result<()> {
        // 1. Self-move check
        if new_parent_id == Some(note_id) {
            return Err(NotetreeError::InvalidMove(
                "A note cannot be its own parent".to_string(),
            ));
        }

        // 2. Cycle check: the destination must not lie inside the subtree
        let note = tree::find_note(&self.notes, note_id)
            .ok_or_else(|| NotetreeError::NoteNotFound(note_id.to_string()))?;
        if let Some(pid) = new_parent_id {
            if tree::is_descendant(note, pid) {
                return Err(NotetreeError::InvalidMove(
                    "Move would create a cycle".to_string(),
                ));
            }
            if tree::find_note(&self.notes, pid).is_none() {
                return Err(NotetreeError::ParentNotFound(pid.to_string()));
            }
        }

        let project_id = self
            .current_project
            .clone()
            .ok_or(NotetreeError::NoActiveProject)?;

        // 3. Allocate an ordering key against the destination sibling group
        let siblings = self.port.sibling_sequences(&project_id, new_parent_id)?;
        let keys: Vec<i64> = siblings.iter().map(|s| s.sequence).collect();
        let sequence = match allocate_sequence(&keys, index) {
            Ok(seq) => seq,
            Err(NotetreeError::AllocationExhausted) => {
                // The gap between the neighbors is gone: rewrite the whole
                // group with fresh evenly spaced keys, then retry once.
                let fresh = spread_keys(siblings.len());
                let assignments: Vec<(String, i64)> = siblings
                    .iter()
                    .zip(fresh.iter())
                    .map(|(s, k)| (s.note_id.clone(), *k))
                    .collect();
                self.port
                    .resequence(&project_id, new_parent_id, &assignments)?;
                allocate_sequence(&fresh, index)?
            }
            Err(e) => return Err(e),
        };

        // 4. Persist the reparent, then relocate locally in one step
        self.port.reparent_note(note_id, new_parent_id, sequence)?;

        let moved = tree::remove_note(&mut self.notes, note_id)
            .ok_or_else(|| NotetreeError::NoteNotFound(note_id.to_string()))?;
        tree::insert_at(&mut self.notes, new_parent_id, index, moved)?;
        Ok(())
    }

    /// Opens or closes the inline editor for a note. Opening seeds the draft
    /// from the committed content so the editor never starts blank on an
    /// existing note. Local state only.
    pub fn toggle_edit(&mut self, note_id: &str) -> Result<()> {
        let note = tree::find_note_mut(&mut self.notes, note_id)
            .ok_or_else(|| NotetreeError::NoteNotFound(note_id.to_string()))?;
        note.is_editing = !note.is_editing;
        if note.is_editing && note.unsaved_content.is_none() {
            note.unsaved_content = Some(note.content.clone());
        }
        self.is_edit_mode = note.is_editing;
        Ok(())
    }

    pub fn set_edit_mode(&mut self, editing: bool) {
        self.is_edit_mode = editing;
    }

    /// Persists and applies the discussion flag, pushing an undo command
    /// that re-applies the negated value.
    pub fn toggle_discussion(&mut self, note_id: &str, value: bool) -> Result<()> {
        if tree::find_note(&self.notes, note_id).is_none() {
            return Err(NotetreeError::NoteNotFound(note_id.to_string()));
        }
        self.port.update_note_flag(note_id, value)?;

        if let Some(note) = tree::find_note_mut(&mut self.notes, note_id) {
            note.is_discussion = value;
        }
        self.undo_stack
            .push(UndoCommand::set_discussion(note_id, !value));
        self.can_undo = true;
        Ok(())
    }

    // ── undo ───────────────────────────────────────────────────────────

    /// Pops the most recent undo command and applies its inverse by
    /// re-entering the corresponding operation (which persists the inverse
    /// and may itself push fresh commands). A failed inverse surfaces the
    /// same error type as the operation it reverts.
    ///
    /// `can_undo` becomes `stack.len() > 1` after the pop — deliberately as
    /// documented, even though it reads false with one command remaining.
    pub fn undo(&mut self) -> Result<()> {
        let Some(command) = self.undo_stack.pop() else {
            return Ok(());
        };
        match command.action {
            UndoAction::RestoreContent { note_id, content } => {
                self.update_note(&note_id, &content)?;
                self.save_note(&note_id)?;
            }
            UndoAction::SetDiscussion { note_id, value } => {
                self.toggle_discussion(&note_id, value)?;
            }
        }
        self.can_undo = self.undo_stack.len() > 1;
        Ok(())
    }

    // ── images ─────────────────────────────────────────────────────────

    /// Attaches an image record at the end of the note's image list. The
    /// binary itself lives in the backend's storage; only the record crosses
    /// this boundary.
    pub fn add_image(&mut self, note_id: &str, url: &str) -> Result<NoteImage> {
        let position = tree::find_note(&self.notes, note_id)
            .ok_or_else(|| NotetreeError::NoteNotFound(note_id.to_string()))?
            .images
            .len() as i32;
        let image = self.port.add_image_record(note_id, url, position)?;
        if let Some(note) = tree::find_note_mut(&mut self.notes, note_id) {
            note.images.push(image.clone());
        }
        Ok(image)
    }

    /// Removes an image record; the note keeps its remaining images in order.
    pub fn remove_image(&mut self, note_id: &str, image_id: &str) -> Result<()> {
        if tree::find_note(&self.notes, note_id).is_none() {
            return Err(NotetreeError::NoteNotFound(note_id.to_string()));
        }
        self.port.remove_image_record(image_id)?;
        if let Some(note) = tree::find_note_mut(&mut self.notes, note_id) {
            note.images.retain(|img| img.id != image_id);
        }
        Ok(())
    }

    // ── view ───────────────────────────────────────────────────────────

    pub fn set_current_level(&mut self, level: i64) {
        self.view.set_level(&self.notes, level);
    }

    pub fn expand_one_level(&mut self) {
        self.view.expand_one(&self.notes);
    }

    pub fn collapse_one_level(&mut self) {
        self.view.collapse_one(&self.notes);
    }

    /// Plain-text outline of the current project, honoring expansion state.
    pub fn print_notes(&self) -> String {
        format_as_text(&self.notes, self.view.expanded())
    }
}

/// Assembles a flat note listing into a forest.
///
/// Rows are grouped by `parent_id` (`None` = root) and each group is sorted
/// ascending by ordering key (missing keys sort as 0); images are sorted by
/// position. Rows referencing an unknown parent are kept as root-level
/// orphans with a warning — a recoverable inconsistency, not a fatal error.
pub fn assemble_forest(rows: Vec<NoteRow>) -> Vec<Note> {
    let mut rows = rows;
    rows.sort_by_key(|row| row.sequence.unwrap_or(0));

    let known: HashSet<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    let mut roots: Vec<String> = Vec::new();
    let mut nodes: HashMap<String, Note> = HashMap::new();

    for row in rows {
        match &row.parent_id {
            Some(pid) if known.contains(pid) => {
                children.entry(pid.clone()).or_default().push(row.id.clone());
            }
            Some(pid) => {
                warn!("note {} references missing parent {pid}; keeping at root level", row.id);
                roots.push(row.id.clone());
            }
            None => roots.push(row.id.clone()),
        }

        let mut images = row.images;
        images.sort_by_key(|img| img.position);
        nodes.insert(
            row.id.clone(),
            Note {
                id: row.id,
                content: row.content,
                unsaved_content: None,
                children: Vec::new(),
                is_editing: false,
                is_discussion: row.is_discussion,
                images,
                project_id: row.project_id,
                user_id: row.user_id,
            },
        );
    }

    fn build(
        id: &str,
        nodes: &mut HashMap<String, Note>,
        children: &HashMap<String, Vec<String>>,
    ) -> Option<Note> {
        let mut note = nodes.remove(id)?;
        if let Some(child_ids) = children.get(id) {
            for child_id in child_ids {
                if let Some(child) = build(child_id, nodes, children) {
                    note.children.push(child);
                }
            }
        }
        Some(note)
    }

    roots
        .iter()
        .filter_map(|id| build(id, &mut nodes, &children))
        .collect()
}
