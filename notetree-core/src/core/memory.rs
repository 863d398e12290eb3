//! In-memory reference implementation of the persistence port.
//!
//! Mirrors the backend's flat tables (`notes`, `note_sequences`,
//! `note_images`, `settings`) with plain maps. Used as the test backend
//! throughout the crate and as a template for real implementations.
//!
//! `fail_next_call` arms a one-shot failure so tests can prove that a failed
//! persistence call leaves the in-memory forest untouched.

use crate::{NoteImage, NoteRecord, NoteRow, NotetreeError, Persistence, Project, Result, SequenceRecord};
use std::cell::Cell;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct SequenceRow {
    project_id: String,
    parent_id: Option<String>,
    sequence: i64,
}

/// An in-memory backend holding one user's projects, notes, ordering keys,
/// and image records.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    notes: HashMap<String, NoteRecord>,
    sequences: HashMap<String, SequenceRow>,
    images: HashMap<String, NoteImage>,
    projects: HashMap<String, Project>,
    fail_next: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot failure: the next port call returns
    /// [`NotetreeError::Persistence`] instead of running.
    pub fn fail_next_call(&mut self) {
        self.fail_next.set(true);
    }

    /// Number of stored note rows, across all projects.
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn has_note(&self, note_id: &str) -> bool {
        self.notes.contains_key(note_id)
    }

    pub fn sequence_of(&self, note_id: &str) -> Option<i64> {
        self.sequences.get(note_id).map(|s| s.sequence)
    }

    fn check_failure(&self) -> Result<()> {
        if self.fail_next.take() {
            return Err(NotetreeError::Persistence("injected failure".to_string()));
        }
        Ok(())
    }

    /// Ids of `note_id` and every descendant, via parent-pointer chasing.
    fn subtree_ids(&self, note_id: &str) -> Vec<String> {
        let mut ids = vec![note_id.to_string()];
        let mut i = 0;
        while i < ids.len() {
            let current = ids[i].clone();
            for (id, rec) in &self.notes {
                if rec.parent_id.as_deref() == Some(current.as_str()) {
                    ids.push(id.clone());
                }
            }
            i += 1;
        }
        ids
    }
}

impl Persistence for MemoryBackend {
    fn create_note(&mut self, record: &NoteRecord) -> Result<()> {
        self.check_failure()?;
        self.notes.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn update_note_content(&mut self, note_id: &str, content: &str) -> Result<()> {
        self.check_failure()?;
        let rec = self
            .notes
            .get_mut(note_id)
            .ok_or_else(|| NotetreeError::Persistence(format!("no note row {note_id}")))?;
        rec.content = content.to_string();
        Ok(())
    }

    fn update_note_flag(&mut self, note_id: &str, is_discussion: bool) -> Result<()> {
        self.check_failure()?;
        let rec = self
            .notes
            .get_mut(note_id)
            .ok_or_else(|| NotetreeError::Persistence(format!("no note row {note_id}")))?;
        rec.is_discussion = is_discussion;
        Ok(())
    }

    fn delete_note_subtree(&mut self, note_id: &str) -> Result<()> {
        self.check_failure()?;
        for id in self.subtree_ids(note_id) {
            self.notes.remove(&id);
            self.sequences.remove(&id);
            self.images.retain(|_, img| img.note_id != id);
        }
        Ok(())
    }

    fn reparent_note(
        &mut self,
        note_id: &str,
        new_parent_id: Option<&str>,
        sequence: i64,
    ) -> Result<()> {
        self.check_failure()?;
        let rec = self
            .notes
            .get_mut(note_id)
            .ok_or_else(|| NotetreeError::Persistence(format!("no note row {note_id}")))?;
        rec.parent_id = new_parent_id.map(str::to_string);
        let project_id = rec.project_id.clone();
        let seq = self
            .sequences
            .entry(note_id.to_string())
            .or_insert_with(|| SequenceRow {
                project_id,
                parent_id: None,
                sequence: 0,
            });
        seq.parent_id = new_parent_id.map(str::to_string);
        seq.sequence = sequence;
        Ok(())
    }

    fn fetch_forest(&self, project_id: &str) -> Result<Vec<NoteRow>> {
        self.check_failure()?;
        let rows = self
            .notes
            .values()
            .filter(|rec| rec.project_id == project_id)
            .map(|rec| {
                let mut images: Vec<NoteImage> = self
                    .images
                    .values()
                    .filter(|img| img.note_id == rec.id)
                    .cloned()
                    .collect();
                images.sort_by_key(|img| img.position);
                NoteRow {
                    id: rec.id.clone(),
                    parent_id: rec.parent_id.clone(),
                    content: rec.content.clone(),
                    is_discussion: rec.is_discussion,
                    sequence: self.sequences.get(&rec.id).map(|s| s.sequence),
                    images,
                    project_id: rec.project_id.clone(),
                    user_id: rec.user_id.clone(),
                }
            })
            .collect();
        Ok(rows)
    }

    fn set_sequence(
        &mut self,
        project_id: &str,
        note_id: &str,
        parent_id: Option<&str>,
        sequence: i64,
    ) -> Result<()> {
        self.check_failure()?;
        self.sequences.insert(
            note_id.to_string(),
            SequenceRow {
                project_id: project_id.to_string(),
                parent_id: parent_id.map(str::to_string),
                sequence,
            },
        );
        Ok(())
    }

    fn sibling_sequences(
        &self,
        project_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<SequenceRecord>> {
        self.check_failure()?;
        let mut records: Vec<SequenceRecord> = self
            .sequences
            .iter()
            .filter(|(_, row)| {
                row.project_id == project_id && row.parent_id.as_deref() == parent_id
            })
            .map(|(note_id, row)| SequenceRecord {
                note_id: note_id.clone(),
                sequence: row.sequence,
            })
            .collect();
        records.sort_by_key(|r| r.sequence);
        Ok(records)
    }

    fn resequence(
        &mut self,
        project_id: &str,
        parent_id: Option<&str>,
        assignments: &[(String, i64)],
    ) -> Result<()> {
        self.check_failure()?;
        for (note_id, sequence) in assignments {
            self.sequences.insert(
                note_id.clone(),
                SequenceRow {
                    project_id: project_id.to_string(),
                    parent_id: parent_id.map(str::to_string),
                    sequence: *sequence,
                },
            );
        }
        Ok(())
    }

    fn add_image_record(&mut self, note_id: &str, url: &str, position: i32) -> Result<NoteImage> {
        self.check_failure()?;
        if !self.notes.contains_key(note_id) {
            return Err(NotetreeError::Persistence(format!("no note row {note_id}")));
        }
        let image = NoteImage {
            id: Uuid::new_v4().to_string(),
            note_id: note_id.to_string(),
            url: url.to_string(),
            position,
        };
        self.images.insert(image.id.clone(), image.clone());
        Ok(image)
    }

    fn remove_image_record(&mut self, image_id: &str) -> Result<()> {
        self.check_failure()?;
        self.images.remove(image_id);
        Ok(())
    }

    fn list_projects(&self, user_id: &str) -> Result<Vec<Project>> {
        self.check_failure()?;
        let mut projects: Vec<Project> = self
            .projects
            .values()
            .filter(|p| p.user_id == user_id && p.deleted_at.is_none())
            .cloned()
            .collect();
        // Most recently modified first, matching the backend listing order.
        projects.sort_by(|a, b| b.last_modified_at.cmp(&a.last_modified_at));
        Ok(projects)
    }

    fn create_project(&mut self, user_id: &str, title: &str) -> Result<Project> {
        self.check_failure()?;
        let now = chrono::Utc::now().timestamp();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: String::new(),
            user_id: user_id.to_string(),
            note_count: 0,
            created_at: now,
            last_modified_at: now,
            deleted_at: None,
        };
        self.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project_title(&mut self, project_id: &str, title: &str) -> Result<()> {
        self.check_failure()?;
        let project = self
            .projects
            .get_mut(project_id)
            .ok_or_else(|| NotetreeError::Persistence(format!("no project row {project_id}")))?;
        project.title = title.to_string();
        project.last_modified_at = chrono::Utc::now().timestamp();
        Ok(())
    }

    fn delete_project(&mut self, project_id: &str) -> Result<()> {
        self.check_failure()?;
        let project = self
            .projects
            .get_mut(project_id)
            .ok_or_else(|| NotetreeError::Persistence(format!("no project row {project_id}")))?;
        project.deleted_at = Some(chrono::Utc::now().timestamp());
        Ok(())
    }
}
