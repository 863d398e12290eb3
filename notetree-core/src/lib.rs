//! Core library for Notetree — a hierarchical note-taking client that mirrors
//! a remote backend.
//!
//! The primary entry point is [`NoteStore`], which owns the in-memory note
//! forest for the current project and applies every mutation through a
//! [`Persistence`] port. The port is the only boundary to the backend; all
//! tree logic is pure and synchronous.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    error::{NotetreeError, Result},
    export::format_as_text,
    memory::MemoryBackend,
    note::{Note, NoteImage},
    port::{NoteRecord, NoteRow, Persistence, SequenceRecord},
    project::{unique_title, validate_title, Project},
    sequence::{allocate_sequence, spread_keys, SEQUENCE_BASE, SEQUENCE_GAP},
    store::NoteStore,
    undo::{UndoAction, UndoCommand},
    visibility::OutlineView,
};
