//! Internal domain modules for the Notetree core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod error;
pub mod export;
pub mod memory;
pub mod note;
pub mod port;
pub mod project;
pub mod sequence;
pub mod store;
pub mod tree;
pub mod undo;
pub mod visibility;

#[doc(inline)]
pub use error::{NotetreeError, Result};
#[doc(inline)]
pub use export::format_as_text;
#[doc(inline)]
pub use memory::MemoryBackend;
#[doc(inline)]
pub use note::{Note, NoteImage};
#[doc(inline)]
pub use port::{NoteRecord, NoteRow, Persistence, SequenceRecord};
#[doc(inline)]
pub use project::{unique_title, validate_title, Project};
#[doc(inline)]
pub use store::NoteStore;
#[doc(inline)]
pub use undo::{UndoAction, UndoCommand};
#[doc(inline)]
pub use visibility::OutlineView;
