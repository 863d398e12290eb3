//! Pure, synchronous operations over the in-memory note forest.
//!
//! No I/O happens here; every function works on a root-level `Vec<Note>` (a
//! forest) or a single subtree. The structure is a strict forest: a note id
//! appears at most once and no note is its own ancestor — the mutation
//! orchestrator's validation keeps it that way.

use crate::{Note, NotetreeError, Result};

/// Depth-first search for a note by id. Returns the first match.
pub fn find_note<'a>(notes: &'a [Note], id: &str) -> Option<&'a Note> {
    for note in notes {
        if note.id == id {
            return Some(note);
        }
        if let Some(found) = find_note(&note.children, id) {
            return Some(found);
        }
    }
    None
}

/// Mutable variant of [`find_note`].
pub fn find_note_mut<'a>(notes: &'a mut [Note], id: &str) -> Option<&'a mut Note> {
    for note in notes {
        if note.id == id {
            return Some(note);
        }
        if let Some(found) = find_note_mut(&mut note.children, id) {
            return Some(found);
        }
    }
    None
}

/// Excises the note matching `id` from wherever it occurs, preserving the
/// order of remaining siblings, and returns it with its subtree intact.
///
/// Returns `None` (forest untouched) when the id does not occur.
pub fn remove_note(notes: &mut Vec<Note>, id: &str) -> Option<Note> {
    if let Some(i) = notes.iter().position(|n| n.id == id) {
        return Some(notes.remove(i));
    }
    for note in notes.iter_mut() {
        if let Some(removed) = remove_note(&mut note.children, id) {
            return Some(removed);
        }
    }
    None
}

/// Inserts `note` at position `index` among the children of `parent_id`, or
/// in the root list when `parent_id` is `None`. `index` is clamped to
/// `[0, sibling_count]`.
///
/// # Errors
///
/// Returns [`NotetreeError::ParentNotFound`] when `parent_id` does not
/// resolve; the forest is left unchanged in that case.
pub fn insert_at(
    notes: &mut Vec<Note>,
    parent_id: Option<&str>,
    index: usize,
    note: Note,
) -> Result<()> {
    match parent_id {
        None => {
            let index = index.min(notes.len());
            notes.insert(index, note);
            Ok(())
        }
        Some(pid) => match find_note_mut(notes, pid) {
            Some(parent) => {
                let index = index.min(parent.children.len());
                parent.children.insert(index, note);
                Ok(())
            }
            None => Err(NotetreeError::ParentNotFound(pid.to_string())),
        },
    }
}

/// Returns true when `id` occurs anywhere inside `ancestor`'s subtree
/// (excluding `ancestor` itself). Used to forbid moving a note into its
/// own subtree.
pub fn is_descendant(ancestor: &Note, id: &str) -> bool {
    ancestor
        .children
        .iter()
        .any(|child| child.id == id || is_descendant(child, id))
}

/// Maximum root-to-leaf edge count in the forest. A forest with no nested
/// children has depth 0.
pub fn max_depth(notes: &[Note]) -> usize {
    notes
        .iter()
        .filter(|n| !n.children.is_empty())
        .map(|n| 1 + max_depth(&n.children))
        .max()
        .unwrap_or(0)
}

/// Collects every note id in the forest, depth-first.
pub fn collect_ids(notes: &[Note], out: &mut Vec<String>) {
    for note in notes {
        out.push(note.id.clone());
        collect_ids(&note.children, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> Note {
        let mut n = Note::new_empty(id.to_string(), "p1".to_string(), "u1".to_string());
        n.is_editing = false;
        n.unsaved_content = None;
        n.content = id.to_string();
        n
    }

    fn branch(id: &str, children: Vec<Note>) -> Note {
        let mut n = leaf(id);
        n.children = children;
        n
    }

    /// a ── b ── c
    /// d
    fn sample_forest() -> Vec<Note> {
        vec![branch("a", vec![branch("b", vec![leaf("c")])]), leaf("d")]
    }

    #[test]
    fn test_find_note_nested() {
        let forest = sample_forest();
        assert_eq!(find_note(&forest, "c").unwrap().id, "c");
        assert!(find_note(&forest, "missing").is_none());
    }

    #[test]
    fn test_remove_note_keeps_sibling_order() {
        let mut forest = vec![leaf("a"), leaf("b"), leaf("c")];
        let removed = remove_note(&mut forest, "b").unwrap();
        assert_eq!(removed.id, "b");
        let ids: Vec<&str> = forest.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_remove_note_takes_subtree_along() {
        let mut forest = sample_forest();
        let removed = remove_note(&mut forest, "b").unwrap();
        assert_eq!(removed.children[0].id, "c");
        assert!(find_note(&forest, "c").is_none());
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut forest = sample_forest();
        assert!(remove_note(&mut forest, "zz").is_none());
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_insert_at_clamps_index() {
        let mut forest = vec![leaf("a")];
        insert_at(&mut forest, None, 99, leaf("b")).unwrap();
        assert_eq!(forest[1].id, "b");

        insert_at(&mut forest, Some("a"), 99, leaf("c")).unwrap();
        assert_eq!(find_note(&forest, "a").unwrap().children[0].id, "c");
    }

    #[test]
    fn test_insert_at_unknown_parent_errors() {
        let mut forest = vec![leaf("a")];
        let err = insert_at(&mut forest, Some("zz"), 0, leaf("b")).unwrap_err();
        assert!(matches!(err, NotetreeError::ParentNotFound(_)));
        assert_eq!(forest.len(), 1, "forest must be unchanged on error");
    }

    #[test]
    fn test_is_descendant() {
        let forest = sample_forest();
        let a = find_note(&forest, "a").unwrap();
        assert!(is_descendant(a, "b"));
        assert!(is_descendant(a, "c"));
        assert!(!is_descendant(a, "a"), "a node is not its own descendant");
        assert!(!is_descendant(a, "d"));
    }

    #[test]
    fn test_max_depth() {
        assert_eq!(max_depth(&[]), 0);
        assert_eq!(max_depth(&[leaf("a"), leaf("b")]), 0);
        assert_eq!(max_depth(&sample_forest()), 2);
    }
}
