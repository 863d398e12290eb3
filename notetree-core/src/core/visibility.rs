//! Expand/collapse depth derivation for the note outline.

use crate::core::tree;
use crate::Note;
use std::collections::HashSet;

/// Derived view state: which notes are expanded at the current outline level.
///
/// The controller is recomputed from the live forest on every level change
/// rather than patched incrementally — the tree may have grown or shrunk
/// since the level was last set, and trees are small enough (hundreds of
/// notes) that a full walk is cheap.
#[derive(Debug, Default)]
pub struct OutlineView {
    expanded: HashSet<String>,
    current_level: usize,
    can_expand_more: bool,
    can_collapse_more: bool,
}

impl OutlineView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ids of notes whose children are currently shown. Notes without
    /// children are never tracked here.
    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn can_expand_more(&self) -> bool {
        self.can_expand_more
    }

    pub fn can_collapse_more(&self) -> bool {
        self.can_collapse_more
    }

    /// Sets the outline level, clamping to `[0, max_depth]` against the live
    /// forest, and rebuilds the expanded set: a note with children is
    /// expanded iff its depth (roots at 0) is strictly below the level.
    pub fn set_level(&mut self, notes: &[Note], level: i64) {
        let depth = tree::max_depth(notes);
        let level = level.clamp(0, depth as i64) as usize;

        let mut expanded = std::mem::take(&mut self.expanded);
        mark_expanded(notes, 0, level, &mut expanded);
        self.expanded = expanded;

        self.current_level = level;
        self.can_expand_more = level < depth;
        self.can_collapse_more = level > 0;
    }

    /// Equivalent to `set_level(current + 1)`; a no-op at max depth.
    pub fn expand_one(&mut self, notes: &[Note]) {
        self.set_level(notes, self.current_level as i64 + 1);
    }

    /// Equivalent to `set_level(current - 1)`; a no-op at level 0.
    pub fn collapse_one(&mut self, notes: &[Note]) {
        self.set_level(notes, self.current_level as i64 - 1);
    }

    /// Drops state referring to a forest that is no longer loaded, e.g. on
    /// project switch.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.current_level = 0;
        self.can_expand_more = false;
        self.can_collapse_more = false;
    }
}

fn mark_expanded(notes: &[Note], depth: usize, level: usize, expanded: &mut HashSet<String>) {
    for note in notes {
        if !note.children.is_empty() {
            if depth < level {
                expanded.insert(note.id.clone());
            } else {
                expanded.remove(&note.id);
            }
            mark_expanded(&note.children, depth + 1, level, expanded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, children: Vec<Note>) -> Note {
        let mut n = Note::new_empty(id.to_string(), "p1".to_string(), "u1".to_string());
        n.is_editing = false;
        n.unsaved_content = None;
        n.children = children;
        n
    }

    /// Depth-3 forest: a → b → c → d, plus a childless root e.
    fn deep_forest() -> Vec<Note> {
        vec![
            note("a", vec![note("b", vec![note("c", vec![note("d", vec![])])])]),
            note("e", vec![]),
        ]
    }

    #[test]
    fn test_level_clamps_high() {
        let forest = deep_forest();
        let mut view = OutlineView::new();
        view.set_level(&forest, 10);
        assert_eq!(view.current_level(), 3);
        assert!(!view.can_expand_more());
        assert!(view.can_collapse_more());
    }

    #[test]
    fn test_level_clamps_negative() {
        let forest = deep_forest();
        let mut view = OutlineView::new();
        view.set_level(&forest, -5);
        assert_eq!(view.current_level(), 0);
        assert!(view.can_expand_more());
        assert!(!view.can_collapse_more());
    }

    #[test]
    fn test_expanded_set_tracks_level() {
        let forest = deep_forest();
        let mut view = OutlineView::new();

        view.set_level(&forest, 2);
        assert!(view.is_expanded("a"));
        assert!(view.is_expanded("b"));
        assert!(!view.is_expanded("c"), "depth 2 is not below level 2");
        assert!(!view.is_expanded("e"), "childless notes are never tracked");

        view.set_level(&forest, 1);
        assert!(view.is_expanded("a"));
        assert!(!view.is_expanded("b"), "collapsing must remove stale entries");
    }

    #[test]
    fn test_expand_and_collapse_one_are_bounded() {
        let forest = vec![note("a", vec![note("b", vec![])])];
        let mut view = OutlineView::new();

        view.collapse_one(&forest);
        assert_eq!(view.current_level(), 0);

        view.expand_one(&forest);
        assert_eq!(view.current_level(), 1);
        view.expand_one(&forest);
        assert_eq!(view.current_level(), 1, "clamped at max depth");
    }

    #[test]
    fn test_recompute_follows_tree_shrink() {
        let mut forest = deep_forest();
        let mut view = OutlineView::new();
        view.set_level(&forest, 3);
        assert_eq!(view.current_level(), 3);

        // Tree loses its deep chain; the next level change re-clamps.
        forest[0].children.clear();
        view.set_level(&forest, 3);
        assert_eq!(view.current_level(), 0);
        assert!(!view.can_expand_more());
    }
}
