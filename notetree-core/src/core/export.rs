//! Plain-text rendering of the note outline for copy-to-clipboard and print.

use crate::Note;
use std::collections::HashSet;

/// Renders the forest as an indented bullet list, honoring the expanded set:
/// a note's children appear only when its id is expanded, so collapsed
/// subtrees are omitted exactly as on screen. Root-level notes are always
/// rendered.
pub fn format_as_text(notes: &[Note], expanded: &HashSet<String>) -> String {
    let mut out = String::new();
    render(notes, expanded, 0, &mut out);
    out
}

fn render(notes: &[Note], expanded: &HashSet<String>, depth: usize, out: &mut String) {
    for note in notes {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str("- ");
        out.push_str(&note.content);
        out.push('\n');
        if expanded.contains(&note.id) {
            render(&note.children, expanded, depth + 1, out);
        }
    }
}
