use std::collections::HashMap;

use tower_lsp::lsp_types::{Position, TextEdit, WorkspaceEdit};

use crate::{document::Document, references::find_occurrences};

/// Replace every occurrence of the key under the cursor in this document with
/// `new_name`. The new name is not checked to be a valid key.
///
/// Occurrences come from [`find_occurrences`], which counts overlapping
/// matches. A key that overlaps itself (`aa` in `aaa`) therefore yields
/// overlapping edits, which LSP clients reject as a whole.
pub fn rename(document: &Document, position: Position, new_name: &str) -> Option<WorkspaceEdit> {
    let located = document.key_at(position)?;
    if located.is_empty() {
        return None;
    }

    let edits = find_occurrences(document, &located.key)
        .into_iter()
        .map(|range| TextEdit {
            range,
            new_text: new_name.to_string(),
        })
        .collect();

    Some(WorkspaceEdit {
        changes: Some(HashMap::from([(document.uri.clone(), edits)])),
        ..Default::default()
    })
}
