//! Citation key completion.
//!
//! Typing after `@` or inside `\cite{` offers every bibliography key that
//! starts with what has been typed so far.

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionList, CompletionResponse, Documentation,
    Position,
};

use crate::{bibliography::Bibliography, document::Document, ui::describe_entry};

pub fn get_completions(
    bibliography: &Bibliography,
    document: &Document,
    position: Position,
) -> CompletionResponse {
    let items = match document.key_at(position) {
        Some(located) if !located.is_empty() => bibliography
            .entries_with_prefix(&located.key)
            .map(|entry| CompletionItem {
                label: format!("@{}", entry.key),
                kind: Some(CompletionItemKind::TEXT),
                documentation: Some(Documentation::String(describe_entry(entry))),
                insert_text: Some(entry.key.clone()),
                ..Default::default()
            })
            .collect(),
        _ => Vec::new(),
    };

    CompletionResponse::List(CompletionList {
        is_incomplete: false,
        items,
    })
}
