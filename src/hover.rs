//! Hover provider for citation keys.
//!
//! Hovering over `@key` or `\cite{key}` shows the entry's title, authors and
//! year (see [`describe_entry`]) and highlights the key.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::{bibliography::Bibliography, document::Document, ui::describe_entry};

/// Generate hover content for the citation key at the cursor position.
///
/// # Returns
///
/// `Some(Hover)` with a plain text description, or `None` if:
/// - Cursor is not on a citation key
/// - The key is not in the bibliography
pub fn hover(bibliography: &Bibliography, document: &Document, position: Position) -> Option<Hover> {
    let located = document.key_at(position)?;
    let entry = bibliography.lookup(&located.key)?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::PlainText,
            value: describe_entry(entry),
        }),
        range: Some(document.key_range(position.line, &located)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{position, sample_bibliography, test_document};
    use tower_lsp::lsp_types::Range;

    #[test]
    fn test_hover_on_marker_key() {
        let document = test_document("# Intro\n\nAs argued in @doe2020, things hold.");

        let result = hover(&sample_bibliography(), &document, position(2, 16)).unwrap();

        match result.contents {
            HoverContents::Markup(markup) => assert_eq!(
                markup.value,
                "Title: A Study\nAuthor: Doe, J.\nYear: 2020\n"
            ),
            other => panic!("Expected markup contents, got {other:?}"),
        }
        assert_eq!(
            result.range,
            Some(Range {
                start: position(2, 14),
                end: position(2, 21),
            })
        );
    }

    #[test]
    fn test_hover_on_cite_command() {
        let document = test_document(r"As argued in \cite{doe2021}.");

        let result = hover(&sample_bibliography(), &document, position(0, 22)).unwrap();

        let HoverContents::Markup(markup) = result.contents else {
            panic!("Expected markup contents");
        };
        assert_eq!(
            markup.value,
            "Title: A Follow-Up Study\nAuthors: Doe, J.; Roe, R.\nYear: 2021\n"
        );
    }

    #[test]
    fn test_hover_range_after_astral_char() {
        let document = test_document("🔥 @doe2020");

        let result = hover(&sample_bibliography(), &document, position(0, 5)).unwrap();

        assert_eq!(
            result.range,
            Some(Range {
                start: position(0, 4),
                end: position(0, 11),
            })
        );
    }

    #[test]
    fn test_hover_unknown_key() {
        let document = test_document("See @nobody1999 here");
        assert!(hover(&sample_bibliography(), &document, position(0, 8)).is_none());
    }

    #[test]
    fn test_hover_plain_text() {
        let document = test_document("No citations on this line");
        assert!(hover(&sample_bibliography(), &document, position(0, 8)).is_none());
    }
}
