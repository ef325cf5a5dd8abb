//! Find-references for citation keys.
//!
//! References are searched in the requesting document only. The bibliography
//! is workspace-wide but citing documents are not indexed, so other files are
//! never scanned.

use tower_lsp::lsp_types::{Location, Position, Range};

use crate::document::Document;

pub fn references(document: &Document, position: Position) -> Option<Vec<Location>> {
    let located = document.key_at(position)?;
    if located.is_empty() {
        return None;
    }

    Some(
        find_occurrences(document, &located.key)
            .into_iter()
            .map(|range| Location {
                uri: document.uri.clone(),
                range,
            })
            .collect(),
    )
}

/// Every occurrence of `key` in `document`, overlapping ones included. Each
/// range spans exactly the key, in UTF-16 columns.
pub fn find_occurrences(document: &Document, key: &str) -> Vec<Range> {
    let key_len = key.encode_utf16().count() as u32;

    document
        .lines()
        .enumerate()
        .flat_map(|(line_number, line)| {
            line.char_indices()
                .filter(|(byte, _)| line[*byte..].starts_with(key))
                .map(|(byte, _)| line[..byte].encode_utf16().count() as u32)
                .map(|character| Range {
                    start: Position {
                        line: line_number as u32,
                        character,
                    },
                    end: Position {
                        line: line_number as u32,
                        character: character + key_len,
                    },
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{position, test_document};

    #[test]
    fn test_references_in_document() {
        let document = test_document(
            "# Notes\n\nFirst @doe2020, then \\cite{doe2020}.\nAlso @doe2021 and @doe2020",
        );

        let locations = references(&document, position(2, 8)).unwrap();

        let ranges: Vec<_> = locations.iter().map(|l| l.range).collect();
        assert_eq!(
            ranges,
            vec![
                Range {
                    start: position(2, 7),
                    end: position(2, 14)
                },
                Range {
                    start: position(2, 27),
                    end: position(2, 34)
                },
                Range {
                    start: position(3, 19),
                    end: position(3, 26)
                },
            ]
        );
        assert!(locations.iter().all(|l| l.uri == document.uri));
    }

    #[test]
    fn test_overlapping_occurrences() {
        let document = test_document("aaa");

        let ranges = find_occurrences(&document, "aa");

        assert_eq!(
            ranges,
            vec![
                Range {
                    start: position(0, 0),
                    end: position(0, 2)
                },
                Range {
                    start: position(0, 1),
                    end: position(0, 3)
                },
            ]
        );
    }

    #[test]
    fn test_occurrences_use_utf16_columns() {
        let document = test_document("ééé @müller 📚 @müller");

        let ranges = find_occurrences(&document, "müller");

        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start, position(0, 5));
        assert_eq!(ranges[1].start, position(0, 16));
        assert_eq!(ranges[1].end, position(0, 22));
    }

    #[test]
    fn test_references_without_key() {
        let document = test_document("plain prose");
        assert!(references(&document, position(0, 4)).is_none());
    }

    #[test]
    fn test_references_for_bare_marker() {
        let document = test_document("@ alone");
        assert!(references(&document, position(0, 1)).is_none());
    }
}
