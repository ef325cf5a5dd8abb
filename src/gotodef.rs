use tower_lsp::lsp_types::{Location, Position};

use crate::{bibliography::Bibliography, document::Document};

/// Jump from a citation key to where its bibliography file declares it.
pub fn goto_definition(
    bibliography: &Bibliography,
    document: &Document,
    position: Position,
) -> Option<Location> {
    let located = document.key_at(position)?;
    let key_position = bibliography.lookup_position(&located.key)?;

    Some(key_position.location(&located.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{position, sample_bib_uri, sample_bibliography, test_document};
    use tower_lsp::lsp_types::Range;

    #[test]
    fn test_goto_definition_marker() {
        let document = test_document("Classic: @knuth1984");

        let location = goto_definition(&sample_bibliography(), &document, position(0, 12)).unwrap();

        assert_eq!(location.uri, sample_bib_uri());
        assert_eq!(
            location.range,
            Range {
                start: position(12, 6),
                end: position(12, 15),
            }
        );
    }

    #[test]
    fn test_goto_definition_cite_command() {
        let document = test_document(r"\cite{doe2020}");

        let location = goto_definition(&sample_bibliography(), &document, position(0, 8)).unwrap();

        assert_eq!(
            location.range,
            Range {
                start: position(0, 9),
                end: position(0, 16),
            }
        );
    }

    #[test]
    fn test_goto_definition_unknown_key() {
        let document = test_document("@missing");
        assert!(goto_definition(&sample_bibliography(), &document, position(0, 3)).is_none());
    }

    #[test]
    fn test_goto_definition_no_key_at_cursor() {
        let document = test_document("Nothing to see");
        assert!(goto_definition(&sample_bibliography(), &document, position(0, 3)).is_none());
    }
}
