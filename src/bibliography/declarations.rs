//! Line scanner for `@type{key` entry declarations.
//!
//! This is deliberately independent of the entry parser: it only needs to find
//! where each key is declared so go-to-definition can jump there.

use once_cell::sync::Lazy;
use regex::Regex;

/// Entry types that declare no citable key.
const NON_CITABLE_TYPES: [&str; 3] = ["comment", "preamble", "string"];

/// A key and the position of its first char within a bibliography file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDeclaration {
    pub key: String,
    pub line: u32,
    pub character: u32,
}

/// Find the key declared on each line of `text`. Only the first declaration of
/// a line is considered.
pub fn scan_declarations(text: &str) -> Vec<KeyDeclaration> {
    static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"@(?<type>[^,\s{}@\]\[]+)\s*\{\s*(?<key>[^,\s{}@\]\[]+)").unwrap()
    });

    text.lines()
        .enumerate()
        .filter_map(|(line_number, line)| {
            let captures = DECLARATION_RE.captures(line)?;
            let entry_type = captures.name("type")?.as_str().to_lowercase();
            if NON_CITABLE_TYPES.contains(&entry_type.as_str()) {
                return None;
            }

            let key = captures.name("key")?;
            Some(KeyDeclaration {
                key: key.as_str().to_string(),
                line: line_number as u32,
                character: line[..key.start()].encode_utf16().count() as u32,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_declarations() {
        let text = "% comment line\n@article{doe2020,\n  title = {A Study},\n}\n\n  @Book{ knuth1984,\n";

        let declarations = scan_declarations(text);

        assert_eq!(
            declarations,
            vec![
                KeyDeclaration {
                    key: "doe2020".into(),
                    line: 1,
                    character: 9,
                },
                KeyDeclaration {
                    key: "knuth1984".into(),
                    line: 5,
                    character: 9,
                },
            ]
        );
    }

    #[test]
    fn test_scan_skips_string_and_comment_blocks() {
        let text = "@string{acm = {ACM}}\n@comment{ignored}\n@misc{real,}";

        let keys: Vec<_> = scan_declarations(text).into_iter().map(|d| d.key).collect();

        assert_eq!(keys, vec!["real"]);
    }

    #[test]
    fn test_scan_counts_utf16_units_not_bytes() {
        let declarations = scan_declarations("% é\n% ü @misc{ünïcode,\n% 📚 @misc{books,");

        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].key, "ünïcode");
        assert_eq!(declarations[0].line, 1);
        assert_eq!(declarations[0].character, 10);
        // The emoji takes two UTF-16 units
        assert_eq!(declarations[1].character, 11);
    }
}
