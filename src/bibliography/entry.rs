//! Bibliography entry records.
//!
//! Field values come from the `biblatex` parser; only `title`, `author`,
//! `date` and `year` are kept.

use biblatex::ChunksExt;
use once_cell::sync::Lazy;
use regex::Regex;

/// The descriptive fields of one bibliography entry. Fields missing from the
/// source stay `None` (or empty for authors) and are never defaulted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub key: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub date: Option<String>,
    pub year: Option<String>,
}

impl BibEntry {
    /// An entry known only by its key, as when the parser rejected its file.
    pub fn bare(key: &str) -> BibEntry {
        BibEntry {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn from_biblatex(entry: &biblatex::Entry) -> BibEntry {
        let field = |name: &str| {
            entry
                .get(name)
                .map(|chunks| chunks.format_verbatim().trim().to_string())
                .filter(|value| !value.is_empty())
        };

        BibEntry {
            key: entry.key.clone(),
            title: field("title"),
            authors: field("author")
                .map(|authors| split_authors(&authors))
                .unwrap_or_default(),
            date: field("date"),
            year: field("year"),
        }
    }

    /// The publication year: the leading component of `date`, or the `year`
    /// field when there is no date.
    pub fn publication_year(&self) -> Option<&str> {
        match &self.date {
            Some(date) => date.split('-').next(),
            None => self.year.as_deref(),
        }
    }
}

/// Split a BibTeX name list on its `and` separators.
pub fn split_authors(authors: &str) -> Vec<String> {
    static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+and\s+").unwrap());

    AND_RE
        .split(authors.trim())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(src: &str) -> BibEntry {
        let bibliography = biblatex::Bibliography::parse(src).expect("valid bibtex");
        let entry = bibliography.iter().next().expect("one entry");
        BibEntry::from_biblatex(entry)
    }

    #[test]
    fn test_entry_fields() {
        let entry = parse_one(
            "@article{doe2020, title={A Study}, author={Doe, J.}, date={2020-01-01}}",
        );

        assert_eq!(entry.key, "doe2020");
        assert_eq!(entry.title.as_deref(), Some("A Study"));
        assert_eq!(entry.authors, vec!["Doe, J."]);
        assert_eq!(entry.date.as_deref(), Some("2020-01-01"));
        assert_eq!(entry.publication_year(), Some("2020"));
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let entry = parse_one("@misc{lonely, note={nothing else}}");

        assert_eq!(entry.title, None);
        assert!(entry.authors.is_empty());
        assert_eq!(entry.publication_year(), None);
    }

    #[test]
    fn test_year_field_used_without_date() {
        let entry = parse_one("@book{knuth1984, title={Literate Programming}, year={1984}}");
        assert_eq!(entry.publication_year(), Some("1984"));
    }

    #[test]
    fn test_split_authors() {
        assert_eq!(
            split_authors("Doe, Jane and Smith, John and  Roe, R."),
            vec!["Doe, Jane", "Smith, John", "Roe, R."]
        );
        assert_eq!(split_authors("Alexandra Band"), vec!["Alexandra Band"]);
        assert!(split_authors("  ").is_empty());
    }
}
