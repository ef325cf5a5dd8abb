//! Human-readable rendering of bibliography entries, shared by hover and
//! completion documentation.

use crate::bibliography::BibEntry;

/// Describe an entry as up to three lines, in fixed order:
///
/// ```text
/// Title: A Study
/// Authors: Doe, J.; Roe, R.
/// Year: 2020
/// ```
///
/// A line is left out when its field is absent. Braces are stripped from the
/// title and the author label is pluralized for more than one author.
pub fn describe_entry(entry: &BibEntry) -> String {
    let mut description = String::new();

    if let Some(title) = &entry.title {
        let title: String = title.chars().filter(|c| !matches!(c, '{' | '}')).collect();
        description.push_str(&format!("Title: {title}\n"));
    }

    if !entry.authors.is_empty() {
        let plural = if entry.authors.len() > 1 { "s" } else { "" };
        description.push_str(&format!(
            "Author{plural}: {}\n",
            entry.authors.join("; ")
        ));
    }

    if let Some(year) = entry.publication_year() {
        description.push_str(&format!("Year: {year}\n"));
    }

    description
}
