//! Citation key detection at a cursor position.
//!
//! Two citation syntaxes are recognised on a single line of text:
//!
//! | Syntax | Example | Key starts after |
//! |--------|---------|------------------|
//! | Marker | `@doe2020` | `@` |
//! | Command | `\cite{doe2020}` | a `{` preceded by `cite` |
//!
//! A key never contains a character from [`TERMINATORS`] or whitespace.
//! Offsets are in chars of the line. [`crate::document::Document`] converts
//! them to and from the UTF-16 columns of LSP positions.

/// Characters that cannot appear inside a citation key. Whitespace also ends a key.
pub const TERMINATORS: [char; 6] = ['{', '}', '@', '[', ']', ','];

const COMMAND: [char; 4] = ['c', 'i', 't', 'e'];

pub fn is_terminator(c: char) -> bool {
    c.is_whitespace() || TERMINATORS.contains(&c)
}

/// A citation key found under the cursor.
///
/// `start..end` is the half-open char range of `key` within its line; an empty
/// key (`@` directly before the cursor) has `start == end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedKey {
    pub key: String,
    pub start: usize,
    pub end: usize,
}

impl LocatedKey {
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Find the citation key the cursor at `cursor` (a char offset) sits in.
///
/// Scans backward from the char before the cursor for a key starter, then
/// forward from the cursor for the end of the key. Any terminator met on the
/// way back means the cursor is not in a key. Cursors past the end of the line
/// are clamped to it.
pub fn locate(line: &str, cursor: usize) -> Option<LocatedKey> {
    let chars: Vec<char> = line.chars().collect();
    let cursor = cursor.min(chars.len());

    let start = (0..cursor).rev().find_map(|index| match chars[index] {
        '@' => Some(Some(index)),
        '{' if index >= 4 && chars[index - 4..index] == COMMAND => Some(Some(index)),
        c if is_terminator(c) => Some(None),
        _ => None,
    })??;

    let end = chars[cursor..]
        .iter()
        .position(|c| is_terminator(*c))
        .map_or(chars.len(), |offset| cursor + offset);

    Some(LocatedKey {
        key: chars[start + 1..end].iter().collect(),
        start: start + 1,
        end,
    })
}
