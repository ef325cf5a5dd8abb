//! Per-document text snapshots.
//!
//! The editor is the source of truth for document text: [`OpenBuffers`]
//! records whatever the last open or change notification carried, falling
//! back to the file on disk for documents the editor never sent. The
//! [`DocumentCache`] sits in front of a [`DocumentProvider`] and only asks it
//! again when a refresh is forced.

use std::path::PathBuf;

use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range, Url};
use tracing::debug;

use crate::locator::{locate, LocatedKey};

/// A full text snapshot of one document.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub path: Option<PathBuf>,
    pub text: Rope,
}

impl Document {
    pub fn new(uri: Url, text: &str) -> Document {
        Document {
            path: uri.to_file_path().ok(),
            uri,
            text: Rope::from_str(text),
        }
    }

    /// Text of line `line` without its line ending.
    pub fn line(&self, line: usize) -> Option<String> {
        let text = self.text.get_line(line)?.to_string();
        Some(text.trim_end_matches(['\n', '\r']).to_string())
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.text
            .lines()
            .map(|line| line.to_string().trim_end_matches(['\n', '\r']).to_string())
    }

    /// The citation key under `position`, if any. `position` counts UTF-16
    /// units; the returned span counts chars of the line.
    pub fn key_at(&self, position: Position) -> Option<LocatedKey> {
        let line = self.line(position.line as usize)?;
        locate(&line, char_index(&line, position.character))
    }

    /// The LSP range of a key found on `line` by [`Document::key_at`].
    pub fn key_range(&self, line: u32, key: &LocatedKey) -> Range {
        let text = self.line(line as usize).unwrap_or_default();
        Range {
            start: Position {
                line,
                character: utf16_column(&text, key.start),
            },
            end: Position {
                line,
                character: utf16_column(&text, key.end),
            },
        }
    }
}

/// UTF-16 column of the char at `char_index` in `line`.
pub fn utf16_column(line: &str, char_index: usize) -> u32 {
    line.chars()
        .take(char_index)
        .map(char::len_utf16)
        .sum::<usize>() as u32
}

/// Char index of the UTF-16 `column` in `line`. A column inside a surrogate
/// pair maps to the char it splits.
fn char_index(line: &str, column: u32) -> usize {
    let mut units = 0;
    line.chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= column as usize
        })
        .count()
}

/// Where the cache gets document text from.
pub trait DocumentProvider {
    fn fetch(&self, uri: &Url) -> Option<Document>;
}

/// Texts of documents as last sent by the editor.
#[derive(Debug, Default)]
pub struct OpenBuffers {
    buffers: DashMap<Url, String>,
}

impl OpenBuffers {
    pub fn new() -> OpenBuffers {
        OpenBuffers::default()
    }

    pub fn update(&self, uri: Url, text: String) {
        self.buffers.insert(uri, text);
    }
}

impl DocumentProvider for OpenBuffers {
    fn fetch(&self, uri: &Url) -> Option<Document> {
        if let Some(text) = self.buffers.get(uri) {
            return Some(Document::new(uri.clone(), text.value()));
        }

        let path = uri.to_file_path().ok()?;
        let text = std::fs::read_to_string(&path).ok()?;
        debug!("Read {} from disk", path.display());
        Some(Document::new(uri.clone(), &text))
    }
}

/// Lazily populated snapshots keyed by URI. Entries are replaced, never
/// merged, and never evicted.
#[derive(Debug)]
pub struct DocumentCache<P> {
    provider: P,
    documents: DashMap<Url, Document>,
}

impl<P: DocumentProvider> DocumentCache<P> {
    pub fn new(provider: P) -> DocumentCache<P> {
        DocumentCache {
            provider,
            documents: DashMap::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The cached snapshot of `uri`, fetched from the provider on a miss or
    /// when `force_refresh` is set.
    pub fn get(&self, uri: &Url, force_refresh: bool) -> Option<Document> {
        if !force_refresh {
            if let Some(document) = self.documents.get(uri) {
                return Some(document.value().clone());
            }
        }

        let document = self.provider.fetch(uri)?;
        self.documents.insert(uri.clone(), document.clone());
        Some(document)
    }
}
