mod declarations;
mod entry;
mod index;
mod sources;

pub use declarations::{scan_declarations, KeyDeclaration};
pub use entry::{split_authors, BibEntry};
pub use index::{BibliographyIndex, Reload, SourceSettings};
pub use sources::{expand_sources, is_glob, normalize_path, resolve_sources};

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use itertools::Itertools;
use rayon::prelude::*;
use tower_lsp::lsp_types::{Location, Position, Range, Url};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum BibliographyError {
    #[error("File Not Found Error: {}", path.display())]
    MissingSource { path: PathBuf },
    #[error("Invalid bibliography pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("Failed to read bibliography {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Bibliography path {} cannot be expressed as a URI", path.display())]
    Unaddressable { path: PathBuf },
    #[error("Bibliography reload was interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// Where a key is declared: the first char of the key in its `.bib` file,
/// as an LSP position (UTF-16 column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPosition {
    pub uri: Url,
    pub line: u32,
    pub character: u32,
}

impl KeyPosition {
    /// The location spanning `key` at its declaration.
    pub fn location(&self, key: &str) -> Location {
        Location {
            uri: self.uri.clone(),
            range: Range {
                start: Position {
                    line: self.line,
                    character: self.character,
                },
                end: Position {
                    line: self.line,
                    character: self.character + key.encode_utf16().count() as u32,
                },
            },
        }
    }
}

/// One parsed bibliography file.
#[derive(Debug)]
struct BibFile {
    entries: Vec<BibEntry>,
    positions: Vec<(String, KeyPosition)>,
}

impl BibFile {
    fn read(path: &Path) -> Result<BibFile, BibliographyError> {
        let text = std::fs::read_to_string(path).map_err(|source| BibliographyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let uri = Url::from_file_path(path).map_err(|_| BibliographyError::Unaddressable {
            path: path.to_path_buf(),
        })?;

        Ok(BibFile::new(&text, &uri))
    }

    fn new(text: &str, uri: &Url) -> BibFile {
        let declarations = scan_declarations(text);

        let parsed = match biblatex::Bibliography::parse(text) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!("Could not parse entries of {uri}, keeping bare keys: {err:?}");
                None
            }
        };

        let entries = declarations
            .iter()
            .map(|declaration| {
                parsed
                    .as_ref()
                    .and_then(|bibliography| bibliography.get(&declaration.key))
                    .map(BibEntry::from_biblatex)
                    .unwrap_or_else(|| BibEntry::bare(&declaration.key))
            })
            .collect();

        let positions = declarations
            .into_iter()
            .map(|KeyDeclaration { key, line, character }| {
                let position = KeyPosition {
                    uri: uri.clone(),
                    line,
                    character,
                };
                (key, position)
            })
            .collect();

        BibFile { entries, positions }
    }
}

#[derive(Debug, Default, Clone)]
/// The in memory index of every configured bibliography file.
///
/// Entries and declaration positions are always built together from the same
/// files, so a key has an entry exactly when it has a position. When several
/// declarations share a key, the one read last wins.
pub struct Bibliography {
    entries: HashMap<String, BibEntry>,
    positions: HashMap<String, KeyPosition>,
    files: Vec<PathBuf>,
}

impl Bibliography {
    /// Build an index from resolved source candidates (see [`resolve_sources`]).
    ///
    /// Either every file loads or nothing is returned.
    pub fn load(sources: &[PathBuf]) -> Result<Bibliography, BibliographyError> {
        let files = expand_sources(sources)?;

        let parsed = files
            .par_iter()
            .map(|path| BibFile::read(path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut bibliography = Bibliography {
            files,
            ..Default::default()
        };
        for bib_file in parsed {
            bibliography.insert(bib_file);
        }

        debug!(
            "Indexed {} keys from {} files",
            bibliography.len(),
            bibliography.files.len()
        );

        Ok(bibliography)
    }

    /// Index a single in-memory bibliography text as if it were the file at `uri`.
    pub fn from_text(text: &str, uri: &Url) -> Bibliography {
        let mut bibliography = Bibliography::default();
        bibliography.insert(BibFile::new(text, uri));
        bibliography
    }

    fn insert(&mut self, bib_file: BibFile) {
        let duplicates = bib_file
            .positions
            .iter()
            .filter(|(key, _)| self.positions.contains_key(key))
            .map(|(key, _)| key.as_str())
            .collect_vec();
        if !duplicates.is_empty() {
            debug!("Overriding duplicate keys: {}", duplicates.join(", "));
        }

        self.entries.extend(
            bib_file
                .entries
                .into_iter()
                .map(|entry| (entry.key.clone(), entry)),
        );
        self.positions.extend(bib_file.positions);
    }

    pub fn lookup(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    pub fn lookup_position(&self, key: &str) -> Option<&KeyPosition> {
        self.positions.get(key)
    }

    pub fn all_keys(&self) -> HashSet<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Entries whose key starts with `prefix` (case-sensitive).
    pub fn entries_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a BibEntry> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
            .map(|(_, entry)| entry)
    }

    /// The files actually read, after glob expansion.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
