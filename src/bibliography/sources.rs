//! Resolution of configured bibliography paths to files on disk.
//!
//! Resolution runs in two phases. [`resolve_sources`] turns the configured
//! strings into normalized candidate paths without touching the filesystem, so
//! two configurations can be compared cheaply. [`expand_sources`] then expands
//! globs and checks that every file exists.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use super::BibliographyError;

/// Expand each configured path into its normalized candidates.
///
/// Paths starting with `.` are relative to the workspace and produce one
/// candidate per workspace folder (none when there are no folders). Other
/// paths produce a single candidate after `~` expansion.
pub fn resolve_sources(paths: &[String], workspace_folders: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| !path.is_empty())
        .flat_map(|path| {
            let expanded = shellexpand::tilde(path).into_owned();
            if path.starts_with('.') {
                workspace_folders
                    .iter()
                    .map(|folder| normalize_path(&folder.join(&expanded)))
                    .collect::<Vec<_>>()
            } else {
                vec![normalize_path(Path::new(&expanded))]
            }
        })
        .collect()
}

/// Expand glob candidates and verify every resulting file exists.
///
/// A glob matching nothing contributes no files. A plain candidate that does
/// not exist aborts with [`BibliographyError::MissingSource`].
pub fn expand_sources(candidates: &[PathBuf]) -> Result<Vec<PathBuf>, BibliographyError> {
    let mut files = Vec::new();

    for candidate in candidates {
        if is_glob(candidate) {
            let pattern = candidate.to_string_lossy();
            let matches =
                glob::glob(&pattern).map_err(|source| BibliographyError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;

            for entry in matches {
                match entry {
                    Ok(path) if path.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(err) => warn!("Skipping unreadable glob match: {err}"),
                }
            }
        } else {
            files.push(candidate.clone());
        }
    }

    match files.iter().find(|file| !file.exists()) {
        Some(missing) => Err(BibliographyError::MissingSource {
            path: missing.clone(),
        }),
        None => Ok(files),
    }
}

pub fn is_glob(path: &Path) -> bool {
    path.to_string_lossy()
        .chars()
        .any(|c| matches!(c, '*' | '?' | '['))
}

/// Lexically normalize a path: make it absolute against the current
/// directory, then drop `.` components and fold `..` into their parent.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = match path.is_absolute() {
        true => path.to_path_buf(),
        false => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
