//! Shared test utilities for citekey.
//!
//! This module provides common helpers used across multiple test modules.
//! It is only compiled when running tests.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tower_lsp::lsp_types::{Position, Url};

use crate::bibliography::Bibliography;
use crate::document::Document;

/// Three entries: a dated article, a two-author paper with a `year` field, and
/// a book with only a title. `knuth1984` is declared on line 12, col 6.
pub const SAMPLE_BIB: &str = r#"@article{doe2020,
  title = {A Study},
  author = {Doe, J.},
  date = {2020-01-01},
}

@inproceedings{doe2021,
  title = {A {Follow-Up} Study},
  author = {Doe, J. and Roe, R.},
  year = {2021},
}

@book{knuth1984,
  title = {Literate Programming},
}
"#;

/// Creates a temporary directory for bibliography fixtures.
///
/// Returns a tuple of (TempDir, PathBuf) where:
/// - TempDir: The temp directory handle (must be kept alive for the test duration)
/// - PathBuf: The path to the fixture subdirectory
pub fn create_test_bib_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let bib_dir = temp_dir.path().join("library");
    fs::create_dir(&bib_dir).expect("Failed to create library subdirectory");
    (temp_dir, bib_dir)
}

/// The sample bibliography indexed as if it lived at `/library/refs.bib`.
pub fn sample_bibliography() -> Bibliography {
    Bibliography::from_text(SAMPLE_BIB, &sample_bib_uri())
}

pub fn sample_bib_uri() -> Url {
    Url::parse("file:///library/refs.bib").expect("valid uri")
}

/// An open Markdown document with the given text.
pub fn test_document(text: &str) -> Document {
    Document::new(
        Url::parse("file:///notes/paper.md").expect("valid uri"),
        text,
    )
}

pub fn position(line: u32, character: u32) -> Position {
    Position { line, character }
}
