//! citekey: a Language Server for BibTeX citation keys
//!
//! This crate provides the core functionality for the citekey LSP server,
//! giving authors of Markdown and LaTeX documents editor support for the
//! citation keys declared in their BibTeX bibliographies.
//!
//! # Overview
//!
//! - **Key Location**: Detects `@key` and `\cite{key}` tokens under the cursor
//! - **Bibliography Index**: Loads `.bib` files resolved from globs and workspace-relative paths
//! - **Autocomplete**: Prefix completion of citation keys with a short entry description
//! - **Hover**: Title, authors and year of the cited entry
//! - **Navigation**: Go-to-definition into the `.bib` file, find-references and rename in the open document
//!
//! # Architecture
//!
//! - [`locator`]: Pure scanner deciding whether the cursor sits inside a citation key
//! - [`bibliography`]: The key index built from the configured bibliography files
//! - [`document`]: Per-document text snapshots
//! - [`server`]: The tower-lsp backend wiring the pieces to the editor
//! - [`config`]: Configuration management and settings
//!
//! # Usage
//!
//! This crate is primarily used as the backing library for the `citekey` binary,
//! which implements the LSP server. The public API enables programmatic access
//! to the index and the feature handlers.
//!
//! ```ignore
//! use citekey::bibliography::{resolve_sources, Bibliography};
//!
//! let sources = resolve_sources(&["./refs.bib".to_string()], &[workspace_root]);
//! let bibliography = Bibliography::load(&sources)?;
//! ```

// Core modules - key scanning and the bibliography index
pub mod bibliography;
pub mod document;
pub mod locator;

// LSP feature modules
pub mod completion;
pub mod gotodef;
pub mod hover;
pub mod references;
pub mod rename;

// Server and configuration
pub mod config;
pub mod server;

// Utilities
pub mod ui;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
