use std::{future::Future, path::PathBuf, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use super::{resolve_sources, Bibliography, BibliographyError};

/// Configured bibliography paths and the workspace folders they resolve against.
pub type SourceSettings = (Vec<String>, Vec<PathBuf>);

/// Outcome of [`BibliographyIndex::reconfigure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    /// The resolved sources matched the applied ones; nothing was read.
    Unchanged,
    Reloaded { keys: usize },
}

/// Shared holder of the current [`Bibliography`].
///
/// Reloads build a complete replacement on a blocking task and publish it with
/// a single swap, so readers see either the old index or the new one. A failed
/// reload publishes nothing.
#[derive(Debug, Default)]
pub struct BibliographyIndex {
    current: RwLock<Arc<Bibliography>>,
    /// Sources of the last successful reload. Also serializes reloads.
    applied: Mutex<Option<Vec<PathBuf>>>,
}

impl BibliographyIndex {
    pub fn new() -> BibliographyIndex {
        BibliographyIndex::default()
    }

    /// The index as of now. Later reloads do not affect the returned snapshot.
    pub async fn snapshot(&self) -> Arc<Bibliography> {
        self.current.read().await.clone()
    }

    /// Reload unconditionally from the configured paths and workspace folders
    /// that `settings` yields.
    ///
    /// `settings` runs once the reload lock is held, so concurrent reloads read
    /// and apply settings in the same order.
    pub async fn configure<F, Fut>(&self, settings: F) -> Result<usize, BibliographyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceSettings>,
    {
        let mut applied = self.applied.lock().await;
        let (paths, workspace_folders) = settings().await;
        let sources = resolve_sources(&paths, &workspace_folders);

        let keys = self.load_and_publish(sources.clone()).await?;
        *applied = Some(sources);
        Ok(keys)
    }

    /// Like [`configure`](Self::configure), but only reload when the resolved
    /// sources differ from the last successful reload.
    pub async fn reconfigure<F, Fut>(&self, settings: F) -> Result<Reload, BibliographyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceSettings>,
    {
        let mut applied = self.applied.lock().await;
        let (paths, workspace_folders) = settings().await;
        let sources = resolve_sources(&paths, &workspace_folders);
        if applied.as_ref() == Some(&sources) {
            return Ok(Reload::Unchanged);
        }

        let keys = self.load_and_publish(sources.clone()).await?;
        *applied = Some(sources);
        Ok(Reload::Reloaded { keys })
    }

    async fn load_and_publish(&self, sources: Vec<PathBuf>) -> Result<usize, BibliographyError> {
        info!("Loading bibliographies from {sources:?}");

        let bibliography = tokio::task::spawn_blocking(move || Bibliography::load(&sources))
            .await??;

        let keys = bibliography.len();
        *self.current.write().await = Arc::new(bibliography);
        Ok(keys)
    }
}
