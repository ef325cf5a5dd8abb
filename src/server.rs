//! The tower-lsp backend.
//!
//! All shared state lives in [`Backend`], built once per connection. Feature
//! requests snapshot the bibliography and the document and hand them to the
//! pure handlers in [`crate::hover`], [`crate::completion`], etc.

use std::{path::PathBuf, time::Duration};

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

use crate::{
    bibliography::{BibliographyError, BibliographyIndex, Reload, SourceSettings},
    completion::get_completions,
    config::{ClientSettings, Settings, CONFIGURATION_SECTION},
    document::{DocumentCache, OpenBuffers},
    gotodef::goto_definition,
    hover, references, rename,
};

/// How long `initialized` waits for the client's configuration before
/// falling back to the settings files.
const CONFIGURATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Uninitialized,
    /// Initialized; `pull_configuration` records whether the client answers
    /// `workspace/configuration`.
    AwaitingConfiguration { pull_configuration: bool },
    Ready,
}

pub struct Backend {
    client: Client,
    state: RwLock<ServerState>,
    settings: RwLock<Settings>,
    workspace_folders: RwLock<Vec<PathBuf>>,
    bibliography: BibliographyIndex,
    documents: DocumentCache<OpenBuffers>,
}

impl Backend {
    pub fn new(client: Client) -> Backend {
        Backend {
            client,
            state: RwLock::new(ServerState::Uninitialized),
            settings: RwLock::new(Settings::default()),
            workspace_folders: RwLock::new(Vec::new()),
            bibliography: BibliographyIndex::new(),
            documents: DocumentCache::new(OpenBuffers::new()),
        }
    }

    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// The configured paths and workspace folders, read together.
    async fn source_settings(&self) -> SourceSettings {
        let bibliographies = self.settings.read().await.bibliographies.clone();
        let workspace_folders = self.workspace_folders.read().await.clone();
        (bibliographies, workspace_folders)
    }

    /// Load the bibliography from the current settings, whatever was loaded
    /// before.
    async fn load_bibliographies(&self) {
        match self.bibliography.configure(|| self.source_settings()).await {
            Ok(keys) => info!("Indexed {keys} citation keys"),
            Err(err) => self.report_reload_error(err).await,
        }
    }

    /// Reload the bibliography if the effective sources changed.
    async fn update_bibliographies(&self) {
        match self.bibliography.reconfigure(|| self.source_settings()).await {
            Ok(Reload::Unchanged) => debug!("Bibliography sources unchanged"),
            Ok(Reload::Reloaded { keys }) => info!("Indexed {keys} citation keys"),
            Err(err) => self.report_reload_error(err).await,
        }
    }

    /// Failed reloads leave the current index in place and are shown to the
    /// user once.
    async fn report_reload_error(&self, err: BibliographyError) {
        error!("Bibliography reload failed: {err}");
        self.client
            .show_message(MessageType::ERROR, err.to_string())
            .await;
    }

    /// Ask the client for the `citation` section, giving up after
    /// [`CONFIGURATION_TIMEOUT`].
    async fn pull_configuration(&self) -> Option<ClientSettings> {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIGURATION_SECTION.to_string()),
        }];

        match tokio::time::timeout(CONFIGURATION_TIMEOUT, self.client.configuration(items)).await {
            Ok(Ok(values)) => values.into_iter().next().and_then(ClientSettings::from_section),
            Ok(Err(err)) => {
                warn!("workspace/configuration failed: {err}");
                None
            }
            Err(_) => {
                warn!("workspace/configuration timed out, using defaults");
                None
            }
        }
    }
}

/// Workspace folders named by an initialize request, most specific source first.
#[allow(deprecated)]
fn initial_workspace_folders(params: &InitializeParams) -> Vec<PathBuf> {
    if let Some(folders) = &params.workspace_folders {
        return folders
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
    }

    params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok())
        .or_else(|| params.root_path.as_ref().map(PathBuf::from))
        .into_iter()
        .collect()
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let workspace_folders = initial_workspace_folders(&params);
        let pull_configuration = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.configuration)
            .unwrap_or(false);

        let settings = match Settings::new(workspace_folders.first().map(PathBuf::as_path)) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Falling back to default settings: {err}");
                Settings::default()
            }
        };

        debug!("Workspace folders: {workspace_folders:?}, pull configuration: {pull_configuration}");
        *self.settings.write().await = settings;
        *self.workspace_folders.write().await = workspace_folders;
        *self.state.write().await = ServerState::AwaitingConfiguration { pull_configuration };

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        ..Default::default()
                    },
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec!["@".to_string(), "{".to_string()]),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Left(true)),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "citekey".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        let pull_configuration = matches!(
            self.state().await,
            ServerState::AwaitingConfiguration {
                pull_configuration: true
            }
        );

        if pull_configuration {
            if let Some(client_settings) = self.pull_configuration().await {
                self.settings.write().await.apply(client_settings);
            }
        }

        self.load_bibliographies().await;
        *self.state.write().await = ServerState::Ready;
        info!("citekey ready");
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents
            .provider()
            .update(uri.clone(), params.text_document.text);
        self.documents.get(&uri, true);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(change) = params.content_changes.into_iter().last() {
            self.documents.provider().update(uri.clone(), change.text);
        }
        self.documents.get(&uri, true);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let Some(client_settings) = ClientSettings::from_settings(params.settings) else {
            debug!("No {CONFIGURATION_SECTION} settings in configuration change");
            return;
        };

        self.settings.write().await.apply(client_settings);
        self.update_bibliographies().await;
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        {
            let mut workspace_folders = self.workspace_folders.write().await;
            for removed in &params.event.removed {
                if let Ok(path) = removed.uri.to_file_path() {
                    workspace_folders.retain(|folder| *folder != path);
                }
            }
            workspace_folders.extend(
                params
                    .event
                    .added
                    .iter()
                    .filter_map(|folder| folder.uri.to_file_path().ok()),
            );
        }

        self.update_bibliographies().await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let Some(document) = self.documents.get(&position.text_document.uri, false) else {
            return Ok(None);
        };
        let bibliography = self.bibliography.snapshot().await;

        Ok(hover::hover(&bibliography, &document, position.position))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let bibliography = self.bibliography.snapshot().await;

        let response = match self.documents.get(&position.text_document.uri, false) {
            Some(document) => get_completions(&bibliography, &document, position.position),
            None => CompletionResponse::Array(Vec::new()),
        };

        Ok(Some(response))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        let Some(document) = self.documents.get(&position.text_document.uri, false) else {
            return Ok(None);
        };
        let bibliography = self.bibliography.snapshot().await;

        Ok(goto_definition(&bibliography, &document, position.position)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let position = params.text_document_position;
        let Some(document) = self.documents.get(&position.text_document.uri, false) else {
            return Ok(None);
        };

        Ok(references::references(&document, position.position))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let position = params.text_document_position;
        let Some(document) = self.documents.get(&position.text_document.uri, false) else {
            return Ok(None);
        };

        Ok(rename::rename(&document, position.position, &params.new_name))
    }
}
