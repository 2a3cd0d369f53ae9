//! `LanguageHost` backed by a clangd process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::host::LanguageHost;
use crate::error::LspError;
use crate::infra::file_filter::FileFilter;
use crate::infra::lsp::LspClient;
use crate::infra::lsp::protocol::{
    DefinitionResponse, DocumentSymbolParams, DocumentSymbolResponse, TextDocumentIdentifier,
    TextDocumentPositionParams,
};
use crate::models::config::LspConfig;
use crate::models::lsp::{Location, Position, path_to_uri};
use crate::models::symbol::RawSymbol;

pub struct ClangdHost {
    client: Arc<LspClient>,
    filters: Vec<FileFilter>,
}

impl ClangdHost {
    /// Spawn the configured server for `roots` and finish the handshake.
    pub async fn start(roots: Vec<PathBuf>, config: &LspConfig) -> Result<Self, LspError> {
        let filters = roots.iter().map(FileFilter::with_gitignore).collect();
        let client = LspClient::new(roots);
        client.start(&config.command, &config.args).await?;
        Ok(Self { client, filters })
    }

    pub async fn shutdown(&self) -> Result<(), LspError> {
        self.client.shutdown().await
    }

    /// The server answers for the buffer it was sent, so send the file as it
    /// is on disk right now.
    async fn open(&self, path: &Path) -> Result<TextDocumentIdentifier, LspError> {
        let content = tokio::fs::read_to_string(path).await?;
        self.client.sync_document(path, &content).await?;
        Ok(TextDocumentIdentifier::new(path_to_uri(path)))
    }
}

#[async_trait]
impl LanguageHost for ClangdHost {
    async fn document_symbols(&self, path: &Path) -> Result<Option<Vec<RawSymbol>>, LspError> {
        let text_document = self.open(path).await?;
        let params = DocumentSymbolParams { text_document };
        let response: Option<DocumentSymbolResponse> = self
            .client
            .request(
                "textDocument/documentSymbol",
                Some(serde_json::to_value(params)?),
            )
            .await?;
        Ok(response.map(DocumentSymbolResponse::into_raw))
    }

    async fn definitions(
        &self,
        path: &Path,
        position: Position,
    ) -> Result<Option<Vec<Location>>, LspError> {
        let text_document = self.open(path).await?;
        let params = TextDocumentPositionParams {
            text_document,
            position,
        };
        let response: Option<DefinitionResponse> = self
            .client
            .request("textDocument/definition", Some(serde_json::to_value(params)?))
            .await?;
        Ok(response.map(DefinitionResponse::into_locations))
    }

    async fn find_files(&self, glob: &str) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = Vec::new();
        for filter in &self.filters {
            for file in filter.find_files(glob) {
                if !found.contains(&file) {
                    found.push(file);
                }
            }
        }
        debug!(%glob, files = found.len(), "workspace search");
        found
    }

    fn workspace_roots(&self) -> Vec<PathBuf> {
        self.client.roots().to_vec()
    }
}
