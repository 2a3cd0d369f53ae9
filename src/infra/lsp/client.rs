use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::time::timeout;

use super::protocol::{
    ClientCapabilities, ClientInfo, InitializeParams, InitializeResult, Message, Notification,
    Request, RequestId, Response, ResponseError, TextDocumentClientCapabilities,
    TextDocumentItem, WorkspaceFolder, error_codes,
};
use super::transport::{Transport, write_notification, write_request, write_response};
use crate::error::LspError;
use crate::infra::hash_content;
use crate::models::lsp::path_to_uri;

type PendingRequest = oneshot::Sender<Response>;

#[derive(Debug)]
struct DocumentState {
    version: u32,
    content_hash: u64,
}

/// JSON-RPC client for a single language server process
pub struct LspClient {
    roots: Vec<PathBuf>,
    process: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    next_id: AtomicU64,
    pending: RwLock<HashMap<RequestId, PendingRequest>>,
    documents: RwLock<HashMap<String, DocumentState>>,
    shutdown: AtomicBool,
    terminated: AtomicBool,
}

impl LspClient {
    /// The first root is the server's working directory and `rootUri`.
    pub fn new(roots: Vec<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            roots,
            process: Mutex::new(None),
            stdin: Mutex::new(None),
            next_id: AtomicU64::new(1),
            pending: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            shutdown: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        })
    }

    fn primary_root(&self) -> PathBuf {
        self.roots
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Spawn the server and run the `initialize` handshake
    pub async fn start(self: &Arc<Self>, command: &str, args: &[String]) -> Result<(), LspError> {
        if self.is_running().await {
            return Ok(());
        }

        tracing::info!("Starting language server: {} {:?}", command, args);

        let mut child = Command::new(command)
            .args(args)
            .current_dir(self.primary_root())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LspError::ServerStart(format!("{}: {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdout".to_string()))?;

        *self.process.lock().await = Some(child);
        *self.stdin.lock().await = Some(stdin);

        let client = Arc::clone(self);
        tokio::spawn(async move {
            client.read_responses(Transport::new(stdout)).await;
        });

        self.initialize().await?;

        tracing::info!("Language server started: {}", command);
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        let mut process = self.process.lock().await;
        match process.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    async fn initialize(&self) -> Result<(), LspError> {
        let root = self.primary_root();
        let params = InitializeParams {
            process_id: Some(std::process::id()),
            root_uri: Some(path_to_uri(&root)),
            workspace_folders: self
                .roots
                .iter()
                .map(PathBuf::as_path)
                .map(workspace_folder)
                .collect(),
            capabilities: Self::client_capabilities(),
            client_info: Some(ClientInfo {
                name: "cxxmate".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        };

        let result: InitializeResult = self
            .request("initialize", Some(serde_json::to_value(params)?))
            .await?;
        tracing::debug!(
            "Server supports documentSymbol: {}",
            result.capabilities.document_symbol_provider.is_some()
        );

        self.notify("initialized", Some(serde_json::json!({})))
            .await?;
        Ok(())
    }

    fn client_capabilities() -> ClientCapabilities {
        ClientCapabilities {
            general: Some(serde_json::json!({ "positionEncodings": ["utf-16"] })),
            text_document: Some(TextDocumentClientCapabilities {
                synchronization: Some(serde_json::json!({ "didSave": false })),
                definition: Some(serde_json::json!({ "linkSupport": true })),
                document_symbol: Some(serde_json::json!({
                    "hierarchicalDocumentSymbolSupport": true
                })),
            }),
        }
    }

    /// Send a request and wait for response
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, LspError> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(LspError::ServerTerminated);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.write().await.insert(RequestId::Number(id), tx);

        let request = Request::new(id, method, params);
        tracing::trace!("LSP request {}: {}", id, method);

        {
            let mut stdin_guard = self.stdin.lock().await;
            let Some(stdin) = stdin_guard.as_mut() else {
                self.pending.write().await.remove(&RequestId::Number(id));
                return Err(LspError::NotConnected);
            };
            write_request(stdin, &request).await?;
        }

        match timeout(crate::config::timeout_for(method), rx).await {
            Ok(Ok(response)) => match response.into_result() {
                Ok(result) => {
                    serde_json::from_value(result).map_err(|e| LspError::Protocol(e.to_string()))
                }
                Err(err) if err.code == error_codes::SERVER_TERMINATED => {
                    Err(LspError::ServerTerminated)
                }
                Err(err) => Err(err.into()),
            },
            Ok(Err(_)) => Err(LspError::RequestCancelled),
            Err(_) => {
                self.cancel_request(id).await;
                Err(LspError::Timeout(format!(
                    "'{}' timed out. The language server may be busy or unresponsive",
                    method
                )))
            }
        }
    }

    async fn cancel_request(&self, id: u64) {
        self.pending.write().await.remove(&RequestId::Number(id));
        let _ = self
            .notify("$/cancelRequest", Some(serde_json::json!({ "id": id })))
            .await;
    }

    /// Send a notification (no response expected)
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), LspError> {
        let notification = Notification::new(method, params);

        let mut stdin_guard = self.stdin.lock().await;
        let stdin = stdin_guard.as_mut().ok_or(LspError::NotConnected)?;
        write_notification(stdin, &notification).await?;
        Ok(())
    }

    async fn read_responses(self: Arc<Self>, mut transport: Transport<ChildStdout>) {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match transport.read_message().await {
                Ok(message) => self.handle_message(message).await,
                Err(e) => {
                    if !self.shutdown.load(Ordering::Acquire) {
                        tracing::error!("LSP read error: {}", e);
                        self.fail_pending(
                            error_codes::SERVER_TERMINATED,
                            "language server terminated unexpectedly",
                        )
                        .await;
                        self.terminated.store(true, Ordering::Release);
                    }
                    break;
                }
            }
        }
    }

    async fn fail_pending(&self, code: i32, reason: &str) {
        let mut pending = self.pending.write().await;
        if !pending.is_empty() {
            tracing::debug!("Cancelling {} pending requests: {}", pending.len(), reason);
        }
        for (id, sender) in pending.drain() {
            let error = ResponseError {
                code,
                message: reason.to_string(),
                data: None,
            };
            let _ = sender.send(Response::failure(Some(id), error));
        }
    }

    async fn handle_message(&self, message: Message) {
        match message {
            Message::Response(response) => {
                let Some(id) = response.id.clone() else {
                    return;
                };
                let mut pending = self.pending.write().await;
                // Some servers echo numeric ids back as strings
                let sender = pending.remove(&id).or_else(|| match &id {
                    RequestId::String(s) => s
                        .parse::<u64>()
                        .ok()
                        .and_then(|n| pending.remove(&RequestId::Number(n))),
                    RequestId::Number(_) => None,
                });
                match sender {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => tracing::debug!(
                        "Received response for unknown request ID {:?} (may have timed out)",
                        id
                    ),
                }
            }
            Message::Request(request) => self.handle_server_request(request).await,
            Message::Notification(notification) => match notification.method.as_str() {
                "window/logMessage" | "window/showMessage" => {
                    if let Some(msg) = notification
                        .params
                        .as_ref()
                        .and_then(|p| p.get("message"))
                        .and_then(|m| m.as_str())
                    {
                        tracing::debug!("clangd: {}", msg);
                    }
                }
                method => tracing::trace!("Unhandled notification: {}", method),
            },
        }
    }

    async fn handle_server_request(&self, request: Request) {
        let response = match request.method.as_str() {
            "workspace/configuration" => {
                let items = request
                    .params
                    .as_ref()
                    .and_then(|p| p.get("items"))
                    .and_then(|i| i.as_array())
                    .map_or(0, |arr| arr.len());
                Response::success(request.id, Value::Array(vec![Value::Null; items]))
            }
            "client/registerCapability"
            | "client/unregisterCapability"
            | "window/workDoneProgress/create" => Response::success(request.id, Value::Null),
            method => {
                tracing::debug!("Unhandled server request: {}", method);
                Response::failure(
                    Some(request.id),
                    ResponseError {
                        code: error_codes::METHOD_NOT_FOUND,
                        message: format!("Method not found: {}", method),
                        data: None,
                    },
                )
            }
        };

        let mut stdin_guard = self.stdin.lock().await;
        if let Some(stdin) = stdin_guard.as_mut() {
            let _ = write_response(stdin, &response).await;
        }
    }

    /// Open `path` on the server, or push new content when it changed since
    /// the last sync.
    pub async fn sync_document(&self, path: &Path, content: &str) -> Result<(), LspError> {
        let uri = path_to_uri(path);
        let hash = hash_content(content);
        let mut documents = self.documents.write().await;

        match documents.get_mut(&uri) {
            Some(state) if state.content_hash == hash => Ok(()),
            Some(state) => {
                state.version += 1;
                state.content_hash = hash;
                self.notify(
                    "textDocument/didChange",
                    Some(serde_json::json!({
                        "textDocument": { "uri": uri, "version": state.version },
                        "contentChanges": [{ "text": content }]
                    })),
                )
                .await
            }
            None => {
                let item = TextDocumentItem {
                    uri: uri.clone(),
                    language_id: language_id(path).to_string(),
                    version: 1,
                    text: content.to_string(),
                };
                self.notify(
                    "textDocument/didOpen",
                    Some(serde_json::json!({ "textDocument": item })),
                )
                .await?;
                documents.insert(
                    uri,
                    DocumentState {
                        version: 1,
                        content_hash: hash,
                    },
                );
                Ok(())
            }
        }
    }

    /// `shutdown` request, `exit` notification, then wait for (or kill) the
    /// process.
    pub async fn shutdown(&self) -> Result<(), LspError> {
        self.shutdown.store(true, Ordering::Release);

        if self.request::<Value>("shutdown", None).await.is_ok() {
            let _ = self.notify("exit", None).await;
        } else {
            tracing::debug!("LSP shutdown request failed or timed out");
        }

        self.stdin.lock().await.take();

        if let Some(mut child) = self.process.lock().await.take() {
            match timeout(Duration::from_secs(5), child.wait()).await {
                Ok(Ok(status)) => tracing::debug!("Language server exited: {:?}", status),
                Ok(Err(e)) => tracing::warn!("Language server wait error: {}", e),
                Err(_) => {
                    tracing::warn!("Language server termination timed out, forcing kill");
                    let _ = child.kill().await;
                }
            }
        }

        self.fail_pending(error_codes::REQUEST_CANCELLED, "Server shutdown")
            .await;
        Ok(())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        if let Ok(mut process_guard) = self.process.try_lock()
            && let Some(child) = process_guard.as_mut()
        {
            let _ = child.start_kill();
            tracing::debug!("LspClient dropped, process killed");
        }
    }
}

fn workspace_folder(root: &Path) -> WorkspaceFolder {
    WorkspaceFolder {
        uri: path_to_uri(root),
        name: root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// clangd only distinguishes C from C++ (and the Objective variants).
fn language_id(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("c") => "c",
        Some("m") => "objective-c",
        Some("mm") => "objective-cpp",
        _ => "cpp",
    }
}
