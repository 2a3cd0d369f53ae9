//! JSON-RPC 2.0 Protocol Implementation for LSP
//!
//! Defines the message types cxxmate exchanges with clangd.
//! Domain types (Position, Range, Location) are in models/lsp.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

pub use crate::models::lsp::{Position, Range};
use crate::models::lsp::{Location, uri_to_path};
use crate::models::symbol::{RawSymbol, SymbolKind};

// ============================================================================
// JSON-RPC 2.0 Core Types
// ============================================================================

/// JSON-RPC request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: RequestId::Number(id),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<RequestId>, error: ResponseError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn into_result(self) -> Result<Value, ResponseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// JSON-RPC notification (no id, no response expected)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Request ID (number or string)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ResponseError {}

/// Standard JSON-RPC and LSP error codes
pub mod error_codes {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const REQUEST_CANCELLED: i32 = -32800;
    /// Local code: the server went away while the request was pending
    pub const SERVER_TERMINATED: i32 = -32099;
}

/// Any incoming message
#[derive(Debug, Clone)]
pub enum Message {
    Response(Response),
    Request(Request),
    Notification(Notification),
}

impl Message {
    /// Classify by the presence of `id` and `method`
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let has_id = value.get("id").is_some();
        let has_method = value.get("method").is_some();

        match (has_id, has_method) {
            (true, true) => Ok(Message::Request(serde_json::from_value(value)?)),
            (true, false) => Ok(Message::Response(serde_json::from_value(value)?)),
            (false, true) => Ok(Message::Notification(serde_json::from_value(value)?)),
            (false, false) => {
                use serde::de::Error;
                Err(serde_json::Error::custom("Invalid LSP message"))
            }
        }
    }
}

// ============================================================================
// LSP Request Parameters
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

impl TextDocumentIdentifier {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Full document sent with `textDocument/didOpen`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentItem {
    pub uri: String,
    pub language_id: String,
    pub version: u32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentPositionParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSymbolParams {
    pub text_document: TextDocumentIdentifier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFolder {
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub process_id: Option<u32>,
    pub root_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workspace_folders: Vec<WorkspaceFolder>,
    pub capabilities: ClientCapabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
}

/// Only the capabilities cxxmate relies on are declared.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_document: Option<TextDocumentClientCapabilities>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentClientCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synchronization: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_symbol: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_provider: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_symbol_provider: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub capabilities: ServerCapabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// LSP Symbol Types
// ============================================================================

/// Symbol kind (LSP standard - integer values)
#[derive(Debug, Clone, Copy, Serialize_repr, Deserialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum LspSymbolKind {
    File = 1,
    Module = 2,
    Namespace = 3,
    Package = 4,
    Class = 5,
    Method = 6,
    Property = 7,
    Field = 8,
    Constructor = 9,
    Enum = 10,
    Interface = 11,
    Function = 12,
    Variable = 13,
    Constant = 14,
    String = 15,
    Number = 16,
    Boolean = 17,
    Array = 18,
    Object = 19,
    Key = 20,
    Null = 21,
    EnumMember = 22,
    Struct = 23,
    Event = 24,
    Operator = 25,
    TypeParameter = 26,
}

impl From<LspSymbolKind> for SymbolKind {
    fn from(kind: LspSymbolKind) -> Self {
        SymbolKind::from_lsp(kind as u32)
    }
}

/// Location in a document (LSP wire format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LspLocation {
    pub uri: String,
    #[serde(default)]
    pub range: Range,
}

impl LspLocation {
    /// `None` for anything not backed by the local filesystem.
    pub fn into_location(self) -> Option<Location> {
        if !self.uri.starts_with("file://") {
            return None;
        }
        Some(Location::new(uri_to_path(&self.uri), self.range))
    }
}

/// LocationLink - returned by clangd when the client advertises `linkSupport`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationLink {
    pub target_uri: String,
    pub target_range: Range,
    pub target_selection_range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_selection_range: Option<Range>,
}

impl LocationLink {
    pub fn to_location(&self) -> LspLocation {
        LspLocation {
            uri: self.target_uri.clone(),
            range: self.target_selection_range,
        }
    }
}

/// Hierarchical document symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSymbol {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub kind: LspSymbolKind,
    pub range: Range,
    pub selection_range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DocumentSymbol>>,
}

impl From<DocumentSymbol> for RawSymbol {
    fn from(symbol: DocumentSymbol) -> Self {
        RawSymbol {
            name: symbol.name,
            detail: symbol.detail,
            kind: symbol.kind.into(),
            range: symbol.range,
            selection_range: symbol.selection_range,
            children: symbol
                .children
                .unwrap_or_default()
                .into_iter()
                .map(RawSymbol::from)
                .collect(),
        }
    }
}

/// Flat symbol information (older servers)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInformation {
    pub name: String,
    pub kind: LspSymbolKind,
    pub location: LspLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

impl From<SymbolInformation> for RawSymbol {
    fn from(symbol: SymbolInformation) -> Self {
        let range = symbol.location.range;
        RawSymbol::new(symbol.name, symbol.kind.into(), range, range)
    }
}

/// `textDocument/documentSymbol` result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentSymbolResponse {
    Nested(Vec<DocumentSymbol>),
    Flat(Vec<SymbolInformation>),
}

impl DocumentSymbolResponse {
    pub fn into_raw(self) -> Vec<RawSymbol> {
        match self {
            Self::Nested(symbols) => symbols.into_iter().map(RawSymbol::from).collect(),
            Self::Flat(symbols) => symbols.into_iter().map(RawSymbol::from).collect(),
        }
    }
}

/// `textDocument/definition` result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefinitionResponse {
    Single(LspLocation),
    Many(Vec<LspLocation>),
    Links(Vec<LocationLink>),
}

impl DefinitionResponse {
    /// Candidates in server order; non-file URIs are dropped.
    pub fn into_locations(self) -> Vec<Location> {
        let wire = match self {
            Self::Single(location) => vec![location],
            Self::Many(locations) => locations,
            Self::Links(links) => links.iter().map(LocationLink::to_location).collect(),
        };
        wire.into_iter()
            .filter_map(LspLocation::into_location)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::new(1, "initialize", Some(serde_json::json!({})));
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"method\":\"initialize\""));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"jsonrpc":"2.0","id":1,"result":{"capabilities":{}}}"#;
        let resp: Response = serde_json::from_str(json).unwrap();
        assert_eq!(resp.id, Some(RequestId::Number(1)));
        assert!(resp.into_result().unwrap()["capabilities"].is_object());
    }

    #[test]
    fn test_error_response() {
        let json =
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#;
        let resp: Response = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_result().unwrap_err().code, error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_message_classification() {
        let request = r#"{"jsonrpc":"2.0","id":3,"method":"workspace/configuration"}"#;
        assert!(matches!(Message::parse(request).unwrap(), Message::Request(_)));

        let note = r#"{"jsonrpc":"2.0","method":"window/logMessage","params":{}}"#;
        assert!(matches!(Message::parse(note).unwrap(), Message::Notification(_)));

        assert!(Message::parse(r#"{"jsonrpc":"2.0"}"#).is_err());
    }

    #[test]
    fn test_nested_document_symbols() {
        let json = r#"[{
            "name": "Widget", "detail": "class", "kind": 5,
            "range": {"start": {"line": 0, "character": 0}, "end": {"line": 4, "character": 1}},
            "selectionRange": {"start": {"line": 0, "character": 6}, "end": {"line": 0, "character": 12}},
            "children": [{
                "name": "resize", "detail": "declaration", "kind": 6,
                "range": {"start": {"line": 2, "character": 4}, "end": {"line": 2, "character": 20}},
                "selectionRange": {"start": {"line": 2, "character": 9}, "end": {"line": 2, "character": 15}}
            }]
        }]"#;
        let response: DocumentSymbolResponse = serde_json::from_str(json).unwrap();
        let raw = response.into_raw();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].kind, SymbolKind::Class);
        assert_eq!(raw[0].children[0].name, "resize");
        assert_eq!(raw[0].children[0].detail.as_deref(), Some("declaration"));
    }

    #[test]
    fn test_flat_symbol_information() {
        let json = r#"[{
            "name": "main", "kind": 12,
            "location": {"uri": "file:///src/main.cpp",
                "range": {"start": {"line": 1, "character": 0}, "end": {"line": 3, "character": 1}}}
        }]"#;
        let response: DocumentSymbolResponse = serde_json::from_str(json).unwrap();
        let raw = response.into_raw();
        assert_eq!(raw[0].kind, SymbolKind::Function);
        assert_eq!(raw[0].selection_range, raw[0].range);
    }

    #[test]
    fn test_definition_shapes() {
        let single = r#"{"uri": "file:///a.cpp",
            "range": {"start": {"line": 1, "character": 0}, "end": {"line": 1, "character": 3}}}"#;
        let response: DefinitionResponse = serde_json::from_str(single).unwrap();
        assert_eq!(response.into_locations().len(), 1);

        let links = r#"[{"targetUri": "file:///b.cpp",
            "targetRange": {"start": {"line": 5, "character": 0}, "end": {"line": 9, "character": 1}},
            "targetSelectionRange": {"start": {"line": 5, "character": 5}, "end": {"line": 5, "character": 8}}}]"#;
        let response: DefinitionResponse = serde_json::from_str(links).unwrap();
        let locations = response.into_locations();
        assert_eq!(locations[0].file, std::path::PathBuf::from("/b.cpp"));
        assert_eq!(locations[0].range.start, Position::new(5, 5));

        let empty: DefinitionResponse = serde_json::from_str("[]").unwrap();
        assert!(empty.into_locations().is_empty());
    }
}
