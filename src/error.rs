//! Error types for cxxmate
//!
//! Only the host side can fail: lookups in the source model report "no
//! result" through `Option` instead.

use thiserror::Error;

pub type CxxResult<T> = std::result::Result<T, CxxError>;

#[derive(Debug, Error)]
pub enum CxxError {
    #[error("{0}")]
    Lsp(#[from] LspError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Invalid location '{input}': {reason}")]
    InvalidLocation { input: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LspError {
    #[error("Failed to start server: {0}. Is clangd installed and on PATH?")]
    ServerStart(String),

    #[error("Server not connected")]
    NotConnected,

    #[error("Language server terminated unexpectedly")]
    ServerTerminated,

    #[error("{0}")]
    Timeout(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Server error [{code}]: {message}")]
    ServerError { code: i32, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LspError {
    const CANCELLED_ERROR_CODE: i32 = -32800;
    const CONTENT_MODIFIED_CODE: i32 = -32801;

    pub fn error_code(&self) -> i32 {
        match self {
            Self::ServerError { code, .. } => *code,
            Self::ServerTerminated => -32099,
            Self::Timeout(_) => -32001,
            Self::NotConnected => -32003,
            Self::RequestCancelled => Self::CANCELLED_ERROR_CODE,
            _ => -32000,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::RequestCancelled)
            || matches!(self, Self::ServerError { code, .. } if *code == Self::CANCELLED_ERROR_CODE)
    }

    /// Errors after which the server process is gone for good.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ServerStart(_) | Self::ServerTerminated | Self::NotConnected
        )
    }

    pub fn server_error_friendly(code: i32, message: String) -> Self {
        let message = match code {
            -32601 => format!("Feature not supported: {}", message),
            -32002 => "Server initializing. Try again in a moment.".to_string(),
            Self::CONTENT_MODIFIED_CODE => {
                "File changed during operation. Please retry.".to_string()
            }
            _ if message.trim().is_empty() => {
                "Operation failed. The position may be invalid.".to_string()
            }
            _ => message,
        };
        Self::ServerError { code, message }
    }
}

impl From<crate::infra::lsp::protocol::ResponseError> for LspError {
    fn from(err: crate::infra::lsp::protocol::ResponseError) -> Self {
        LspError::server_error_friendly(err.code, err.message)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::lsp::protocol::ResponseError;

    #[test]
    fn test_terminated_is_fatal() {
        let err = LspError::ServerTerminated;
        assert!(err.is_fatal());
        assert_eq!(err.error_code(), -32099);
        assert!(!LspError::Timeout("slow".to_string()).is_fatal());
    }

    #[test]
    fn test_cancelled_error() {
        assert!(LspError::RequestCancelled.is_cancelled());

        let server_cancelled = LspError::ServerError {
            code: -32800,
            message: "cancelled".to_string(),
        };
        assert!(server_cancelled.is_cancelled());
    }

    #[test]
    fn test_friendly_server_errors() {
        let err: LspError = ResponseError {
            code: -32601,
            message: "textDocument/foo".to_string(),
            data: None,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Server error [-32601]: Feature not supported: textDocument/foo"
        );

        let err = LspError::server_error_friendly(-32603, "  ".to_string());
        assert_eq!(err.error_code(), -32603);
        assert!(err.to_string().contains("position may be invalid"));
    }

    #[test]
    fn test_top_level_conversion() {
        let err: CxxError = LspError::NotConnected.into();
        assert_eq!(err.to_string(), "Server not connected");

        let err = CxxError::InvalidLocation {
            input: "a.h:x".to_string(),
            reason: "line is not a number".to_string(),
        };
        assert!(err.to_string().starts_with("Invalid location 'a.h:x'"));
    }
}
