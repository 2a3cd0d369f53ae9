//! Data models for cxxmate
//!
//! Contains core type definitions used throughout the application.

pub mod config;
pub mod lsp;
pub mod symbol;

// Re-export commonly used types
pub use config::{CxxConfig, FileConfig, GuardConfig, GuardStyle};
pub use lsp::{Location, Position, Range};
pub use symbol::{RawSymbol, SymbolKind};
