//! LSP infrastructure for cxxmate
//!
//! Just enough of the Language Server Protocol to drive clangd:
//! - JSON-RPC 2.0 protocol types
//! - Async message transport with Content-Length framing
//! - Client with atomic request IDs and per-method timeouts

pub mod client;
pub mod protocol;
pub mod transport;

pub use client::LspClient;
