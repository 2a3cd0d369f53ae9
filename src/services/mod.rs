//! Service layer for cxxmate

pub mod clangd;
pub mod config;
pub mod host;

pub use clangd::ClangdHost;
pub use config::{ConfigService, DefaultConfigService};
pub use host::LanguageHost;
