//! Global Configuration Singleton

use std::sync::OnceLock;
use std::time::Duration;

use crate::models::config::CxxConfig;

static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Request,
    /// `textDocument/definition` may trigger cross-file indexing in clangd
    CrossFile,
    Initialization,
    Shutdown,
}

impl OperationType {
    pub fn from_method(method: &str) -> Self {
        match method {
            "textDocument/definition" => Self::CrossFile,
            "initialize" => Self::Initialization,
            "shutdown" => Self::Shutdown,
            _ => Self::Request,
        }
    }

    fn base_multiplier(self) -> f64 {
        match self {
            Self::Request => 1.0,
            Self::CrossFile => 2.0,
            Self::Initialization => 2.0,
            Self::Shutdown => 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    base_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&CxxConfig> for RuntimeConfig {
    fn from(config: &CxxConfig) -> Self {
        Self {
            base_timeout: Duration::from_secs(config.lsp.timeout_secs),
        }
    }
}

impl RuntimeConfig {
    pub fn timeout_for(&self, method: &str) -> Duration {
        let multiplier = OperationType::from_method(method).base_multiplier();
        Duration::from_secs_f64(self.base_timeout.as_secs_f64() * multiplier)
    }
}

pub fn init(config: &CxxConfig) {
    let _ = CONFIG.set(RuntimeConfig::from(config));
}

pub fn timeout_for(method: &str) -> Duration {
    config().timeout_for(method)
}

fn config() -> RuntimeConfig {
    CONFIG.get().cloned().unwrap_or_default()
}
