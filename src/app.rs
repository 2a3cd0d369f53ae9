//! Application container for cxxmate

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::cli::OutputContext;
use crate::config;
use crate::models::config::CxxConfig;
use crate::services::clangd::ClangdHost;
use crate::services::config::{ConfigService, DefaultConfigService};

pub struct App {
    root: PathBuf,
    pub(crate) output: OutputContext,
    pub(crate) config_service: Arc<dyn ConfigService>,
    pub(crate) config: CxxConfig,
    host: OnceCell<Arc<ClangdHost>>,
}

impl App {
    pub async fn new() -> anyhow::Result<Self> {
        let root = std::env::current_dir()?;
        Self::with_root(root).await
    }

    pub async fn with_root(root: PathBuf) -> anyhow::Result<Self> {
        tracing::debug!("Initializing cxxmate at {:?}", root);

        let output = OutputContext::new(root.clone());
        let config_service = Arc::new(DefaultConfigService::new(&root));
        let config = match config_service.load(false).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {}", e);
                CxxConfig::default()
            }
        };

        config::init(&config);

        Ok(Self {
            root,
            output,
            config_service,
            config,
            host: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &CxxConfig {
        &self.config
    }

    /// The clangd host, started on first use.
    pub async fn host(&self) -> anyhow::Result<Arc<ClangdHost>> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let host = ClangdHost::start(vec![self.root.clone()], &self.config.lsp).await?;
                Ok::<_, crate::error::LspError>(Arc::new(host))
            })
            .await?;
        Ok(Arc::clone(host))
    }

    /// Stop clangd if a command started it.
    pub async fn shutdown(&self) {
        if let Some(host) = self.host.get()
            && let Err(e) = host.shutdown().await
        {
            tracing::debug!("clangd shutdown failed: {}", e);
        }
    }
}
