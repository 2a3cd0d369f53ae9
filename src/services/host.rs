//! Capabilities the source model borrows from its host.
//!
//! The model never parses C/C++ itself: outlines and definition candidates
//! come from whatever implements [`LanguageHost`] (clangd in the CLI, an
//! in-memory fake in tests).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::LspError;
use crate::models::lsp::{Location, Position};
use crate::models::symbol::RawSymbol;

#[async_trait]
pub trait LanguageHost: Send + Sync {
    /// Hierarchical outline of `path`; `Ok(None)` when the provider has none.
    async fn document_symbols(&self, path: &Path) -> Result<Option<Vec<RawSymbol>>, LspError>;

    /// Definition candidates for the symbol at `position`, in provider order.
    async fn definitions(
        &self,
        path: &Path,
        position: Position,
    ) -> Result<Option<Vec<Location>>, LspError>;

    /// Local files in the workspace matching a glob such as
    /// `**/widget.{cpp,cc}`.
    async fn find_files(&self, glob: &str) -> Vec<PathBuf>;

    /// Open workspace roots in priority order.
    fn workspace_roots(&self) -> Vec<PathBuf>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// In-memory host: outlines and definition answers are registered up
    /// front, file search is a glob-free suffix match over `files`.
    #[derive(Default)]
    pub(crate) struct FakeHost {
        pub symbols: HashMap<PathBuf, Vec<RawSymbol>>,
        pub definitions: HashMap<(PathBuf, Position), Vec<Location>>,
        pub files: Vec<PathBuf>,
        pub roots: Vec<PathBuf>,
        pub failing: bool,
        pub symbol_requests: AtomicUsize,
        pub globs: Mutex<Vec<String>>,
    }

    impl FakeHost {
        pub(crate) fn with_symbols(
            mut self,
            path: impl Into<PathBuf>,
            symbols: Vec<RawSymbol>,
        ) -> Self {
            self.symbols.insert(path.into(), symbols);
            self
        }

        pub(crate) fn with_definition(
            mut self,
            path: impl Into<PathBuf>,
            position: Position,
            locations: Vec<Location>,
        ) -> Self {
            self.definitions.insert((path.into(), position), locations);
            self
        }

        pub(crate) fn with_files(mut self, files: &[&str]) -> Self {
            self.files.extend(files.iter().map(PathBuf::from));
            self
        }

        pub(crate) fn with_roots(mut self, roots: &[&str]) -> Self {
            self.roots.extend(roots.iter().map(PathBuf::from));
            self
        }

        pub(crate) fn failing(mut self) -> Self {
            self.failing = true;
            self
        }
    }

    #[async_trait]
    impl LanguageHost for FakeHost {
        async fn document_symbols(&self, path: &Path) -> Result<Option<Vec<RawSymbol>>, LspError> {
            self.symbol_requests.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(LspError::NotConnected);
            }
            Ok(self.symbols.get(path).cloned())
        }

        async fn definitions(
            &self,
            path: &Path,
            position: Position,
        ) -> Result<Option<Vec<Location>>, LspError> {
            if self.failing {
                return Err(LspError::Timeout("fake".to_string()));
            }
            Ok(self
                .definitions
                .get(&(path.to_path_buf(), position))
                .cloned())
        }

        /// Understands only `**/{stem}.{ext,ext}`.
        async fn find_files(&self, glob: &str) -> Vec<PathBuf> {
            self.globs
                .lock()
                .expect("glob log lock")
                .push(glob.to_string());
            let Some(pattern) = glob.strip_prefix("**/") else {
                return Vec::new();
            };
            let (stem, exts) = match pattern.split_once(".{") {
                Some((stem, rest)) => (stem, rest.trim_end_matches('}').split(',').collect()),
                None => match pattern.rsplit_once('.') {
                    Some((stem, ext)) => (stem, vec![ext]),
                    None => return Vec::new(),
                },
            };
            self.files
                .iter()
                .filter(|f| {
                    f.file_stem().and_then(|s| s.to_str()) == Some(stem)
                        && f.extension()
                            .and_then(|e| e.to_str())
                            .is_some_and(|e| exts.contains(&e))
                })
                .cloned()
                .collect()
        }

        fn workspace_roots(&self) -> Vec<PathBuf> {
            self.roots.clone()
        }
    }
}
