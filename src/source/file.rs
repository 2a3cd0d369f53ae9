//! Per-file symbol cache and cross-file lookups.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use super::csymbol::CSymbol;
use super::tree::{SymbolId, SymbolTree};
use crate::models::config::FileConfig;
use crate::models::lsp::{Location, Position, same_file};
use crate::services::host::LanguageHost;

/// One file's outline, fetched from the host on first use and kept until
/// [`SourceFile::invalidate`] is called.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    symbols: Option<SymbolTree>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            symbols: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached outline, populating it from `host` if needed. A host
    /// failure or an absent outline yields an empty tree.
    pub async fn symbols(&mut self, host: &dyn LanguageHost) -> &SymbolTree {
        if self.symbols.is_none() {
            let raw = match host.document_symbols(&self.path).await {
                Ok(Some(raw)) => raw,
                Ok(None) => Vec::new(),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "document symbols unavailable");
                    Vec::new()
                }
            };
            let tree = SymbolTree::build(&raw, &self.path);
            debug!(path = %self.path.display(), symbols = tree.len(), "symbol cache filled");
            self.symbols = Some(tree);
        }
        self.symbols
            .get_or_insert_with(|| SymbolTree::empty(&self.path))
    }

    /// The outline if it has been fetched.
    pub fn cached(&self) -> Option<&SymbolTree> {
        self.symbols.as_ref()
    }

    /// Drop the cached outline so the next query refetches it.
    pub fn invalidate(&mut self) {
        self.symbols = None;
    }

    pub async fn symbol_at(
        &mut self,
        host: &dyn LanguageHost,
        position: Position,
    ) -> Option<SymbolId> {
        self.symbols(host).await.symbol_at(position)
    }

    /// Symbol in this file that corresponds by name to `other`.
    pub async fn find_matching_symbol(
        &mut self,
        host: &dyn LanguageHost,
        other: &CSymbol<'_>,
    ) -> Option<SymbolId> {
        self.symbols(host)
            .await
            .find_by_first_chain(other.identifier())
    }

    /// The header for a source file or the source for a header: same stem,
    /// opposite extension set, closest directory. `None` for files that are
    /// neither.
    pub async fn find_matching_header_or_source(
        &self,
        host: &dyn LanguageHost,
        files: &FileConfig,
    ) -> Option<PathBuf> {
        let stem = self.path.file_stem()?.to_str()?;
        let counterparts = if files.is_header(&self.path) {
            &files.source_extensions
        } else if files.is_source(&self.path) {
            &files.header_extensions
        } else {
            return None;
        };

        let extensions: Vec<&str> = counterparts
            .iter()
            .map(|e| e.trim_start_matches('.'))
            .collect();
        let glob = format!("**/{}.{{{}}}", stem, extensions.join(","));
        let candidates = host.find_files(&glob).await;
        debug!(%glob, candidates = candidates.len(), "header/source search");

        let directory = self.path.parent().unwrap_or(Path::new(""));
        let mut best: Option<(usize, PathBuf)> = None;
        for candidate in candidates {
            let parent = candidate.parent().unwrap_or(Path::new(""));
            let distance = directory_distance(directory, parent);
            if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                best = Some((distance, candidate));
            }
        }
        best.map(|(_, path)| path)
    }
}

/// Path segments on either side that are not shared: `a/b/c` vs `a/d` is 3.
pub(crate) fn directory_distance(a: &Path, b: &Path) -> usize {
    let a: Vec<Component<'_>> = a.components().collect();
    let b: Vec<Component<'_>> = b.components().collect();
    let common = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    a.len() + b.len() - 2 * common
}

/// Resolve the definition of the symbol named at `position` in `file`.
///
/// A candidate in the same file that is not the query itself wins;
/// otherwise the first candidate under the first workspace root that has
/// one. The query itself is skipped in both passes: clangd answers with the
/// declaration when it knows no definition, and that must read as "none".
pub async fn find_definition(
    host: &dyn LanguageHost,
    file: &Path,
    position: Position,
) -> Option<Location> {
    let candidates = match host.definitions(file, position).await {
        Ok(Some(candidates)) => candidates,
        Ok(None) => return None,
        Err(e) => {
            warn!(path = %file.display(), error = %e, "definition lookup failed");
            return None;
        }
    };
    let is_self = |location: &Location| location.is_in(file) && location.range.contains(position);

    if let Some(local) = candidates
        .iter()
        .find(|l| same_file(&l.file, file) && !is_self(l))
    {
        return Some(local.clone());
    }

    for root in host.workspace_roots() {
        if let Some(found) = candidates
            .iter()
            .find(|l| l.file.starts_with(&root) && !is_self(l))
        {
            return Some(found.clone());
        }
    }
    debug!(path = %file.display(), candidates = candidates.len(), "no usable definition");
    None
}
