//! A C/C++ file together with its text.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::csymbol::CSymbol;
use super::file::{SourceFile, find_definition};
use super::mask::mask_comments;
use super::placement::{
    IncludePositions, ProposedPosition, find_position_for_new_header_guard,
    find_position_for_new_include, statement_end,
};
use super::text::TextDocument;
use super::tree::{SymbolId, SymbolTree};
use crate::error::CxxResult;
use crate::models::config::GuardConfig;
use crate::models::lsp::{Position, Range};
use crate::services::host::LanguageHost;

static PRAGMA_ONCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\s*#[ \t]*pragma[ \t]+once\b").expect("valid pragma regex"));

/// Symbol-level queries need the outline: call [`SourceDocument::symbols`]
/// once before using the synchronous accessors.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    file: SourceFile,
    text: TextDocument,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            file: SourceFile::new(path),
            text: TextDocument::new(text),
        }
    }

    pub async fn open(path: impl Into<PathBuf>) -> CxxResult<Self> {
        let path = path.into();
        let text = tokio::fs::read_to_string(&path).await?;
        Ok(Self::new(path, text))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn text(&self) -> &TextDocument {
        &self.text
    }

    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    pub async fn symbols(&mut self, host: &dyn LanguageHost) -> &SymbolTree {
        self.file.symbols(host).await
    }

    pub fn symbol_at(&self, position: Position) -> Option<CSymbol<'_>> {
        let tree = self.file.cached()?;
        let id = tree.symbol_at(position)?;
        Some(CSymbol::new(tree, &self.text, id))
    }

    /// Top-level symbols as semantic views.
    pub fn top_level(&self) -> Vec<CSymbol<'_>> {
        match self.file.cached() {
            Some(tree) => tree
                .roots()
                .iter()
                .map(|&id| CSymbol::new(tree, &self.text, id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// `#pragma once` before any code, an `#ifndef`/`#define` pair for the
    /// configured macro, or a top-level symbol named like that macro.
    pub async fn has_header_guard(
        &mut self,
        host: &dyn LanguageHost,
        guard: &GuardConfig,
    ) -> bool {
        if PRAGMA_ONCE.is_match(&mask_comments(self.text.text())) {
            return true;
        }
        let name = guard.macro_for(self.path());
        if defines_guard_macro(&self.text, &name) {
            return true;
        }
        let tree = self.symbols(host).await;
        tree.roots().iter().any(|&id| tree.node(id).name == name)
    }

    pub fn find_position_for_new_header_guard(&self) -> ProposedPosition {
        find_position_for_new_header_guard(&self.text)
    }

    pub async fn find_position_for_new_include(
        &mut self,
        host: &dyn LanguageHost,
    ) -> IncludePositions {
        let tree = self.file.symbols(host).await;
        find_position_for_new_include(tree, &self.text)
    }

    /// Where the out-of-line definition of `declaration` should go in this
    /// document.
    ///
    /// The nearest sibling whose own definition already lives here anchors
    /// it: after a preceding sibling's definition, or before a following
    /// one's. Without an anchor the definition goes after the last top-level
    /// symbol.
    pub async fn find_position_for_new_definition(
        &mut self,
        host: &dyn LanguageHost,
        declaration: &CSymbol<'_>,
    ) -> ProposedPosition {
        let source = declaration.tree();
        if source.is_empty() {
            return ProposedPosition::default();
        }
        let target_is_empty = self.symbols(host).await.is_empty();
        if declaration.parent().is_none() && target_is_empty {
            return ProposedPosition::default();
        }

        let siblings = source.siblings(declaration.id());
        let Some(index) = siblings.iter().position(|&id| id == declaration.id()) else {
            return self.after_last_symbol();
        };

        for &sibling in siblings[..index].iter().rev() {
            if let Some(range) = self.resolve_here(host, source, sibling).await {
                debug!(anchor = %source.node(sibling).name, "definition goes after sibling");
                return ProposedPosition::after(statement_end(&self.text, range.end));
            }
        }
        for &sibling in &siblings[index + 1..] {
            if let Some(range) = self.resolve_here(host, source, sibling).await {
                debug!(anchor = %source.node(sibling).name, "definition goes before sibling");
                return ProposedPosition::before(range.start);
            }
        }
        self.after_last_symbol()
    }

    /// Full range, in this document, of the definition of `id` from `tree`.
    async fn resolve_here(
        &self,
        host: &dyn LanguageHost,
        tree: &SymbolTree,
        id: SymbolId,
    ) -> Option<Range> {
        let node = tree.node(id);
        let location = find_definition(host, tree.file(), node.selection_range.start).await?;
        if !location.is_in(self.path()) {
            return None;
        }
        let here = self.file.cached()?;
        Some(
            here.symbol_at(location.range.start)
                .map_or(location.range, |found| here.node(found).range),
        )
    }

    fn after_last_symbol(&self) -> ProposedPosition {
        if let Some(tree) = self.file.cached()
            && let Some(&last) = tree.roots().last()
        {
            return ProposedPosition::after(statement_end(&self.text, tree.node(last).range.end));
        }
        let trimmed = self.text.text().trim_end().len();
        if trimmed == 0 {
            ProposedPosition::default()
        } else {
            ProposedPosition::after(self.text.position_at(trimmed))
        }
    }
}

/// `#ifndef NAME` directly followed by `#define NAME`, comments ignored.
fn defines_guard_macro(text: &TextDocument, name: &str) -> bool {
    let masked = mask_comments(text.text());
    let mut directives = masked
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());
    let directive = |line: Option<&str>, keyword: &str| {
        line.and_then(|l| l.strip_prefix('#'))
            .map(str::trim_start)
            .and_then(|l| l.strip_prefix(keyword))
            .is_some_and(|rest| rest.split_whitespace().next() == Some(name))
    };
    directive(directives.next(), "ifndef") && directive(directives.next(), "define")
}
