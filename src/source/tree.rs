//! Generic symbol tree built from a document-symbol provider's outline.
//!
//! Nodes live in an arena owned by [`SymbolTree`]; parent links are arena
//! indices, so ownership only ever runs from parent to children.

use std::path::{Path, PathBuf};

use crate::models::lsp::{Position, Range};
use crate::models::symbol::{RawSymbol, SymbolKind, plain_identifier};

/// Index of a node inside its owning [`SymbolTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(usize);

#[derive(Debug, Clone)]
pub struct SymbolNode {
    pub name: String,
    pub detail: Option<String>,
    pub kind: SymbolKind,
    pub range: Range,
    pub selection_range: Range,
    parent: Option<SymbolId>,
    children: Vec<SymbolId>,
}

impl SymbolNode {
    /// Name without scope qualification, template arguments or parameters.
    pub fn identifier(&self) -> &str {
        plain_identifier(&self.name)
    }

    pub fn parent(&self) -> Option<SymbolId> {
        self.parent
    }

    pub fn children(&self) -> &[SymbolId] {
        &self.children
    }
}

/// Immutable snapshot of one file's outline.
#[derive(Debug, Clone)]
pub struct SymbolTree {
    file: PathBuf,
    nodes: Vec<SymbolNode>,
    roots: Vec<SymbolId>,
}

impl SymbolTree {
    pub fn empty(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Deep-copy a raw outline, sorting every level by range start and
    /// linking each child to its parent.
    pub fn build(raw: &[RawSymbol], file: impl Into<PathBuf>) -> Self {
        let mut tree = Self::empty(file);
        tree.roots = tree.insert_level(raw, None);
        tree
    }

    fn insert_level(&mut self, raw: &[RawSymbol], parent: Option<SymbolId>) -> Vec<SymbolId> {
        let mut sorted: Vec<&RawSymbol> = raw.iter().collect();
        sorted.sort_by_key(|s| s.range.start);

        let mut ids = Vec::with_capacity(sorted.len());
        for symbol in sorted {
            let id = SymbolId(self.nodes.len());
            self.nodes.push(SymbolNode {
                name: symbol.name.clone(),
                detail: symbol.detail.clone(),
                kind: symbol.kind,
                range: symbol.range,
                selection_range: symbol.selection_range,
                parent,
                children: Vec::new(),
            });
            let children = self.insert_level(&symbol.children, Some(id));
            self.nodes[id.0].children = children;
            ids.push(id);
        }
        ids
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> &[SymbolId] {
        &self.roots
    }

    pub fn node(&self, id: SymbolId) -> &SymbolNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: SymbolId) -> Option<SymbolId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: SymbolId) -> &[SymbolId] {
        &self.nodes[id.0].children
    }

    /// The level `id` lives on, itself included.
    pub fn siblings(&self, id: SymbolId) -> &[SymbolId] {
        match self.parent(id) {
            Some(parent) => self.children(parent),
            None => &self.roots,
        }
    }

    /// Enclosing symbols from the outermost down to the immediate parent.
    pub fn ancestors(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.parent(parent);
        }
        chain.reverse();
        chain
    }

    /// All ids in depth-first pre-order.
    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        let mut stack: Vec<SymbolId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// Deepest symbol whose range contains `pos`.
    pub fn symbol_at(&self, pos: Position) -> Option<SymbolId> {
        let mut found = None;
        let mut level = self.roots.as_slice();
        while let Some(&hit) = level.iter().find(|&&id| self.node(id).range.contains(pos)) {
            found = Some(hit);
            level = self.children(hit);
        }
        found
    }

    /// Symbols are identified by range: trees are rebuilt per query, so ids
    /// from another snapshot are meaningless here.
    pub fn find_by_range(&self, range: &Range) -> Option<SymbolId> {
        self.iter().find(|&id| self.node(id).range == *range)
    }

    /// Shallow name-based correspondence: walk down the first symbol of each
    /// level and return the first one whose identifier equals `identifier`.
    pub fn find_by_first_chain(&self, identifier: &str) -> Option<SymbolId> {
        let mut level = self.roots.as_slice();
        while let Some(&first) = level.first() {
            if self.node(first).identifier() == identifier {
                return Some(first);
            }
            level = self.children(first);
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn range(l1: u32, c1: u32, l2: u32, c2: u32) -> Range {
        Range::new(Position::new(l1, c1), Position::new(l2, c2))
    }

    fn raw(name: &str, kind: SymbolKind, r: Range) -> RawSymbol {
        RawSymbol::new(name, kind, r, Range::point(r.start))
    }

    fn sample() -> SymbolTree {
        // Children deliberately out of order.
        let class = raw("Widget", SymbolKind::Class, range(2, 0, 10, 2)).with_children(vec![
            raw("setSize", SymbolKind::Method, range(6, 4, 6, 30)),
            raw("m_size", SymbolKind::Field, range(8, 4, 8, 15)),
            raw("size", SymbolKind::Method, range(5, 4, 5, 30)),
        ]);
        let ns = raw("ui", SymbolKind::Namespace, range(0, 0, 12, 1)).with_children(vec![class]);
        let free = raw("helper", SymbolKind::Function, range(14, 0, 14, 20));
        SymbolTree::build(&[free, ns], "/src/widget.h")
    }

    fn assert_sorted(tree: &SymbolTree, level: &[SymbolId]) {
        for pair in level.windows(2) {
            assert!(tree.node(pair[0]).range.start <= tree.node(pair[1]).range.start);
        }
        for &id in level {
            assert_sorted(tree, tree.children(id));
        }
    }

    #[test]
    fn test_every_level_is_sorted() {
        let tree = sample();
        assert_sorted(&tree, tree.roots());
        assert_eq!(tree.node(tree.roots()[0]).name, "ui");
    }

    #[test]
    fn test_parent_consistency() {
        let tree = sample();
        for id in tree.iter() {
            if let Some(parent) = tree.parent(id) {
                let range = tree.node(id).range;
                assert!(
                    tree.children(parent)
                        .iter()
                        .any(|&c| tree.node(c).range == range)
                );
            }
        }
    }

    #[test]
    fn test_ancestors_outermost_first() {
        let tree = sample();
        let field = tree.find_by_range(&range(8, 4, 8, 15)).unwrap();
        let names: Vec<_> = tree
            .ancestors(field)
            .into_iter()
            .map(|id| tree.node(id).name.as_str())
            .collect();
        assert_eq!(names, ["ui", "Widget"]);
        assert!(tree.ancestors(tree.roots()[1]).is_empty());
    }

    #[test]
    fn test_symbol_at_descends_to_deepest() {
        let tree = sample();
        let hit = tree.symbol_at(Position::new(6, 10)).unwrap();
        assert_eq!(tree.node(hit).name, "setSize");
        let hit = tree.symbol_at(Position::new(3, 0)).unwrap();
        assert_eq!(tree.node(hit).name, "Widget");
        assert!(tree.symbol_at(Position::new(13, 0)).is_none());
    }

    #[test]
    fn test_iter_is_preorder() {
        let tree = sample();
        let names: Vec<_> = tree.iter().map(|id| tree.node(id).name.clone()).collect();
        assert_eq!(
            names,
            ["ui", "Widget", "size", "setSize", "m_size", "helper"]
        );
    }

    #[test]
    fn test_find_by_first_chain_is_shallow() {
        let tree = sample();
        assert!(tree.find_by_first_chain("Widget").is_some());
        assert!(tree.find_by_first_chain("size").is_some());
        // Not on the first-symbol chain.
        assert!(tree.find_by_first_chain("helper").is_none());
    }

    #[test]
    fn test_empty_tree() {
        let tree = SymbolTree::build(&[], "/src/empty.h");
        assert!(tree.is_empty());
        assert!(tree.symbol_at(Position::new(0, 0)).is_none());
    }
}
