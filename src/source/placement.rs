//! Insertion-point heuristics.
//!
//! Pure functions of a symbol tree and its text: nothing here talks to the
//! language server. Definition placement, which has to resolve sibling
//! definitions, lives on [`super::document::SourceDocument`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::csymbol::CSymbol;
use super::mask::{mask_all, mask_comments};
use super::text::TextDocument;
use super::tree::SymbolTree;
use crate::models::lsp::{Position, Range};

static PUBLIC_SPECIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpublic\s*:(?:[^:]|$)").expect("valid access regex"));
static ACCESS_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:public|protected|private)\s*:(?:[^:]|$)").expect("valid access regex")
});
static SYSTEM_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*include\s*<[^>]*>").expect("valid include regex"));
static PROJECT_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*#\s*include\s*"[^"]*""#).expect("valid include regex"));

/// An anchor plus placement intent. `next_to` asks for no blank line
/// between the anchor and the inserted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedPosition {
    pub value: Position,
    pub before: bool,
    pub after: bool,
    pub next_to: bool,
}

impl ProposedPosition {
    pub fn before(value: Position) -> Self {
        Self {
            value,
            before: true,
            ..Default::default()
        }
    }

    pub fn after(value: Position) -> Self {
        Self {
            value,
            after: true,
            ..Default::default()
        }
    }

    pub fn next_to(mut self) -> Self {
        self.next_to = true;
        self
    }

    /// Whether text inserted here lands lexically inside `range`. Inserting
    /// after its end or before its start stays outside.
    pub fn is_within(&self, range: Range) -> bool {
        range.contains(self.value)
            && !(self.after && self.value == range.end)
            && !(self.before && self.value == range.start)
    }
}

/// Where new `#include` lines of each kind should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncludePositions {
    pub system: Position,
    pub project: Position,
}

/// Skip a trailing `;` run that symbol ranges leave out.
pub fn statement_end(doc: &TextDocument, pos: Position) -> Position {
    let bytes = doc.text().as_bytes();
    let mut offset = doc.offset_at(pos);
    while bytes.get(offset) == Some(&b';') {
        offset += 1;
    }
    doc.position_at(offset)
}

/// Before the first token that is not a comment, so a file banner stays on
/// top. A file of only comments gets the guard after them.
pub fn find_position_for_new_header_guard(doc: &TextDocument) -> ProposedPosition {
    let masked = mask_comments(doc.text());
    if let Some(first) = masked.find(|c: char| !c.is_whitespace()) {
        return ProposedPosition::before(doc.position_at(first));
    }

    let trimmed = doc.text().trim_end().len();
    if trimmed == 0 {
        return ProposedPosition::default();
    }
    ProposedPosition::after(doc.position_at(trimmed))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IncludeKind {
    System,
    Project,
}

#[derive(Debug, Clone, Copy)]
struct IncludeBlock {
    kind: IncludeKind,
    first_line: u32,
    last_line: u32,
}

impl IncludeBlock {
    fn line_span(&self) -> u32 {
        self.last_line - self.first_line + 1
    }
}

/// End of the largest contiguous block of `<...>` includes and of `"..."`
/// includes. With only one kind present both anchors share its block.
pub fn find_position_for_new_include(tree: &SymbolTree, doc: &TextDocument) -> IncludePositions {
    let masked = TextDocument::new(mask_comments(doc.text()));
    let mut largest_system: Option<IncludeBlock> = None;
    let mut largest_project: Option<IncludeBlock> = None;
    let mut current: Option<IncludeBlock> = None;

    let mut close = |block: IncludeBlock| {
        let largest = match block.kind {
            IncludeKind::System => &mut largest_system,
            IncludeKind::Project => &mut largest_project,
        };
        if largest.is_none_or(|l| block.line_span() > l.line_span()) {
            *largest = Some(block);
        }
    };

    for line in 0..masked.line_count() {
        let text = masked.line_text(line);
        let kind = if SYSTEM_INCLUDE.is_match(text) {
            Some(IncludeKind::System)
        } else if PROJECT_INCLUDE.is_match(text) {
            Some(IncludeKind::Project)
        } else {
            None
        };

        match (kind, current.as_mut()) {
            (Some(kind), Some(block)) if block.kind == kind => block.last_line = line,
            (kind, _) => {
                if let Some(block) = current.take() {
                    close(block);
                }
                current = kind.map(|kind| IncludeBlock {
                    kind,
                    first_line: line,
                    last_line: line,
                });
            }
        }
    }
    if let Some(block) = current {
        close(block);
    }

    let block_end = |block: IncludeBlock| doc.line_range(block.last_line).end;
    match (largest_system, largest_project) {
        (Some(system), Some(project)) => IncludePositions {
            system: block_end(system),
            project: block_end(project),
        },
        (Some(only), None) | (None, Some(only)) => {
            let end = block_end(only);
            IncludePositions {
                system: end,
                project: end,
            }
        }
        (None, None) => {
            let fallback = include_fallback(tree, doc);
            debug!(line = fallback.line, "no include block, using fallback anchor");
            IncludePositions {
                system: fallback,
                project: fallback,
            }
        }
    }
}

/// End of the last non-blank line above the first top-level symbol. Without
/// symbols, the end of the last non-blank line of the file.
fn include_fallback(tree: &SymbolTree, doc: &TextDocument) -> Position {
    let search_end = match tree.roots().first() {
        Some(&first) => tree.node(first).range.start.line,
        None => doc.line_count(),
    };
    (0..search_end)
        .rev()
        .find(|&line| !doc.is_line_blank(line))
        .map(|line| doc.line_range(line).end)
        .unwrap_or_default()
}

/// Insertion point for a new member function of `class`.
///
/// Inside a class or struct the public section bounds the search: next to
/// `relative_name` when that function is there (before it for a getter, so
/// a getter lands ahead of its setter), else after the last public
/// function, else after the last member.
pub fn find_position_for_new_method(
    class: &CSymbol<'_>,
    relative_name: Option<&str>,
    is_getter: bool,
) -> ProposedPosition {
    let doc = class.document();
    let after_last_child = || match class.children().last() {
        Some(child) => ProposedPosition::after(statement_end(doc, child.range().end)),
        None => after_opening_brace(class),
    };

    if !class.is_class_like() {
        return after_last_child();
    }
    let Some((section_start, section_end)) = public_section(class) else {
        debug!(class = class.name(), "no public section");
        return after_last_child();
    };

    let public_functions: Vec<CSymbol<'_>> = class
        .children()
        .filter(|child| {
            child.is_function()
                && child.range().start > section_start
                && child.range().end < section_end
        })
        .collect();

    if let Some(name) = relative_name
        && let Some(anchor) = public_functions.iter().find(|f| f.identifier() == name)
    {
        return if is_getter {
            ProposedPosition::before(anchor.range().start).next_to()
        } else {
            ProposedPosition::after(statement_end(doc, anchor.range().end)).next_to()
        };
    }

    match public_functions.last() {
        Some(last) => ProposedPosition::after(statement_end(doc, last.range().end)),
        None => after_last_child(),
    }
}

/// From the first `public:` up to the next access specifier or the end of
/// the class.
fn public_section(class: &CSymbol<'_>) -> Option<(Position, Position)> {
    let doc = class.document();
    let base = doc.offset_at(class.range().start);
    let masked = mask_all(class.text());

    let public = PUBLIC_SPECIFIER.find(&masked)?;
    let label_end = base
        + public
            .as_str()
            .find(':')
            .map_or(public.end(), |c| public.start() + c + 1);
    let start = doc.position_at(label_end);
    let end = match ACCESS_SPECIFIER.find_at(&masked, label_end - base) {
        Some(next) => doc.position_at(base + next.start()),
        None => class.range().end,
    };
    Some((start, end))
}

fn after_opening_brace(symbol: &CSymbol<'_>) -> ProposedPosition {
    let doc = symbol.document();
    let base = doc.offset_at(symbol.range().start);
    match mask_all(symbol.text()).find('{') {
        Some(brace) => ProposedPosition::after(doc.position_at(base + brace + 1)),
        None => ProposedPosition::after(symbol.range().end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::symbol::SymbolKind;
    use crate::source::csymbol::tests::raw_at;

    #[test]
    fn test_header_guard_skips_banner() {
        let doc = TextDocument::new("/*\n * Copyright\n */\n\nclass A {};\n");
        let pos = find_position_for_new_header_guard(&doc);
        assert_eq!(pos, ProposedPosition::before(Position::new(4, 0)));
    }

    #[test]
    fn test_header_guard_line_comment_banner() {
        let doc = TextDocument::new("// widget.h\n#include <vector>\n");
        let pos = find_position_for_new_header_guard(&doc);
        assert_eq!(pos.value, Position::new(1, 0));
        assert!(pos.before);
    }

    #[test]
    fn test_header_guard_comment_only_file() {
        let doc = TextDocument::new("// nothing here\n\n");
        let pos = find_position_for_new_header_guard(&doc);
        assert_eq!(pos, ProposedPosition::after(Position::new(0, 15)));
    }

    #[test]
    fn test_header_guard_empty_file() {
        for text in ["", "  \n\n"] {
            let pos = find_position_for_new_header_guard(&TextDocument::new(text));
            assert_eq!(pos.value, Position::new(0, 0));
            assert!(!pos.after);
            assert!(!pos.before);
        }
    }

    #[test]
    fn test_include_blocks() {
        let text = "\
#include <vector>
#include <string>

// helpers
#include \"widget.h\"

int x;
";
        let doc = TextDocument::new(text);
        let tree = SymbolTree::empty("/src/a.cpp");
        let pos = find_position_for_new_include(&tree, &doc);
        assert_eq!(pos.system, Position::new(1, 17));
        assert_eq!(pos.project, Position::new(4, 19));
    }

    #[test]
    fn test_largest_block_wins_and_ties_keep_first() {
        let text = "\
#include <a>
#include <b>
#include \"x.h\"
#include <c>
#include <d>
#include \"y.h\"
#include \"z.h\"
";
        let doc = TextDocument::new(text);
        let pos = find_position_for_new_include(&SymbolTree::empty("/a.cpp"), &doc);
        assert_eq!(pos.system, Position::new(1, 12));
        assert_eq!(pos.project, Position::new(6, 14));
    }

    #[test]
    fn test_single_include_kind_shares_anchor() {
        let doc = TextDocument::new("#include \"a.h\"\n#include \"b.h\"\n\nint x;\n");
        let pos = find_position_for_new_include(&SymbolTree::empty("/a.cpp"), &doc);
        assert_eq!(pos.system, Position::new(1, 14));
        assert_eq!(pos.project, pos.system);
    }

    #[test]
    fn test_commented_include_is_ignored() {
        let doc = TextDocument::new("// #include <gone>\n#include <kept>\n");
        let pos = find_position_for_new_include(&SymbolTree::empty("/a.cpp"), &doc);
        assert_eq!(pos.system, Position::new(1, 15));
    }

    #[test]
    fn test_include_fallback_above_first_symbol() {
        let text = "#ifndef A_H\n#define A_H\n\nclass A {};\n\n#endif\n";
        let doc = TextDocument::new(text);
        let class = raw_at(&doc, "class A {}", "A", SymbolKind::Class);
        let tree = SymbolTree::build(&[class], "/a.h");
        let pos = find_position_for_new_include(&tree, &doc);
        assert_eq!(pos.system, Position::new(1, 11));
        assert_eq!(pos.project, Position::new(1, 11));
    }

    #[test]
    fn test_include_fallback_without_symbols() {
        let doc = TextDocument::new("#pragma once\n\n");
        let pos = find_position_for_new_include(&SymbolTree::empty("/a.h"), &doc);
        assert_eq!(pos.system, Position::new(0, 12));

        let doc = TextDocument::new("");
        let pos = find_position_for_new_include(&SymbolTree::empty("/a.h"), &doc);
        assert_eq!(pos.system, Position::new(0, 0));
    }

    #[test]
    fn test_statement_end() {
        let doc = TextDocument::new("int f();;\n");
        assert_eq!(statement_end(&doc, Position::new(0, 7)), Position::new(0, 9));
        assert_eq!(statement_end(&doc, Position::new(0, 3)), Position::new(0, 3));
    }

    const CLASS: &str = "\
class Point {
    int m_x;
public:
    int getX() const;
    void setX(int x);
private:
    void helper();
};
";

    fn point_tree(doc: &TextDocument) -> SymbolTree {
        let members = vec![
            raw_at(doc, "int m_x", "m_x", SymbolKind::Field),
            raw_at(doc, "int getX() const", "getX", SymbolKind::Method),
            raw_at(doc, "void setX(int x)", "setX", SymbolKind::Method),
            raw_at(doc, "void helper()", "helper", SymbolKind::Method),
        ];
        let class_text = &CLASS[..CLASS.rfind('}').unwrap() + 1];
        let class = raw_at(doc, class_text, "Point", SymbolKind::Class).with_children(members);
        SymbolTree::build(&[class], "/src/point.h")
    }

    #[test]
    fn test_getter_goes_before_its_setter() {
        let doc = TextDocument::new(CLASS);
        let tree = point_tree(&doc);
        let class = CSymbol::new(&tree, &doc, tree.roots()[0]);

        let pos = find_position_for_new_method(&class, Some("setX"), true);
        assert_eq!(pos, ProposedPosition::before(Position::new(4, 4)).next_to());
    }

    #[test]
    fn test_setter_goes_after_its_getter() {
        let doc = TextDocument::new(CLASS);
        let tree = point_tree(&doc);
        let class = CSymbol::new(&tree, &doc, tree.roots()[0]);

        let pos = find_position_for_new_method(&class, Some("getX"), false);
        assert_eq!(pos, ProposedPosition::after(Position::new(3, 21)).next_to());
    }

    #[test]
    fn test_new_method_after_last_public_function() {
        let doc = TextDocument::new(CLASS);
        let tree = point_tree(&doc);
        let class = CSymbol::new(&tree, &doc, tree.roots()[0]);

        // `helper` is private, so it does not count.
        let pos = find_position_for_new_method(&class, None, false);
        assert_eq!(pos, ProposedPosition::after(Position::new(4, 21)));

        let pos = find_position_for_new_method(&class, Some("missing"), false);
        assert_eq!(pos, ProposedPosition::after(Position::new(4, 21)));
    }

    #[test]
    fn test_new_method_without_public_section() {
        let text = "struct Data {\n    int value;\n};\n";
        let doc = TextDocument::new(text);
        let field = raw_at(&doc, "int value", "value", SymbolKind::Field);
        let class = raw_at(&doc, "struct Data {\n    int value;\n}", "Data", SymbolKind::Struct)
            .with_children(vec![field]);
        let tree = SymbolTree::build(&[class], "/src/data.h");
        let class = CSymbol::new(&tree, &doc, tree.roots()[0]);

        let pos = find_position_for_new_method(&class, None, false);
        assert_eq!(pos, ProposedPosition::after(Position::new(1, 14)));
    }

    #[test]
    fn test_new_method_in_empty_class() {
        let doc = TextDocument::new("class Empty {\n};\n");
        let class = raw_at(&doc, "class Empty {\n}", "Empty", SymbolKind::Class);
        let tree = SymbolTree::build(&[class], "/src/empty.h");
        let class = CSymbol::new(&tree, &doc, tree.roots()[0]);

        let pos = find_position_for_new_method(&class, None, false);
        assert_eq!(pos, ProposedPosition::after(Position::new(0, 13)));
    }

    #[test]
    fn test_public_in_comment_is_ignored() {
        let text = "class C {\n    // public: not really\n    void f();\n};\n";
        let doc = TextDocument::new(text);
        let method = raw_at(&doc, "void f()", "f", SymbolKind::Method);
        let class_text = &text[..text.rfind('}').unwrap() + 1];
        let class =
            raw_at(&doc, class_text, "C", SymbolKind::Class).with_children(vec![method]);
        let tree = SymbolTree::build(&[class], "/src/c.h");
        let class = CSymbol::new(&tree, &doc, tree.roots()[0]);

        // No public section: falls back to the last child.
        let pos = find_position_for_new_method(&class, Some("f"), true);
        assert_eq!(pos, ProposedPosition::after(Position::new(2, 13)));
    }
    #[test]
    fn test_new_function_in_namespace_goes_after_last_child() {
        let text = "namespace util {\npublic:\nvoid a();\nvoid b();\n}\n";
        let doc = TextDocument::new(text);
        let members = vec![
            raw_at(&doc, "void a()", "a", SymbolKind::Function),
            raw_at(&doc, "void b()", "b", SymbolKind::Function),
        ];
        let ns_text = &text[..text.rfind('}').unwrap() + 1];
        let ns = raw_at(&doc, ns_text, "util", SymbolKind::Namespace).with_children(members);
        let tree = SymbolTree::build(&[ns], "/src/util.h");
        let ns = CSymbol::new(&tree, &doc, tree.roots()[0]);

        // Neither the anchor nor the `public:` label matter outside a class.
        let pos = find_position_for_new_method(&ns, Some("a"), true);
        assert_eq!(pos, ProposedPosition::after(Position::new(3, 9)));
    }

    #[test]
    fn test_proposed_position_within_range() {
        let range = Range::new(Position::new(0, 0), Position::new(4, 1));
        assert!(ProposedPosition::after(Position::new(2, 0)).is_within(range));
        assert!(ProposedPosition::before(Position::new(4, 1)).is_within(range));
        assert!(!ProposedPosition::after(Position::new(4, 1)).is_within(range));
        assert!(!ProposedPosition::before(Position::new(0, 0)).is_within(range));
        assert!(!ProposedPosition::default().is_within(Range::new(
            Position::new(1, 0),
            Position::new(2, 0)
        )));
    }
}
