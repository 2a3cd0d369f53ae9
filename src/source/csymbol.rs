//! C/C++ semantics layered over a [`SymbolTree`] node.
//!
//! A [`CSymbol`] is a cheap view: tree + text buffer + node id. Everything it
//! reports is derived on demand from the surrounding source text.

use std::sync::LazyLock;

use regex::Regex;

use super::mask::{mask_all, strip_default_values};
use super::placement::ProposedPosition;
use super::text::TextDocument;
use super::tree::{SymbolId, SymbolNode, SymbolTree};
use crate::models::lsp::Range;
use crate::models::symbol::{SymbolKind, plain_identifier};

static SYMMETRIC_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_+(.+?)_+$").expect("valid member-name regex"));
static TRAILING_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)_+$").expect("valid member-name regex"));
static M_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^m_(.+)$").expect("valid member-name regex"));

static CONST: LazyLock<Regex> = LazyLock::new(|| keyword("const"));
static INLINE: LazyLock<Regex> = LazyLock::new(|| keyword("inline"));
static CONSTEXPR: LazyLock<Regex> = LazyLock::new(|| keyword("constexpr"));
static STATIC: LazyLock<Regex> = LazyLock::new(|| keyword("static"));
static VIRTUAL: LazyLock<Regex> = LazyLock::new(|| keyword("virtual"));

static DECLARATION_ONLY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:virtual|static|explicit|friend)\b\s*").expect("valid prefix regex")
});
static DECLARATION_ONLY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:\b(?:override|final)\b|=\s*(?:0|default|delete)\b)")
        .expect("valid suffix regex")
});

fn keyword(word: &str) -> Regex {
    Regex::new(&format!(r"\b{word}\b")).expect("valid keyword regex")
}

/// Strip a private-member decoration: `_x_`, `x_`, then `m_x`.
pub fn base_name(identifier: &str) -> &str {
    for pattern in [&SYMMETRIC_UNDERSCORES, &TRAILING_UNDERSCORES, &M_PREFIX] {
        if let Some(stripped) = pattern.captures(identifier).and_then(|c| c.get(1)) {
            return stripped.as_str();
        }
    }
    identifier
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CSymbol<'a> {
    tree: &'a SymbolTree,
    doc: &'a TextDocument,
    id: SymbolId,
}

impl<'a> CSymbol<'a> {
    pub fn new(tree: &'a SymbolTree, doc: &'a TextDocument, id: SymbolId) -> Self {
        Self { tree, doc, id }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn tree(&self) -> &'a SymbolTree {
        self.tree
    }

    pub fn document(&self) -> &'a TextDocument {
        self.doc
    }

    pub fn node(&self) -> &'a SymbolNode {
        self.tree.node(self.id)
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    pub fn identifier(&self) -> &'a str {
        self.node().identifier()
    }

    pub fn kind(&self) -> SymbolKind {
        self.node().kind
    }

    pub fn range(&self) -> Range {
        self.node().range
    }

    pub fn selection_range(&self) -> Range {
        self.node().selection_range
    }

    pub fn parent(&self) -> Option<CSymbol<'a>> {
        self.tree.parent(self.id).map(|id| self.wrap(id))
    }

    pub fn children(&self) -> impl Iterator<Item = CSymbol<'a>> + 'a {
        let (tree, doc) = (self.tree, self.doc);
        tree.children(self.id)
            .iter()
            .map(move |&id| CSymbol::new(tree, doc, id))
    }

    fn wrap(&self, id: SymbolId) -> CSymbol<'a> {
        CSymbol::new(self.tree, self.doc, id)
    }

    /// Full source text of the symbol.
    pub fn text(&self) -> &'a str {
        self.doc.text_in(self.range())
    }

    /// Declaration prefix between the start of the symbol and its name.
    pub fn leading(&self) -> &'a str {
        let range = self.range();
        let name_start = self.selection_range().start.max(range.start);
        self.doc.text_in(Range::new(range.start, name_start))
    }

    // ------------------------------------------------------------------
    // Naming
    // ------------------------------------------------------------------

    pub fn base_name(&self) -> &'a str {
        base_name(self.identifier())
    }

    /// Empty for anything that is not a member variable. An undecorated
    /// member gets a `get` prefix; a decorated one is already getter-shaped
    /// once the decoration is stripped.
    pub fn getter_name(&self) -> String {
        if !self.is_member_variable() {
            return String::new();
        }
        let base = self.base_name();
        if base == self.identifier() {
            format!("get{}", capitalize(base))
        } else {
            base.to_string()
        }
    }

    pub fn setter_name(&self) -> String {
        if !self.is_member_variable() {
            return String::new();
        }
        format!("set{}", capitalize(self.base_name()))
    }

    pub fn find_getter_for(&self, member: &CSymbol<'_>) -> Option<CSymbol<'a>> {
        self.find_accessor_for(member, member.getter_name())
    }

    pub fn find_setter_for(&self, member: &CSymbol<'_>) -> Option<CSymbol<'a>> {
        self.find_accessor_for(member, member.setter_name())
    }

    fn find_accessor_for(&self, member: &CSymbol<'_>, accessor: String) -> Option<CSymbol<'a>> {
        let is_direct_child = self
            .tree
            .children(self.id)
            .iter()
            .any(|&c| self.tree.node(c).range == member.range());
        if !is_direct_child || !member.is_member_variable() {
            return None;
        }
        self.children().find(|child| child.identifier() == accessor)
    }

    // ------------------------------------------------------------------
    // Qualifiers
    // ------------------------------------------------------------------

    pub fn is_const(&self) -> bool {
        CONST.is_match(&mask_all(self.leading()))
    }

    pub fn is_inline(&self) -> bool {
        INLINE.is_match(&mask_all(self.leading()))
    }

    pub fn is_constexpr(&self) -> bool {
        CONSTEXPR.is_match(&mask_all(self.leading()))
    }

    pub fn is_static(&self) -> bool {
        STATIC.is_match(&mask_all(self.leading()))
    }

    pub fn is_virtual(&self) -> bool {
        VIRTUAL.is_match(&mask_all(self.leading()))
    }

    /// A `*` in the declaration prefix, or for functions anywhere in the
    /// parameter list.
    pub fn is_pointer(&self) -> bool {
        if mask_all(self.leading()).contains('*') {
            return true;
        }
        self.is_function()
            && self
                .parameter_span()
                .is_some_and(|(open, close, masked)| masked[open + 1..close].contains('*'))
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    pub fn is_class_like(&self) -> bool {
        self.kind().is_class_like()
    }

    pub fn is_function(&self) -> bool {
        self.kind().is_callable()
    }

    pub fn is_member_variable(&self) -> bool {
        match self.kind() {
            SymbolKind::Field => true,
            SymbolKind::Variable | SymbolKind::Property => {
                self.parent().is_some_and(|p| p.is_class_like())
            }
            _ => false,
        }
    }

    /// Out-of-line `Foo::Foo` is recognised from its qualifier when there is
    /// no enclosing class symbol.
    pub fn is_constructor(&self) -> bool {
        if !self.is_function() || self.is_destructor() {
            return false;
        }
        if self.kind() == SymbolKind::Constructor {
            return true;
        }
        match self.parent() {
            Some(parent) => self.identifier() == parent.identifier(),
            None => self.qualifier() == Some(self.identifier()),
        }
    }

    pub fn is_destructor(&self) -> bool {
        if !matches!(
            self.kind(),
            SymbolKind::Method | SymbolKind::Constructor | SymbolKind::Function
        ) {
            return false;
        }
        let owner = match self.parent() {
            Some(parent) => Some(parent.identifier()),
            None => self.qualifier(),
        };
        owner.is_some_and(|owner| self.identifier() == format!("~{owner}"))
    }

    /// Last scope segment of a qualified name: `"Foo"` for `"ns::Foo::bar"`.
    fn qualifier(&self) -> Option<&'a str> {
        let name = self.name();
        let scope_end = name.rfind("::")?;
        Some(plain_identifier(&name[..scope_end]))
    }

    pub fn is_function_declaration(&self) -> bool {
        if !self.is_function() {
            return false;
        }
        self.node().detail.as_deref() == Some("declaration")
            || !self.text().trim_end().ends_with('}')
    }

    pub fn is_function_definition(&self) -> bool {
        self.is_function() && !self.is_function_declaration()
    }

    /// Enclosing symbols, outermost first.
    pub fn scopes(&self) -> Vec<CSymbol<'a>> {
        self.tree
            .ancestors(self.id)
            .into_iter()
            .map(|id| self.wrap(id))
            .collect()
    }

    // ------------------------------------------------------------------
    // Declaration -> definition
    // ------------------------------------------------------------------

    /// Byte offsets (relative to [`Self::text`]) of the parameter list's
    /// parentheses, plus the masked symbol text they were found in.
    fn parameter_span(&self) -> Option<(usize, usize, String)> {
        let start = self.doc.offset_at(self.range().start);
        let name_end = self
            .doc
            .offset_at(self.selection_range().end)
            .saturating_sub(start);
        let masked = mask_all(self.text());

        let open = name_end + masked.get(name_end..)?.find('(')?;
        let mut depth = 0usize;
        for (i, b) in masked.bytes().enumerate().skip(open) {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((open, i, masked));
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Rewrite this function declaration as the signature of an out-of-line
    /// definition placed at `position` in `target`.
    ///
    /// Scopes are qualified unless the insertion lands inside the matching
    /// scope of `target`; after a scope's closing brace counts as outside.
    /// Default arguments and declaration-only specifiers are dropped and
    /// continuation lines of a multi-line parameter list are re-aligned.
    /// Returns `None` for anything that is not a function declaration.
    pub fn new_function_definition(
        &self,
        target: &SymbolTree,
        position: &ProposedPosition,
    ) -> Option<String> {
        if !self.is_function_declaration() {
            return None;
        }

        let mut scope = String::new();
        for enclosing in self.scopes() {
            let already_inside = target
                .find_by_first_chain(enclosing.identifier())
                .is_some_and(|m| position.is_within(target.node(m).range));
            if !already_inside {
                scope.push_str(enclosing.identifier());
                scope.push_str("::");
            }
        }

        let text = self.text();
        let (open, close, _) = self.parameter_span()?;
        let start = self.doc.offset_at(self.range().start);
        let name_start = self
            .doc
            .offset_at(self.selection_range().start)
            .saturating_sub(start)
            .min(open);
        let name = text[name_start..open].trim_end();

        let leading = normalize_leading(&DECLARATION_ONLY_PREFIX.replace_all(self.leading(), ""));
        let trailing = DECLARATION_ONLY_SUFFIX.replace_all(&text[close + 1..], "");
        let trailing = trailing.trim_end().trim_end_matches(';').trim_end();

        let old_align = self.selection_range().start.character as usize + name.chars().count() + 1;
        let last_leading_line = leading.rsplit('\n').next().unwrap_or("");
        let new_align = last_leading_line.chars().count()
            + scope.chars().count()
            + name.chars().count()
            + 1;
        let params = realign(
            &strip_default_values(&text[open + 1..close]),
            old_align,
            new_align,
        );

        Some(format!("{leading}{scope}{name}({params}){trailing}"))
    }
}

/// Drop the original indentation from every line but the first of a
/// (possibly multi-line, e.g. templated) declaration prefix.
fn normalize_leading(leading: &str) -> String {
    let mut lines = leading.split('\n');
    let mut out = lines.next().unwrap_or("").to_string();
    for line in lines {
        out.push('\n');
        out.push_str(line.trim_start());
    }
    out
}

fn realign(params: &str, old_align: usize, new_align: usize) -> String {
    let old_indent = " ".repeat(old_align);
    let new_indent = " ".repeat(new_align);
    let mut lines = params.split('\n');
    let mut out = lines.next().unwrap_or("").to_string();
    for line in lines {
        out.push('\n');
        match line.strip_prefix(&old_indent) {
            Some(rest) => {
                out.push_str(&new_indent);
                out.push_str(rest);
            }
            None => out.push_str(line),
        }
    }
    out
}
