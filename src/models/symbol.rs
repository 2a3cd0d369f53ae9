//! Symbol model definitions
//!
//! Raw outline symbols as handed over by a document-symbol provider, and the
//! symbol kinds shared by every layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::lsp::Range;

/// Hierarchical outline entry produced by a document-symbol provider.
///
/// This is the provider's shape, not ours: children arrive in whatever order
/// the provider likes and are sorted when a [`crate::source::SymbolTree`] is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymbol {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub kind: SymbolKind,
    pub range: Range,
    pub selection_range: Range,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawSymbol>,
}

impl RawSymbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: Range, selection: Range) -> Self {
        Self {
            name: name.into(),
            detail: None,
            kind,
            range,
            selection_range: selection,
            children: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_children(mut self, children: Vec<RawSymbol>) -> Self {
        self.children = children;
        self
    }
}

/// Strip template arguments, parameter lists and qualifying scopes from an
/// outline name: `"ns::Foo<T>::bar(int)"` -> `"bar"`.
///
/// Operator names keep their punctuation (`operator<`, `operator()`).
pub fn plain_identifier(name: &str) -> &str {
    let name = name.trim();

    if let Some(op) = name.find("operator") {
        let before = &name[..op];
        let at_word_start = before
            .chars()
            .last()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        if at_word_start {
            return &name[op..];
        }
    }

    // Remove parameter list: "method(int, String)" -> "method"
    let name = match name.find('(') {
        Some(paren_pos) => &name[..paren_pos],
        None => name,
    };

    // Remove template arguments: "Foo<T, K>" -> "Foo"
    let name = match name.find('<') {
        Some(angle_pos) => &name[..angle_pos],
        None => name,
    };

    let name = match name.rfind("::") {
        Some(scope_pos) => &name[scope_pos + 2..],
        None => name,
    };

    name.trim()
}

/// Symbol classification (aligned with LSP SymbolKind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum SymbolKind {
    File,
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    String,
    Number,
    Boolean,
    Array,
    Object,
    Key,
    Null,
    EnumMember,
    Struct,
    Event,
    Operator,
    TypeParameter,
}

impl SymbolKind {
    /// Convert from LSP SymbolKind number
    pub fn from_lsp(kind: u32) -> Self {
        match kind {
            1 => Self::File,
            2 => Self::Module,
            3 => Self::Namespace,
            4 => Self::Package,
            5 => Self::Class,
            6 => Self::Method,
            7 => Self::Property,
            8 => Self::Field,
            9 => Self::Constructor,
            10 => Self::Enum,
            11 => Self::Interface,
            12 => Self::Function,
            13 => Self::Variable,
            14 => Self::Constant,
            15 => Self::String,
            16 => Self::Number,
            17 => Self::Boolean,
            18 => Self::Array,
            19 => Self::Object,
            20 => Self::Key,
            21 => Self::Null,
            22 => Self::EnumMember,
            23 => Self::Struct,
            24 => Self::Event,
            25 => Self::Operator,
            26 => Self::TypeParameter,
            _ => Self::Variable, // Default fallback
        }
    }

    /// Convert to LSP SymbolKind number
    pub fn to_lsp(&self) -> u32 {
        match self {
            Self::File => 1,
            Self::Module => 2,
            Self::Namespace => 3,
            Self::Package => 4,
            Self::Class => 5,
            Self::Method => 6,
            Self::Property => 7,
            Self::Field => 8,
            Self::Constructor => 9,
            Self::Enum => 10,
            Self::Interface => 11,
            Self::Function => 12,
            Self::Variable => 13,
            Self::Constant => 14,
            Self::String => 15,
            Self::Number => 16,
            Self::Boolean => 17,
            Self::Array => 18,
            Self::Object => 19,
            Self::Key => 20,
            Self::Null => 21,
            Self::EnumMember => 22,
            Self::Struct => 23,
            Self::Event => 24,
            Self::Operator => 25,
            Self::TypeParameter => 26,
        }
    }

    /// Check if this is a class-like aggregate that can hold members
    pub fn is_class_like(&self) -> bool {
        matches!(self, Self::Class | Self::Struct)
    }

    /// Check if this is callable
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Self::Function | Self::Method | Self::Constructor | Self::Operator
        )
    }
}

impl From<u32> for SymbolKind {
    fn from(kind: u32) -> Self {
        Self::from_lsp(kind)
    }
}

impl From<SymbolKind> for u32 {
    fn from(kind: SymbolKind) -> Self {
        kind.to_lsp()
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::File => "file",
            Self::Module => "module",
            Self::Namespace => "namespace",
            Self::Package => "package",
            Self::Class => "class",
            Self::Method => "method",
            Self::Property => "property",
            Self::Field => "field",
            Self::Constructor => "constructor",
            Self::Enum => "enum",
            Self::Interface => "interface",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Constant => "constant",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Key => "key",
            Self::Null => "null",
            Self::EnumMember => "enum_member",
            Self::Struct => "struct",
            Self::Event => "event",
            Self::Operator => "operator",
            Self::TypeParameter => "type_parameter",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lsp::Position;

    #[test]
    fn test_plain_identifier() {
        assert_eq!(plain_identifier("bar"), "bar");
        assert_eq!(plain_identifier("Foo::bar"), "bar");
        assert_eq!(plain_identifier("ns::Foo<T>::bar(int)"), "bar");
        assert_eq!(plain_identifier("Vec<T>"), "Vec");
        assert_eq!(plain_identifier("~Widget"), "~Widget");
        assert_eq!(plain_identifier("operator<"), "operator<");
        assert_eq!(plain_identifier("Foo::operator()"), "operator()");
        assert_eq!(plain_identifier("operatorName"), "operatorName");
    }

    #[test]
    fn test_kind_lsp_numbers() {
        assert_eq!(SymbolKind::from_lsp(23), SymbolKind::Struct);
        assert_eq!(SymbolKind::Constructor.to_lsp(), 9);
        assert_eq!(SymbolKind::from_lsp(999), SymbolKind::Variable);
    }

    #[test]
    fn test_raw_symbol_deserializes_lsp_shape() {
        let json = r#"{
            "name": "Widget",
            "kind": 5,
            "range": {"start": {"line": 0, "character": 0}, "end": {"line": 3, "character": 1}},
            "selectionRange": {"start": {"line": 0, "character": 6}, "end": {"line": 0, "character": 12}},
            "children": [{
                "name": "m_size",
                "detail": "int",
                "kind": 8,
                "range": {"start": {"line": 2, "character": 4}, "end": {"line": 2, "character": 14}},
                "selectionRange": {"start": {"line": 2, "character": 8}, "end": {"line": 2, "character": 14}}
            }]
        }"#;
        let raw: RawSymbol = serde_json::from_str(json).unwrap();
        assert_eq!(raw.kind, SymbolKind::Class);
        assert_eq!(raw.children.len(), 1);
        assert_eq!(raw.children[0].kind, SymbolKind::Field);
        assert_eq!(raw.children[0].detail.as_deref(), Some("int"));
        assert_eq!(raw.selection_range.start, Position::new(0, 6));
    }
}
