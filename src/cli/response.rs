//! Response types for CLI output
//!
//! All positions are printed 1-indexed, the way editors show them.

use serde::Serialize;

use crate::models::lsp::{Position, Range};
use crate::source::{CSymbol, IncludePositions, ProposedPosition};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PositionOutput {
    pub line: u32,
    pub column: u32,
}

impl From<Position> for PositionOutput {
    fn from(position: Position) -> Self {
        let (line, column) = position.to_display();
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RangeOutput {
    pub start: PositionOutput,
    pub end: PositionOutput,
}

impl From<Range> for RangeOutput {
    fn from(range: Range) -> Self {
        Self {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}

/// Insertion point plus how it relates to the surrounding code
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InsertionOutput {
    #[serde(flatten)]
    pub position: PositionOutput,
    pub before: bool,
    pub after: bool,
    pub next_to: bool,
}

impl From<ProposedPosition> for InsertionOutput {
    fn from(proposed: ProposedPosition) -> Self {
        Self {
            position: proposed.value.into(),
            before: proposed.before,
            after: proposed.after,
            next_to: proposed.next_to,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct IncludeOutput {
    pub system: PositionOutput,
    pub project: PositionOutput,
}

impl From<IncludePositions> for IncludeOutput {
    fn from(positions: IncludePositions) -> Self {
        Self {
            system: positions.system.into(),
            project: positions.project.into(),
        }
    }
}

/// What the source model knows about one symbol
#[derive(Debug, Clone, Serialize)]
pub struct SymbolOutput {
    pub name: String,
    pub kind: String,
    pub range: RangeOutput,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessors: Option<AccessorNames>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SymbolOutput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessorNames {
    pub base_name: String,
    pub getter: String,
    pub setter: String,
}

impl SymbolOutput {
    /// `depth` limits how many levels of children are included.
    pub fn from_csymbol(symbol: &CSymbol<'_>, depth: Option<u32>) -> Self {
        let children = match depth {
            Some(0) => Vec::new(),
            _ => symbol
                .children()
                .map(|child| Self::from_csymbol(&child, depth.map(|d| d - 1)))
                .collect(),
        };

        Self {
            name: symbol.name().to_string(),
            kind: symbol.kind().to_string(),
            range: symbol.range().into(),
            qualifiers: qualifiers(symbol),
            role: role(symbol),
            accessors: symbol.is_member_variable().then(|| AccessorNames {
                base_name: symbol.base_name().to_string(),
                getter: symbol.getter_name(),
                setter: symbol.setter_name(),
            }),
            children,
        }
    }
}

fn qualifiers(symbol: &CSymbol<'_>) -> Vec<&'static str> {
    [
        ("static", symbol.is_static()),
        ("virtual", symbol.is_virtual()),
        ("inline", symbol.is_inline()),
        ("constexpr", symbol.is_constexpr()),
        ("const", symbol.is_const()),
        ("pointer", symbol.is_pointer()),
    ]
    .into_iter()
    .filter_map(|(name, set)| set.then_some(name))
    .collect()
}

fn role(symbol: &CSymbol<'_>) -> Option<&'static str> {
    if symbol.is_constructor() {
        Some("constructor")
    } else if symbol.is_destructor() {
        Some("destructor")
    } else if symbol.is_function_declaration() {
        Some("declaration")
    } else if symbol.is_function_definition() {
        Some("definition")
    } else if symbol.is_member_variable() {
        Some("member")
    } else {
        None
    }
}
