//! Heuristic structure model of C/C++ source files.
//!
//! Text is never parsed: outlines come from a [`LanguageHost`] and the
//! model fills the gaps with masking and regular expressions over the raw
//! text.
//!
//! [`LanguageHost`]: crate::services::LanguageHost

pub mod csymbol;
pub mod document;
pub mod file;
pub mod mask;
pub mod placement;
pub mod text;
pub mod tree;

pub use csymbol::CSymbol;
pub use document::SourceDocument;
pub use file::{SourceFile, find_definition};
pub use placement::{IncludePositions, ProposedPosition, find_position_for_new_method};
pub use text::TextDocument;
pub use tree::{SymbolId, SymbolTree};
