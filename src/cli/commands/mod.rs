//! Command implementations for cxxmate
//!
//! Each command is implemented in its own module.

pub mod accessors;
pub mod config;
pub mod define;
pub mod guard;
pub mod include;
pub mod method;
pub mod pair;
pub mod symbols;

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::ParsedLocation;
use crate::services::LanguageHost;
use crate::source::SourceDocument;

/// Read `path` and fetch its outline.
pub(crate) async fn load_document(host: &dyn LanguageHost, path: &Path) -> Result<SourceDocument> {
    let mut document = SourceDocument::open(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    document.symbols(host).await;
    Ok(document)
}

/// Parse `file:line:column`, then load the file and check the position
/// lies inside it.
pub(crate) async fn load_location(
    host: &dyn LanguageHost,
    location: &str,
) -> Result<(ParsedLocation, SourceDocument)> {
    let location = ParsedLocation::parse_absolute(location)?;
    let document = load_document(host, &location.file).await?;
    location.validate_position_with_content(document.text().text())?;
    Ok((location, document))
}
