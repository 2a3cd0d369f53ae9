//! Out-of-line definition command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{load_document, load_location};
use crate::app::App;
use crate::cli::location::absolute_file;
use crate::cli::response::{InsertionOutput, PositionOutput};
use crate::source::{SourceFile, find_definition};

#[derive(Args, Debug)]
pub struct DefineArgs {
    /// Position of the function declaration (file:line:column)
    pub location: String,

    /// File to put the definition in (default: the matching source file,
    /// else the declaring file)
    #[arg(short, long, value_name = "FILE")]
    pub target: Option<String>,
}

#[derive(Serialize)]
struct DefineResponse {
    declaration: String,
    target: String,
    /// Present when the function is already defined somewhere
    #[serde(skip_serializing_if = "Option::is_none")]
    existing: Option<ExistingDefinition>,
    position: InsertionOutput,
    signature: Option<String>,
}

#[derive(Serialize)]
struct ExistingDefinition {
    file: String,
    #[serde(flatten)]
    position: PositionOutput,
}

pub async fn execute(args: DefineArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let host = app.host().await?;
    let (location, document) = load_location(&*host, &args.location).await?;

    let Some(declaration) = document
        .symbol_at(location.position())
        .filter(|symbol| symbol.is_function_declaration())
    else {
        ctx.print_error(&format!("No function declaration at {}", location));
        return Ok(());
    };

    let target_path: PathBuf = match &args.target {
        Some(target) => absolute_file(target.as_ref())?,
        None => SourceFile::new(&location.file)
            .find_matching_header_or_source(&*host, &app.config().files)
            .await
            .unwrap_or_else(|| location.file.clone()),
    };

    let mut target = if target_path == location.file {
        document.clone()
    } else {
        load_document(&*host, &target_path).await?
    };

    let existing = find_definition(
        &*host,
        &location.file,
        declaration.selection_range().start,
    )
    .await
    .map(|found| ExistingDefinition {
        file: ctx.relative_path(&found.file),
        position: found.range.start.into(),
    });

    let position = target
        .find_position_for_new_definition(&*host, &declaration)
        .await;
    let signature = target
        .file()
        .cached()
        .and_then(|tree| declaration.new_function_definition(tree, &position));

    ctx.print_success_flat(DefineResponse {
        declaration: declaration.name().to_string(),
        target: ctx.relative_path(&target_path),
        existing,
        position: position.into(),
        signature,
    });
    Ok(())
}
