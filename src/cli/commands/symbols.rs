//! Symbols command implementation

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::load_document;
use crate::app::App;
use crate::cli::location::absolute_file;
use crate::cli::response::SymbolOutput;

#[derive(Args, Debug)]
pub struct SymbolsArgs {
    /// C/C++ file
    pub file: String,

    /// Levels of nested symbols to include (default: all)
    #[arg(short, long)]
    pub depth: Option<u32>,
}

#[derive(Serialize)]
struct SymbolsResponse {
    file: String,
    count: usize,
    symbols: Vec<SymbolOutput>,
}

pub async fn execute(args: SymbolsArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let path = absolute_file(args.file.as_ref())?;
    let host = app.host().await?;
    let document = load_document(&*host, &path).await?;

    let symbols: Vec<SymbolOutput> = document
        .top_level()
        .iter()
        .map(|symbol| SymbolOutput::from_csymbol(symbol, args.depth))
        .collect();

    ctx.print_success_flat(SymbolsResponse {
        file: ctx.relative_path(&path),
        count: document.file().cached().map_or(0, |tree| tree.len()),
        symbols,
    });
    Ok(())
}
