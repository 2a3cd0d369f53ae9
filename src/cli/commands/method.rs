//! Method placement command implementation

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::load_location;
use crate::app::App;
use crate::cli::response::InsertionOutput;
use crate::source::{CSymbol, find_position_for_new_method};

#[derive(Args, Debug)]
pub struct MethodArgs {
    /// Position inside the class (file:line:column)
    pub location: String,

    /// Existing method to place the new one next to
    #[arg(long, value_name = "NAME")]
    pub after: Option<String>,

    /// The new method is a getter: it goes before the anchor instead
    #[arg(long)]
    pub getter: bool,
}

#[derive(Serialize)]
struct MethodResponse {
    file: String,
    class: String,
    position: InsertionOutput,
}

pub async fn execute(args: MethodArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let host = app.host().await?;
    let (location, document) = load_location(&*host, &args.location).await?;

    let Some(class) = document
        .symbol_at(location.position())
        .and_then(enclosing_class)
    else {
        ctx.print_error(&format!("No class or struct at {}", location));
        return Ok(());
    };

    let position = find_position_for_new_method(&class, args.after.as_deref(), args.getter);
    ctx.print_success_flat(MethodResponse {
        file: ctx.relative_path(&location.file),
        class: class.name().to_string(),
        position: position.into(),
    });
    Ok(())
}

/// The symbol itself or its nearest class-like ancestor.
pub(crate) fn enclosing_class(symbol: CSymbol<'_>) -> Option<CSymbol<'_>> {
    std::iter::successors(Some(symbol), CSymbol::parent).find(CSymbol::is_class_like)
}
