//! Header guard command implementation

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::load_document;
use crate::app::App;
use crate::cli::location::absolute_file;
use crate::cli::response::InsertionOutput;

#[derive(Args, Debug)]
pub struct GuardArgs {
    /// Header file
    pub file: String,
}

#[derive(Serialize)]
struct GuardResponse {
    file: String,
    has_guard: bool,
    #[serde(rename = "macro")]
    macro_name: String,
    position: InsertionOutput,
    opening: String,
    closing: String,
}

pub async fn execute(args: GuardArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let guard = &app.config().guard;
    let path = absolute_file(args.file.as_ref())?;

    if !app.config().files.is_header(&path) {
        ctx.print_error(&format!("Not a header file: {}", ctx.relative_path(&path)));
        return Ok(());
    }

    let host = app.host().await?;
    let mut document = load_document(&*host, &path).await?;
    let has_guard = document.has_header_guard(&*host, guard).await;
    let (opening, closing) = guard.directives(&path);

    ctx.print_success_flat(GuardResponse {
        file: ctx.relative_path(&path),
        has_guard,
        macro_name: guard.macro_for(&path),
        position: document.find_position_for_new_header_guard().into(),
        opening,
        closing,
    });
    Ok(())
}
