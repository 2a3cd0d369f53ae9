//! Include command implementation

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::load_document;
use crate::app::App;
use crate::cli::location::absolute_file;
use crate::cli::response::IncludeOutput;

#[derive(Args, Debug)]
pub struct IncludeArgs {
    /// C/C++ file
    pub file: String,
}

#[derive(Serialize)]
struct IncludeResponse {
    file: String,
    #[serde(flatten)]
    positions: IncludeOutput,
}

pub async fn execute(args: IncludeArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let path = absolute_file(args.file.as_ref())?;
    let host = app.host().await?;
    let mut document = load_document(&*host, &path).await?;

    let positions = document.find_position_for_new_include(&*host).await;
    ctx.print_success_flat(IncludeResponse {
        file: ctx.relative_path(&path),
        positions: positions.into(),
    });
    Ok(())
}
