//! Header/source pairing command implementation

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::cli::location::absolute_file;
use crate::source::SourceFile;

#[derive(Args, Debug)]
pub struct PairArgs {
    /// Header or source file
    pub file: String,
}

#[derive(Serialize)]
struct PairResponse {
    file: String,
    kind: &'static str,
    matching: Option<String>,
}

pub async fn execute(args: PairArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let files = &app.config().files;
    let path = absolute_file(args.file.as_ref())?;

    let kind = if files.is_header(&path) {
        "header"
    } else if files.is_source(&path) {
        "source"
    } else {
        ctx.print_error(&format!(
            "Neither a header nor a source file: {}",
            ctx.relative_path(&path)
        ));
        return Ok(());
    };

    let host = app.host().await?;
    let matching = SourceFile::new(&path)
        .find_matching_header_or_source(&*host, files)
        .await;

    ctx.print_success_flat(PairResponse {
        file: ctx.relative_path(&path),
        kind,
        matching: matching.map(|m| ctx.relative_path(&m)),
    });
    Ok(())
}
