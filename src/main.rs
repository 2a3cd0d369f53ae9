//! cxxmate - heuristic C/C++ structure CLI

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cxxmate::app::App;
use cxxmate::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Quiet by default so stdout stays parseable JSON.
    // RUST_LOG=cxxmate=debug (or --verbose) for diagnostics on stderr
    let default_filter = if cli.verbose {
        "cxxmate=debug"
    } else {
        "cxxmate=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!(
                r#"{{"success":false,"error":"Failed to create runtime: {}"}}"#,
                e
            );
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(async_main(cli.command));

    if let Err(e) = result {
        // Errors are JSON too, so callers can parse every outcome
        let response = serde_json::json!({
            "success": false,
            "error": format!("{:#}", e)
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| format!(r#"{{"success":false,"error":"{}"}}"#, e))
        );
        std::process::exit(2);
    }
}

async fn async_main(command: Commands) -> anyhow::Result<()> {
    let app = App::new()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize: {}", e))?;

    let result = execute_command(command, &app).await;
    app.shutdown().await;
    result
}

async fn execute_command(command: Commands, app: &App) -> anyhow::Result<()> {
    use cxxmate::cli::commands;

    match command {
        // Structure queries (clangd-backed)
        Commands::Symbols(args) => commands::symbols::execute(args, app).await,
        Commands::Guard(args) => commands::guard::execute(args, app).await,
        Commands::Include(args) => commands::include::execute(args, app).await,
        Commands::Method(args) => commands::method::execute(args, app).await,
        Commands::Accessors(args) => commands::accessors::execute(args, app).await,
        Commands::Define(args) => commands::define::execute(args, app).await,
        Commands::Pair(args) => commands::pair::execute(args, app).await,

        // Configuration
        Commands::Config(args) => commands::config::execute(args, app).await,
    }
}
