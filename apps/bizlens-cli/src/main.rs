//! `bizlens` binary entry point.

use clap::Parser;
use tracing::info;

use bizlens_cli::cli::{run, Cli, Output};
use bizlens_cli::init_tracing;

/// ## Startup Sequence
/// 1. Initialize logging (stderr, `RUST_LOG` aware)
/// 2. Parse arguments
/// 3. Load configuration (defaults → TOML → env)
/// 4. Open the database and run pending migrations
/// 5. Run the command; print JSON/CSV to stdout or an `ApiError` to stderr
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    info!("Starting BizLens");

    match run(cli).await {
        Ok(Output::Json(value)) => println!("{}", serde_json::to_string_pretty(&value)?),
        Ok(Output::Text(text)) => print!("{}", text),
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            std::process::exit(1);
        }
    }

    Ok(())
}
