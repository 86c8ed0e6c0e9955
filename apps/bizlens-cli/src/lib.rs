//! # BizLens CLI Library
//!
//! Everything behind the `bizlens` binary, kept in a library so commands
//! can be tested against an in-memory database.
//!
//! ## Module Organization
//! ```text
//! bizlens_cli/
//! ├── lib.rs          ◄─── You are here (tracing setup)
//! ├── cli.rs          ◄─── clap arguments + dispatch
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── AppConfig (defaults → TOML → env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── upload.rs   ◄─── Workbook upload
//! │   ├── dashboard.rs◄─── Insights + CSV export
//! │   ├── scenario.rs ◄─── Saved scenarios + risk
//! │   └── recommendation.rs ◄─── Advisor notes
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_LOG_FILTER: &str = "info,bizlens=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout carries only command output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bizlens=trace` - Show trace for bizlens crates only
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_LOG_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_filter_levels() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(default_filter())
            .with_writer(std::io::sink)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(target: "sqlx::query", Level::DEBUG));
            assert!(!tracing::enabled!(target: "sqlx::query", Level::INFO));
            assert!(tracing::enabled!(target: "sqlx::query", Level::WARN));
            assert!(!tracing::enabled!(target: "hyper", Level::DEBUG));
            assert!(tracing::enabled!(target: "bizlens_cli::commands", Level::DEBUG));
            assert!(tracing::enabled!(target: "bizlens_db::pool", Level::DEBUG));
            assert!(!tracing::enabled!(target: "bizlens_db::pool", Level::TRACE));
        });
    }
}
