//! # Command Line
//!
//! Argument parsing and dispatch from parsed arguments to [`crate::commands`].
//!
//! ```text
//! bizlens [--config PATH] --user ID --role owner|advisor|manager [--owner ID] <command>
//!
//!   upload FILE [--business-name NAME]
//!   insights
//!   export [--out PATH]
//!   break-even save --product P --fixed-cost F --variable-cost V --price X
//!   scenario list | save FILE | assess FILE | copy ID | compare A B | delete ID
//!   recommend --scenario ID TEXT
//!   recommendations [--scenario ID]
//! ```

use std::path::{Path, PathBuf};

use bizlens_core::breakeven::BreakEvenDraft;
use bizlens_core::ingest::check_upload_size;
use bizlens_core::{Role, Session};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::commands::{dashboard, recommendation, scenario, upload};
use crate::error::{ApiError, ApiResult};
use crate::state::{AppConfig, DbState};

/// BizLens - financial analytics for small businesses
#[derive(Debug, Parser)]
#[command(name = "bizlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Id of the signed-in user
    #[arg(long, env = "BIZLENS_USER")]
    pub user: String,

    /// Role the user acts under
    #[arg(long, env = "BIZLENS_ROLE")]
    pub role: Role,

    /// Owner to act on (required for advisor and manager sessions)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a business workbook (.xlsx, .xls, .ods)
    Upload {
        file: PathBuf,
        #[arg(long)]
        business_name: Option<String>,
    },

    /// Show dashboard insights
    Insights,

    /// Export dashboard insights as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Break-even calculator
    #[command(subcommand)]
    BreakEven(BreakEvenCommand),

    /// Saved scenarios
    #[command(subcommand)]
    Scenario(ScenarioCommand),

    /// Attach advice to one of the owner's scenarios (advisors)
    Recommend {
        #[arg(long)]
        scenario: String,
        text: String,
    },

    /// List the owner's recommendations
    Recommendations {
        /// Only notes on this scenario, oldest first
        #[arg(long)]
        scenario: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum BreakEvenCommand {
    /// Compute and save a break-even scenario
    Save(BreakEvenArgs),
}

#[derive(Debug, Args)]
pub struct BreakEvenArgs {
    #[arg(long)]
    pub product: String,
    #[arg(long)]
    pub fixed_cost: f64,
    #[arg(long)]
    pub variable_cost: f64,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
}

impl From<BreakEvenArgs> for BreakEvenDraft {
    fn from(args: BreakEvenArgs) -> Self {
        BreakEvenDraft {
            product_name: args.product,
            scenario_name: args.name,
            description: args.description,
            tag: args.tag,
            fixed_cost: args.fixed_cost,
            variable_cost_per_unit: args.variable_cost,
            price_per_unit: args.price,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ScenarioCommand {
    /// List saved scenarios with their risk assessment
    List,
    /// Save a pricing scenario from a JSON file
    Save { file: PathBuf },
    /// Assess a scenario JSON file without saving it
    Assess { file: PathBuf },
    /// Save a copy of a pricing scenario
    Copy { id: String },
    /// Compare two saved scenarios
    Compare { left: String, right: String },
    /// Delete a break-even scenario
    Delete { id: String },
}

/// What a command prints on success.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Json(Value),
    Text(String),
}

impl Cli {
    /// The explicit identity every command runs under.
    pub fn session(&self) -> Session {
        Session::new(self.user.trim(), self.role)
    }
}

/// Loads configuration, opens the database and runs the command.
///
/// Every failure, including a bad config file or an unreachable database,
/// comes back as an [`ApiError`] so callers see one error shape.
pub async fn run(cli: Cli) -> ApiResult<Output> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let db = DbState::open(&config).await?;

    let result = execute(cli, &db, &config).await;
    db.inner().close().await;
    result
}

/// Runs the parsed command.
pub async fn execute(cli: Cli, db: &DbState, config: &AppConfig) -> ApiResult<Output> {
    let session = cli.session();
    let owner = cli.owner.as_deref();

    info!(user = %session.user_id, role = %session.role, "Running command");

    match cli.command {
        Command::Upload {
            file,
            business_name,
        } => {
            let bytes = read_upload(&file, config.max_upload_bytes).await?;
            let summary = upload::upload_workbook(
                db,
                config,
                &session,
                bytes,
                owner,
                business_name.as_deref(),
            )
            .await?;
            json(&summary)
        }

        Command::Insights => json(&dashboard::get_dashboard(db, &session, owner).await?),

        Command::Export { out } => {
            let csv = dashboard::export_insights_csv(db, &session, owner).await?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, csv).await.map_err(|e| {
                        ApiError::internal(format!("Cannot write {}: {}", path.display(), e))
                    })?;
                    Ok(Output::Text(format!("Exported to {}\n", path.display())))
                }
                None => Ok(Output::Text(csv)),
            }
        }

        Command::BreakEven(BreakEvenCommand::Save(args)) => {
            json(&scenario::save_break_even(db, &session, owner, args.into()).await?)
        }

        Command::Scenario(command) => match command {
            ScenarioCommand::List => json(&scenario::list_scenarios(db, &session, owner).await?),
            ScenarioCommand::Save { file } => {
                let draft = serde_json::from_value(read_json(&file).await?)
                    .map_err(|e| ApiError::validation(format!("Invalid scenario: {}", e)))?;
                json(&scenario::save_pricing(db, &session, owner, draft).await?)
            }
            ScenarioCommand::Assess { file } => {
                json(&scenario::assess_json(&read_json(&file).await?))
            }
            ScenarioCommand::Copy { id } => {
                json(&scenario::copy_scenario(db, &session, owner, &id).await?)
            }
            ScenarioCommand::Compare { left, right } => json(
                &scenario::compare_scenarios(db, &session, owner, &[left, right]).await?,
            ),
            ScenarioCommand::Delete { id } => {
                scenario::delete_break_even(db, &session, owner, &id).await?;
                Ok(Output::Text(format!("Deleted {}\n", id)))
            }
        },

        Command::Recommend {
            scenario: scenario_id,
            text,
        } => json(
            &recommendation::add_recommendation(db, &session, owner, &scenario_id, &text).await?,
        ),

        Command::Recommendations { scenario } => json(
            &recommendation::list_recommendations(db, &session, owner, scenario.as_deref())
                .await?,
        ),
    }
}

fn json<T: Serialize>(value: &T) -> ApiResult<Output> {
    serde_json::to_value(value)
        .map(Output::Json)
        .map_err(|e| ApiError::internal(format!("Cannot serialize output: {}", e)))
}

async fn read_file(path: &Path) -> ApiResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::validation(format!("Cannot read {}: {}", path.display(), e)))
}

/// Rejects oversized files from their metadata before buffering them.
async fn read_upload(path: &Path, max_upload_bytes: usize) -> ApiResult<Vec<u8>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| ApiError::validation(format!("Cannot read {}: {}", path.display(), e)))?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    check_upload_size(size, max_upload_bytes)?;

    read_file(path).await
}

async fn read_json(path: &Path) -> ApiResult<Value> {
    let bytes = read_file(path).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::validation(format!("{} is not valid JSON: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_upload() {
        let cli = Cli::try_parse_from([
            "bizlens",
            "--user",
            "owner-1",
            "--role",
            "business_owner",
            "upload",
            "q3.xlsx",
            "--business-name",
            "Cafe",
        ])
        .unwrap();

        assert_eq!(cli.session(), Session::new("owner-1", Role::Owner));
        assert!(matches!(
            cli.command,
            Command::Upload { ref business_name, .. } if business_name.as_deref() == Some("Cafe")
        ));
    }

    #[test]
    fn test_owner_flag_is_global() {
        let cli = Cli::try_parse_from([
            "bizlens", "--user", "adv-1", "--role", "advisor", "insights", "--owner", "owner-1",
        ])
        .unwrap();
        assert_eq!(cli.owner.as_deref(), Some("owner-1"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = Cli::try_parse_from([
            "bizlens", "--user", "u", "--role", "admin", "insights",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_break_even_args_become_draft() {
        let cli = Cli::try_parse_from([
            "bizlens",
            "--user",
            "owner-1",
            "--role",
            "owner",
            "break-even",
            "save",
            "--product",
            "Widget",
            "--fixed-cost",
            "1200",
            "--variable-cost",
            "8",
            "--price",
            "20",
        ])
        .unwrap();

        let Command::BreakEven(BreakEvenCommand::Save(args)) = cli.command else {
            panic!("expected break-even save");
        };
        let draft = BreakEvenDraft::from(args);
        assert_eq!(draft.product_name, "Widget");
        assert_eq!(draft.fixed_cost, 1200.0);
        assert!(draft.scenario_name.is_none());
    }

    #[test]
    fn test_recommendations_scenario_filter() {
        let cli = Cli::try_parse_from([
            "bizlens", "--user", "o", "--role", "owner", "recommendations", "--scenario", "s-1",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Recommendations { ref scenario } if scenario.as_deref() == Some("s-1")
        ));
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bizlens-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_before_reading() {
        let path = temp_path("big.xlsx");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let err = read_upload(&path, 16).await.unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(err.code, ErrorCode::InvalidWorkbook);
        assert!(err.message.contains("64"));
    }

    #[tokio::test]
    async fn test_upload_within_limit_is_read() {
        let path = temp_path("small.xlsx");
        std::fs::write(&path, b"PK").unwrap();

        let bytes = read_upload(&path, 16).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(bytes, b"PK");
    }

    #[tokio::test]
    async fn test_missing_upload_is_validation_error() {
        let err = read_upload(&temp_path("absent.xlsx"), 16).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_bad_config_surfaces_as_api_error() {
        let cli = Cli::try_parse_from([
            "bizlens",
            "--config",
            temp_path("absent.toml").to_str().unwrap(),
            "--user",
            "owner-1",
            "--role",
            "owner",
            "insights",
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert_eq!(serde_json::to_value(&err).unwrap()["code"], "CONFIG_ERROR");
    }

    #[test]
    fn test_compare_takes_two_ids() {
        let cli = Cli::try_parse_from([
            "bizlens", "--user", "o", "--role", "owner", "scenario", "compare", "a", "b",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Scenario(ScenarioCommand::Compare { .. })
        ));
    }
}
