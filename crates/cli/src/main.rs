//! Dojo CLI - training progress tracking.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dojo_core::{Cohort, Requirement, User, Username};
use dojo_progress::{
    requirements_for_cohort, score_user, ConcurrencyMode, ProgressUpdateRequest, ProgressUpdater,
    UpdaterConfig,
};
use dojo_storage::{JsonStorage, RequirementCatalog, UserStore};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dojo")]
#[command(about = "Training progress tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage path for dojo data
    #[arg(short, long, env = "DOJO_STORAGE", default_value = ".dojo")]
    storage: PathBuf,

    /// Refuse negative increments
    #[arg(long)]
    reject_negative: bool,

    /// Retries after a concurrent update (0 disables the version check)
    #[arg(long, default_value = "3")]
    max_retries: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a user
    AddUser {
        /// Username
        username: String,
        /// Display name
        #[arg(long, default_value = "")]
        display_name: String,
        /// Cohort the user trains in
        #[arg(long)]
        cohort: Option<String>,
    },
    /// Add or replace a requirement from a JSON file
    AddRequirement {
        /// Path to the requirement JSON
        file: PathBuf,
    },
    /// Apply a progress update
    Update {
        /// Acting user
        username: String,
        /// Raw JSON request body; overrides the field flags
        #[arg(long)]
        body: Option<String>,
        /// Requirement ID
        #[arg(long, default_value = "")]
        requirement: String,
        /// Cohort
        #[arg(long, default_value = "")]
        cohort: String,
        /// Completed count to add
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        count: i64,
        /// Minutes to add
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        minutes: i64,
    },
    /// Show a user and their progress
    Show {
        /// Username
        username: String,
    },
    /// Show a user's timeline
    Timeline {
        /// Username
        username: String,
    },
    /// List requirements for a cohort
    Requirements {
        /// Cohort (ALL_COHORTS lists everything)
        #[arg(long, default_value = dojo_core::ALL_COHORTS)]
        cohort: String,
        /// Only requirements shown on the scoreboard
        #[arg(long)]
        scoreboard_only: bool,
    },
    /// Show a user's scoreboard score
    Score {
        /// Username
        username: String,
        /// Cohort to score against (defaults to the user's cohort)
        #[arg(long)]
        cohort: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let storage = Arc::new(
        JsonStorage::new(&cli.storage)
            .await
            .with_context(|| format!("opening storage at {}", cli.storage.display()))?,
    );

    let config = UpdaterConfig {
        reject_negative_increments: cli.reject_negative,
        concurrency: match cli.max_retries {
            0 => ConcurrencyMode::LastWriteWins,
            max_retries => ConcurrencyMode::Optimistic { max_retries },
        },
    };
    let updater = ProgressUpdater::new(storage.clone(), storage.clone()).with_config(config);

    match cli.command {
        Commands::AddUser { username, display_name, cohort } => {
            let mut user = User::new(username, chrono::Utc::now());
            user.display_name = display_name;
            user.dojo_cohort = cohort.as_deref().map(Cohort::parse);
            storage.save_user(&user).await?;
            info!(user = %user.username, "added user");
            print_json(&user)?;
        }
        Commands::AddRequirement { file } => {
            let json = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let requirement: Requirement = serde_json::from_str(&json)
                .with_context(|| format!("parsing requirement from {}", file.display()))?;
            storage.save_requirement(&requirement).await?;
            info!(requirement = %requirement.id, "saved requirement");
            print_json(&requirement)?;
        }
        Commands::Update { username, body, requirement, cohort, count, minutes } => {
            let username = Username::new(username);
            let result = match body {
                Some(body) => updater.update_json(&username, &body).await,
                None => {
                    let request = ProgressUpdateRequest {
                        requirement_id: requirement,
                        incremental_count: count,
                        incremental_minutes_spent: minutes,
                        cohort,
                    };
                    updater.update(&username, &request).await
                }
            };
            match result {
                Ok(user) => print_json(&user)?,
                Err(err) => {
                    print_json(&err.to_response())?;
                    std::process::exit(1);
                }
            }
        }
        Commands::Show { username } => {
            let user = storage.get_user(&Username::new(username)).await?;
            print_json(&user)?;
        }
        Commands::Timeline { username } => {
            let entries = updater.timeline(&Username::new(username)).await?;
            print_json(&entries)?;
        }
        Commands::Requirements { cohort, scoreboard_only } => {
            let requirements =
                requirements_for_cohort(storage.as_ref(), &Cohort::parse(&cohort), scoreboard_only)
                    .await?;
            print_json(&requirements)?;
        }
        Commands::Score { username, cohort } => {
            let user = storage.get_user(&Username::new(username)).await?;
            let cohort = cohort
                .as_deref()
                .map(Cohort::parse)
                .or_else(|| user.dojo_cohort.clone())
                .with_context(|| format!("user {} has no cohort; pass --cohort", user.username))?;
            let requirements = requirements_for_cohort(storage.as_ref(), &cohort, true).await?;
            print_json(&score_user(&user, &cohort, &requirements))?;
        }
    }

    Ok(())
}
