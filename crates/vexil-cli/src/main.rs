//! Vexil command line tool
//!
//! Inspects, checks and toggles feature flags defined by a flags settings
//! document and its condition store.

mod commands;
mod config;

use crate::commands::CheckRequest;
use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vexil_sdk::{FlagEngine, FlagEngineBuilder, FlagsConfig};

#[derive(Parser)]
#[command(name = "vexil")]
#[command(about = "Inspect and toggle Vexil feature flags")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Flags settings file (overrides vexil.yaml / VEXIL_SETTINGS)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a flag for a described request
    Check {
        /// Flag name
        flag: String,

        /// Request path
        #[arg(long, default_value = "/")]
        path: String,

        /// Query parameter as name=value (can specify multiple)
        #[arg(long = "param")]
        params: Vec<String>,

        /// Authenticated username
        #[arg(long, conflicts_with = "anonymous")]
        user: Option<String>,

        /// Evaluate as an anonymous user (default)
        #[arg(long)]
        anonymous: bool,
    },

    /// List every flag with its conditions
    List,

    /// List registered condition types
    Conditions,

    /// Enable a flag through its stored boolean condition
    Enable {
        flag: String,

        /// Fail instead of creating a boolean condition
        #[arg(long)]
        no_create: bool,
    },

    /// Disable a flag through its stored boolean condition
    Disable {
        flag: String,

        /// Fail instead of creating a boolean condition
        #[arg(long)]
        no_create: bool,
    },

    /// Validate a value for a condition type
    Validate { condition: String, value: String },

    /// Check flags for conditions that are not registered
    Doctor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load()?;
    init_tracing(&config)?;

    let settings = cli.settings.unwrap_or(config.settings);
    let engine = init_engine(&settings)?;

    let output = match cli.command {
        Commands::Check {
            flag,
            path,
            params,
            user,
            anonymous,
        } => {
            let request = CheckRequest {
                path,
                params,
                user,
                anonymous,
            };
            commands::check(&engine, &flag, &request)?
        }
        Commands::List => commands::list(&engine)?,
        Commands::Conditions => commands::conditions(&engine),
        Commands::Enable { flag, no_create } => commands::set_flag(&engine, &flag, true, !no_create)?,
        Commands::Disable { flag, no_create } => {
            commands::set_flag(&engine, &flag, false, !no_create)?
        }
        Commands::Validate { condition, value } => commands::validate(&engine, &condition, &value)?,
        Commands::Doctor => commands::doctor(&engine)?,
    };

    println!("{}", output);
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(config: &CliConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

/// Build the engine from the settings file; a missing file means no settings flags
fn init_engine(settings: &Path) -> Result<FlagEngine> {
    let flags_config = if settings.exists() {
        FlagsConfig::from_file(settings)
            .with_context(|| format!("Failed to load {}", settings.display()))?
    } else {
        info!("No settings file at {}, using defaults", settings.display());
        FlagsConfig::default()
    };

    let engine = FlagEngineBuilder::new().with_config(flags_config).build()?;
    for warning in engine.check_conditions() {
        tracing::warn!("{}", warning);
    }
    Ok(engine)
}
