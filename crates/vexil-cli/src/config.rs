//! CLI configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration of the `vexil` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Flags settings document (see `FlagsConfig`)
    pub settings: PathBuf,

    /// Default log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            settings: PathBuf::from("flags.yaml"),
            log_filter: "vexil=info,vexil_core=info,vexil_sdk=info,vexil_repository=info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration from `vexil.yaml` and `VEXIL_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        Self::load_from("vexil")
    }

    pub(crate) fn load_from(name: &str) -> anyhow::Result<Self> {
        let config_result = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("VEXIL"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::debug!("No usable config file ({}), using default configuration", e);
                Ok(Self::default())
            }
        }
    }
}
