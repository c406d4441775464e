use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::agents::AgentRunnerConfig;
use crate::moderator::ModeratorConfig;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub auction: ModeratorConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub human: HumanConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Spawn the AI franchises
    pub enabled: bool,
    /// Opening balance of every AI wallet
    pub starting_balance: Decimal,
    /// Lower bound of the reaction delay
    pub reaction_min_ms: u64,
    pub reaction_max_ms: u64,
    /// Base seed; each agent offsets it by its table position
    pub seed: u64,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            starting_balance: dec!(1000),
            reaction_min_ms: 500,
            reaction_max_ms: 2500,
            seed: 7,
        }
    }
}

impl AgentsConfig {
    pub fn runner_config(&self) -> AgentRunnerConfig {
        AgentRunnerConfig {
            reaction_min_ms: self.reaction_min_ms,
            reaction_max_ms: self.reaction_max_ms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HumanConfig {
    pub starting_balance: Decimal,
}

impl Default for HumanConfig {
    fn default() -> Self {
        Self {
            starting_balance: dec!(1000),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Mint endpoint; ignored when `dry_run` is set
    pub endpoint: Option<String>,
    pub dry_run: bool,
    pub timeout_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            dry_run: true,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON array of players; the built-in demo queue when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Daily rolling log files go here when set
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("auction.bid_timeout_secs", 15)?
            .set_default("auction.settle_ticks", 3)?
            .set_default("auction.tick_ms", 1000)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Environment-specific file (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("AUCTIONEER_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // AUCTIONEER_AUCTION__BID_TIMEOUT_SECS, AUCTIONEER_SERVER__PORT, ...
            .add_source(
                Environment::with_prefix("AUCTIONEER")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.auction.bid_timeout_secs == 0 {
            errors.push("auction.bid_timeout_secs must be positive".to_string());
        }
        if self.auction.tick_ms == 0 {
            errors.push("auction.tick_ms must be positive".to_string());
        }

        if self.agents.starting_balance < Decimal::ZERO {
            errors.push("agents.starting_balance must not be negative".to_string());
        }
        if self.agents.reaction_min_ms > self.agents.reaction_max_ms {
            errors.push("agents.reaction_min_ms must not exceed reaction_max_ms".to_string());
        }

        if self.human.starting_balance < Decimal::ZERO {
            errors.push("human.starting_balance must not be negative".to_string());
        }

        if self.server.port == 0 {
            errors.push("server.port must be set".to_string());
        }

        if !self.registry.dry_run && self.registry.endpoint.is_none() {
            errors.push("registry.endpoint is required unless registry.dry_run is set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
