// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Gateway configuration module
//!
//! Configuration is layered with the `config` crate. Server settings, per-chain
//! endpoint lists, the explorer client and the incubator wallet all live in one
//! [`GatewayConfig`] that is validated before anything is started.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use alloy_primitives::{Address, address};
use anyhow::{Result, anyhow, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File};
use endpoint_registry::RegistryConfig;
use explorer_client::{BSCSCAN_API_URL, ExplorerConfig};
use serde::{Deserialize, Deserializer, Serialize, de};
use shared_types::{ChainId, TrackedToken, default_bsc_tokens};
use url::Url;

use crate::error::{ServerError, ServerResult};

/// Wallet that receives incubator deposits on BNB Smart Chain
pub const DEFAULT_INCUBATOR_WALLET: Address =
    address!("0xEA9123FAe9121C45B1c1f10eCf96fbD1284Af5Ed");

const ENV_PREFIX: &str = "GATEWAY";
const ENV_SEPARATOR: &str = "__";

/// A validated server port that ensures the value is appropriate for the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerPort {
    port: u16,
    environment: Environment,
}

impl ServerPort {
    /// Create a new `ServerPort`, ensuring it's valid for the given environment
    ///
    /// # Errors
    ///
    /// Returns an error if the port is 0 in non-testing environments
    pub fn new(port: u16, environment: Environment) -> Result<Self> {
        if port == 0 && environment != Environment::Testing {
            return Err(anyhow!("port cannot be 0 in non-testing environments"));
        }
        Ok(Self { port, environment })
    }

    /// Default development port
    pub const fn default_development() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
        }
    }

    /// Port 0, letting the OS pick
    pub const fn testing() -> Self {
        Self {
            port: 0,
            environment: Environment::Testing,
        }
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.port
    }
}

impl<'de> Deserialize<'de> for ServerPort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        // Re-checked against the real environment once the whole config is loaded
        Ok(Self {
            port,
            environment: Environment::Development,
        })
    }
}

/// A validated timeout duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// 30 seconds
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(30))
    }

    /// 5 seconds
    pub const fn testing() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Get the timeout value
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}

/// Endpoint pool and probing settings for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// RPC endpoint URLs in preference order
    pub endpoints: Vec<String>,
    /// Consecutive failed probes before an endpoint is marked unhealthy
    pub max_fail_count: u32,
    /// Seconds between probe rounds
    pub probe_interval_seconds: u64,
    /// Seconds before a single probe is abandoned
    pub probe_timeout_seconds: u64,
}

impl ChainSettings {
    fn with_endpoints(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            max_fail_count: 3,
            probe_interval_seconds: 30,
            probe_timeout_seconds: 5,
        }
    }

    /// Registry configuration for `chain`
    pub fn registry_config(&self, chain: ChainId) -> RegistryConfig {
        RegistryConfig::new(chain, self.endpoints.clone())
            .with_max_fail_count(self.max_fail_count)
            .with_probe_interval(Duration::from_secs(self.probe_interval_seconds))
            .with_probe_timeout(Duration::from_secs(self.probe_timeout_seconds))
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self::with_endpoints(Vec::new())
    }
}

/// Per-chain endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainsConfig {
    /// BNB Smart Chain
    pub bsc: ChainSettings,
    /// Solana
    pub solana: ChainSettings,
}

impl ChainsConfig {
    /// Settings for `chain`
    pub fn get(&self, chain: ChainId) -> &ChainSettings {
        match chain {
            ChainId::Bsc => &self.bsc,
            ChainId::Solana => &self.solana,
        }
    }

    fn get_mut(&mut self, chain: ChainId) -> &mut ChainSettings {
        match chain {
            ChainId::Bsc => &mut self.bsc,
            ChainId::Solana => &mut self.solana,
        }
    }
}

impl Default for ChainsConfig {
    fn default() -> Self {
        Self {
            bsc: ChainSettings::with_endpoints(ChainId::Bsc.default_endpoints()),
            solana: ChainSettings::with_endpoints(ChainId::Solana.default_endpoints()),
        }
    }
}

/// Block explorer client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    /// Explorer API endpoint
    pub base_url: String,
    /// API key, required
    pub api_key: String,
    /// Minimum spacing between explorer requests in milliseconds
    pub min_interval_ms: u64,
    /// Seconds a successful response stays cached
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached responses
    pub max_cache_entries: usize,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            base_url: BSCSCAN_API_URL.to_string(),
            api_key: String::new(),
            min_interval_ms: 20_000,
            cache_ttl_seconds: 60,
            max_cache_entries: 10_000,
            timeout_seconds: 30,
        }
    }
}

impl ExplorerSettings {
    /// Client configuration built from these settings
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or API key is empty
    pub fn client_config(&self) -> explorer_client::Result<ExplorerConfig> {
        Ok(
            ExplorerConfig::new(self.base_url.clone(), self.api_key.clone())?
                .with_min_interval(Duration::from_millis(self.min_interval_ms))
                .with_cache_ttl(Duration::from_secs(self.cache_ttl_seconds))
                .with_max_cache_entries(self.max_cache_entries)
                .with_timeout_seconds(self.timeout_seconds),
        )
    }
}

/// Incubator deposit tracking settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncubatorSettings {
    /// Wallet that receives deposits
    pub wallet: Address,
    /// Tokens whose balances and deposits are reported
    pub tokens: Vec<TrackedToken>,
}

impl Default for IncubatorSettings {
    fn default() -> Self {
        Self {
            wallet: DEFAULT_INCUBATOR_WALLET,
            tokens: default_bsc_tokens(),
        }
    }
}

/// Complete gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server host address
    pub host: IpAddr,
    /// Server port (validated for environment compatibility)
    pub port: ServerPort,
    /// Request timeout in seconds (validated range: 1-300)
    pub timeout_seconds: TimeoutSeconds,
    /// Environment type
    pub environment: Environment,
    /// Timeout for direct on-chain reads in seconds
    #[serde(default = "default_rpc_timeout_seconds")]
    pub rpc_timeout_seconds: u64,
    /// Per-chain endpoint settings
    #[serde(default)]
    pub chains: ChainsConfig,
    /// Explorer client settings
    #[serde(default)]
    pub explorer: ExplorerSettings,
    /// Incubator deposit tracking
    #[serde(default)]
    pub incubator: IncubatorSettings,
}

const fn default_rpc_timeout_seconds() -> u64 {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::default_development(),
            timeout_seconds: TimeoutSeconds::default(),
            environment: Environment::Development,
            rpc_timeout_seconds: default_rpc_timeout_seconds(),
            chains: ChainsConfig::default(),
            explorer: ExplorerSettings::default(),
            incubator: IncubatorSettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables and optional configuration files
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::load(Path::new("."))
            .map_err(|e| ServerError::Config {
                message: format!("failed to load configuration: {e}"),
            })
            .and_then(|config| {
                config.validate().map_err(|e| ServerError::Config {
                    message: e.to_string(),
                })?;
                Ok(config)
            })
    }

    /// Load configuration from `dir` using the config crate with hierarchical sources
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. `config.json`
    /// 3. `config.{env}.json`
    /// 4. Environment variables such as `GATEWAY_EXPLORER__API_KEY`
    ///
    /// List values (`chains.*.endpoints`) may be given as comma separated
    /// environment variables. A chain left without endpoints gets its public
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let env_var = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let env_name = env_var.to_lowercase();

        let mut config_builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("timeout_seconds", 30)?
            .set_default("environment", "development")?
            .add_source(File::from(dir.join("config.json")).required(false))
            .add_source(File::from(dir.join(format!("config.{env_name}.json"))).required(false))
            .add_source(
                ConfigEnv::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .list_separator(",")
                    .with_list_parse_key("chains.bsc.endpoints")
                    .with_list_parse_key("chains.solana.endpoints")
                    .try_parsing(true),
            );

        if std::env::var("ENVIRONMENT").is_ok() {
            config_builder = config_builder.set_override("environment", env_name)?;
        }

        let mut gateway_config: Self = config_builder.build()?.try_deserialize()?;

        gateway_config.port =
            ServerPort::new(gateway_config.port.value(), gateway_config.environment)
                .map_err(|e| ConfigError::Message(format!("invalid port configuration: {e}")))?;

        for &chain in ChainId::all() {
            let settings = gateway_config.chains.get_mut(chain);
            if settings.endpoints.is_empty() {
                settings.endpoints = chain.default_endpoints();
            }
        }

        Ok(gateway_config)
    }

    /// Check cross-field constraints the deserializer cannot express
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        for &chain in ChainId::all() {
            let settings = self.chains.get(chain);
            settings
                .registry_config(chain)
                .validate()
                .map_err(|e| anyhow!("chains.{}: {e}", chain.slug()))?;

            for endpoint in &settings.endpoints {
                Url::parse(endpoint).map_err(|e| {
                    anyhow!("chains.{}: invalid endpoint {endpoint}: {e}", chain.slug())
                })?;
            }
        }

        ensure!(
            !self.explorer.api_key.trim().is_empty(),
            "explorer.api_key must be set"
        );
        Url::parse(&self.explorer.base_url)
            .map_err(|e| anyhow!("explorer.base_url is invalid: {e}"))?;
        ensure!(
            self.explorer.timeout_seconds > 0,
            "explorer.timeout_seconds must be greater than 0"
        );
        ensure!(
            self.rpc_timeout_seconds > 0,
            "rpc_timeout_seconds must be greater than 0"
        );

        Ok(())
    }

    /// Configuration for tests: OS-assigned port, no explorer spacing, a dummy API key
    ///
    /// Endpoint lists still point at public nodes and must be replaced before
    /// a server is started.
    pub fn for_testing() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::testing(),
            timeout_seconds: TimeoutSeconds::testing(),
            environment: Environment::Testing,
            rpc_timeout_seconds: 2,
            chains: ChainsConfig::default(),
            explorer: ExplorerSettings {
                api_key: "test-api-key".to_string(),
                min_interval_ms: 0,
                timeout_seconds: 5,
                ..ExplorerSettings::default()
            },
            incubator: IncubatorSettings::default(),
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }

    /// Timeout for direct on-chain reads
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }
}
