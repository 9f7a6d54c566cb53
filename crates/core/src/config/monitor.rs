//! Monitor configuration.
//!
//! Every field has a serde default, so an empty TOML file (or none at all)
//! yields the production deployment: PancakeSwap on BNB Smart Chain and the
//! Cetus/Turbos packages on Sui.

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use pairscout_chain::evm::contracts::bsc;
use pairscout_chain::{EventTopics, EvmSignals, MovePackage, SUI_MAINNET_RPC};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::pair::Network;

/// Top-level monitoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Networks scanned on each pass
    #[serde(default = "default_networks")]
    pub networks: Vec<Network>,

    /// Upper bound for any single RPC call
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,

    /// Persistence gate thresholds
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// BNB Smart Chain scanner
    #[serde(default)]
    pub bnb: BnbConfig,

    /// Sui scanner
    #[serde(default)]
    pub sui: SuiConfig,
}

fn default_networks() -> Vec<Network> {
    vec![Network::Sui, Network::Bnb]
}
fn default_rpc_timeout_ms() -> u64 {
    10_000
}

/// Market thresholds for the strict admission policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    #[serde(default = "default_min_market_cap")]
    pub min_market_cap: f64,

    #[serde(default = "default_min_volume")]
    pub min_volume_24h: f64,
}

fn default_min_market_cap() -> f64 {
    10_000.0
}
fn default_min_volume() -> f64 {
    1_000.0
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            min_market_cap: default_min_market_cap(),
            min_volume_24h: default_min_volume(),
        }
    }
}

/// BNB Smart Chain scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BnbConfig {
    /// JSON-RPC endpoint; `${VAR}` is expanded from the environment
    #[serde(default = "default_bnb_rpc")]
    pub rpc_url: String,

    /// Average block interval
    #[serde(default = "default_block_time_ms")]
    pub block_time_ms: u64,

    /// How far back each scan looks
    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: u64,

    /// Pair factory
    #[serde(default = "default_factory")]
    pub factory: Address,

    /// Routers emitting liquidity events
    #[serde(default = "default_routers")]
    pub routers: Vec<Address>,

    /// Wrapped native token
    #[serde(default = "default_wrapped_native")]
    pub wrapped_native: Address,

    /// Most recent transfer logs inspected per scan
    #[serde(default = "default_transfer_sample")]
    pub transfer_sample_size: usize,

    /// Large transfer threshold in whole tokens (18 decimals assumed)
    #[serde(default = "default_large_transfer_tokens")]
    pub large_transfer_tokens: u64,

    /// Concurrent metadata lookups per signal
    #[serde(default = "default_metadata_concurrency")]
    pub metadata_concurrency: usize,
}

fn default_bnb_rpc() -> String {
    "https://bsc-dataseed.binance.org/".to_string()
}
fn default_block_time_ms() -> u64 {
    3_000
}
fn default_lookback_secs() -> u64 {
    30 * 60
}
fn default_factory() -> Address {
    bsc::FACTORY
}
fn default_routers() -> Vec<Address> {
    vec![bsc::ROUTER_V2, bsc::ROUTER_V3]
}
fn default_wrapped_native() -> Address {
    bsc::WBNB
}
fn default_transfer_sample() -> usize {
    100
}
fn default_large_transfer_tokens() -> u64 {
    100_000
}
fn default_metadata_concurrency() -> usize {
    8
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_bnb_rpc(),
            block_time_ms: default_block_time_ms(),
            lookback_secs: default_lookback_secs(),
            factory: default_factory(),
            routers: default_routers(),
            wrapped_native: default_wrapped_native(),
            transfer_sample_size: default_transfer_sample(),
            large_transfer_tokens: default_large_transfer_tokens(),
            metadata_concurrency: default_metadata_concurrency(),
        }
    }
}

impl BnbConfig {
    /// Signal configuration injected into the BNB scanner.
    pub fn signals(&self) -> EvmSignals {
        EvmSignals {
            factory: self.factory,
            routers: self.routers.clone(),
            wrapped_native: self.wrapped_native,
            topics: EventTopics::standard(),
        }
    }
}

/// Sui scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiConfig {
    #[serde(default = "default_sui_rpc")]
    pub rpc_url: String,

    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: u64,

    /// Page size of each event query
    #[serde(default = "default_events_per_query")]
    pub events_per_query: usize,

    /// Packages and event types queried, in order
    #[serde(default = "default_packages")]
    pub packages: Vec<MovePackage>,
}

fn default_sui_rpc() -> String {
    SUI_MAINNET_RPC.to_string()
}
fn default_events_per_query() -> usize {
    50
}

/// Label of the package entry `SUI_FACTORY_ADDRESS` replaces.
pub(crate) const FACTORY_LABEL: &str = "factory";

fn default_packages() -> Vec<MovePackage> {
    vec![
        MovePackage::new(
            "0x1eabed72c53feb3805120a081dc15963c204dc8d091542592abaf7a35689b2fb",
            "cetus",
            &["PoolCreatedEvent", "AddLiquidityEvent"],
        ),
        MovePackage::new(
            "0x91bfbc386a41afcfd9b2533058d7e915a1d3829089cc268ff4333d54d6339ca1",
            "turbos",
            &["PoolCreated", "LiquidityAdded"],
        ),
        MovePackage::new(
            "0x886b3ff4623c7a9d101e0470012e0612621fbc67fa4cedddd3b17b273e35a50e",
            FACTORY_LABEL,
            &["PairCreated"],
        ),
    ]
}

impl Default for SuiConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_sui_rpc(),
            lookback_secs: default_lookback_secs(),
            events_per_query: default_events_per_query(),
            packages: default_packages(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            networks: default_networks(),
            rpc_timeout_ms: default_rpc_timeout_ms(),
            admission: AdmissionConfig::default(),
            bnb: BnbConfig::default(),
            sui: SuiConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Failed to parse {path}"))?;
        Ok(config)
    }

    /// `CONFIG_FILE` if set (defaults otherwise), then environment overrides,
    /// then validation.
    pub fn load() -> Result<Self> {
        let base = match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        let config = base.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn is_enabled(&self, network: Network) -> bool {
        self.networks.contains(&network)
    }

    /// Reject configurations no scan could run with.
    pub fn validate(&self) -> Result<()> {
        if self.networks.is_empty() {
            bail!("No networks enabled");
        }
        if self.rpc_timeout_ms == 0 {
            bail!("rpc_timeout_ms must be positive");
        }
        if self.bnb.block_time_ms == 0 {
            bail!("bnb.block_time_ms must be positive");
        }
        if self.bnb.metadata_concurrency == 0 {
            bail!("bnb.metadata_concurrency must be positive");
        }

        let package_id = Regex::new(r"^0x[0-9a-fA-F]{1,64}$").context("package id pattern")?;
        for package in &self.sui.packages {
            if !package_id.is_match(&package.package_id) {
                bail!("Invalid Sui package id: {}", package.package_id);
            }
            if package.events.iter().any(|e| e.trim().is_empty()) {
                bail!("Empty event type for package {}", package.package_id);
            }
        }

        Ok(())
    }

    /// Log the effective configuration.
    pub fn log_config(&self) {
        let networks: Vec<&str> = self.networks.iter().map(|n| n.as_str()).collect();
        info!(
            networks = ?networks,
            rpc_timeout_ms = self.rpc_timeout_ms,
            min_market_cap = self.admission.min_market_cap,
            min_volume_24h = self.admission.min_volume_24h,
            "Monitor configuration loaded"
        );
        if self.is_enabled(Network::Bnb) {
            info!(
                rpc = %self.bnb.rpc_url,
                factory = %self.bnb.factory,
                routers = self.bnb.routers.len(),
                lookback_secs = self.bnb.lookback_secs,
                block_time_ms = self.bnb.block_time_ms,
                "BNB scanner"
            );
        }
        if self.is_enabled(Network::Sui) {
            let event_types: usize = self.sui.packages.iter().map(|p| p.events.len()).sum();
            info!(
                rpc = %self.sui.rpc_url,
                packages = self.sui.packages.len(),
                event_types = event_types,
                lookback_secs = self.sui.lookback_secs,
                "Sui scanner"
            );
        }
    }
}
