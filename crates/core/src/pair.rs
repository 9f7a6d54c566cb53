//! Normalized candidate pair record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Networks the monitor can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Bnb,
    Sui,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Bnb => "bnb",
            Network::Sui => "sui",
        }
    }

    /// Slug used by dextools pair explorer URLs.
    fn dextools_slug(&self) -> &'static str {
        match self {
            Network::Bnb => "bnb",
            Network::Sui => "sui",
        }
    }

    /// Slug used by dexscreener URLs.
    fn dexscreener_slug(&self) -> &'static str {
        match self {
            Network::Bnb => "bsc",
            Network::Sui => "sui",
        }
    }

    pub fn dextools_url(&self, contract: &str) -> String {
        format!(
            "https://www.dextools.io/app/en/{}/pair-explorer/{}",
            self.dextools_slug(),
            contract
        )
    }

    pub fn dexscreener_url(&self, contract: &str) -> String {
        format!("https://dexscreener.com/{}/{}", self.dexscreener_slug(), contract)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bnb" | "bsc" => Ok(Network::Bnb),
            "sui" => Ok(Network::Sui),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Heuristic risk annotation attached by some detection strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub factors: Vec<String>,
}

impl RiskAssessment {
    pub fn new(score: u8, factors: &[&str]) -> Self {
        Self {
            score,
            factors: factors.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// A newly observed token or pair, normalized across networks.
///
/// Market fields are always zero at discovery; pricing happens downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePair {
    /// Unique within a network for a merged scan result
    #[serde(rename = "id")]
    pub identity: String,
    pub symbol: String,
    pub name: String,
    pub network: Network,
    pub contract_address: String,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub price: f64,
    pub price_change_24h: f64,
    pub launch_time: DateTime<Utc>,
    pub dextools_url: String,
    pub dexscreener_url: String,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskAssessment>,
}

impl CandidatePair {
    /// Start a record. Returns `None` when symbol or name is blank.
    pub fn builder(
        network: Network,
        identity: impl Into<String>,
        contract_address: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        launch_time: DateTime<Utc>,
    ) -> Option<CandidatePairBuilder> {
        let symbol = symbol.into();
        let name = name.into();
        if symbol.trim().is_empty() || name.trim().is_empty() {
            return None;
        }

        let contract_address = contract_address.into();
        Some(CandidatePairBuilder {
            pair: CandidatePair {
                identity: identity.into(),
                symbol,
                name,
                network,
                dextools_url: network.dextools_url(&contract_address),
                dexscreener_url: network.dexscreener_url(&contract_address),
                contract_address,
                market_cap: 0.0,
                volume_24h: 0.0,
                price: 0.0,
                price_change_24h: 0.0,
                launch_time,
                verified: false,
                total_supply: None,
                liquidity: None,
                risk: None,
            },
        })
    }
}

/// Sets the optional fields of a [`CandidatePair`].
#[derive(Debug)]
pub struct CandidatePairBuilder {
    pair: CandidatePair,
}

impl CandidatePairBuilder {
    pub fn total_supply(mut self, supply: f64) -> Self {
        self.pair.total_supply = Some(supply);
        self
    }

    pub fn liquidity(mut self, liquidity: f64) -> Self {
        self.pair.liquidity = Some(liquidity);
        self
    }

    pub fn risk(mut self, risk: RiskAssessment) -> Self {
        self.pair.risk = Some(risk);
        self
    }

    pub fn build(self) -> CandidatePair {
        self.pair
    }
}
