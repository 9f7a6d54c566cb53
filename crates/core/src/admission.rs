//! Admission filter applied before persistence.

use crate::pair::CandidatePair;

/// Where a batch of candidates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySource {
    /// On-chain scanners; market data is always zero at discovery
    OnChain,
    /// Market-data feeds carrying real market cap and volume
    MarketData,
}

/// Gate deciding which candidates reach the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdmissionPolicy {
    /// Require market thresholds plus non-empty labels
    Strict {
        min_market_cap: f64,
        min_volume_24h: f64,
    },
    /// Require non-empty labels only
    NewPair,
}

impl AdmissionPolicy {
    /// Policy for a discovery source. On-chain candidates would never pass
    /// market thresholds, so they are admitted permissively.
    pub fn for_source(source: DiscoverySource, min_market_cap: f64, min_volume_24h: f64) -> Self {
        match source {
            DiscoverySource::OnChain => AdmissionPolicy::NewPair,
            DiscoverySource::MarketData => AdmissionPolicy::Strict {
                min_market_cap,
                min_volume_24h,
            },
        }
    }

    pub fn admits(&self, pair: &CandidatePair) -> bool {
        let labelled = !pair.contract_address.is_empty()
            && !pair.symbol.is_empty()
            && !pair.name.is_empty();

        match *self {
            AdmissionPolicy::NewPair => labelled,
            AdmissionPolicy::Strict {
                min_market_cap,
                min_volume_24h,
            } => labelled && pair.market_cap >= min_market_cap && pair.volume_24h >= min_volume_24h,
        }
    }

    /// Partition into (admitted, rejected count).
    pub fn filter(&self, pairs: Vec<CandidatePair>) -> (Vec<CandidatePair>, usize) {
        let total = pairs.len();
        let admitted: Vec<CandidatePair> = pairs.into_iter().filter(|p| self.admits(p)).collect();
        let rejected = total - admitted.len();
        (admitted, rejected)
    }
}
