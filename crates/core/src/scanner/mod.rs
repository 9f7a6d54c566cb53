//! Per-network multi-strategy scanners.
//!
//! A scanner runs its detection strategies concurrently, merges whatever
//! succeeded and returns a deduplicated, newest-first list. Strategy failures
//! are logged and contribute nothing; only a failed orchestration
//! prerequisite fails the whole network.

mod bnb;
mod sui;

pub use bnb::{BnbScanSettings, BnbScanner};
pub use sui::{SuiScanSettings, SuiScanner};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::admission::DiscoverySource;
use crate::error::ScanError;
use crate::fanout::{Outcome, Settled};
use crate::pair::{CandidatePair, Network};

/// One network's discovery pipeline.
#[async_trait]
pub trait NetworkScanner: Send + Sync {
    fn network(&self) -> Network;

    /// Discovery source, selects the admission policy.
    fn source(&self) -> DiscoverySource {
        DiscoverySource::OnChain
    }

    /// Run every strategy once over the configured lookback.
    async fn scan(&self) -> Result<Vec<CandidatePair>, ScanError>;
}

/// Flatten strategy outcomes in strategy order, logging each.
pub(crate) fn collect_settled(
    network: Network,
    settled: Vec<Settled<Vec<CandidatePair>>>,
) -> Vec<CandidatePair> {
    let mut all = Vec::new();
    for Settled { label, outcome } in settled {
        match outcome {
            Outcome::Completed(pairs) => {
                info!(network = %network, strategy = label, found = pairs.len(), "Strategy completed");
                all.extend(pairs);
            }
            Outcome::Failed(reason) => {
                warn!(network = %network, strategy = label, reason = %reason, "Strategy failed, contributing nothing");
            }
        }
    }
    all
}

pub(crate) fn strategy_error(strategy: &'static str, err: impl std::fmt::Display) -> ScanError {
    ScanError::Strategy {
        strategy,
        reason: err.to_string(),
    }
}
