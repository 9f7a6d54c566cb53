//! Scan and persistence errors.

use pairscout_chain::SourceError;
use thiserror::Error;

use crate::pair::Network;

/// A network scan could not proceed.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The network's orchestration prerequisite (head block, checkpoint)
    /// was unavailable.
    #[error("{network} unreachable: {source}")]
    Unreachable {
        network: Network,
        #[source]
        source: SourceError,
    },

    /// A single detection strategy failed. Only surfaces inside fan-out
    /// outcomes, never as a network result.
    #[error("strategy {strategy} failed: {reason}")]
    Strategy {
        strategy: &'static str,
        reason: String,
    },
}

/// Persistence collaborator failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write rejected for {contract}: {reason}")]
    Rejected { contract: String, reason: String },
}
