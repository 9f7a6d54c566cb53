//! Pairscout core logic.
//!
//! This crate provides the discovery pipeline on top of the chain adapters:
//! - Normalized candidate pair record
//! - Per-network multi-strategy scanners (BNB Smart Chain, Sui)
//! - Fan-out primitive isolating strategy failures and panics
//! - First-seen-wins deduplication with newest-first ordering
//! - Admission policies and the persistence contract
//! - Monitoring orchestrator running one pass over every network
//! - Configuration with TOML files and environment overrides

mod admission;
pub mod config;
mod dedup;
mod error;
mod fanout;
mod monitor;
mod pair;
mod scanner;
mod store;

#[cfg(test)]
mod testing;

pub use admission::{AdmissionPolicy, DiscoverySource};
pub use config::{AdmissionConfig, BnbConfig, MonitorConfig, SuiConfig};
pub use dedup::dedup_and_sort;
pub use error::{ScanError, StoreError};
pub use fanout::{settle_all, Outcome, Settled};
pub use monitor::{Monitor, MonitorReport, NetworkReport};
pub use pair::{CandidatePair, CandidatePairBuilder, Network, RiskAssessment};
pub use scanner::{BnbScanSettings, BnbScanner, NetworkScanner, SuiScanSettings, SuiScanner};
pub use store::{MemoryPairStore, PairStore};
