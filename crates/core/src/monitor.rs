//! Monitoring orchestrator.
//!
//! One pass scans every network concurrently, gates the results through the
//! admission policy of each scanner's discovery source and persists records
//! not seen before. A failed network never affects the others.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::admission::AdmissionPolicy;
use crate::config::AdmissionConfig;
use crate::fanout::{settle_all, Outcome};
use crate::pair::{CandidatePair, Network};
use crate::scanner::NetworkScanner;
use crate::store::PairStore;

/// Outcome of one network within a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkReport {
    pub network: Option<Network>,
    /// Unique candidates returned by the scanner
    pub discovered: usize,
    /// Candidates that passed admission
    pub admitted: usize,
    /// Newly stored records
    pub inserted: usize,
    /// Candidates already present in the store
    pub skipped_existing: usize,
    /// Per-record store failures
    pub store_failures: usize,
    /// Scan failure, if the network could not be scanned
    pub error: Option<String>,
}

/// Result of [`Monitor::run_once`].
#[derive(Debug, Clone, Default)]
pub struct MonitorReport {
    pub networks: Vec<NetworkReport>,
    /// Records inserted during the pass, per network in scanner order
    pub inserted: Vec<CandidatePair>,
}

impl MonitorReport {
    pub fn total_inserted(&self) -> usize {
        self.inserted.len()
    }

    pub fn total_discovered(&self) -> usize {
        self.networks.iter().map(|n| n.discovered).sum()
    }

    pub fn failed_networks(&self) -> impl Iterator<Item = &NetworkReport> {
        self.networks.iter().filter(|n| n.error.is_some())
    }
}

pub struct Monitor {
    scanners: Vec<Arc<dyn NetworkScanner>>,
    store: Arc<dyn PairStore>,
    admission: AdmissionConfig,
}

impl Monitor {
    pub fn new(
        scanners: Vec<Arc<dyn NetworkScanner>>,
        store: Arc<dyn PairStore>,
        admission: AdmissionConfig,
    ) -> Self {
        Self {
            scanners,
            store,
            admission,
        }
    }

    /// Scan all networks once and persist new records.
    #[instrument(skip(self), fields(networks = self.scanners.len()))]
    pub async fn run_once(&self) -> MonitorReport {
        let scans: Vec<_> = self
            .scanners
            .iter()
            .map(|scanner| (scanner.network().as_str(), scanner.scan()))
            .collect();
        let settled = settle_all(scans).await;

        let mut report = MonitorReport::default();

        for (scanner, result) in self.scanners.iter().zip(settled) {
            let network = scanner.network();
            let mut net = NetworkReport {
                network: Some(network),
                ..Default::default()
            };

            let pairs = match result.outcome {
                Outcome::Completed(pairs) => pairs,
                Outcome::Failed(reason) => {
                    warn!(network = %network, reason = %reason, "Network scan failed");
                    net.error = Some(reason);
                    report.networks.push(net);
                    continue;
                }
            };
            net.discovered = pairs.len();

            let policy = AdmissionPolicy::for_source(
                scanner.source(),
                self.admission.min_market_cap,
                self.admission.min_volume_24h,
            );
            let (admitted, rejected) = policy.filter(pairs);
            net.admitted = admitted.len();
            if rejected > 0 {
                debug!(network = %network, rejected = rejected, "Candidates rejected by admission");
            }

            for pair in admitted {
                match self.persist(pair).await {
                    Persisted::Inserted(pair) => {
                        net.inserted += 1;
                        report.inserted.push(pair);
                    }
                    Persisted::Existing => net.skipped_existing += 1,
                    Persisted::Failed => net.store_failures += 1,
                }
            }

            info!(
                network = %network,
                discovered = net.discovered,
                admitted = net.admitted,
                inserted = net.inserted,
                existing = net.skipped_existing,
                store_failures = net.store_failures,
                "Network pass complete"
            );
            report.networks.push(net);
        }

        report
    }

    /// Existence check, then insert.
    async fn persist(&self, pair: CandidatePair) -> Persisted {
        match self.store.find_existing(&pair.contract_address, pair.network).await {
            Ok(Some(_)) => return Persisted::Existing,
            Ok(None) => {}
            Err(e) => {
                warn!(contract = %pair.contract_address, error = %e, "Store lookup failed");
                return Persisted::Failed;
            }
        }

        match self.store.insert(pair.clone()).await {
            Ok(()) => {
                info!(network = %pair.network, symbol = %pair.symbol, contract = %pair.contract_address, "New pair stored");
                Persisted::Inserted(pair)
            }
            Err(e) => {
                warn!(contract = %pair.contract_address, error = %e, "Store insert failed");
                Persisted::Failed
            }
        }
    }
}

enum Persisted {
    Inserted(CandidatePair),
    Existing,
    Failed,
}
