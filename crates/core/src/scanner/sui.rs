//! Sui scanner: one query per configured (package, event type).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pairscout_chain::{decode_move_event, MoveEventSource, MovePackage};
use tracing::{debug, info, instrument};

use crate::config::SuiConfig;
use crate::dedup::dedup_and_sort;
use crate::error::ScanError;
use crate::fanout::settle_all;
use crate::pair::{CandidatePair, Network};

use super::{collect_settled, strategy_error, NetworkScanner};

#[derive(Debug, Clone)]
pub struct SuiScanSettings {
    pub lookback_secs: u64,
    pub events_per_query: usize,
}

impl From<&SuiConfig> for SuiScanSettings {
    fn from(config: &SuiConfig) -> Self {
        Self {
            lookback_secs: config.lookback_secs,
            events_per_query: config.events_per_query,
        }
    }
}

impl Default for SuiScanSettings {
    fn default() -> Self {
        Self::from(&SuiConfig::default())
    }
}

pub struct SuiScanner {
    source: Arc<dyn MoveEventSource>,
    packages: Vec<MovePackage>,
    settings: SuiScanSettings,
}

impl SuiScanner {
    pub fn new(
        source: Arc<dyn MoveEventSource>,
        packages: Vec<MovePackage>,
        settings: SuiScanSettings,
    ) -> Self {
        Self {
            source,
            packages,
            settings,
        }
    }

    /// Events of one type newer than `cutoff_ms`.
    async fn scan_event_type(
        &self,
        package: &MovePackage,
        event_type: &str,
        now_ms: u64,
        cutoff_ms: u64,
    ) -> Result<Vec<CandidatePair>, ScanError> {
        let events = self
            .source
            .query_events(event_type, self.settings.events_per_query)
            .await
            .map_err(|e| strategy_error("move-events", format!("{event_type}: {e}")))?;

        let mut pairs = Vec::with_capacity(events.len());
        let mut stale = 0usize;

        for event in &events {
            let ts = event.timestamp_or(now_ms);
            if ts < cutoff_ms {
                stale += 1;
                continue;
            }

            let decoded = match decode_move_event(event) {
                Ok(d) => d,
                Err(e) => {
                    debug!(tx = %event.id.tx_digest, error = %e, "Skipping undecodable Move event");
                    continue;
                }
            };

            let Some(launch) = i64::try_from(ts).ok().and_then(DateTime::from_timestamp_millis) else {
                continue;
            };

            if let Some(builder) = CandidatePair::builder(
                Network::Sui,
                decoded.identity,
                decoded.contract_address,
                decoded.symbol,
                decoded.name,
                launch,
            ) {
                pairs.push(builder.build());
            }
        }

        info!(
            package = %package.label,
            package_id = package.short_id(),
            event_type = %event_type,
            fetched = events.len(),
            stale = stale,
            found = pairs.len(),
            "Sui event type scanned"
        );

        Ok(pairs)
    }
}

#[async_trait]
impl NetworkScanner for SuiScanner {
    fn network(&self) -> Network {
        Network::Sui
    }

    #[instrument(skip(self), fields(network = "sui"))]
    async fn scan(&self) -> Result<Vec<CandidatePair>, ScanError> {
        let checkpoint = self
            .source
            .latest_checkpoint()
            .await
            .map_err(|source| ScanError::Unreachable {
                network: Network::Sui,
                source,
            })?;

        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let cutoff_ms = now_ms.saturating_sub(self.settings.lookback_secs.saturating_mul(1000));

        let queries: Vec<(&MovePackage, String)> = self
            .packages
            .iter()
            .flat_map(|package| package.event_types().map(move |t| (package, t)))
            .collect();

        info!(checkpoint = checkpoint, queries = queries.len(), "Scanning Sui events");

        let tasks: Vec<_> = queries
            .iter()
            .map(|(package, event_type)| {
                (
                    "move-events",
                    self.scan_event_type(package, event_type, now_ms, cutoff_ms),
                )
            })
            .collect();
        let settled = settle_all(tasks).await;

        let merged = dedup_and_sort(collect_settled(Network::Sui, settled));
        info!(unique = merged.len(), "Sui scan complete");
        Ok(merged)
    }
}
