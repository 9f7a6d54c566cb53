//! BNB Smart Chain scanner.
//!
//! Three signals over one shared block window:
//! - factory pair creation (highest confidence)
//! - router liquidity additions
//! - large wallet-to-wallet transfers

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use pairscout_chain::evm::decoder::{
    decode_factory_payload, decode_liquidity_token, large_transfer_threshold,
    recover_pair_address, select_large_transfers,
};
use pairscout_chain::{
    BlockWindow, EvmLogSource, EvmSignals, LiquidityShape, LogQuery, RawLog, SourceError,
    TransferRecord,
};
use tracing::{debug, info, instrument, warn};

use super::{collect_settled, strategy_error, NetworkScanner};
use crate::config::BnbConfig;
use crate::dedup::dedup_and_sort;
use crate::error::ScanError;
use crate::fanout::{settle_all, Outcome};
use crate::pair::{CandidatePair, Network, RiskAssessment};

type StrategyFuture<'a> = BoxFuture<'a, Result<Vec<CandidatePair>, ScanError>>;

/// Tunables of the BNB scanner.
#[derive(Debug, Clone)]
pub struct BnbScanSettings {
    pub block_time_ms: u64,
    pub lookback_secs: u64,
    /// Most recent transfer logs inspected
    pub transfer_sample_size: usize,
    /// Raw amount a transfer must exceed
    pub large_transfer_threshold: U256,
    /// Concurrent metadata lookups per signal
    pub metadata_concurrency: usize,
}

impl From<&BnbConfig> for BnbScanSettings {
    fn from(config: &BnbConfig) -> Self {
        Self {
            block_time_ms: config.block_time_ms,
            lookback_secs: config.lookback_secs,
            transfer_sample_size: config.transfer_sample_size,
            large_transfer_threshold: large_transfer_threshold(config.large_transfer_tokens),
            metadata_concurrency: config.metadata_concurrency.max(1),
        }
    }
}

impl Default for BnbScanSettings {
    fn default() -> Self {
        Self::from(&BnbConfig::default())
    }
}

/// EVM addresses are reported lower-cased.
fn lower(address: Address) -> String {
    address.to_string().to_lowercase()
}

/// Multi-strategy scanner for BNB Smart Chain.
pub struct BnbScanner {
    source: Arc<dyn EvmLogSource>,
    signals: EvmSignals,
    settings: BnbScanSettings,
    /// Block timestamps seen during the current window
    block_times: DashMap<u64, DateTime<Utc>>,
}

impl BnbScanner {
    pub fn new(source: Arc<dyn EvmLogSource>, signals: EvmSignals, settings: BnbScanSettings) -> Self {
        Self {
            source,
            signals,
            settings,
            block_times: DashMap::new(),
        }
    }

    async fn launch_time(&self, block: u64) -> Result<DateTime<Utc>, SourceError> {
        let cached = self.block_times.get(&block).map(|t| *t);
        if let Some(t) = cached {
            return Ok(t);
        }

        let secs = self.source.block_timestamp(block).await?;
        let time = i64::try_from(secs)
            .ok()
            .and_then(|s| DateTime::from_timestamp(s, 0))
            .ok_or_else(|| SourceError::Malformed {
                op: "eth_getBlockByNumber",
                message: format!("timestamp {secs} out of range"),
            })?;

        self.block_times.insert(block, time);
        Ok(time)
    }

    // ------------------------------------------------------------------
    // Factory signal
    // ------------------------------------------------------------------

    async fn factory_pairs(&self, window: BlockWindow) -> Result<Vec<CandidatePair>, ScanError> {
        let query = LogQuery::new(window, self.signals.topics.pair_created).at(self.signals.factory);
        let logs = self
            .source
            .logs(&query)
            .await
            .map_err(|e| strategy_error("factory", e))?;

        debug!(events = logs.len(), "Factory pair events");

        let lookups: Vec<_> = logs.iter().map(|log| self.factory_pair(log)).collect();
        let pairs = stream::iter(lookups)
            .buffered(self.settings.metadata_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(pairs.into_iter().flatten().collect())
    }

    async fn factory_pair(&self, log: &RawLog) -> Option<CandidatePair> {
        let payload = match decode_factory_payload(&log.data) {
            Ok(p) => p,
            Err(e) => {
                debug!(tx = %log.tx_hash, width = log.data.len(), error = %e, "Discarding factory log");
                return None;
            }
        };

        let pair_address = match payload.pair {
            Some(pair) => pair,
            None => {
                let addresses = match self.source.receipt_log_addresses(log.tx_hash).await {
                    Ok(a) => a,
                    Err(e) => {
                        debug!(tx = %log.tx_hash, error = %e, "Creation receipt unavailable");
                        return None;
                    }
                };
                match recover_pair_address(&addresses, self.signals.factory) {
                    Some(pair) => pair,
                    None => {
                        debug!(tx = %log.tx_hash, "No pair address in creation receipt");
                        return None;
                    }
                }
            }
        };

        let (meta0, meta1, launch) = tokio::join!(
            self.source.token_metadata(payload.token0),
            self.source.token_metadata(payload.token1),
            self.launch_time(log.block_number),
        );
        let (meta0, meta1, launch) = match (meta0, meta1, launch) {
            (Ok(a), Ok(b), Ok(t)) => (a, b, t),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                debug!(pair = %pair_address, error = %e, "Discarding pair, metadata unavailable");
                return None;
            }
        };

        let contract = lower(pair_address);
        CandidatePair::builder(
            Network::Bnb,
            contract.clone(),
            contract,
            format!("{}/{}", meta0.symbol, meta1.symbol),
            format!("{} / {}", meta0.name, meta1.name),
            launch,
        )
        .map(|b| b.build())
    }

    // ------------------------------------------------------------------
    // Liquidity signal
    // ------------------------------------------------------------------

    async fn liquidity_pairs(&self, window: BlockWindow) -> Result<Vec<CandidatePair>, ScanError> {
        let queries: Vec<(Address, LiquidityShape)> = self
            .signals
            .routers
            .iter()
            .flat_map(|router| LiquidityShape::ALL.map(|shape| (*router, shape)))
            .collect();

        let tasks: Vec<_> = queries
            .iter()
            .map(|(router, shape)| {
                let query = LogQuery::new(window, shape.topic(&self.signals.topics)).at(*router);
                (shape.as_str(), async move { self.source.logs(&query).await })
            })
            .collect();
        let settled = settle_all(tasks).await;

        let mut tagged: Vec<(LiquidityShape, RawLog)> = Vec::new();
        let mut failed = 0usize;
        for ((router, shape), result) in queries.iter().zip(settled) {
            match result.outcome {
                Outcome::Completed(logs) => {
                    debug!(router = %router, shape = shape.as_str(), events = logs.len(), "Liquidity events");
                    tagged.extend(logs.into_iter().map(|log| (*shape, log)));
                }
                Outcome::Failed(reason) => {
                    warn!(router = %router, shape = shape.as_str(), reason = %reason, "Liquidity query failed");
                    failed += 1;
                }
            }
        }

        if !queries.is_empty() && failed == queries.len() {
            return Err(strategy_error("liquidity", "every router query failed"));
        }

        let lookups: Vec<_> = tagged.iter().map(|(shape, log)| self.liquidity_pair(*shape, log)).collect();
        let pairs = stream::iter(lookups)
            .buffered(self.settings.metadata_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(pairs.into_iter().flatten().collect())
    }

    async fn liquidity_pair(&self, shape: LiquidityShape, log: &RawLog) -> Option<CandidatePair> {
        let token = match decode_liquidity_token(shape, &log.data, self.signals.wrapped_native) {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                debug!(tx = %log.tx_hash, shape = shape.as_str(), error = %e, "Discarding liquidity log");
                return None;
            }
        };

        let (details, launch) = tokio::join!(
            self.source.token_details(token),
            self.launch_time(log.block_number),
        );
        let (details, launch) = match (details, launch) {
            (Ok(d), Ok(t)) => (d, t),
            (Err(e), _) | (_, Err(e)) => {
                debug!(token = %token, error = %e, "Discarding token, metadata unavailable");
                return None;
            }
        };

        let contract = lower(token);
        CandidatePair::builder(
            Network::Bnb,
            format!("{}-{}", contract, log.tx_hash),
            contract,
            details.symbol.clone(),
            details.name.clone(),
            launch,
        )
        .map(|b| {
            b.total_supply(details.total_supply_units())
                .liquidity(0.0)
                .risk(RiskAssessment::new(50, &["New token"]))
                .build()
        })
    }

    // ------------------------------------------------------------------
    // Large-transfer signal
    // ------------------------------------------------------------------

    async fn transfer_pairs(&self, window: BlockWindow) -> Result<Vec<CandidatePair>, ScanError> {
        let query = LogQuery::new(window, self.signals.topics.transfer);
        let logs = self
            .source
            .logs(&query)
            .await
            .map_err(|e| strategy_error("transfer", e))?;

        let large = select_large_transfers(
            &logs,
            self.settings.transfer_sample_size,
            self.settings.large_transfer_threshold,
        );
        debug!(events = logs.len(), large = large.len(), "Transfer events");

        let lookups: Vec<_> = large.iter().map(|record| self.transfer_pair(record)).collect();
        let pairs = stream::iter(lookups)
            .buffered(self.settings.metadata_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(pairs.into_iter().flatten().collect())
    }

    async fn transfer_pair(&self, record: &TransferRecord) -> Option<CandidatePair> {
        let (details, launch) = tokio::join!(
            self.source.token_details(record.token),
            self.launch_time(record.block_number),
        );
        let (details, launch) = match (details, launch) {
            (Ok(d), Ok(t)) => (d, t),
            _ => return None,
        };

        let contract = lower(record.token);
        CandidatePair::builder(
            Network::Bnb,
            format!("{}-transfer-{}", contract, record.tx_hash),
            contract,
            details.symbol.clone(),
            details.name.clone(),
            launch,
        )
        .map(|b| {
            b.total_supply(details.total_supply_units())
                .risk(RiskAssessment::new(60, &["New token", "Large transfer detected"]))
                .build()
        })
    }
}

#[async_trait]
impl NetworkScanner for BnbScanner {
    fn network(&self) -> Network {
        Network::Bnb
    }

    #[instrument(skip(self), fields(network = "bnb"))]
    async fn scan(&self) -> Result<Vec<CandidatePair>, ScanError> {
        let head = self
            .source
            .block_number()
            .await
            .map_err(|source| ScanError::Unreachable {
                network: Network::Bnb,
                source,
            })?;

        let window = BlockWindow::lookback(head, self.settings.block_time_ms, self.settings.lookback_secs);
        self.block_times.retain(|block, _| *block >= window.from);

        info!(from = window.from, to = window.to, blocks = window.len(), "Scanning BNB blocks");

        let strategies: Vec<(&'static str, StrategyFuture<'_>)> = vec![
            ("factory", self.factory_pairs(window).boxed()),
            ("liquidity", self.liquidity_pairs(window).boxed()),
            ("transfer", self.transfer_pairs(window).boxed()),
        ];

        let settled = settle_all(strategies).await;
        let merged = dedup_and_sort(collect_settled(Network::Bnb, settled));

        info!(unique = merged.len(), "BNB scan complete");
        Ok(merged)
    }
}
