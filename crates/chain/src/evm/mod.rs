//! EVM side of the discovery pipeline.
//!
//! # Architecture
//!
//! - [`EvmLogSource`]: the RPC capability the scanners depend on
//! - [`AlloyEvmSource`]: the production implementation over an Alloy provider
//! - [`decoder`]: pure functions turning [`RawLog`] payloads into typed signals
//! - [`contracts`]: ERC20 bindings, event topics and per-chain addresses

pub mod contracts;
pub mod decoder;
mod provider;

pub use contracts::{EventTopics, EvmSignals};
pub use decoder::{FactoryLayout, FactoryPayload, LiquidityShape, TransferRecord};
pub use provider::{AlloyEvmSource, EvmLogSource};

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::Log;

/// A log record reduced to the fields the decoders need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    /// Emitting contract
    pub address: Address,
    /// Topics, topic0 first
    pub topics: Vec<B256>,
    /// Non-indexed payload
    pub data: Bytes,
    /// Block the log was included in
    pub block_number: u64,
    /// Originating transaction
    pub tx_hash: B256,
}

impl RawLog {
    /// Convert an RPC log. Pending logs (no block or transaction) are rejected.
    pub fn from_rpc(log: Log) -> Option<Self> {
        let block_number = log.block_number?;
        let tx_hash = log.transaction_hash?;

        Some(Self {
            address: log.address(),
            topics: log.topics().to_vec(),
            data: log.data().data.clone(),
            block_number,
            tx_hash,
        })
    }
}

/// Log filter for a single event signature over a block range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Restrict to one emitting contract; `None` scans every contract
    pub address: Option<Address>,
    pub from_block: u64,
    pub to_block: u64,
    pub topic0: B256,
}

impl LogQuery {
    /// Query for `topic0` across the whole window.
    pub fn new(window: BlockWindow, topic0: B256) -> Self {
        Self {
            address: None,
            from_block: window.from,
            to_block: window.to,
            topic0,
        }
    }

    /// Restrict the query to one emitting contract.
    pub fn at(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}

/// Inclusive block range shared by every signal of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWindow {
    pub from: u64,
    pub to: u64,
}

impl BlockWindow {
    /// Window covering `lookback_secs` before `head`, given the chain's average
    /// block interval.
    pub fn lookback(head: u64, block_time_ms: u64, lookback_secs: u64) -> Self {
        let blocks = lookback_secs.saturating_mul(1000) / block_time_ms.max(1);
        Self {
            from: head.saturating_sub(blocks),
            to: head,
        }
    }

    /// Number of blocks covered.
    pub fn len(&self) -> u64 {
        self.to.saturating_sub(self.from) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.to < self.from
    }
}

/// Basic ERC20 labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub symbol: String,
    pub name: String,
}

/// ERC20 labels plus supply information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDetails {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Raw total supply in base units
    pub total_supply: U256,
}

impl TokenDetails {
    /// Total supply scaled by `decimals`.
    pub fn total_supply_units(&self) -> f64 {
        let raw: f64 = self.total_supply.to_string().parse().unwrap_or(f64::MAX);
        raw / 10f64.powi(self.decimals as i32)
    }
}
