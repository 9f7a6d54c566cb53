//! In-memory network adapters and fixture builders for scanner tests.

use std::collections::{HashMap, HashSet};

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use pairscout_chain::{
    EventId, EventTopics, EvmLogSource, LogQuery, MoveEventSource, RawLog, SourceError, SuiEvent,
    TokenDetails, TokenMetadata,
};
use serde_json::Value;

/// Block timestamps are `GENESIS + block * 3`.
pub const GENESIS: u64 = 1_700_000_000;

#[derive(Default)]
pub struct MockEvmSource {
    head: Option<u64>,
    logs: HashMap<(Option<Address>, B256), Vec<RawLog>>,
    failing_topics: HashSet<B256>,
    receipts: HashMap<B256, Vec<Address>>,
    tokens: HashMap<Address, TokenDetails>,
}

impl MockEvmSource {
    pub fn new(head: u64) -> Self {
        Self {
            head: Some(head),
            ..Default::default()
        }
    }

    /// A source whose head block cannot be fetched.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_logs(mut self, address: Option<Address>, topic0: B256, logs: Vec<RawLog>) -> Self {
        self.logs.entry((address, topic0)).or_default().extend(logs);
        self
    }

    /// Every query for `topic0` fails.
    pub fn failing(mut self, topic0: B256) -> Self {
        self.failing_topics.insert(topic0);
        self
    }

    pub fn with_receipt(mut self, tx: B256, addresses: Vec<Address>) -> Self {
        self.receipts.insert(tx, addresses);
        self
    }

    pub fn with_token(mut self, token: Address, symbol: &str, name: &str) -> Self {
        self.tokens.insert(
            token,
            TokenDetails {
                symbol: symbol.to_string(),
                name: name.to_string(),
                decimals: 18,
                total_supply: U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(18u64)),
            },
        );
        self
    }
}

fn rpc_down(op: &'static str) -> SourceError {
    SourceError::Rpc {
        op,
        message: "connection refused".to_string(),
    }
}

#[async_trait]
impl EvmLogSource for MockEvmSource {
    async fn block_number(&self) -> Result<u64, SourceError> {
        self.head.ok_or_else(|| rpc_down("eth_blockNumber"))
    }

    async fn logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, SourceError> {
        if self.failing_topics.contains(&query.topic0) {
            return Err(rpc_down("eth_getLogs"));
        }
        Ok(self
            .logs
            .get(&(query.address, query.topic0))
            .map(|logs| {
                logs.iter()
                    .filter(|l| l.block_number >= query.from_block && l.block_number <= query.to_block)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, SourceError> {
        Ok(GENESIS + block * 3)
    }

    async fn receipt_log_addresses(&self, tx: B256) -> Result<Vec<Address>, SourceError> {
        self.receipts.get(&tx).cloned().ok_or(SourceError::Missing {
            op: "eth_getTransactionReceipt",
            what: format!("receipt {tx}"),
        })
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, SourceError> {
        let details = self.token_details(token).await?;
        Ok(TokenMetadata {
            symbol: details.symbol,
            name: details.name,
        })
    }

    async fn token_details(&self, token: Address) -> Result<TokenDetails, SourceError> {
        self.tokens.get(&token).cloned().ok_or_else(|| rpc_down("symbol"))
    }
}

fn addr_word(a: Address) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[12..].copy_from_slice(a.as_slice());
    w
}

fn words(ws: &[[u8; 32]]) -> Bytes {
    Bytes::from(ws.iter().flatten().copied().collect::<Vec<u8>>())
}

fn raw_log(address: Address, topics: Vec<B256>, data: Bytes, block: u64, tx: B256) -> RawLog {
    RawLog {
        address,
        topics,
        data,
        block_number: block,
        tx_hash: tx,
    }
}

/// `PairCreated` log with a payload of `params` words (2, 3 or 4).
pub fn factory_log(
    factory: Address,
    token0: Address,
    token1: Address,
    pair: Address,
    params: usize,
    block: u64,
    tx: B256,
) -> RawLog {
    let mut ws = vec![addr_word(token0), addr_word(token1)];
    if params >= 3 {
        ws.push(addr_word(pair));
    }
    if params >= 4 {
        ws.push(U256::from(42u64).to_be_bytes::<32>());
    }
    let topics = EventTopics::standard();
    raw_log(factory, vec![topics.pair_created], words(&ws), block, tx)
}

/// `AddLiquidityETH` log for `token`.
pub fn liquidity_eth_log(router: Address, token: Address, block: u64, tx: B256) -> RawLog {
    let mut ws = vec![addr_word(token)];
    ws.extend(std::iter::repeat([0u8; 32]).take(5));
    let topics = EventTopics::standard();
    raw_log(router, vec![topics.add_liquidity_eth], words(&ws), block, tx)
}

/// Indexed `Transfer` log of `tokens` whole tokens (18 decimals).
pub fn transfer_log(
    token: Address,
    from: Address,
    to: Address,
    tokens: u64,
    block: u64,
    tx: B256,
) -> RawLog {
    let amount = U256::from(tokens) * U256::from(10u64).pow(U256::from(18u64));
    let topics = EventTopics::standard();
    raw_log(
        token,
        vec![
            topics.transfer,
            B256::from(addr_word(from)),
            B256::from(addr_word(to)),
        ],
        words(&[amount.to_be_bytes::<32>()]),
        block,
        tx,
    )
}

#[derive(Default)]
pub struct MockMoveSource {
    checkpoint: Option<u64>,
    events: HashMap<String, Vec<SuiEvent>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
}

impl MockMoveSource {
    pub fn new() -> Self {
        Self {
            checkpoint: Some(1),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, event_type: &str, events: Vec<SuiEvent>) -> Self {
        self.events.insert(event_type.to_string(), events);
        self
    }

    pub fn failing(mut self, event_type: &str) -> Self {
        self.failing.insert(event_type.to_string());
        self
    }

    pub fn panicking(mut self, event_type: &str) -> Self {
        self.panicking.insert(event_type.to_string());
        self
    }
}

#[async_trait]
impl MoveEventSource for MockMoveSource {
    async fn query_events(
        &self,
        event_type: &str,
        limit: usize,
    ) -> Result<Vec<SuiEvent>, SourceError> {
        if self.panicking.contains(event_type) {
            panic!("malformed page for {event_type}");
        }
        if self.failing.contains(event_type) {
            return Err(rpc_down("suix_queryEvents"));
        }
        Ok(self
            .events
            .get(event_type)
            .map(|e| e.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn latest_checkpoint(&self) -> Result<u64, SourceError> {
        self.checkpoint
            .ok_or_else(|| rpc_down("sui_getLatestCheckpointSequenceNumber"))
    }
}

/// Move event with the given digest, sequence, timestamp and fields.
pub fn sui_event(digest: &str, seq: u64, timestamp_ms: Option<u64>, fields: Value) -> SuiEvent {
    SuiEvent {
        id: EventId {
            tx_digest: digest.to_string(),
            event_seq: seq,
        },
        timestamp_ms,
        parsed_json: fields,
    }
}
