//! Persistence contract and the in-memory store.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::StoreError;
use crate::pair::{CandidatePair, Network};

/// Storage collaborator for discovered pairs.
#[async_trait]
pub trait PairStore: Send + Sync {
    /// Previously stored record for (contract, network), if any.
    async fn find_existing(
        &self,
        contract_address: &str,
        network: Network,
    ) -> Result<Option<CandidatePair>, StoreError>;

    /// Store a new record.
    async fn insert(&self, pair: CandidatePair) -> Result<(), StoreError>;
}

/// [`PairStore`] keyed by (network, lower-cased contract address).
#[derive(Debug, Default)]
pub struct MemoryPairStore {
    pairs: DashMap<(Network, String), CandidatePair>,
}

impl MemoryPairStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(contract_address: &str, network: Network) -> (Network, String) {
        (network, contract_address.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[async_trait]
impl PairStore for MemoryPairStore {
    async fn find_existing(
        &self,
        contract_address: &str,
        network: Network,
    ) -> Result<Option<CandidatePair>, StoreError> {
        Ok(self
            .pairs
            .get(&Self::key(contract_address, network))
            .map(|e| e.value().clone()))
    }

    async fn insert(&self, pair: CandidatePair) -> Result<(), StoreError> {
        let key = Self::key(&pair.contract_address, pair.network);
        debug!(network = %pair.network, contract = %pair.contract_address, "Storing pair");
        self.pairs.entry(key).or_insert(pair);
        Ok(())
    }
}
