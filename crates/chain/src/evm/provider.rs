//! EVM RPC capability and its Alloy HTTP implementation.

use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use async_trait::async_trait;
use tracing::{debug, info};

use super::contracts::IERC20Metadata;
use super::{LogQuery, RawLog, TokenDetails, TokenMetadata};
use crate::SourceError;

/// Read-only EVM capability the scanners are written against.
#[async_trait]
pub trait EvmLogSource: Send + Sync {
    /// Current head block.
    async fn block_number(&self) -> Result<u64, SourceError>;

    /// Logs matching `query`.
    async fn logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, SourceError>;

    /// Unix timestamp (seconds) of `block`.
    async fn block_timestamp(&self, block: u64) -> Result<u64, SourceError>;

    /// Emitting contract of every log in the receipt of `tx`, in log order.
    async fn receipt_log_addresses(&self, tx: B256) -> Result<Vec<Address>, SourceError>;

    /// ERC20 symbol and name.
    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, SourceError>;

    /// ERC20 symbol, name, decimals and total supply.
    async fn token_details(&self, token: Address) -> Result<TokenDetails, SourceError>;
}

/// [`EvmLogSource`] over an Alloy HTTP provider.
///
/// The provider and its connection pool live as long as the adapter and are
/// shared by every call. Every call is bounded by `timeout`; expiry surfaces
/// as [`SourceError::Timeout`].
#[derive(Clone)]
pub struct AlloyEvmSource {
    provider: DynProvider,
    timeout: Duration,
}

impl AlloyEvmSource {
    /// Create the adapter and verify the endpoint answers.
    pub async fn connect(rpc_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let source = Self::new(rpc_url, timeout)?;
        let block = source.block_number().await?;
        info!(rpc = rpc_url, block = block, "EVM provider connection verified");
        Ok(source)
    }

    /// Create the adapter without probing the endpoint.
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let url = rpc_url.parse().map_err(|e| SourceError::Malformed {
            op: "connect",
            message: format!("invalid RPC URL `{rpc_url}`: {e}"),
        })?;
        let provider = ProviderBuilder::new().on_http(url).erased();
        Ok(Self { provider, timeout })
    }

    /// Run `fut` under the adapter timeout, mapping both failure kinds.
    async fn bounded<T, E, F>(&self, op: &'static str, fut: F) -> Result<T, SourceError>
    where
        E: Display,
        F: IntoFuture<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| SourceError::rpc(op, e)),
            Err(_) => Err(SourceError::Timeout {
                op,
                after: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl EvmLogSource for AlloyEvmSource {
    async fn block_number(&self) -> Result<u64, SourceError> {
        self.bounded("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    async fn logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, SourceError> {
        let mut filter = Filter::new()
            .from_block(query.from_block)
            .to_block(query.to_block)
            .event_signature(query.topic0);
        if let Some(address) = query.address {
            filter = filter.address(address);
        }

        let logs = self.bounded("eth_getLogs", self.provider.get_logs(&filter)).await?;
        let total = logs.len();
        let logs: Vec<RawLog> = logs.into_iter().filter_map(RawLog::from_rpc).collect();

        debug!(
            topic = %query.topic0,
            address = ?query.address,
            from = query.from_block,
            to = query.to_block,
            fetched = total,
            kept = logs.len(),
            "Fetched logs"
        );

        Ok(logs)
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, SourceError> {
        let fetched = self
            .bounded(
                "eth_getBlockByNumber",
                self.provider.get_block_by_number(BlockNumberOrTag::Number(block)),
            )
            .await?;

        fetched
            .map(|b| b.header.timestamp)
            .ok_or_else(|| SourceError::Missing {
                op: "eth_getBlockByNumber",
                what: format!("block {block}"),
            })
    }

    async fn receipt_log_addresses(&self, tx: B256) -> Result<Vec<Address>, SourceError> {
        let receipt = self
            .bounded(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(tx),
            )
            .await?
            .ok_or_else(|| SourceError::Missing {
                op: "eth_getTransactionReceipt",
                what: format!("receipt {tx}"),
            })?;

        Ok(receipt.inner.logs().iter().map(|log| log.address()).collect())
    }

    async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, SourceError> {
        let contract = IERC20Metadata::new(token, &self.provider);

        let symbol_call = contract.symbol();
        let name_call = contract.name();
        let (symbol, name) = tokio::join!(
            self.bounded("symbol", symbol_call.call()),
            self.bounded("name", name_call.call()),
        );

        Ok(TokenMetadata {
            symbol: symbol?._0,
            name: name?._0,
        })
    }

    async fn token_details(&self, token: Address) -> Result<TokenDetails, SourceError> {
        let contract = IERC20Metadata::new(token, &self.provider);

        let symbol_call = contract.symbol();
        let name_call = contract.name();
        let decimals_call = contract.decimals();
        let supply_call = contract.totalSupply();
        let (symbol, name, decimals, total_supply) = tokio::join!(
            self.bounded("symbol", symbol_call.call()),
            self.bounded("name", name_call.call()),
            self.bounded("decimals", decimals_call.call()),
            self.bounded("totalSupply", supply_call.call()),
        );

        Ok(TokenDetails {
            symbol: symbol?._0,
            name: name?._0,
            decimals: decimals?._0,
            total_supply: total_supply?._0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        let err = AlloyEvmSource::new("not a url", Duration::from_secs(1));
        assert!(matches!(err, Err(SourceError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_held_provider_serves_repeated_calls() {
        // Nothing listens on port 1, so every call fails fast with a transport error
        let source = AlloyEvmSource::new("http://127.0.0.1:1", Duration::from_secs(5)).unwrap();
        let shared = source.clone();

        let first = source.block_number().await;
        let second = shared.block_timestamp(1).await;
        assert!(matches!(first, Err(SourceError::Rpc { op: "eth_blockNumber", .. })));
        assert!(matches!(second, Err(SourceError::Rpc { op: "eth_getBlockByNumber", .. })));
    }

    #[tokio::test]
    async fn test_bounded_maps_timeout() {
        let source = AlloyEvmSource::new("http://localhost:8545", Duration::from_millis(10)).unwrap();
        let result: Result<(), SourceError> = source
            .bounded("sleep", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<(), std::io::Error>(())
            })
            .await;
        assert!(matches!(result, Err(SourceError::Timeout { op: "sleep", .. })));
    }

    #[tokio::test]
    async fn test_bounded_maps_rpc_error() {
        let source = AlloyEvmSource::new("http://localhost:8545", Duration::from_secs(1)).unwrap();
        let result: Result<(), SourceError> = source
            .bounded("fail", async { Err::<(), _>("boom") })
            .await;
        assert!(matches!(result, Err(SourceError::Rpc { op: "fail", .. })));
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_bsc_head_and_wbnb_metadata() {
        let source = AlloyEvmSource::connect(
            "https://bsc-dataseed.binance.org/",
            Duration::from_secs(10),
        )
        .await
        .unwrap();

        assert!(source.block_number().await.unwrap() > 0);

        let meta = source
            .token_metadata(super::super::contracts::bsc::WBNB)
            .await
            .unwrap();
        assert_eq!(meta.symbol, "WBNB");
    }
}
