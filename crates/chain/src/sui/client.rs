//! Sui JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::{value_as_u64, MoveEventSource, SuiEvent};
use crate::SourceError;

/// Public mainnet fullnode.
pub const SUI_MAINNET_RPC: &str = "https://fullnode.mainnet.sui.io:443";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventPage {
    data: Vec<SuiEvent>,
    #[serde(default)]
    has_next_page: bool,
}

/// `suix_queryEvents` params: filter, cursor, limit, descending.
fn query_events_params(event_type: &str, limit: usize) -> Value {
    json!([{ "MoveEventType": event_type }, null, limit, true])
}

/// [`MoveEventSource`] over the Sui JSON-RPC API.
#[derive(Debug)]
pub struct SuiRpcClient {
    client: reqwest::Client,
    rpc_url: String,
    timeout: Duration,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    /// Create a client whose every request is bounded by `timeout`.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::rpc("connect", e))?;

        let rpc_url = rpc_url.into();
        info!(rpc = %rpc_url, timeout_ms = timeout.as_millis() as u64, "Sui RPC client created");

        Ok(Self {
            client,
            rpc_url,
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    fn transport_error(&self, op: &'static str, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                op,
                after: self.timeout,
            }
        } else {
            SourceError::rpc(op, err)
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, SourceError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Rpc {
                op: method,
                message: format!("HTTP {status}"),
            });
        }

        let body: RpcResponse<T> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(method, e)
            } else {
                SourceError::Malformed {
                    op: method,
                    message: e.to_string(),
                }
            }
        })?;

        if let Some(err) = body.error {
            return Err(SourceError::Rpc {
                op: method,
                message: format!("{} (code {})", err.message, err.code),
            });
        }

        body.result.ok_or(SourceError::Malformed {
            op: method,
            message: "response carries neither result nor error".to_string(),
        })
    }
}

#[async_trait]
impl MoveEventSource for SuiRpcClient {
    #[instrument(skip(self))]
    async fn query_events(
        &self,
        event_type: &str,
        limit: usize,
    ) -> Result<Vec<SuiEvent>, SourceError> {
        let page: EventPage = self
            .call("suix_queryEvents", query_events_params(event_type, limit))
            .await?;

        debug!(
            count = page.data.len(),
            has_next_page = page.has_next_page,
            "Fetched Move events"
        );

        Ok(page.data)
    }

    async fn latest_checkpoint(&self) -> Result<u64, SourceError> {
        let op = "sui_getLatestCheckpointSequenceNumber";
        let value: Value = self.call(op, json!([])).await?;
        value_as_u64(&value).ok_or(SourceError::Malformed {
            op,
            message: format!("not a checkpoint number: {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_shape() {
        let params = query_events_params("0x1::pool::PoolCreated", 50);
        assert_eq!(
            params,
            json!([{ "MoveEventType": "0x1::pool::PoolCreated" }, null, 50, true])
        );
    }

    #[test]
    fn test_parse_event_page() {
        let body: RpcResponse<EventPage> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "data": [{
                    "id": { "txDigest": "AbCdEfGh12345678", "eventSeq": "0" },
                    "packageId": "0x1",
                    "timestampMs": "1700000000000",
                    "parsedJson": { "coin_type": "0x2::mytoken::MYTOKEN" }
                }],
                "nextCursor": null,
                "hasNextPage": false
            }
        }))
        .unwrap();

        let page = body.result.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id.tx_digest, "AbCdEfGh12345678");
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_parse_rpc_error() {
        let body: RpcResponse<EventPage> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Invalid params" }
        }))
        .unwrap();

        assert!(body.result.is_none());
        assert_eq!(body.error.unwrap().code, -32602);
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_mainnet_checkpoint() {
        let client = SuiRpcClient::new(SUI_MAINNET_RPC, Duration::from_secs(10)).unwrap();
        assert!(client.latest_checkpoint().await.unwrap() > 0);
    }
}
