//! Sui side of the discovery pipeline.
//!
//! [`MoveEventSource`] is the capability the Sui scanner depends on;
//! [`SuiRpcClient`] implements it over JSON-RPC. Event payloads are untyped
//! JSON and are interpreted by [`decoder`].

mod client;
pub mod decoder;

pub use client::{SuiRpcClient, SUI_MAINNET_RPC};
pub use decoder::{decode_move_event, DecodedMoveEvent, MoveShape};

use async_trait::async_trait;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SourceError;

/// Read-only Sui capability.
#[async_trait]
pub trait MoveEventSource: Send + Sync {
    /// Most recent events of `event_type` (`<package>::<module>::<Event>`),
    /// newest first.
    async fn query_events(&self, event_type: &str, limit: usize)
        -> Result<Vec<SuiEvent>, SourceError>;

    /// Latest checkpoint sequence number; used as a reachability probe.
    async fn latest_checkpoint(&self) -> Result<u64, SourceError>;
}

/// Event identifier: originating transaction plus position within it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub event_seq: u64,
}

/// A Move event as returned by the node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
    pub id: EventId,
    /// Emission time in unix milliseconds; some nodes omit it
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub timestamp_ms: Option<u64>,
    /// Event fields, shape depends on the emitting package
    #[serde(default)]
    pub parsed_json: Value,
}

impl SuiEvent {
    /// Event time, defaulting to `now_ms` when the node did not report one.
    pub fn timestamp_or(&self, now_ms: u64) -> u64 {
        self.timestamp_ms.unwrap_or(now_ms)
    }
}

/// A DEX package and the event types emitted on pool/pair creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePackage {
    pub package_id: String,
    /// Human label for logs
    #[serde(default)]
    pub label: String,
    /// Event type suffixes appended to the package id
    pub events: Vec<String>,
}

impl MovePackage {
    pub fn new(package_id: impl Into<String>, label: impl Into<String>, events: &[&str]) -> Self {
        Self {
            package_id: package_id.into(),
            label: label.into(),
            events: events.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Fully qualified `<package>::<event>` types, in configured order.
    pub fn event_types(&self) -> impl Iterator<Item = String> + '_ {
        self.events
            .iter()
            .map(move |event| format!("{}::{}", self.package_id, event))
    }

    /// Short form of the package id for logging.
    pub fn short_id(&self) -> &str {
        self.package_id.get(..10).unwrap_or(&self.package_id)
    }
}

/// Parse an integer the node may send as either a JSON number or a string.
pub(crate) fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_as_u64(&value)
        .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {value}")))
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_as_u64(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {value}"))),
    }
}
