//! Error taxonomy for the network boundary and the payload decoders.

use std::time::Duration;
use thiserror::Error;

/// Failure talking to a network RPC endpoint.
///
/// Every variant is treated the same way by callers: the affected unit of work
/// contributes nothing and the scan carries on.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The call did not complete within the adapter timeout.
    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    /// Transport or JSON-RPC level failure.
    #[error("{op} failed: {message}")]
    Rpc { op: &'static str, message: String },

    /// The node answered but the requested object does not exist (yet).
    #[error("{op}: {what} not found")]
    Missing { op: &'static str, what: String },

    /// The node answered with something we cannot interpret.
    #[error("{op}: malformed response: {message}")]
    Malformed { op: &'static str, message: String },
}

impl SourceError {
    pub(crate) fn rpc(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Rpc {
            op,
            message: err.to_string(),
        }
    }
}

/// Failure decoding a single log or event payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Payload width has no known layout.
    #[error("unknown payload width: {0} bytes")]
    UnknownWidth(usize),

    /// An address word carried non-zero bytes in its 12-byte padding.
    #[error("word {word} is not a valid address")]
    DirtyAddress { word: usize },

    /// Payload shorter than the layout requires.
    #[error("payload truncated: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Pair sequence number does not fit in a u64 index.
    #[error("sequence word overflows u64")]
    SequenceOverflow,

    /// Log topic0 does not belong to the expected event family.
    #[error("unrecognized event topic")]
    UnknownTopic,

    /// A JSON field had an unexpected type.
    #[error("field `{field}` has unexpected type")]
    FieldType { field: &'static str },
}
