//! Move event decoder.
//!
//! DEX packages emit structurally different creation events. An event is
//! matched against an ordered table of shapes; the first shape whose key
//! fields are present decides how symbol and name are derived. The last
//! shape matches everything, so every event yields a record.

use serde_json::{Map, Value};

use super::SuiEvent;
use crate::DecodeError;

/// Recognized Move event payload shapes, in matching priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveShape {
    /// `token_x` / `token_y` objects carrying `symbol` and `name`
    TokenPair,
    /// `coin_type_a` / `coin_type_b` fully qualified coin types
    CoinTypePair,
    /// Single `coin_type`
    CoinType,
    /// Only a `pool_id`
    Pool,
    /// Nothing recognizable; labelled after the transaction digest
    Transaction,
}

/// Shape → required key fields. Order is matching priority.
const SHAPE_TABLE: &[(MoveShape, &[&str])] = &[
    (MoveShape::TokenPair, &["token_x", "token_y"]),
    (MoveShape::CoinTypePair, &["coin_type_a", "coin_type_b"]),
    (MoveShape::CoinType, &["coin_type"]),
    (MoveShape::Pool, &["pool_id"]),
    (MoveShape::Transaction, &[]),
];

/// Labels and identity extracted from one Move event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMoveEvent {
    pub symbol: String,
    pub name: String,
    pub contract_address: String,
    /// `<contract_address>-<event_seq>`
    pub identity: String,
    pub shape: MoveShape,
}

/// A field counts as present unless it is null, `false`, zero or an empty
/// string.
fn present(fields: &Map<String, Value>, key: &str) -> bool {
    match fields.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

impl MoveShape {
    /// First shape in the table whose key fields are all present.
    pub fn detect(fields: &Map<String, Value>) -> Self {
        SHAPE_TABLE
            .iter()
            .find(|(_, keys)| keys.iter().all(|k| present(fields, k)))
            .map(|(shape, _)| *shape)
            .unwrap_or(MoveShape::Transaction)
    }
}

/// Optional string field; present but non-string is a decode failure.
fn str_field<'a>(
    fields: &'a Map<String, Value>,
    key: &'static str,
) -> Result<Option<&'a str>, DecodeError> {
    if !present(fields, key) {
        return Ok(None);
    }
    match fields.get(key) {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Err(DecodeError::FieldType { field: key }),
    }
}

/// Label of one side of a token pair object, with a fallback.
fn side_label<'a>(side: Option<&'a Value>, key: &str, fallback: &'a str) -> &'a str {
    side.and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
}

/// Trailing `::` segment of a coin type (`0x2::sui::SUI` → `SUI`).
fn type_tail(coin_type: &str) -> Option<&str> {
    coin_type.rsplit("::").next().filter(|s| !s.is_empty())
}

/// Last eight characters.
fn last8(s: &str) -> &str {
    s.char_indices()
        .rev()
        .nth(7)
        .map(|(i, _)| &s[i..])
        .unwrap_or(s)
}

/// Decode one Move event into labels and identity.
pub fn decode_move_event(event: &SuiEvent) -> Result<DecodedMoveEvent, DecodeError> {
    let empty = Map::new();
    let fields = event.parsed_json.as_object().unwrap_or(&empty);
    let digest = event.id.tx_digest.as_str();

    let shape = MoveShape::detect(fields);

    let (symbol, name) = match shape {
        MoveShape::TokenPair => {
            let x = fields.get("token_x");
            let y = fields.get("token_y");
            (
                format!(
                    "{}/{}",
                    side_label(x, "symbol", "UNK"),
                    side_label(y, "symbol", "UNK")
                ),
                format!(
                    "{} / {}",
                    side_label(x, "name", "Unknown"),
                    side_label(y, "name", "Unknown")
                ),
            )
        }
        MoveShape::CoinTypePair => {
            let a = str_field(fields, "coin_type_a")?
                .and_then(type_tail)
                .unwrap_or("UNK");
            let b = str_field(fields, "coin_type_b")?
                .and_then(type_tail)
                .unwrap_or("UNK");
            (format!("{a}/{b}"), format!("{a} / {b}"))
        }
        MoveShape::CoinType => {
            let symbol = str_field(fields, "coin_type")?
                .and_then(type_tail)
                .unwrap_or("UNKNOWN");
            (symbol.to_string(), symbol.to_string())
        }
        MoveShape::Pool => {
            let pool = str_field(fields, "pool_id")?.unwrap_or(digest);
            (format!("POOL_{}", last8(pool)), format!("Pool {}", last8(pool)))
        }
        MoveShape::Transaction => (
            format!("TX_{}", last8(digest)),
            format!("Transaction {}", last8(digest)),
        ),
    };

    let contract_address = match (str_field(fields, "pair")?, str_field(fields, "pool_id")?) {
        (Some(pair), _) => pair.to_string(),
        (None, Some(pool)) => pool.to_string(),
        (None, None) => match shape {
            MoveShape::CoinType => str_field(fields, "coin_type")?.unwrap_or(digest).to_string(),
            _ => digest.to_string(),
        },
    };

    let identity = format!("{}-{}", contract_address, event.id.event_seq);

    Ok(DecodedMoveEvent {
        symbol,
        name,
        contract_address,
        identity,
        shape,
    })
}
