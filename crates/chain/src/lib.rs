//! Pairscout network boundary and payload decoding.
//!
//! This crate provides:
//! - EVM adapter over an Alloy HTTP provider (logs, blocks, receipts, ERC20 reads)
//! - EVM log decoders for factory, liquidity and transfer signals
//! - Sui JSON-RPC adapter for Move event queries
//! - Move event decoder for heterogeneous DEX event payloads
//!
//! All RPC calls are bounded by a timeout at the adapter boundary.

mod error;
pub mod evm;
pub mod sui;

pub use error::{DecodeError, SourceError};
pub use evm::{
    AlloyEvmSource, BlockWindow, EventTopics, EvmLogSource, EvmSignals, FactoryLayout,
    FactoryPayload, LiquidityShape, LogQuery, RawLog, TokenDetails, TokenMetadata,
    TransferRecord,
};
pub use sui::{
    decode_move_event, DecodedMoveEvent, EventId, MoveEventSource, MovePackage, MoveShape,
    SuiEvent, SuiRpcClient, SUI_MAINNET_RPC,
};
