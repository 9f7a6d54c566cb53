//! Contract interfaces, event topics and per-chain addresses.

use alloy::primitives::{address, keccak256, Address, B256};
use alloy::sol;

sol! {
    /// ERC20 metadata subset used for token introspection
    #[sol(rpc)]
    interface IERC20Metadata {
        function symbol() external view returns (string);
        function name() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
    }
}

/// Well-known BNB Smart Chain addresses (PancakeSwap deployment).
pub mod bsc {
    use super::*;

    /// PancakeSwap V2 factory
    pub const FACTORY: Address = address!("ca143ce32fe78f1f7019d7d551a6402fc5350c73");
    /// PancakeSwap V2 router
    pub const ROUTER_V2: Address = address!("10ed43c718714eb63d5aa57b78b54704e256024e");
    /// PancakeSwap V3 router
    pub const ROUTER_V3: Address = address!("13f4ea83d0bd40e75c8222255bc855a974568dd4");
    /// Wrapped BNB
    pub const WBNB: Address = address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");
}

/// Topic0 hashes of the signals the EVM scanner listens for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTopics {
    pub pair_created: B256,
    pub add_liquidity_eth: B256,
    pub add_liquidity: B256,
    pub transfer: B256,
}

impl EventTopics {
    /// Uniswap-V2 style factory/router events and the ERC20 transfer.
    pub fn standard() -> Self {
        Self {
            // PairCreated(address indexed token0, address indexed token1, address pair, uint256)
            pair_created: keccak256("PairCreated(address,address,address,uint256)"),
            add_liquidity_eth: keccak256(
                "AddLiquidityETH(address,uint256,uint256,uint256,address,uint256)",
            ),
            add_liquidity: keccak256(
                "AddLiquidity(address,address,uint256,uint256,uint256,uint256,address,uint256)",
            ),
            // Transfer(address indexed from, address indexed to, uint256 value)
            transfer: keccak256("Transfer(address,address,uint256)"),
        }
    }
}

impl Default for EventTopics {
    fn default() -> Self {
        Self::standard()
    }
}

/// Immutable per-chain signal configuration injected into the EVM scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmSignals {
    /// Pair factory whose creation events are the primary signal
    pub factory: Address,
    /// Routers emitting liquidity-addition events
    pub routers: Vec<Address>,
    /// Wrapped native currency, never reported as a discovered token
    pub wrapped_native: Address,
    /// Event topics
    pub topics: EventTopics,
}

impl EvmSignals {
    /// PancakeSwap on BNB Smart Chain.
    pub fn pancakeswap_bsc() -> Self {
        Self {
            factory: bsc::FACTORY,
            routers: vec![bsc::ROUTER_V2, bsc::ROUTER_V3],
            wrapped_native: bsc::WBNB,
            topics: EventTopics::standard(),
        }
    }
}
