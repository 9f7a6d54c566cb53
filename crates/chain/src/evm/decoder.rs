//! Pure decoders for the three EVM discovery signals.
//!
//! Nothing in this module performs I/O, so every decode policy can be tested
//! against fixture payloads.

use alloy::primitives::{Address, B256, U256};
use tracing::{debug, trace};

use super::{EventTopics, RawLog};
use crate::DecodeError;

/// ABI word size in bytes.
const WORD: usize = 32;

/// Read ABI word `index` from `data`.
fn word(data: &[u8], index: usize) -> Result<&[u8], DecodeError> {
    let start = index * WORD;
    let end = start + WORD;
    data.get(start..end).ok_or(DecodeError::Truncated {
        expected: end,
        actual: data.len(),
    })
}

/// Decode an address word; the 12 padding bytes must be zero.
fn address_word(data: &[u8], index: usize) -> Result<Address, DecodeError> {
    let w = word(data, index)?;
    if w[..12].iter().any(|b| *b != 0) {
        return Err(DecodeError::DirtyAddress { word: index });
    }
    Ok(Address::from_slice(&w[12..]))
}

fn uint_word(data: &[u8], index: usize) -> Result<U256, DecodeError> {
    Ok(U256::from_be_slice(word(data, index)?))
}

/// Decode an indexed address topic.
fn topic_address(topic: &B256, index: usize) -> Result<Address, DecodeError> {
    address_word(topic.as_slice(), 0).map_err(|_| DecodeError::DirtyAddress { word: index })
}

// ============================================================================
// Factory creation signal
// ============================================================================

/// Payload layouts emitted by different factory versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryLayout {
    /// (token0, token1, pair, sequence)
    TokensPairSequence,
    /// (token0, token1, pair)
    TokensPair,
    /// (token0, token1); the pair must be recovered from the receipt
    TokensOnly,
}

/// Width → ordered layout attempts.
const WIDTH_LAYOUTS: &[(usize, &[FactoryLayout])] = &[
    (
        4 * WORD,
        &[FactoryLayout::TokensPairSequence, FactoryLayout::TokensPair],
    ),
    (3 * WORD, &[FactoryLayout::TokensPair]),
    (2 * WORD, &[FactoryLayout::TokensOnly]),
];

/// Layouts to try, in order, for a payload of `width` bytes.
///
/// An empty slice means the width is unknown and the log must be discarded.
pub fn factory_layouts(width: usize) -> &'static [FactoryLayout] {
    WIDTH_LAYOUTS
        .iter()
        .find(|(w, _)| *w == width)
        .map(|(_, layouts)| *layouts)
        .unwrap_or(&[])
}

/// Decoded factory payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryPayload {
    pub token0: Address,
    pub token1: Address,
    /// Pair address, absent for the two-parameter layout
    pub pair: Option<Address>,
    /// Factory pair index, only present in the four-parameter layout
    pub sequence: Option<u64>,
    /// Layout that produced this payload
    pub layout: FactoryLayout,
}

impl FactoryLayout {
    /// Decode `data` strictly under this layout.
    pub fn decode(self, data: &[u8]) -> Result<FactoryPayload, DecodeError> {
        let token0 = address_word(data, 0)?;
        let token1 = address_word(data, 1)?;

        let (pair, sequence) = match self {
            Self::TokensPairSequence => {
                let pair = address_word(data, 2)?;
                let sequence = uint_word(data, 3)?;
                if sequence > U256::from(u64::MAX) {
                    return Err(DecodeError::SequenceOverflow);
                }
                (Some(pair), Some(sequence.to::<u64>()))
            }
            Self::TokensPair => (Some(address_word(data, 2)?), None),
            Self::TokensOnly => (None, None),
        };

        Ok(FactoryPayload {
            token0,
            token1,
            pair,
            sequence,
            layout: self,
        })
    }
}

/// Decode a factory creation payload, walking the width's fallback layouts.
pub fn decode_factory_payload(data: &[u8]) -> Result<FactoryPayload, DecodeError> {
    let layouts = factory_layouts(data.len());
    let mut last_error = DecodeError::UnknownWidth(data.len());

    for layout in layouts {
        match layout.decode(data) {
            Ok(payload) => return Ok(payload),
            Err(e) => {
                debug!(
                    layout = ?layout,
                    width = data.len(),
                    error = %e,
                    "Factory layout rejected, trying next"
                );
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Pick the pair address out of a creation receipt: the first emitting
/// contract that is not the factory itself.
pub fn recover_pair_address(receipt_addresses: &[Address], factory: Address) -> Option<Address> {
    receipt_addresses.iter().copied().find(|a| *a != factory)
}

// ============================================================================
// Liquidity-addition signal
// ============================================================================

/// Router liquidity event payload shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityShape {
    /// Token paired with the native currency
    NativePaired,
    /// Token paired with an arbitrary token
    TokenPaired,
}

impl LiquidityShape {
    pub const ALL: [LiquidityShape; 2] = [Self::NativePaired, Self::TokenPaired];

    /// Topic0 identifying this shape.
    pub fn topic(self, topics: &EventTopics) -> B256 {
        match self {
            Self::NativePaired => topics.add_liquidity_eth,
            Self::TokenPaired => topics.add_liquidity,
        }
    }

    /// Minimum payload width in bytes.
    pub fn min_width(self) -> usize {
        match self {
            Self::NativePaired => 6 * WORD,
            Self::TokenPaired => 8 * WORD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NativePaired => "addLiquidityETH",
            Self::TokenPaired => "addLiquidity",
        }
    }
}

/// Extract the non-native token from a liquidity payload.
///
/// `Ok(None)` means the payload decoded but neither side is a new token
/// candidate (e.g. a token/token pair without the wrapped native side).
pub fn decode_liquidity_token(
    shape: LiquidityShape,
    data: &[u8],
    wrapped_native: Address,
) -> Result<Option<Address>, DecodeError> {
    if data.len() < shape.min_width() {
        return Err(DecodeError::Truncated {
            expected: shape.min_width(),
            actual: data.len(),
        });
    }

    let token = match shape {
        LiquidityShape::NativePaired => {
            let token = address_word(data, 0)?;
            (token != wrapped_native).then_some(token)
        }
        LiquidityShape::TokenPaired => {
            let token_a = address_word(data, 0)?;
            let token_b = address_word(data, 1)?;
            if token_a == wrapped_native {
                Some(token_b)
            } else if token_b == wrapped_native {
                Some(token_a)
            } else {
                None
            }
        }
    };

    Ok(token)
}

// ============================================================================
// Large-transfer signal
// ============================================================================

/// Decoded ERC20 transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Token contract that emitted the transfer
    pub token: Address,
    pub from: Address,
    pub to: Address,
    /// Raw amount in base units
    pub amount: U256,
    pub block_number: u64,
    pub tx_hash: B256,
}

impl TransferRecord {
    /// Mints and burns move tokens from/to the zero address.
    pub fn is_mint_or_burn(&self) -> bool {
        self.from == Address::ZERO || self.to == Address::ZERO
    }

    /// Wallet-to-wallet transfer strictly above `threshold`.
    pub fn is_large(&self, threshold: U256) -> bool {
        !self.is_mint_or_burn() && self.amount > threshold
    }
}

/// Decode a transfer log in either the indexed or the fully non-indexed form.
pub fn decode_transfer(log: &RawLog) -> Result<TransferRecord, DecodeError> {
    let (from, to, amount) = match log.topics.len() {
        // Transfer(address indexed from, address indexed to, uint256 value)
        3 => (
            topic_address(&log.topics[1], 1)?,
            topic_address(&log.topics[2], 2)?,
            uint_word(&log.data, 0)?,
        ),
        // Non-indexed variant: everything lives in a 96 byte payload
        1 if log.data.len() == 3 * WORD => (
            address_word(&log.data, 0)?,
            address_word(&log.data, 1)?,
            uint_word(&log.data, 2)?,
        ),
        1 => return Err(DecodeError::UnknownWidth(log.data.len())),
        // ERC721 style transfers index the token id as well
        _ => return Err(DecodeError::UnknownTopic),
    };

    Ok(TransferRecord {
        token: log.address,
        from,
        to,
        amount,
        block_number: log.block_number,
        tx_hash: log.tx_hash,
    })
}

/// Large-transfer threshold in base units, assuming 18 decimals.
pub fn large_transfer_threshold(tokens: u64) -> U256 {
    U256::from(tokens) * U256::from(10u64).pow(U256::from(18u64))
}

/// The most recent `n` entries of a chronologically ordered slice.
pub fn most_recent<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Sample the most recent `sample` logs and keep large wallet-to-wallet
/// transfers. Undecodable logs are skipped.
pub fn select_large_transfers(
    logs: &[RawLog],
    sample: usize,
    threshold: U256,
) -> Vec<TransferRecord> {
    most_recent(logs, sample)
        .iter()
        .filter_map(|log| match decode_transfer(log) {
            Ok(record) => Some(record),
            Err(e) => {
                trace!(token = %log.address, error = %e, "Skipping undecodable transfer");
                None
            }
        })
        .filter(|record| record.is_large(threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;

    fn addr_word(a: Address) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[12..].copy_from_slice(a.as_slice());
        w
    }

    fn uint_word_bytes(v: U256) -> [u8; 32] {
        v.to_be_bytes::<32>()
    }

    fn payload(words: &[[u8; 32]]) -> Vec<u8> {
        words.iter().flatten().copied().collect()
    }

    fn token0() -> Address {
        Address::repeat_byte(0x11)
    }
    fn token1() -> Address {
        Address::repeat_byte(0x22)
    }
    fn pair() -> Address {
        Address::repeat_byte(0x33)
    }

    #[test]
    fn test_width_table() {
        assert_eq!(
            factory_layouts(128),
            &[FactoryLayout::TokensPairSequence, FactoryLayout::TokensPair]
        );
        assert_eq!(factory_layouts(96), &[FactoryLayout::TokensPair]);
        assert_eq!(factory_layouts(64), &[FactoryLayout::TokensOnly]);
        assert!(factory_layouts(130).is_empty());
        assert!(factory_layouts(0).is_empty());
    }

    #[test]
    fn test_factory_four_params() {
        let data = payload(&[
            addr_word(token0()),
            addr_word(token1()),
            addr_word(pair()),
            uint_word_bytes(U256::from(1234u64)),
        ]);
        let decoded = decode_factory_payload(&data).unwrap();
        assert_eq!(decoded.layout, FactoryLayout::TokensPairSequence);
        assert_eq!(decoded.pair, Some(pair()));
        assert_eq!(decoded.sequence, Some(1234));
    }

    #[test]
    fn test_factory_128_falls_back_to_three_params() {
        // Trailing word does not fit a pair index, so the 4-param layout rejects it
        let data = payload(&[
            addr_word(token0()),
            addr_word(token1()),
            addr_word(pair()),
            [0xff; 32],
        ]);
        assert_eq!(
            FactoryLayout::TokensPairSequence.decode(&data),
            Err(DecodeError::SequenceOverflow)
        );

        let decoded = decode_factory_payload(&data).unwrap();
        assert_eq!(decoded.layout, FactoryLayout::TokensPair);
        assert_eq!(decoded.token0, token0());
        assert_eq!(decoded.token1, token1());
        assert_eq!(decoded.pair, Some(pair()));
        assert_eq!(decoded.sequence, None);
    }

    #[test]
    fn test_factory_128_both_layouts_fail() {
        let mut dirty = addr_word(pair());
        dirty[0] = 1;
        let data = payload(&[addr_word(token0()), addr_word(token1()), dirty, [0; 32]]);
        assert_eq!(
            decode_factory_payload(&data),
            Err(DecodeError::DirtyAddress { word: 2 })
        );
    }

    #[test]
    fn test_factory_three_params_direct() {
        let data = payload(&[addr_word(token0()), addr_word(token1()), addr_word(pair())]);
        let decoded = decode_factory_payload(&data).unwrap();
        assert_eq!(decoded.layout, FactoryLayout::TokensPair);
        assert_eq!(decoded.pair, Some(pair()));
    }

    #[test]
    fn test_factory_two_params_needs_receipt() {
        let data = payload(&[addr_word(token0()), addr_word(token1())]);
        let decoded = decode_factory_payload(&data).unwrap();
        assert_eq!(decoded.layout, FactoryLayout::TokensOnly);
        assert_eq!(decoded.pair, None);
    }

    #[test]
    fn test_factory_unknown_width() {
        let data = vec![0u8; 130];
        assert_eq!(
            decode_factory_payload(&data),
            Err(DecodeError::UnknownWidth(130))
        );
    }

    #[test]
    fn test_recover_pair_address() {
        let factory = Address::repeat_byte(0xfa);
        assert_eq!(
            recover_pair_address(&[factory, pair(), token0()], factory),
            Some(pair())
        );
        assert_eq!(recover_pair_address(&[factory, factory], factory), None);
        assert_eq!(recover_pair_address(&[], factory), None);
    }

    #[test]
    fn test_liquidity_native_paired() {
        let wbnb = Address::repeat_byte(0xbb);
        let mut words = vec![addr_word(token0())];
        words.extend(std::iter::repeat([0u8; 32]).take(5));
        let data = payload(&words);

        let token = decode_liquidity_token(LiquidityShape::NativePaired, &data, wbnb).unwrap();
        assert_eq!(token, Some(token0()));

        let err = decode_liquidity_token(LiquidityShape::NativePaired, &data[..64], wbnb);
        assert!(matches!(err, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_liquidity_token_paired_picks_non_native() {
        let wbnb = Address::repeat_byte(0xbb);
        let mut words = vec![addr_word(wbnb), addr_word(token1())];
        words.extend(std::iter::repeat([0u8; 32]).take(6));
        let data = payload(&words);
        assert_eq!(
            decode_liquidity_token(LiquidityShape::TokenPaired, &data, wbnb).unwrap(),
            Some(token1())
        );

        let mut words = vec![addr_word(token0()), addr_word(wbnb)];
        words.extend(std::iter::repeat([0u8; 32]).take(6));
        let data = payload(&words);
        assert_eq!(
            decode_liquidity_token(LiquidityShape::TokenPaired, &data, wbnb).unwrap(),
            Some(token0())
        );

        let mut words = vec![addr_word(token0()), addr_word(token1())];
        words.extend(std::iter::repeat([0u8; 32]).take(6));
        let data = payload(&words);
        assert_eq!(
            decode_liquidity_token(LiquidityShape::TokenPaired, &data, wbnb).unwrap(),
            None
        );
    }

    #[test]
    fn test_liquidity_shape_topics_distinct() {
        let topics = EventTopics::standard();
        assert_eq!(LiquidityShape::NativePaired.topic(&topics), topics.add_liquidity_eth);
        assert_eq!(LiquidityShape::TokenPaired.topic(&topics), topics.add_liquidity);
    }

    fn transfer_log(from: Address, to: Address, amount: U256) -> RawLog {
        let topics = EventTopics::standard();
        RawLog {
            address: Address::repeat_byte(0x44),
            topics: vec![
                topics.transfer,
                B256::from(addr_word(from)),
                B256::from(addr_word(to)),
            ],
            data: Bytes::from(uint_word_bytes(amount).to_vec()),
            block_number: 7,
            tx_hash: B256::repeat_byte(0x99),
        }
    }

    #[test]
    fn test_decode_indexed_transfer() {
        let log = transfer_log(token0(), token1(), U256::from(5u64));
        let record = decode_transfer(&log).unwrap();
        assert_eq!(record.token, Address::repeat_byte(0x44));
        assert_eq!(record.from, token0());
        assert_eq!(record.to, token1());
        assert_eq!(record.amount, U256::from(5u64));
        assert_eq!(record.block_number, 7);
    }

    #[test]
    fn test_decode_non_indexed_transfer() {
        let topics = EventTopics::standard();
        let log = RawLog {
            address: Address::repeat_byte(0x44),
            topics: vec![topics.transfer],
            data: Bytes::from(payload(&[
                addr_word(token0()),
                addr_word(token1()),
                uint_word_bytes(U256::from(9u64)),
            ])),
            block_number: 1,
            tx_hash: B256::ZERO,
        };
        let record = decode_transfer(&log).unwrap();
        assert_eq!(record.amount, U256::from(9u64));

        let short = RawLog {
            data: Bytes::from(vec![0u8; 32]),
            ..log
        };
        assert_eq!(decode_transfer(&short), Err(DecodeError::UnknownWidth(32)));
    }

    #[test]
    fn test_large_transfer_filter() {
        let threshold = large_transfer_threshold(100_000);
        let big = threshold + U256::from(1u64);

        let logs = vec![
            transfer_log(token0(), token1(), big),
            // mint
            transfer_log(Address::ZERO, token1(), big),
            // burn
            transfer_log(token0(), Address::ZERO, big),
            // exactly at the threshold is not "above" it
            transfer_log(token0(), token1(), threshold),
            transfer_log(token1(), token0(), big),
        ];

        let selected = select_large_transfers(&logs, 100, threshold);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| !r.is_mint_or_burn()));

        // Only the most recent entry is sampled
        let selected = select_large_transfers(&logs, 1, threshold);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].from, token1());
    }

    #[test]
    fn test_most_recent() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(most_recent(&items, 2), &[4, 5]);
        assert_eq!(most_recent(&items, 10), &items);
        assert!(most_recent(&items, 0).is_empty());
    }
}
