//! Merge of multi-strategy scan results.

use std::collections::HashSet;

use crate::pair::CandidatePair;

/// Keep the first record per (network, contract address), then order newest
/// first. The sort is stable, so equal launch times keep input order.
pub fn dedup_and_sort(pairs: Vec<CandidatePair>) -> Vec<CandidatePair> {
    let mut seen = HashSet::with_capacity(pairs.len());
    let mut unique: Vec<CandidatePair> = pairs
        .into_iter()
        .filter(|p| seen.insert((p.network, p.contract_address.clone())))
        .collect();

    unique.sort_by(|a, b| b.launch_time.cmp(&a.launch_time));
    unique
}
