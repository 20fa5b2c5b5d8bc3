use itertools::Itertools;

use crate::db::PartyResult;

/// The `n` items with the largest key. Equal keys keep input order; fewer
/// than `n` items means all of them.
pub fn top_n<T, K: Ord>(items: &[T], n: usize, key: impl Fn(&T) -> K) -> Vec<&T> {
    items
        .iter()
        .sorted_by(|a, b| key(b).cmp(&key(a)))
        .take(n)
        .collect()
}

/// The `n` items with the smallest key, same tie and size rules as [`top_n`].
pub fn bottom_n<T, K: Ord>(items: &[T], n: usize, key: impl Fn(&T) -> K) -> Vec<&T> {
    items
        .iter()
        .sorted_by(|a, b| key(a).cmp(&key(b)))
        .take(n)
        .collect()
}

pub fn grand_total(parties: &[PartyResult]) -> u64 {
    parties.iter().map(|p| p.total).sum()
}

/// `part / total`, or 0 when there is nothing to divide by.
pub fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
