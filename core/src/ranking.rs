//! Ranking engine — dense ranks with a reproducible row order.
//!
//! Equal metrics share a rank and the next distinct metric gets rank + 1,
//! so there are never gaps. Rows are ordered by rank, then key ascending;
//! the key never changes a rank number, only where a tied row is listed.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<K, M> {
    pub rank:   usize,
    pub key:    K,
    pub metric: M,
}

fn compare_metric<M: PartialOrd>(a: &M, b: &M, direction: SortDirection) -> Ordering {
    let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
    match direction {
        SortDirection::Ascending  => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

/// Dense-rank `entries` by metric in `direction`.
pub fn dense_rank<K, M, I>(entries: I, direction: SortDirection) -> Vec<Ranked<K, M>>
where
    K: Ord,
    M: PartialOrd + Copy,
    I: IntoIterator<Item = (K, M)>,
{
    let mut sorted: Vec<(K, M)> = entries.into_iter().collect();
    sorted.sort_by(|a, b| compare_metric(&a.1, &b.1, direction).then_with(|| a.0.cmp(&b.0)));

    let mut out: Vec<Ranked<K, M>> = Vec::with_capacity(sorted.len());
    let mut rank = 0;
    for (key, metric) in sorted {
        let same_as_prev = out
            .last()
            .map(|prev| compare_metric(&prev.metric, &metric, direction) == Ordering::Equal)
            .unwrap_or(false);
        if !same_as_prev {
            rank += 1;
        }
        out.push(Ranked { rank, key, metric });
    }
    out
}

/// Keep every row ranked `n` or better. Ties at rank `n` are all kept, so
/// the result can hold more than `n` rows.
pub fn top_n<K, M>(ranked: Vec<Ranked<K, M>>, n: usize) -> Vec<Ranked<K, M>> {
    ranked.into_iter().take_while(|r| r.rank <= n).collect()
}

/// Dense-rank independently inside each partition.
pub fn dense_rank_partitioned<P, K, M, I>(
    entries: I,
    direction: SortDirection,
) -> BTreeMap<P, Vec<Ranked<K, M>>>
where
    P: Ord,
    K: Ord,
    M: PartialOrd + Copy,
    I: IntoIterator<Item = (P, K, M)>,
{
    let mut partitions: BTreeMap<P, Vec<(K, M)>> = BTreeMap::new();
    for (partition, key, metric) in entries {
        partitions.entry(partition).or_default().push((key, metric));
    }
    partitions
        .into_iter()
        .map(|(p, rows)| (p, dense_rank(rows, direction)))
        .collect()
}
