//! Dense ranking and top-N tests.

use delivery_analytics_core::ranking::{dense_rank, dense_rank_partitioned, top_n, SortDirection};

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn ties_share_rank_without_gaps() {
    let entries = vec![(1, 100), (2, 100), (3, 90), (4, 80), (5, 80)];

    let ranked = dense_rank(entries, SortDirection::Descending);

    let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 1, 2, 3, 3]);
}

#[test]
fn insertion_order_does_not_change_rank_or_listing() {
    let a = dense_rank(vec![(3, 50.0), (1, 50.0), (2, 75.0)], SortDirection::Descending);
    let b = dense_rank(vec![(1, 50.0), (2, 75.0), (3, 50.0)], SortDirection::Descending);

    assert_eq!(a, b, "Same entries in a different order must rank identically");
    let keys: Vec<i32> = a.iter().map(|r| r.key).collect();
    assert_eq!(keys, vec![2, 1, 3], "Tied rows are listed by key ascending");
    assert_eq!(a[1].rank, a[2].rank);
}

#[test]
fn ascending_direction_ranks_smallest_first() {
    let ranked = dense_rank(vec![("b", 3), ("a", 1), ("c", 1)], SortDirection::Ascending);

    let listing: Vec<(&str, usize)> = ranked.iter().map(|r| (r.key, r.rank)).collect();
    assert_eq!(listing, vec![("a", 1), ("c", 1), ("b", 2)]);
}

#[test]
fn top_n_keeps_every_row_tied_at_the_cutoff() {
    // Four customers share the third-highest count.
    let entries = vec![(1, 9), (2, 7), (3, 5), (4, 5), (5, 5), (6, 5), (7, 2)];

    let top = top_n(dense_rank(entries, SortDirection::Descending), 3);

    let keys: Vec<i32> = top.iter().map(|r| r.key).collect();
    assert_eq!(keys, vec![1, 2, 3, 4, 5, 6], "All four rank-3 rows must be returned");
    assert!(top.iter().all(|r| r.rank <= 3));
}

#[test]
fn top_n_on_empty_input_is_empty() {
    let ranked = dense_rank(Vec::<(i32, f64)>::new(), SortDirection::Descending);
    assert!(top_n(ranked, 5).is_empty());
}

#[test]
fn partitioned_ranks_restart_per_partition() {
    let entries = vec![
        ("Delhi", 1, 500.0),
        ("Delhi", 2, 800.0),
        ("Mumbai", 3, 300.0),
        ("Mumbai", 4, 300.0),
    ];

    let parts = dense_rank_partitioned(entries, SortDirection::Descending);

    assert_eq!(parts.len(), 2);
    let delhi: Vec<(i32, usize)> = parts["Delhi"].iter().map(|r| (r.key, r.rank)).collect();
    assert_eq!(delhi, vec![(2, 1), (1, 2)]);
    let mumbai: Vec<(i32, usize)> = parts["Mumbai"].iter().map(|r| (r.key, r.rank)).collect();
    assert_eq!(mumbai, vec![(3, 1), (4, 1)]);
}
