//! Aggregation engine tests: grouping, filters, inner and left modes.

use chrono::NaiveDate;
use delivery_analytics_core::{
    aggregation::{aggregate, customer_aggregates, JoinMode, OrderFilter},
    record::{Customer, Order},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn customer(id: i64) -> Customer {
    Customer {
        customer_id: id,
        name:        format!("Customer {id}"),
        contact:     String::new(),
        location:    "Delhi".into(),
    }
}

fn order(id: i64, customer_id: i64, day: NaiveDate, amount: f64, status: &str) -> Order {
    Order {
        order_id:       id,
        customer_id,
        restaurant_id:  1,
        deliverer_id:   1,
        order_date:     day,
        order_amount:   amount,
        payment_method: "UPI".into(),
        order_status:   status.into(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn groups_count_sum_and_average_over_filtered_rows() {
    let orders = vec![
        order(1, 1, date(2024, 1, 1), 100.0, "Delivered"),
        order(2, 1, date(2024, 1, 2), 300.0, "Delivered"),
        order(3, 1, date(2024, 1, 3), 999.0, "Cancelled"),
        order(4, 2, date(2024, 1, 3), 50.0, "Delivered"),
    ];

    let out = aggregate(&orders, &OrderFilter::Delivered, |o| Some(o.customer_id), JoinMode::Inner);

    assert_eq!(out.len(), 2);
    assert_eq!(out[&1].count, 2);
    assert_eq!(out[&1].total, 400.0);
    assert_eq!(out[&1].average, Some(200.0));
    assert_eq!(out[&1].last_order_date, Some(date(2024, 1, 2)));
    assert_eq!(out[&2].total, 50.0);
}

#[test]
fn orders_on_the_same_date_all_count() {
    let day = date(2024, 3, 3);
    let orders = vec![
        order(1, 1, day, 10.0, "Delivered"),
        order(2, 1, day, 10.0, "Delivered"),
        order(3, 1, day, 10.0, "Delivered"),
    ];

    let out = aggregate(&orders, &OrderFilter::All, |o| Some(o.customer_id), JoinMode::Inner);

    assert_eq!(out[&1].count, 3);
}

#[test]
fn inner_mode_omits_groups_without_rows() {
    let orders = vec![order(1, 1, date(2024, 1, 1), 10.0, "Cancelled")];

    let out = aggregate(&orders, &OrderFilter::Delivered, |o| Some(o.customer_id), JoinMode::Inner);

    assert!(out.is_empty(), "No key may be invented for a filtered-out group");
}

#[test]
fn left_mode_emits_every_supplied_key() {
    let orders = vec![order(1, 2, date(2024, 1, 1), 10.0, "Delivered")];

    let out = aggregate(
        &orders,
        &OrderFilter::Delivered,
        |o| Some(o.customer_id),
        JoinMode::Left(vec![1, 2, 3]),
    );

    assert_eq!(out.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(out[&1].count, 0);
    assert_eq!(out[&1].total, 0.0);
    assert_eq!(out[&1].average, None, "Empty left-mode group must not carry an average");
    assert_eq!(out[&1].last_order_date, None);
    assert_eq!(out[&2].count, 1);
}

#[test]
fn left_mode_ignores_keys_outside_the_list() {
    let orders = vec![
        order(1, 1, date(2024, 1, 1), 10.0, "Delivered"),
        order(2, 9, date(2024, 1, 1), 10.0, "Delivered"),
    ];

    let out = aggregate(&orders, &OrderFilter::All, |o| Some(o.customer_id), JoinMode::Left(vec![1]));

    assert_eq!(out.len(), 1);
    assert!(!out.contains_key(&9));
}

#[test]
fn left_mode_repeated_key_keeps_its_metrics() {
    let orders = vec![
        order(1, 1, date(2024, 1, 1), 10.0, "Delivered"),
        order(2, 1, date(2024, 1, 2), 30.0, "Delivered"),
    ];

    let out = aggregate(&orders, &OrderFilter::All, |o| Some(o.customer_id), JoinMode::Left(vec![1, 1]));

    assert_eq!(out.len(), 1);
    assert_eq!(out[&1].count, 2);
    assert_eq!(out[&1].total, 40.0);
    assert_eq!(out[&1].last_order_date, Some(date(2024, 1, 2)));
}

#[test]
fn customer_aggregates_list_a_repeated_customer_once() {
    let customers = vec![customer(1), customer(1)];
    let orders = vec![order(1, 1, date(2024, 6, 30), 100.0, "Delivered")];

    let rows = customer_aggregates(&orders, &customers, &OrderFilter::All, true, date(2024, 6, 30));

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_orders, 1);
    assert_eq!(rows[0].recency_days, Some(0));
}

#[test]
fn key_extractor_returning_none_skips_the_order() {
    let orders = vec![
        order(1, 1, date(2024, 1, 1), 10.0, "Delivered"),
        order(2, 2, date(2024, 1, 1), 20.0, "Delivered"),
    ];

    let out = aggregate(
        &orders,
        &OrderFilter::All,
        |o| (o.customer_id == 1).then_some("kept"),
        JoinMode::Inner,
    );

    assert_eq!(out["kept"].count, 1);
}

#[test]
fn customer_aggregates_compute_recency_from_as_of() {
    let customers = vec![customer(1), customer(2)];
    let orders = vec![
        order(1, 1, date(2024, 6, 1), 100.0, "Delivered"),
        order(2, 1, date(2024, 6, 20), 50.0, "Delivered"),
    ];

    let rows = customer_aggregates(&orders, &customers, &OrderFilter::Delivered, true, date(2024, 6, 30));

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].customer_id, 1);
    assert_eq!(rows[0].total_orders, 2);
    assert_eq!(rows[0].total_revenue, 150.0);
    assert_eq!(rows[0].average_order_value, Some(75.0));
    assert_eq!(rows[0].last_order_date, Some(date(2024, 6, 20)));
    assert_eq!(rows[0].recency_days, Some(10));

    assert_eq!(rows[1].customer_id, 2);
    assert_eq!(rows[1].total_orders, 0);
    assert_eq!(rows[1].recency_days, None);
}

#[test]
fn customer_aggregates_inner_mode_lists_participants_only() {
    let customers = vec![customer(1), customer(2)];
    let orders = vec![order(1, 2, date(2024, 6, 1), 100.0, "Delivered")];

    let rows = customer_aggregates(&orders, &customers, &OrderFilter::Delivered, false, date(2024, 6, 30));

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_id, 2);
}
