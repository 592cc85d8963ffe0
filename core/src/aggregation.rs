//! Aggregation engine — grouped count / sum / average over orders.
//!
//! One pass over the input, one accumulator per distinct key. Output is a
//! `BTreeMap`, so key order is deterministic for every caller.
//!
//! RULES:
//!   - Only orders accepted by the filter contribute.
//!   - Inner mode never invents a key: a group exists only if at least one
//!     order landed in it, so an average is never a division by zero.
//!   - Left mode emits exactly the supplied key list, once per distinct
//!     key; keys with no orders carry zero count/total and no average or
//!     last date.

use crate::{
    record::{Customer, Order, OrderStatus},
    types::{round_cents, Amount, CustomerId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Public types ─────────────────────────────────────────────────────────────

/// Which orders a metric counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    Delivered,
    Cancelled,
    Status(OrderStatus),
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::All       => true,
            OrderFilter::Delivered => order.is_delivered(),
            OrderFilter::Cancelled => order.is_cancelled(),
            OrderFilter::Status(s) => &order.order_status == s,
        }
    }
}

/// Inner: participants only. Left: one row per supplied key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinMode<K> {
    Inner,
    Left(Vec<K>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    pub count:           usize,
    pub total:           Amount,
    /// `None` only for a left-mode key with no orders.
    pub average:         Option<Amount>,
    pub last_order_date: Option<NaiveDate>,
}

impl GroupMetrics {
    fn empty() -> Self {
        Self { count: 0, total: 0.0, average: None, last_order_date: None }
    }
}

/// Per-customer rollup shared by the customer reports and both views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAggregate {
    pub customer_id:         CustomerId,
    pub total_orders:        usize,
    pub total_revenue:       Amount,
    pub average_order_value: Option<Amount>,
    /// Days between the last order and the reference date.
    pub recency_days:        Option<i64>,
    /// `None` means the customer has no order under the filter.
    pub last_order_date:     Option<NaiveDate>,
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Accumulator {
    count: usize,
    total: Amount,
    last:  Option<NaiveDate>,
}

impl Accumulator {
    fn add(&mut self, order: &Order) {
        self.count += 1;
        self.total += order.order_amount;
        self.last = self.last.max(Some(order.order_date));
    }

    fn finish(self) -> GroupMetrics {
        let total = round_cents(self.total);
        GroupMetrics {
            count: self.count,
            total,
            average: Some(round_cents(self.total / self.count as f64)),
            last_order_date: self.last,
        }
    }
}

/// Group `orders` by `key_fn` and compute count / total / average per key.
///
/// `key_fn` returns `None` for orders that have no value on the grouping
/// dimension; those orders are ignored.
pub fn aggregate<'a, K, I, F>(
    orders: I,
    filter: &OrderFilter,
    mut key_fn: F,
    mode: JoinMode<K>,
) -> BTreeMap<K, GroupMetrics>
where
    K: Ord + Clone,
    I: IntoIterator<Item = &'a Order>,
    F: FnMut(&Order) -> Option<K>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for order in orders {
        if !filter.matches(order) {
            continue;
        }
        if let Some(key) = key_fn(order) {
            groups.entry(key).or_default().add(order);
        }
    }

    let out: BTreeMap<K, GroupMetrics> = match mode {
        JoinMode::Inner => groups
            .into_iter()
            .map(|(k, acc)| (k, acc.finish()))
            .collect(),
        JoinMode::Left(keys) => {
            let mut out = BTreeMap::new();
            for k in keys {
                if out.contains_key(&k) {
                    continue;
                }
                let metrics = groups
                    .remove(&k)
                    .map(Accumulator::finish)
                    .unwrap_or_else(GroupMetrics::empty);
                out.insert(k, metrics);
            }
            out
        }
    };

    log::debug!("aggregate: filter={filter:?} groups={}", out.len());
    out
}

/// Per-customer aggregates over `orders`.
///
/// In inner mode only customers with a matching order appear; in left mode
/// every customer id in `customers` appears once, even if listed twice. Rows are ordered by
/// customer id.
pub fn customer_aggregates<'a, I>(
    orders: I,
    customers: &[Customer],
    filter: &OrderFilter,
    left_join: bool,
    as_of: NaiveDate,
) -> Vec<CustomerAggregate>
where
    I: IntoIterator<Item = &'a Order>,
{
    let mode = if left_join {
        JoinMode::Left(customers.iter().map(|c| c.customer_id).collect())
    } else {
        JoinMode::Inner
    };

    aggregate(orders, filter, |o| Some(o.customer_id), mode)
        .into_iter()
        .map(|(customer_id, m)| CustomerAggregate {
            customer_id,
            total_orders:        m.count,
            total_revenue:       m.total,
            average_order_value: m.average,
            recency_days:        m.last_order_date.map(|d| (as_of - d).num_days()),
            last_order_date:     m.last_order_date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64, customer_id: i64, amount: f64, status: &str) -> Order {
        Order {
            order_id: id,
            customer_id,
            restaurant_id: 1,
            deliverer_id: 1,
            order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            order_amount: amount,
            payment_method: "Card".into(),
            order_status: status.into(),
        }
    }

    #[test]
    fn accumulated_totals_are_rounded_to_cents() {
        let orders = vec![
            order(1, 1, 0.1, "Delivered"),
            order(2, 1, 0.2, "Delivered"),
        ];
        let out = aggregate(&orders, &OrderFilter::All, |o| Some(o.customer_id), JoinMode::Inner);
        assert_eq!(out[&1].total, 0.3);
    }

    #[test]
    fn status_filter_matches_other_statuses_verbatim() {
        let orders = vec![
            order(1, 1, 10.0, "Pending"),
            order(2, 1, 10.0, "Delivered"),
        ];
        let filter = OrderFilter::Status(OrderStatus::from("Pending"));
        let out = aggregate(&orders, &filter, |o| Some(o.customer_id), JoinMode::Inner);
        assert_eq!(out[&1].count, 1);
    }
}
