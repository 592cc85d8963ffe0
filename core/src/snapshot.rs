//! Dataset snapshot — the immutable record set every report reads.
//!
//! A snapshot owns the five source collections plus id indexes built once at
//! construction. Reports borrow it; nothing writes to it afterwards.
//! Snapshots round-trip through JSON so a run can be replayed offline.

use crate::{
    error::AnalyticsResult,
    record::{Customer, DeliveryAssignment, Order, Restaurant, Rider},
    types::{CustomerId, DelivererId, OrderId, RestaurantId, RiderId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized form of a snapshot: the raw tables, no indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotTables {
    #[serde(default)]
    pub customers:   Vec<Customer>,
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub riders:      Vec<Rider>,
    #[serde(default)]
    pub delivery:    Vec<DeliveryAssignment>,
    #[serde(default)]
    pub orders:      Vec<Order>,
}

#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    tables:           SnapshotTables,
    customer_idx:     BTreeMap<CustomerId, usize>,
    restaurant_idx:   BTreeMap<RestaurantId, usize>,
    rider_idx:        BTreeMap<RiderId, usize>,
    deliverer_riders: BTreeMap<DelivererId, RiderId>,
}

/// Why an order was left out of a report's working set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IntegrityIssue {
    UnknownCustomer   { order_id: OrderId, customer_id: CustomerId },
    UnknownRestaurant { order_id: OrderId, restaurant_id: RestaurantId },
    UnknownDeliverer  { order_id: OrderId, deliverer_id: DelivererId },
}

/// Orders that passed the reference check, plus what was skipped.
#[derive(Debug, Clone)]
pub struct CheckedOrders<'a> {
    pub orders:  Vec<&'a Order>,
    pub skipped: Vec<IntegrityIssue>,
}

impl DatasetSnapshot {
    pub fn new(
        customers: Vec<Customer>,
        restaurants: Vec<Restaurant>,
        riders: Vec<Rider>,
        delivery: Vec<DeliveryAssignment>,
        orders: Vec<Order>,
    ) -> Self {
        Self::from_tables(SnapshotTables { customers, restaurants, riders, delivery, orders })
    }

    pub fn from_tables(tables: SnapshotTables) -> Self {
        // First occurrence wins; upstream guarantees unique ids.
        let mut customer_idx = BTreeMap::new();
        for (i, c) in tables.customers.iter().enumerate() {
            customer_idx.entry(c.customer_id).or_insert(i);
        }
        let mut restaurant_idx = BTreeMap::new();
        for (i, r) in tables.restaurants.iter().enumerate() {
            restaurant_idx.entry(r.restaurant_id).or_insert(i);
        }
        let mut rider_idx = BTreeMap::new();
        for (i, r) in tables.riders.iter().enumerate() {
            rider_idx.entry(r.rider_id).or_insert(i);
        }
        let mut deliverer_riders = BTreeMap::new();
        for d in &tables.delivery {
            deliverer_riders.entry(d.deliverer_id).or_insert(d.rider_id);
        }

        Self { tables, customer_idx, restaurant_idx, rider_idx, deliverer_riders }
    }

    /// Parse an exported snapshot. Order amounts are checked the same way
    /// the store loader checks them.
    pub fn from_json(json: &str) -> AnalyticsResult<Self> {
        let tables: SnapshotTables = serde_json::from_str(json)?;
        for order in &tables.orders {
            order.check_amount()?;
        }
        Ok(Self::from_tables(tables))
    }

    pub fn to_json(&self) -> AnalyticsResult<String> {
        Ok(serde_json::to_string_pretty(&self.tables)?)
    }

    // ── Tables ─────────────────────────────────────────────────

    pub fn customers(&self) -> &[Customer] {
        &self.tables.customers
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.tables.restaurants
    }

    pub fn riders(&self) -> &[Rider] {
        &self.tables.riders
    }

    pub fn delivery(&self) -> &[DeliveryAssignment] {
        &self.tables.delivery
    }

    pub fn orders(&self) -> &[Order] {
        &self.tables.orders
    }

    // ── Distinct records, by id ────────────────────────────────

    /// One customer per id (the first listed), ascending by id.
    pub fn distinct_customers(&self) -> impl Iterator<Item = &Customer> + '_ {
        self.customer_idx.values().map(|&i| &self.tables.customers[i])
    }

    pub fn distinct_restaurants(&self) -> impl Iterator<Item = &Restaurant> + '_ {
        self.restaurant_idx.values().map(|&i| &self.tables.restaurants[i])
    }

    pub fn distinct_riders(&self) -> impl Iterator<Item = &Rider> + '_ {
        self.rider_idx.values().map(|&i| &self.tables.riders[i])
    }

    // ── Lookups ────────────────────────────────────────────────

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customer_idx.get(&id).map(|&i| &self.tables.customers[i])
    }

    pub fn restaurant(&self, id: RestaurantId) -> Option<&Restaurant> {
        self.restaurant_idx.get(&id).map(|&i| &self.tables.restaurants[i])
    }

    pub fn rider(&self, id: RiderId) -> Option<&Rider> {
        self.rider_idx.get(&id).map(|&i| &self.tables.riders[i])
    }

    /// Resolve an order's deliverer id to the rider record behind it.
    pub fn rider_for_deliverer(&self, deliverer_id: DelivererId) -> Option<&Rider> {
        self.deliverer_riders
            .get(&deliverer_id)
            .and_then(|&rider_id| self.rider(rider_id))
    }

    // ── Integrity ──────────────────────────────────────────────

    /// Orders whose customer and restaurant both exist. With
    /// `require_rider`, the deliverer must also resolve to a rider.
    pub fn checked_orders(&self, require_rider: bool) -> CheckedOrders<'_> {
        let mut orders = Vec::with_capacity(self.tables.orders.len());
        let mut skipped = Vec::new();

        for order in &self.tables.orders {
            if !self.customer_idx.contains_key(&order.customer_id) {
                skipped.push(IntegrityIssue::UnknownCustomer {
                    order_id:    order.order_id,
                    customer_id: order.customer_id,
                });
            } else if !self.restaurant_idx.contains_key(&order.restaurant_id) {
                skipped.push(IntegrityIssue::UnknownRestaurant {
                    order_id:      order.order_id,
                    restaurant_id: order.restaurant_id,
                });
            } else if require_rider && self.rider_for_deliverer(order.deliverer_id).is_none() {
                skipped.push(IntegrityIssue::UnknownDeliverer {
                    order_id:     order.order_id,
                    deliverer_id: order.deliverer_id,
                });
            } else {
                orders.push(order);
            }
        }

        CheckedOrders { orders, skipped }
    }
}
