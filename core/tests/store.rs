//! SQLite record store: schema, load into a snapshot, NULL handling.

use chrono::NaiveDate;
use delivery_analytics_core::{
    error::AnalyticsError,
    record::{Customer, Order, OrderStatus, Restaurant, Rider},
    snapshot::DatasetSnapshot,
    store::RecordStore,
};
use rusqlite::Connection;
use std::path::PathBuf;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn store() -> RecordStore {
    let store = RecordStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

/// A database file unique to one test, removed when dropped.
struct TempDb(PathBuf);

impl TempDb {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "delivery-analytics-{name}-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Self(path)
    }

    fn path(&self) -> &str {
        self.0.to_str().expect("utf-8 temp path")
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn customer(id: i64) -> Customer {
    Customer {
        customer_id: id,
        name:        format!("Customer {id}"),
        contact:     "9800000000".into(),
        location:    "Delhi".into(),
    }
}

fn order(id: i64, customer_id: i64, amount: f64, status: &str) -> Order {
    Order {
        order_id:       id,
        customer_id,
        restaurant_id:  10,
        deliverer_id:   1,
        order_date:     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        order_amount:   amount,
        payment_method: "UPI".into(),
        order_status:   status.into(),
    }
}

fn populate(store: &RecordStore) {
    store.insert_customer(&customer(1)).unwrap();
    store.insert_customer(&customer(2)).unwrap();
    store
        .insert_restaurant(&Restaurant {
            restaurant_id: 10,
            name:          "Spice Hub".into(),
            cuisine:       "North Indian".into(),
            rating:        4.5,
            location:      "Delhi".into(),
        })
        .unwrap();
    store
        .insert_rider(&Rider {
            rider_id:     100,
            name:         "Asha".into(),
            vehicle_type: "Bike".into(),
            contact:      String::new(),
        })
        .unwrap();
    store.insert_delivery(1, Some(100)).unwrap();
    store.insert_order(&order(1, 1, 250.75, "Delivered")).unwrap();
    store.insert_order(&order(2, 2, 99.0, "Cancelled")).unwrap();
    store.insert_order(&order(3, 2, 40.0, "Not Fulfilled")).unwrap();
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn loads_inserted_records_into_a_snapshot() {
    let store = store();
    populate(&store);

    let (snapshot, load) = store.load_snapshot().unwrap();

    assert_eq!(load.total_dropped(), 0);
    assert_eq!(snapshot.customers().len(), 2);
    assert_eq!(snapshot.orders().len(), 3);
    assert_eq!(snapshot.orders()[0], order(1, 1, 250.75, "Delivered"));
    assert_eq!(
        snapshot.orders()[2].order_status,
        OrderStatus::Other("Not Fulfilled".into())
    );
    assert_eq!(snapshot.rider_for_deliverer(1).map(|r| r.name.as_str()), Some("Asha"));
    assert_eq!(snapshot.restaurant(10).map(|r| r.rating), Some(4.5));
}

#[test]
fn migrate_is_idempotent() {
    let store = store();
    store.migrate().expect("second migration");
    populate(&store);
    assert_eq!(store.load_snapshot().unwrap().0.orders().len(), 3);
}

#[test]
fn unassigned_deliverers_are_dropped_and_counted() {
    let store = store();
    populate(&store);
    store.insert_delivery(2, None).unwrap();

    let (snapshot, load) = store.load_snapshot().unwrap();

    assert_eq!(load.delivery_dropped, 1);
    assert_eq!(snapshot.delivery().len(), 1);
    assert!(snapshot.rider_for_deliverer(2).is_none());
}

#[test]
fn rows_with_null_required_columns_are_dropped_and_counted() {
    let db = TempDb::new("nulls");
    let store = RecordStore::open(db.path()).expect("open");
    store.migrate().unwrap();
    populate(&store);

    let raw = Connection::open(db.path()).expect("raw connection");
    raw.execute_batch(
        "INSERT INTO customers (customer_id, customer_name, contact_no, location)
             VALUES (3, 'No Location', NULL, NULL);
         INSERT INTO customers (customer_id, customer_name, contact_no, location)
             VALUES (4, 'No Contact', NULL, 'Pune');
         INSERT INTO orders (order_id, customer_id, restaurant_id, deliverer_id, order_date,
                             order_amount, payment_method, order_status)
             VALUES (9, 1, 10, 1, '2024-06-02', NULL, 'UPI', 'Delivered');",
    )
    .unwrap();

    let (snapshot, load) = store.load_snapshot().unwrap();

    assert_eq!(load.customers_dropped, 1);
    assert_eq!(load.orders_dropped, 1);
    assert_eq!(load.total_dropped(), 2);
    // A missing contact is not a reason to drop.
    assert_eq!(snapshot.customer(4).map(|c| c.contact.as_str()), Some(""));
    assert!(snapshot.customer(3).is_none());
    assert_eq!(snapshot.orders().len(), 3);
}

#[test]
fn negative_amount_is_an_invalid_record() {
    let store = store();
    populate(&store);
    store.insert_order(&order(7, 1, -5.0, "Delivered")).unwrap();

    let err = store.load_snapshot().unwrap_err();

    assert!(matches!(
        err,
        AnalyticsError::InvalidRecord { table: "orders", id: 7, .. }
    ));
}

#[test]
fn unparseable_order_date_is_an_invalid_record() {
    let db = TempDb::new("bad-date");
    let store = RecordStore::open(db.path()).expect("open");
    store.migrate().unwrap();
    populate(&store);

    Connection::open(db.path())
        .expect("raw connection")
        .execute(
            "INSERT INTO orders (order_id, customer_id, restaurant_id, deliverer_id, order_date,
                                 order_amount, payment_method, order_status)
             VALUES (8, 1, 10, 1, '01/06/2024', 120.0, 'UPI', 'Delivered')",
            [],
        )
        .unwrap();

    let err = store.load_snapshot().unwrap_err();

    assert!(matches!(
        err,
        AnalyticsError::InvalidRecord { table: "orders", id: 8, .. }
    ));
}

#[test]
fn snapshot_survives_a_json_round_trip() {
    let store = store();
    populate(&store);
    let (snapshot, _) = store.load_snapshot().unwrap();

    let json = snapshot.to_json().unwrap();
    let restored = DatasetSnapshot::from_json(&json).unwrap();

    assert_eq!(restored.customers(), snapshot.customers());
    assert_eq!(restored.orders(), snapshot.orders());
    assert_eq!(restored.delivery(), snapshot.delivery());
    assert!(json.contains("\"order_status\": \"Not Fulfilled\""));
}

#[test]
fn snapshot_json_tolerates_missing_tables() {
    let json = r#"{ "customers": [
        { "customer_id": 1, "name": "A", "contact": "", "location": "Delhi" }
    ] }"#;

    let snapshot = DatasetSnapshot::from_json(json).unwrap();

    assert_eq!(snapshot.customers().len(), 1);
    assert!(snapshot.orders().is_empty());
}

#[test]
fn snapshot_json_rejects_negative_amounts() {
    let mut bad = order(5, 1, 10.0, "Delivered");
    bad.order_amount = -10.0;
    let json = serde_json::to_string(&serde_json::json!({
        "customers": [customer(1)],
        "orders": [order(4, 1, 20.0, "Delivered"), bad],
    }))
    .unwrap();

    let err = DatasetSnapshot::from_json(&json).unwrap_err();

    assert!(matches!(
        err,
        AnalyticsError::InvalidRecord { table: "orders", id: 5, .. }
    ));
}
