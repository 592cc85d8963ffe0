//! Same snapshot, same params, same bytes.
//!
//! Reports are pure functions of (snapshot, params). Two runs, or one run
//! over the same records loaded in a different order, must serialize to
//! byte-identical JSON. Any divergence is a blocker.

use chrono::NaiveDate;
use delivery_analytics_core::{
    config::ReportParams,
    record::{Customer, DeliveryAssignment, Order, Restaurant, Rider},
    report::ReportBuilder,
    snapshot::DatasetSnapshot,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

/// A few hundred orders spread over customers, restaurants, riders,
/// months and statuses. Half-rupee amounts keep every sum exact, so input
/// order cannot move a rounded total.
fn build_tables() -> (Vec<Customer>, Vec<Restaurant>, Vec<Rider>, Vec<DeliveryAssignment>, Vec<Order>) {
    let locations = ["Delhi", "Mumbai", "Pune", "Bengaluru"];
    let cuisines = ["North Indian", "Chinese", "Italian"];
    let vehicles = ["Bike", "Scooter", "Bicycle"];
    let methods = ["UPI", "Card", "Cash"];

    let customers: Vec<Customer> = (1..=40)
        .map(|id| Customer {
            customer_id: id,
            name:        format!("Customer {id}"),
            contact:     String::new(),
            location:    locations[id as usize % locations.len()].into(),
        })
        .collect();
    let restaurants: Vec<Restaurant> = (1..=9)
        .map(|id| Restaurant {
            restaurant_id: id,
            name:          format!("Restaurant {id}"),
            cuisine:       cuisines[id as usize % cuisines.len()].into(),
            rating:        3.0 + (id % 5) as f64 * 0.4,
            location:      locations[id as usize % locations.len()].into(),
        })
        .collect();
    let riders: Vec<Rider> = (1..=6)
        .map(|id| Rider {
            rider_id:     id,
            name:         format!("Rider {id}"),
            vehicle_type: vehicles[id as usize % vehicles.len()].into(),
            contact:      String::new(),
        })
        .collect();
    let delivery: Vec<DeliveryAssignment> = (1..=6)
        .map(|id| DeliveryAssignment { deliverer_id: id * 10, rider_id: id })
        .collect();

    let orders: Vec<Order> = (1..=300)
        .map(|id: i64| {
            let status = match id % 9 {
                0 => "Cancelled",
                4 => "Not Fulfilled",
                _ => "Delivered",
            };
            Order {
                order_id:       id,
                customer_id:    id * 7 % 43 + 1,
                restaurant_id:  id % 9 + 1,
                deliverer_id:   (id % 7 + 1) * 10,
                order_date:     as_of() - chrono::Duration::days(id * 13 % 180),
                order_amount:   150.0 + (id * 37 % 900) as f64 + 0.5,
                payment_method: methods[id as usize % methods.len()].into(),
                order_status:   status.into(),
            }
        })
        .collect();

    (customers, restaurants, riders, delivery, orders)
}

fn run_json(snapshot: &DatasetSnapshot) -> String {
    let builder = ReportBuilder::new(snapshot, ReportParams::with_defaults(as_of()))
        .expect("default params are valid");
    let tables = builder.run_all().expect("run_all");
    serde_json::to_string(&tables).expect("serialize")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn same_snapshot_produces_identical_output() {
    let (c, r, ri, d, o) = build_tables();
    let snapshot = DatasetSnapshot::new(c, r, ri, d, o);

    let a = run_json(&snapshot);
    let b = run_json(&snapshot);

    assert_eq!(a.len(), b.len(), "Output lengths differ: {} vs {}", a.len(), b.len());
    assert_eq!(a, b);
}

#[test]
fn input_order_does_not_change_output() {
    let (c, r, ri, d, o) = build_tables();
    let forward = DatasetSnapshot::new(c.clone(), r.clone(), ri.clone(), d.clone(), o.clone());

    let mut c2 = c;
    let mut r2 = r;
    let mut ri2 = ri;
    let mut d2 = d;
    let mut o2 = o;
    c2.reverse();
    r2.reverse();
    ri2.reverse();
    d2.reverse();
    o2.reverse();
    let reversed = DatasetSnapshot::new(c2, r2, ri2, d2, o2);

    assert_eq!(run_json(&forward), run_json(&reversed));
}

#[test]
fn snapshot_json_replay_matches_live_run() {
    let (c, r, ri, d, o) = build_tables();
    let live = DatasetSnapshot::new(c, r, ri, d, o);

    let replayed = DatasetSnapshot::from_json(&live.to_json().expect("export"))
        .expect("import");

    assert_eq!(run_json(&live), run_json(&replayed));
}
