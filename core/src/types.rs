//! Shared primitive types used across the analytics core.

/// Primary key of a customer row.
pub type CustomerId = i64;

/// Primary key of a restaurant row.
pub type RestaurantId = i64;

/// Primary key of a rider row.
pub type RiderId = i64;

/// Deliverer identifier carried on an order; resolved to a rider through
/// the delivery assignment table.
pub type DelivererId = i64;

pub type OrderId = i64;

/// Monetary amount. Sums are rounded to cents after accumulation.
pub type Amount = f64;

/// Round an accumulated amount to cents.
pub fn round_cents(value: Amount) -> Amount {
    (value * 100.0).round() / 100.0
}
