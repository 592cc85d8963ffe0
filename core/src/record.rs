//! Input records — one struct per source table.
//!
//! RULE: Records are plain data. They are deduplicated and NULL-filtered
//! before they reach the core; nothing here mutates them.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    types::{Amount, CustomerId, DelivererId, OrderId, RestaurantId, RiderId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name:        String,
    pub contact:     String,
    pub location:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub restaurant_id: RestaurantId,
    pub name:          String,
    pub cuisine:       String,
    pub rating:        f64,
    pub location:      String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rider {
    pub rider_id:     RiderId,
    pub name:         String,
    pub vehicle_type: String,
    pub contact:      String,
}

/// Links the deliverer id carried on an order to the rider who did the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAssignment {
    pub deliverer_id: DelivererId,
    pub rider_id:     RiderId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id:       OrderId,
    pub customer_id:    CustomerId,
    pub restaurant_id:  RestaurantId,
    pub deliverer_id:   DelivererId,
    pub order_date:     NaiveDate,
    pub order_amount:   Amount,
    pub payment_method: String,
    pub order_status:   OrderStatus,
}

impl Order {
    pub fn is_delivered(&self) -> bool {
        self.order_status == OrderStatus::Delivered
    }

    pub fn is_cancelled(&self) -> bool {
        self.order_status == OrderStatus::Cancelled
    }

    /// Amounts must be finite and non-negative.
    pub fn check_amount(&self) -> AnalyticsResult<()> {
        if self.order_amount < 0.0 || !self.order_amount.is_finite() {
            return Err(AnalyticsError::InvalidRecord {
                table:  "orders",
                id:     self.order_id,
                reason: format!("order_amount must be non-negative, got {}", self.order_amount),
            });
        }
        Ok(())
    }
}

/// Order status as stored upstream. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(s)  => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.trim() {
            "Delivered" => OrderStatus::Delivered,
            "Cancelled" => OrderStatus::Cancelled,
            _           => OrderStatus::Other(s),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        OrderStatus::from(s.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
