use super::RecordStore;
use crate::{
    error::{AnalyticsError, AnalyticsResult},
    record::{Customer, DeliveryAssignment, Order, OrderStatus, Restaurant, Rider},
};
use chrono::NaiveDate;
use rusqlite::params;

impl RecordStore {
    // ── Customers ─────────────────────────────────────────────────

    pub fn insert_customer(&self, c: &Customer) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO customers (customer_id, customer_name, contact_no, location)
             VALUES (?1, ?2, ?3, ?4)",
            params![c.customer_id, &c.name, &c.contact, &c.location],
        )?;
        Ok(())
    }

    pub(super) fn load_customers(&self) -> AnalyticsResult<(Vec<Customer>, usize)> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, customer_name, contact_no, location
             FROM customers ORDER BY customer_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total = rows.len();
        let customers: Vec<Customer> = rows
            .into_iter()
            .filter_map(|(customer_id, name, contact, location)| {
                Some(Customer {
                    customer_id,
                    name:     name?,
                    contact:  contact.unwrap_or_default(),
                    location: location?,
                })
            })
            .collect();
        let dropped = total - customers.len();
        Ok((customers, dropped))
    }

    // ── Restaurants ───────────────────────────────────────────────

    pub fn insert_restaurant(&self, r: &Restaurant) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO restaurants (restaurant_id, restaurant_name, cuisine, rating, location)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![r.restaurant_id, &r.name, &r.cuisine, r.rating, &r.location],
        )?;
        Ok(())
    }

    pub(super) fn load_restaurants(&self) -> AnalyticsResult<(Vec<Restaurant>, usize)> {
        let mut stmt = self.conn.prepare(
            "SELECT restaurant_id, restaurant_name, cuisine, rating, location
             FROM restaurants ORDER BY restaurant_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total = rows.len();
        let restaurants: Vec<Restaurant> = rows
            .into_iter()
            .filter_map(|(restaurant_id, name, cuisine, rating, location)| {
                Some(Restaurant {
                    restaurant_id,
                    name:     name?,
                    cuisine:  cuisine?,
                    rating:   rating?,
                    location: location?,
                })
            })
            .collect();
        let dropped = total - restaurants.len();
        Ok((restaurants, dropped))
    }

    // ── Riders ────────────────────────────────────────────────────

    pub fn insert_rider(&self, r: &Rider) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO riders (rider_id, rider_name, vehicle_type, contact_no)
             VALUES (?1, ?2, ?3, ?4)",
            params![r.rider_id, &r.name, &r.vehicle_type, &r.contact],
        )?;
        Ok(())
    }

    pub(super) fn load_riders(&self) -> AnalyticsResult<(Vec<Rider>, usize)> {
        let mut stmt = self.conn.prepare(
            "SELECT rider_id, rider_name, vehicle_type, contact_no
             FROM riders ORDER BY rider_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total = rows.len();
        let riders: Vec<Rider> = rows
            .into_iter()
            .filter_map(|(rider_id, name, vehicle_type, contact)| {
                Some(Rider {
                    rider_id,
                    name:         name?,
                    vehicle_type: vehicle_type?,
                    contact:      contact.unwrap_or_default(),
                })
            })
            .collect();
        let dropped = total - riders.len();
        Ok((riders, dropped))
    }

    // ── Delivery assignments ──────────────────────────────────────

    /// `rider_id = None` stores an unassigned deliverer.
    pub fn insert_delivery(&self, deliverer_id: i64, rider_id: Option<i64>) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO delivery (deliverer_id, rider_id) VALUES (?1, ?2)",
            params![deliverer_id, rider_id],
        )?;
        Ok(())
    }

    /// Unassigned deliverers are dropped, not kept as a separate state.
    pub(super) fn load_delivery(&self) -> AnalyticsResult<(Vec<DeliveryAssignment>, usize)> {
        let mut stmt = self.conn.prepare(
            "SELECT deliverer_id, rider_id FROM delivery ORDER BY deliverer_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let total = rows.len();
        let delivery: Vec<DeliveryAssignment> = rows
            .into_iter()
            .filter_map(|(deliverer_id, rider_id)| {
                rider_id.map(|rider_id| DeliveryAssignment { deliverer_id, rider_id })
            })
            .collect();
        let dropped = total - delivery.len();
        Ok((delivery, dropped))
    }

    // ── Orders ────────────────────────────────────────────────────

    pub fn insert_order(&self, o: &Order) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO orders (
                order_id, customer_id, restaurant_id, deliverer_id, order_date,
                order_amount, payment_method, order_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                o.order_id,
                o.customer_id,
                o.restaurant_id,
                o.deliverer_id,
                o.order_date,
                o.order_amount,
                &o.payment_method,
                o.order_status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Orders with a NULL in any column are dropped. An unparseable date or
    /// a negative amount is an error: it means the upstream cleanup did not
    /// run.
    pub(super) fn load_orders(&self) -> AnalyticsResult<(Vec<Order>, usize)> {
        let mut stmt = self.conn.prepare(
            "SELECT order_id, customer_id, restaurant_id, deliverer_id, order_date,
                    order_amount, payment_method, order_status
             FROM orders ORDER BY order_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawOrder {
                    order_id:       row.get(0)?,
                    customer_id:    row.get(1)?,
                    restaurant_id:  row.get(2)?,
                    deliverer_id:   row.get(3)?,
                    order_date:     row.get(4)?,
                    order_amount:   row.get(5)?,
                    payment_method: row.get(6)?,
                    order_status:   row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total = rows.len();
        let mut orders = Vec::with_capacity(total);
        for raw in rows {
            let Some(order) = raw.into_order()? else {
                continue;
            };
            order.check_amount()?;
            orders.push(order);
        }
        let dropped = total - orders.len();
        Ok((orders, dropped))
    }
}

struct RawOrder {
    order_id:       i64,
    customer_id:    Option<i64>,
    restaurant_id:  Option<i64>,
    deliverer_id:   Option<i64>,
    order_date:     Option<String>,
    order_amount:   Option<f64>,
    payment_method: Option<String>,
    order_status:   Option<String>,
}

impl RawOrder {
    fn into_order(self) -> AnalyticsResult<Option<Order>> {
        let (
            Some(customer_id),
            Some(restaurant_id),
            Some(deliverer_id),
            Some(date_text),
            Some(order_amount),
            Some(payment_method),
            Some(status),
        ) = (
            self.customer_id,
            self.restaurant_id,
            self.deliverer_id,
            self.order_date,
            self.order_amount,
            self.payment_method,
            self.order_status,
        )
        else {
            return Ok(None);
        };

        let order_date = NaiveDate::parse_from_str(date_text.trim(), "%Y-%m-%d").map_err(|e| {
            AnalyticsError::InvalidRecord {
                table:  "orders",
                id:     self.order_id,
                reason: format!("order_date '{date_text}' is not YYYY-MM-DD: {e}"),
            }
        })?;

        Ok(Some(Order {
            order_id: self.order_id,
            customer_id,
            restaurant_id,
            deliverer_id,
            order_date,
            order_amount,
            payment_method,
            order_status: OrderStatus::from(status),
        }))
    }
}
