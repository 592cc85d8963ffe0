//! SQLite record store — the adapter that feeds snapshots to the core.
//!
//! RULE: Only the store talks to the database.
//! Reports never see a connection; they read a `DatasetSnapshot`.
//!
//! The store is read-mostly: `insert_*` exists so tests and the runner's
//! schema bootstrap can populate a database, and `load_snapshot` reads all
//! five tables in one go.

use crate::{
    error::AnalyticsResult,
    snapshot::{DatasetSnapshot, SnapshotTables},
};
use rusqlite::Connection;

mod tables;

/// Rows dropped while loading because a required column was NULL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub customers_dropped:   usize,
    pub restaurants_dropped: usize,
    pub riders_dropped:      usize,
    pub delivery_dropped:    usize,
    pub orders_dropped:      usize,
}

impl LoadReport {
    pub fn total_dropped(&self) -> usize {
        self.customers_dropped
            + self.restaurants_dropped
            + self.riders_dropped
            + self.delivery_dropped
            + self.orders_dropped
    }
}

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    pub fn open(path: &str) -> AnalyticsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AnalyticsResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the source tables if they do not exist yet.
    pub fn migrate(&self) -> AnalyticsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_food_delivery.sql"))?;
        Ok(())
    }

    /// Read all five tables into an immutable snapshot.
    pub fn load_snapshot(&self) -> AnalyticsResult<(DatasetSnapshot, LoadReport)> {
        let mut report = LoadReport::default();

        let (customers, dropped) = self.load_customers()?;
        report.customers_dropped = dropped;
        let (restaurants, dropped) = self.load_restaurants()?;
        report.restaurants_dropped = dropped;
        let (riders, dropped) = self.load_riders()?;
        report.riders_dropped = dropped;
        let (delivery, dropped) = self.load_delivery()?;
        report.delivery_dropped = dropped;
        let (orders, dropped) = self.load_orders()?;
        report.orders_dropped = dropped;

        if report.total_dropped() > 0 {
            log::warn!("store: dropped {} row(s) with NULL required columns: {report:?}",
                report.total_dropped());
        }
        log::info!(
            "store: loaded customers={} restaurants={} riders={} delivery={} orders={}",
            customers.len(),
            restaurants.len(),
            riders.len(),
            delivery.len(),
            orders.len(),
        );

        let snapshot = DatasetSnapshot::from_tables(SnapshotTables {
            customers,
            restaurants,
            riders,
            delivery,
            orders,
        });
        Ok((snapshot, report))
    }
}
