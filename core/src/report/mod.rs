//! Report builder — one named, pure function per business question.
//!
//! RULES:
//!   - A report reads the snapshot and its params. Nothing else.
//!   - Reports never call each other; any of them can run alone.
//!   - Every order-based report starts from `working_set()`, which drops
//!     orders with dangling references and records how many it dropped.
//!   - Each report keeps its own boundary operator. Do not unify them.
//!
//! Typed report methods live in the submodules, grouped by subject:
//!   customers    — rankings, cancellation rate, inactivity, HVLF, AOV, location
//!   orders       — monthly trend, payment methods, status mix, weekdays
//!   restaurants  — restaurant rankings, cancellations, cuisine metrics
//!   riders       — rider utilization, vehicle types
//!   segments     — RFM and tier views with their summaries

mod customers;
mod orders;
mod restaurants;
mod riders;
mod segments;

pub use customers::{
    AverageOrderValueRow, CancellationRateRow, CustomerRankRow, HighValueLowFrequencyRow,
    InactiveCustomerRow, LocationCustomersRow,
};
pub use orders::{MonthlyRevenueRow, PaymentMethodRow, StatusShareRow, WeekdayVolumeRow};
pub use restaurants::{
    CuisineRatingRow, CuisineRevenueRow, LocationLeaderRow, RestaurantCancellationRow,
    RestaurantRankRow,
};
pub use riders::{RiderUtilizationRow, VehicleTypeRow};
pub use segments::{SegmentSummaryRow, TierSummaryRow};

use crate::{
    config::ReportParams,
    error::{AnalyticsError, AnalyticsResult},
    snapshot::{CheckedOrders, DatasetSnapshot},
    table::{ReportTable, TableRow},
    types::CustomerId,
};
use std::fmt;
use std::str::FromStr;

// ── Catalogue ────────────────────────────────────────────────────────────────

/// Every report the builder can produce.
/// Variants are listed in `run_all` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    TopCustomersByOrders,
    TopCustomersBySpend,
    CustomerCancellationRate,
    InactiveCustomers,
    HighValueLowFrequency,
    AverageOrderValue,
    CustomersByLocation,
    MonthlyRevenueTrend,
    PaymentMethodUsage,
    OrderStatusDistribution,
    WeekdayOrderVolume,
    TopRestaurantsByRevenue,
    RestaurantCancellations,
    CuisineAverageRating,
    CuisineRevenue,
    TopRestaurantPerLocation,
    RiderUtilization,
    VehicleTypeDeliveries,
    RfmSegmentation,
    RfmSegmentSummary,
    CustomerClassification,
    TierSummary,
}

impl ReportKind {
    pub const ALL: [ReportKind; 22] = [
        ReportKind::TopCustomersByOrders,
        ReportKind::TopCustomersBySpend,
        ReportKind::CustomerCancellationRate,
        ReportKind::InactiveCustomers,
        ReportKind::HighValueLowFrequency,
        ReportKind::AverageOrderValue,
        ReportKind::CustomersByLocation,
        ReportKind::MonthlyRevenueTrend,
        ReportKind::PaymentMethodUsage,
        ReportKind::OrderStatusDistribution,
        ReportKind::WeekdayOrderVolume,
        ReportKind::TopRestaurantsByRevenue,
        ReportKind::RestaurantCancellations,
        ReportKind::CuisineAverageRating,
        ReportKind::CuisineRevenue,
        ReportKind::TopRestaurantPerLocation,
        ReportKind::RiderUtilization,
        ReportKind::VehicleTypeDeliveries,
        ReportKind::RfmSegmentation,
        ReportKind::RfmSegmentSummary,
        ReportKind::CustomerClassification,
        ReportKind::TierSummary,
    ];

    /// Stable snake_case name used on the command line and in output.
    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::TopCustomersByOrders     => "top_customers_by_orders",
            ReportKind::TopCustomersBySpend      => "top_customers_by_spend",
            ReportKind::CustomerCancellationRate => "customer_cancellation_rate",
            ReportKind::InactiveCustomers        => "inactive_customers",
            ReportKind::HighValueLowFrequency    => "high_value_low_frequency",
            ReportKind::AverageOrderValue        => "average_order_value",
            ReportKind::CustomersByLocation      => "customers_by_location",
            ReportKind::MonthlyRevenueTrend      => "monthly_revenue_trend",
            ReportKind::PaymentMethodUsage       => "payment_method_usage",
            ReportKind::OrderStatusDistribution  => "order_status_distribution",
            ReportKind::WeekdayOrderVolume       => "weekday_order_volume",
            ReportKind::TopRestaurantsByRevenue  => "top_restaurants_by_revenue",
            ReportKind::RestaurantCancellations  => "restaurant_cancellations",
            ReportKind::CuisineAverageRating     => "cuisine_average_rating",
            ReportKind::CuisineRevenue           => "cuisine_revenue",
            ReportKind::TopRestaurantPerLocation => "top_restaurant_per_location",
            ReportKind::RiderUtilization         => "rider_utilization",
            ReportKind::VehicleTypeDeliveries    => "vehicle_type_deliveries",
            ReportKind::RfmSegmentation          => "rfm_segmentation",
            ReportKind::RfmSegmentSummary        => "rfm_segment_summary",
            ReportKind::CustomerClassification   => "customer_classification",
            ReportKind::TierSummary              => "tier_summary",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReportKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| AnalyticsError::UnknownReport { name: wanted.to_string() })
    }
}

/// Typed rows of one report plus the integrity count of its working set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput<R> {
    pub rows:         Vec<R>,
    pub skipped_rows: usize,
}

impl<R> ReportOutput<R> {
    fn new(rows: Vec<R>, skipped_rows: usize) -> Self {
        Self { rows, skipped_rows }
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

pub struct ReportBuilder<'a> {
    snapshot: &'a DatasetSnapshot,
    params:   ReportParams,
}

impl<'a> ReportBuilder<'a> {
    /// Fails with a configuration error before anything is computed.
    pub fn new(snapshot: &'a DatasetSnapshot, params: ReportParams) -> AnalyticsResult<Self> {
        params.validate()?;
        Ok(Self { snapshot, params })
    }

    pub fn params(&self) -> &ReportParams {
        &self.params
    }

    pub fn snapshot(&self) -> &'a DatasetSnapshot {
        self.snapshot
    }

    /// Run one report by kind and render it as a table.
    pub fn run(&self, kind: ReportKind) -> AnalyticsResult<ReportTable> {
        let table = match kind {
            ReportKind::TopCustomersByOrders     => tabulate(kind, self.top_customers_by_orders()?),
            ReportKind::TopCustomersBySpend      => tabulate(kind, self.top_customers_by_spend()?),
            ReportKind::CustomerCancellationRate => tabulate(kind, self.customer_cancellation_rate()?),
            ReportKind::InactiveCustomers        => tabulate(kind, self.inactive_customers()?),
            ReportKind::HighValueLowFrequency    => tabulate(kind, self.high_value_low_frequency()?),
            ReportKind::AverageOrderValue        => tabulate(kind, self.average_order_value()?),
            ReportKind::CustomersByLocation      => tabulate(kind, self.customers_by_location()?),
            ReportKind::MonthlyRevenueTrend      => tabulate(kind, self.monthly_revenue_trend()?),
            ReportKind::PaymentMethodUsage       => tabulate(kind, self.payment_method_usage()?),
            ReportKind::OrderStatusDistribution  => tabulate(kind, self.order_status_distribution()?),
            ReportKind::WeekdayOrderVolume       => tabulate(kind, self.weekday_order_volume()?),
            ReportKind::TopRestaurantsByRevenue  => tabulate(kind, self.top_restaurants_by_revenue()?),
            ReportKind::RestaurantCancellations  => tabulate(kind, self.restaurant_cancellations()?),
            ReportKind::CuisineAverageRating     => tabulate(kind, self.cuisine_average_rating()?),
            ReportKind::CuisineRevenue           => tabulate(kind, self.cuisine_revenue()?),
            ReportKind::TopRestaurantPerLocation => tabulate(kind, self.top_restaurant_per_location()?),
            ReportKind::RiderUtilization         => tabulate(kind, self.rider_utilization()?),
            ReportKind::VehicleTypeDeliveries    => tabulate(kind, self.vehicle_type_deliveries()?),
            ReportKind::RfmSegmentation          => tabulate(kind, self.rfm_segmentation()?),
            ReportKind::RfmSegmentSummary        => tabulate(kind, self.rfm_segment_summary()?),
            ReportKind::CustomerClassification   => tabulate(kind, self.customer_classification()?),
            ReportKind::TierSummary              => tabulate(kind, self.tier_summary()?),
        }?;

        log::info!(
            "as_of={} report={kind}: rows={} skipped={}",
            self.params.as_of,
            table.len(),
            table.skipped_rows,
        );
        Ok(table)
    }

    /// Run the whole catalogue in `ReportKind::ALL` order.
    pub fn run_all(&self) -> AnalyticsResult<Vec<ReportTable>> {
        ReportKind::ALL.iter().map(|kind| self.run(*kind)).collect()
    }

    /// Orders a report may use. Orders pointing at a missing customer or
    /// restaurant (or, with `require_rider`, a deliverer with no rider) are
    /// dropped and counted; in strict mode any drop fails the report.
    fn working_set(&self, kind: ReportKind, require_rider: bool) -> AnalyticsResult<CheckedOrders<'a>> {
        let checked = self.snapshot.checked_orders(require_rider);
        if !checked.skipped.is_empty() {
            if self.params.strict_integrity {
                return Err(AnalyticsError::DataIntegrity {
                    report:  kind.name().to_string(),
                    skipped: checked.skipped.len(),
                });
            }
            log::warn!(
                "report={kind}: skipped {} order(s) with dangling references (first: {:?})",
                checked.skipped.len(),
                checked.skipped[0],
            );
        }
        Ok(checked)
    }

    fn customer_name(&self, customer_id: CustomerId) -> String {
        self.snapshot
            .customer(customer_id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }
}

fn tabulate<R: TableRow>(kind: ReportKind, output: ReportOutput<R>) -> AnalyticsResult<ReportTable> {
    ReportTable::from_rows(kind.name(), &output.rows, output.skipped_rows)
}

/// `part / whole` as a percentage rounded to two places. Callers guarantee
/// `whole > 0`.
fn percent(part: usize, whole: usize) -> f64 {
    (part as f64 / whole as f64 * 10_000.0).round() / 100.0
}
