use super::{ReportBuilder, ReportKind, ReportOutput};
use crate::{
    aggregation::{aggregate, JoinMode, OrderFilter},
    error::AnalyticsResult,
    table::TableRow,
    types::RiderId,
};
use serde::Serialize;
use std::collections::BTreeMap;

// ── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiderUtilizationRow {
    pub rider_id:     RiderId,
    pub rider_name:   String,
    pub vehicle_type: String,
    pub deliveries:   usize,
    pub low_activity: bool,
}

impl TableRow for RiderUtilizationRow {
    const COLUMNS: &'static [&'static str] =
        &["rider_id", "rider_name", "vehicle_type", "deliveries", "low_activity"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleTypeRow {
    pub vehicle_type:       String,
    pub rider_count:        usize,
    pub deliveries:         usize,
    pub average_per_rider:  f64,
}

impl TableRow for VehicleTypeRow {
    const COLUMNS: &'static [&'static str] =
        &["vehicle_type", "rider_count", "deliveries", "average_per_rider"];
}

// ── Reports ──────────────────────────────────────────────────────────────────

impl ReportBuilder<'_> {
    /// Delivered orders per rider, busiest first. Every rider is listed;
    /// riders with strictly fewer than `rider_low_activity` deliveries are
    /// flagged.
    pub fn rider_utilization(&self) -> AnalyticsResult<ReportOutput<RiderUtilizationRow>> {
        let working = self.working_set(ReportKind::RiderUtilization, true)?;
        let riders = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| self.snapshot.rider_for_deliverer(o.deliverer_id).map(|r| r.rider_id),
            JoinMode::Left(self.snapshot.distinct_riders().map(|r| r.rider_id).collect()),
        );

        let mut rows: Vec<RiderUtilizationRow> = riders
            .into_iter()
            .filter_map(|(rider_id, m)| {
                self.snapshot.rider(rider_id).map(|rider| RiderUtilizationRow {
                    rider_id,
                    rider_name:   rider.name.clone(),
                    vehicle_type: rider.vehicle_type.clone(),
                    deliveries:   m.count,
                    low_activity: m.count < self.params.rider_low_activity,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.deliveries.cmp(&a.deliveries));

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Delivered orders per vehicle type and the per-rider average.
    pub fn vehicle_type_deliveries(&self) -> AnalyticsResult<ReportOutput<VehicleTypeRow>> {
        let working = self.working_set(ReportKind::VehicleTypeDeliveries, true)?;
        let deliveries = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| {
                self.snapshot
                    .rider_for_deliverer(o.deliverer_id)
                    .map(|r| r.vehicle_type.clone())
            },
            JoinMode::Inner,
        );

        let mut fleet: BTreeMap<&str, usize> = BTreeMap::new();
        for rider in self.snapshot.distinct_riders() {
            *fleet.entry(rider.vehicle_type.as_str()).or_insert(0) += 1;
        }

        let mut rows: Vec<VehicleTypeRow> = fleet
            .into_iter()
            .map(|(vehicle_type, rider_count)| {
                let count = deliveries.get(vehicle_type).map(|m| m.count).unwrap_or(0);
                VehicleTypeRow {
                    vehicle_type: vehicle_type.to_string(),
                    rider_count,
                    deliveries: count,
                    average_per_rider: (count as f64 / rider_count as f64 * 100.0).round() / 100.0,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.deliveries.cmp(&a.deliveries));

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }
}
