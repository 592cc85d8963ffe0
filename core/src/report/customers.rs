use super::{percent, ReportBuilder, ReportKind, ReportOutput};
use crate::{
    aggregation::{aggregate, customer_aggregates, JoinMode, OrderFilter},
    error::AnalyticsResult,
    ranking::{dense_rank, top_n, SortDirection},
    table::TableRow,
    types::{round_cents, Amount, CustomerId},
};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ── Rows ─────────────────────────────────────────────────────────────────────

/// Shared by both top-customer rankings; `metric` is an order count or a
/// spend total depending on the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRankRow {
    pub rank:          usize,
    pub customer_id:   CustomerId,
    pub customer_name: String,
    pub total_orders:  usize,
    pub total_spend:   Amount,
}

impl TableRow for CustomerRankRow {
    const COLUMNS: &'static [&'static str] =
        &["rank", "customer_id", "customer_name", "total_orders", "total_spend"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationRateRow {
    pub customer_id:           CustomerId,
    pub customer_name:         String,
    pub total_orders:          usize,
    pub cancelled_orders:      usize,
    pub cancellation_rate_pct: f64,
}

impl TableRow for CancellationRateRow {
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "customer_name",
        "total_orders",
        "cancelled_orders",
        "cancellation_rate_pct",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InactiveCustomerRow {
    pub customer_id:           CustomerId,
    pub customer_name:         String,
    pub last_order_date:       Option<NaiveDate>,
    pub days_since_last_order: Option<i64>,
}

impl TableRow for InactiveCustomerRow {
    const COLUMNS: &'static [&'static str] =
        &["customer_id", "customer_name", "last_order_date", "days_since_last_order"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighValueLowFrequencyRow {
    pub customer_id:   CustomerId,
    pub customer_name: String,
    pub total_orders:  usize,
    pub total_spend:   Amount,
}

impl TableRow for HighValueLowFrequencyRow {
    const COLUMNS: &'static [&'static str] =
        &["customer_id", "customer_name", "total_orders", "total_spend"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageOrderValueRow {
    pub customer_id:         CustomerId,
    pub customer_name:       String,
    pub total_orders:        usize,
    pub average_order_value: Amount,
}

impl TableRow for AverageOrderValueRow {
    const COLUMNS: &'static [&'static str] =
        &["customer_id", "customer_name", "total_orders", "average_order_value"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationCustomersRow {
    pub location:           String,
    pub customer_count:     usize,
    /// Customers in this location with at least one Delivered order.
    pub ordering_customers: usize,
    pub total_revenue:      Amount,
}

impl TableRow for LocationCustomersRow {
    const COLUMNS: &'static [&'static str] =
        &["location", "customer_count", "ordering_customers", "total_revenue"];
}

// ── Reports ──────────────────────────────────────────────────────────────────

impl ReportBuilder<'_> {
    /// Top-N customers by Delivered order count, dense-ranked.
    pub fn top_customers_by_orders(&self) -> AnalyticsResult<ReportOutput<CustomerRankRow>> {
        let working = self.working_set(ReportKind::TopCustomersByOrders, false)?;
        let groups = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| Some(o.customer_id),
            JoinMode::Inner,
        );

        let ranked = dense_rank(
            groups.iter().map(|(id, m)| (*id, m.count)),
            SortDirection::Descending,
        );
        let rows = top_n(ranked, self.params.top_n)
            .into_iter()
            .map(|r| CustomerRankRow {
                rank:          r.rank,
                customer_id:   r.key,
                customer_name: self.customer_name(r.key),
                total_orders:  r.metric,
                total_spend:   groups[&r.key].total,
            })
            .collect();

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Top-N customers by Delivered spend, dense-ranked.
    pub fn top_customers_by_spend(&self) -> AnalyticsResult<ReportOutput<CustomerRankRow>> {
        let working = self.working_set(ReportKind::TopCustomersBySpend, false)?;
        let groups = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| Some(o.customer_id),
            JoinMode::Inner,
        );

        let ranked = dense_rank(
            groups.iter().map(|(id, m)| (*id, m.total)),
            SortDirection::Descending,
        );
        let rows = top_n(ranked, self.params.top_n)
            .into_iter()
            .map(|r| CustomerRankRow {
                rank:          r.rank,
                customer_id:   r.key,
                customer_name: self.customer_name(r.key),
                total_orders:  groups[&r.key].count,
                total_spend:   r.metric,
            })
            .collect();

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Share of each customer's orders that were Cancelled. Customers with
    /// no orders at all have no rate and are left out.
    pub fn customer_cancellation_rate(&self) -> AnalyticsResult<ReportOutput<CancellationRateRow>> {
        let working = self.working_set(ReportKind::CustomerCancellationRate, false)?;
        let all = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::All,
            |o| Some(o.customer_id),
            JoinMode::Inner,
        );
        let cancelled = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Cancelled,
            |o| Some(o.customer_id),
            JoinMode::Left(all.keys().copied().collect()),
        );

        let mut rows: Vec<CancellationRateRow> = all
            .iter()
            .map(|(id, m)| {
                let cancelled_orders = cancelled.get(id).map(|c| c.count).unwrap_or(0);
                CancellationRateRow {
                    customer_id:           *id,
                    customer_name:         self.customer_name(*id),
                    total_orders:          m.count,
                    cancelled_orders,
                    cancellation_rate_pct: percent(cancelled_orders, m.count),
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            b.cancellation_rate_pct
                .partial_cmp(&a.cancellation_rate_pct)
                .unwrap_or(Ordering::Equal)
                .then(a.customer_id.cmp(&b.customer_id))
        });

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Customers whose last order (any status) is strictly older than
    /// `as_of - inactivity_days`. Customers who never ordered are listed
    /// first when `include_never_ordered` is set.
    pub fn inactive_customers(&self) -> AnalyticsResult<ReportOutput<InactiveCustomerRow>> {
        let working = self.working_set(ReportKind::InactiveCustomers, false)?;
        let as_of = self.params.as_of;
        let cutoff = as_of
            .checked_sub_days(Days::new(self.params.inactivity_days as u64))
            .unwrap_or(NaiveDate::MIN);

        let aggregates = customer_aggregates(
            working.orders.iter().copied(),
            self.snapshot.customers(),
            &OrderFilter::All,
            true,
            as_of,
        );

        let mut rows: Vec<InactiveCustomerRow> = aggregates
            .into_iter()
            .filter(|a| match a.last_order_date {
                Some(last) => last < cutoff,
                None       => self.params.include_never_ordered,
            })
            .map(|a| InactiveCustomerRow {
                customer_id:           a.customer_id,
                customer_name:         self.customer_name(a.customer_id),
                last_order_date:       a.last_order_date,
                days_since_last_order: a.recency_days,
            })
            .collect();
        rows.sort_by(|a, b| {
            a.last_order_date
                .cmp(&b.last_order_date)
                .then(a.customer_id.cmp(&b.customer_id))
        });

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Few Delivered orders (`<= hvlf_max_orders`) but high spend
    /// (`> hvlf_min_spend`).
    pub fn high_value_low_frequency(&self) -> AnalyticsResult<ReportOutput<HighValueLowFrequencyRow>> {
        let working = self.working_set(ReportKind::HighValueLowFrequency, false)?;
        let aggregates = customer_aggregates(
            working.orders.iter().copied(),
            self.snapshot.customers(),
            &OrderFilter::Delivered,
            false,
            self.params.as_of,
        );

        let mut rows: Vec<HighValueLowFrequencyRow> = aggregates
            .into_iter()
            .filter(|a| {
                a.total_orders <= self.params.hvlf_max_orders
                    && a.total_revenue > self.params.hvlf_min_spend
            })
            .map(|a| HighValueLowFrequencyRow {
                customer_id:   a.customer_id,
                customer_name: self.customer_name(a.customer_id),
                total_orders:  a.total_orders,
                total_spend:   a.total_revenue,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_spend
                .partial_cmp(&a.total_spend)
                .unwrap_or(Ordering::Equal)
                .then(a.customer_id.cmp(&b.customer_id))
        });

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Average Delivered order value per customer, highest first.
    pub fn average_order_value(&self) -> AnalyticsResult<ReportOutput<AverageOrderValueRow>> {
        let working = self.working_set(ReportKind::AverageOrderValue, false)?;
        let aggregates = customer_aggregates(
            working.orders.iter().copied(),
            self.snapshot.customers(),
            &OrderFilter::Delivered,
            false,
            self.params.as_of,
        );

        let mut rows: Vec<AverageOrderValueRow> = aggregates
            .into_iter()
            .filter_map(|a| {
                a.average_order_value.map(|aov| AverageOrderValueRow {
                    customer_id:         a.customer_id,
                    customer_name:       self.customer_name(a.customer_id),
                    total_orders:        a.total_orders,
                    average_order_value: aov,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.average_order_value
                .partial_cmp(&a.average_order_value)
                .unwrap_or(Ordering::Equal)
                .then(a.customer_id.cmp(&b.customer_id))
        });

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Customer counts per location, with Delivered revenue.
    pub fn customers_by_location(&self) -> AnalyticsResult<ReportOutput<LocationCustomersRow>> {
        let working = self.working_set(ReportKind::CustomersByLocation, false)?;
        let per_customer = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| Some(o.customer_id),
            JoinMode::Inner,
        );

        let mut locations: BTreeMap<&str, LocationCustomersRow> = BTreeMap::new();
        for customer in self.snapshot.distinct_customers() {
            let entry = locations
                .entry(customer.location.as_str())
                .or_insert_with(|| LocationCustomersRow {
                    location:           customer.location.clone(),
                    customer_count:     0,
                    ordering_customers: 0,
                    total_revenue:      0.0,
                });
            entry.customer_count += 1;
            if let Some(m) = per_customer.get(&customer.customer_id) {
                entry.ordering_customers += 1;
                entry.total_revenue += m.total;
            }
        }

        let mut rows: Vec<LocationCustomersRow> = locations
            .into_values()
            .map(|mut row| {
                row.total_revenue = round_cents(row.total_revenue);
                row
            })
            .collect();
        // Stable sort keeps location order within equal counts.
        rows.sort_by(|a, b| b.customer_count.cmp(&a.customer_count));

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }
}
