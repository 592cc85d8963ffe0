use super::{percent, ReportBuilder, ReportKind, ReportOutput};
use crate::{
    aggregation::{aggregate, JoinMode, OrderFilter},
    error::AnalyticsResult,
    table::TableRow,
    types::{round_cents, Amount},
};
use chrono::{Datelike, Weekday};
use serde::Serialize;

// ── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenueRow {
    /// `YYYY-MM`
    pub month:        String,
    pub total_orders: usize,
    pub revenue:      Amount,
    /// Change against the previous listed month; `None` for the first month
    /// or when the previous month had no revenue.
    pub growth_pct:   Option<f64>,
}

impl TableRow for MonthlyRevenueRow {
    const COLUMNS: &'static [&'static str] = &["month", "total_orders", "revenue", "growth_pct"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodRow {
    pub payment_method: String,
    pub total_orders:   usize,
    pub total_amount:   Amount,
    pub average_amount: Amount,
}

impl TableRow for PaymentMethodRow {
    const COLUMNS: &'static [&'static str] =
        &["payment_method", "total_orders", "total_amount", "average_amount"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShareRow {
    pub order_status: String,
    pub order_count:  usize,
    pub share_pct:    f64,
}

impl TableRow for StatusShareRow {
    const COLUMNS: &'static [&'static str] = &["order_status", "order_count", "share_pct"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayVolumeRow {
    pub weekday:      String,
    pub total_orders: usize,
    pub revenue:      Amount,
}

impl TableRow for WeekdayVolumeRow {
    const COLUMNS: &'static [&'static str] = &["weekday", "total_orders", "revenue"];
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Reports ──────────────────────────────────────────────────────────────────

impl ReportBuilder<'_> {
    /// Delivered revenue per calendar month, oldest first, with
    /// month-over-month growth.
    pub fn monthly_revenue_trend(&self) -> AnalyticsResult<ReportOutput<MonthlyRevenueRow>> {
        let working = self.working_set(ReportKind::MonthlyRevenueTrend, false)?;
        let months = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| Some((o.order_date.year(), o.order_date.month())),
            JoinMode::Inner,
        );

        let mut rows = Vec::with_capacity(months.len());
        let mut previous: Option<Amount> = None;
        for ((year, month), m) in months {
            let growth_pct = previous
                .filter(|prev| *prev > 0.0)
                .map(|prev| round_cents((m.total - prev) / prev * 100.0));
            rows.push(MonthlyRevenueRow {
                month: format!("{year:04}-{month:02}"),
                total_orders: m.count,
                revenue: m.total,
                growth_pct,
            });
            previous = Some(m.total);
        }

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// How often each payment method is used (any status) and the average
    /// amount paid with it.
    pub fn payment_method_usage(&self) -> AnalyticsResult<ReportOutput<PaymentMethodRow>> {
        let working = self.working_set(ReportKind::PaymentMethodUsage, false)?;
        let methods = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::All,
            |o| Some(o.payment_method.clone()),
            JoinMode::Inner,
        );

        let mut rows: Vec<PaymentMethodRow> = methods
            .into_iter()
            .map(|(payment_method, m)| PaymentMethodRow {
                payment_method,
                total_orders:   m.count,
                total_amount:   m.total,
                average_amount: m.average.unwrap_or_default(),
            })
            .collect();
        rows.sort_by(|a, b| b.total_orders.cmp(&a.total_orders));

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Order count and share per status.
    pub fn order_status_distribution(&self) -> AnalyticsResult<ReportOutput<StatusShareRow>> {
        let working = self.working_set(ReportKind::OrderStatusDistribution, false)?;
        let total = working.orders.len();
        let statuses = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::All,
            |o| Some(o.order_status.as_str().to_string()),
            JoinMode::Inner,
        );

        let mut rows: Vec<StatusShareRow> = statuses
            .into_iter()
            .map(|(order_status, m)| StatusShareRow {
                order_status,
                order_count: m.count,
                share_pct:   percent(m.count, total),
            })
            .collect();
        rows.sort_by(|a, b| b.order_count.cmp(&a.order_count));

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Delivered volume per weekday, Monday through Sunday. Every weekday
    /// is listed, including days with no orders.
    pub fn weekday_order_volume(&self) -> AnalyticsResult<ReportOutput<WeekdayVolumeRow>> {
        let working = self.working_set(ReportKind::WeekdayOrderVolume, false)?;
        let days = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| Some(o.order_date.weekday().num_days_from_monday()),
            JoinMode::Left((0..7).collect()),
        );

        let rows = days
            .into_iter()
            .map(|(idx, m)| WeekdayVolumeRow {
                weekday:      weekday_name(WEEK[idx as usize]).to_string(),
                total_orders: m.count,
                revenue:      m.total,
            })
            .collect();

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }
}
