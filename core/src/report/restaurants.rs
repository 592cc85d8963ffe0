use super::{percent, ReportBuilder, ReportKind, ReportOutput};
use crate::{
    aggregation::{aggregate, JoinMode, OrderFilter},
    error::AnalyticsResult,
    ranking::{dense_rank, dense_rank_partitioned, top_n, SortDirection},
    table::TableRow,
    types::{round_cents, Amount, RestaurantId},
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// ── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantRankRow {
    pub rank:            usize,
    pub restaurant_id:   RestaurantId,
    pub restaurant_name: String,
    pub cuisine:         String,
    pub total_orders:    usize,
    pub revenue:         Amount,
}

impl TableRow for RestaurantRankRow {
    const COLUMNS: &'static [&'static str] =
        &["rank", "restaurant_id", "restaurant_name", "cuisine", "total_orders", "revenue"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantCancellationRow {
    pub restaurant_id:         RestaurantId,
    pub restaurant_name:       String,
    pub total_orders:          usize,
    pub cancelled_orders:      usize,
    pub cancellation_rate_pct: f64,
}

impl TableRow for RestaurantCancellationRow {
    const COLUMNS: &'static [&'static str] = &[
        "restaurant_id",
        "restaurant_name",
        "total_orders",
        "cancelled_orders",
        "cancellation_rate_pct",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuisineRatingRow {
    pub cuisine:          String,
    pub restaurant_count: usize,
    pub average_rating:   f64,
}

impl TableRow for CuisineRatingRow {
    const COLUMNS: &'static [&'static str] = &["cuisine", "restaurant_count", "average_rating"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuisineRevenueRow {
    pub cuisine:             String,
    pub total_orders:        usize,
    pub revenue:             Amount,
    pub average_order_value: Amount,
}

impl TableRow for CuisineRevenueRow {
    const COLUMNS: &'static [&'static str] =
        &["cuisine", "total_orders", "revenue", "average_order_value"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationLeaderRow {
    pub location:        String,
    pub restaurant_id:   RestaurantId,
    pub restaurant_name: String,
    pub revenue:         Amount,
}

impl TableRow for LocationLeaderRow {
    const COLUMNS: &'static [&'static str] =
        &["location", "restaurant_id", "restaurant_name", "revenue"];
}

// ── Reports ──────────────────────────────────────────────────────────────────

impl ReportBuilder<'_> {
    fn restaurant_name(&self, restaurant_id: RestaurantId) -> String {
        self.snapshot
            .restaurant(restaurant_id)
            .map(|r| r.name.clone())
            .unwrap_or_default()
    }

    /// Top-N restaurants by Delivered revenue, dense-ranked.
    pub fn top_restaurants_by_revenue(&self) -> AnalyticsResult<ReportOutput<RestaurantRankRow>> {
        let working = self.working_set(ReportKind::TopRestaurantsByRevenue, false)?;
        let groups = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| Some(o.restaurant_id),
            JoinMode::Inner,
        );

        let ranked = dense_rank(
            groups.iter().map(|(id, m)| (*id, m.total)),
            SortDirection::Descending,
        );
        let rows = top_n(ranked, self.params.top_n)
            .into_iter()
            .map(|r| {
                let restaurant = self.snapshot.restaurant(r.key);
                RestaurantRankRow {
                    rank:            r.rank,
                    restaurant_id:   r.key,
                    restaurant_name: restaurant.map(|x| x.name.clone()).unwrap_or_default(),
                    cuisine:         restaurant.map(|x| x.cuisine.clone()).unwrap_or_default(),
                    total_orders:    groups[&r.key].count,
                    revenue:         r.metric,
                }
            })
            .collect();

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Cancelled orders per restaurant, most cancellations first.
    /// Restaurants without orders are not listed.
    pub fn restaurant_cancellations(&self) -> AnalyticsResult<ReportOutput<RestaurantCancellationRow>> {
        let working = self.working_set(ReportKind::RestaurantCancellations, false)?;
        let all = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::All,
            |o| Some(o.restaurant_id),
            JoinMode::Inner,
        );
        let cancelled = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Cancelled,
            |o| Some(o.restaurant_id),
            JoinMode::Inner,
        );

        let mut rows: Vec<RestaurantCancellationRow> = all
            .iter()
            .map(|(id, m)| {
                let cancelled_orders = cancelled.get(id).map(|c| c.count).unwrap_or(0);
                RestaurantCancellationRow {
                    restaurant_id:         *id,
                    restaurant_name:       self.restaurant_name(*id),
                    total_orders:          m.count,
                    cancelled_orders,
                    cancellation_rate_pct: percent(cancelled_orders, m.count),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.cancelled_orders.cmp(&a.cancelled_orders));

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// Average restaurant rating per cuisine. Reads the restaurant table
    /// only.
    pub fn cuisine_average_rating(&self) -> AnalyticsResult<ReportOutput<CuisineRatingRow>> {
        let mut cuisines: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for restaurant in self.snapshot.distinct_restaurants() {
            let entry = cuisines.entry(restaurant.cuisine.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += restaurant.rating;
        }

        let mut rows: Vec<CuisineRatingRow> = cuisines
            .into_iter()
            .map(|(cuisine, (count, sum))| CuisineRatingRow {
                cuisine:          cuisine.to_string(),
                restaurant_count: count,
                average_rating:   round_cents(sum / count as f64),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(Ordering::Equal)
        });

        Ok(ReportOutput::new(rows, 0))
    }

    /// Delivered orders and revenue per cuisine, highest revenue first.
    pub fn cuisine_revenue(&self) -> AnalyticsResult<ReportOutput<CuisineRevenueRow>> {
        let working = self.working_set(ReportKind::CuisineRevenue, false)?;
        let cuisines = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| self.snapshot.restaurant(o.restaurant_id).map(|r| r.cuisine.clone()),
            JoinMode::Inner,
        );

        let mut rows: Vec<CuisineRevenueRow> = cuisines
            .into_iter()
            .map(|(cuisine, m)| CuisineRevenueRow {
                cuisine,
                total_orders:        m.count,
                revenue:             m.total,
                average_order_value: m.average.unwrap_or_default(),
            })
            .collect();
        rows.sort_by(|a, b| b.revenue.partial_cmp(&a.revenue).unwrap_or(Ordering::Equal));

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }

    /// The highest-revenue restaurant(s) in each location. Ties at the top
    /// are all listed.
    pub fn top_restaurant_per_location(&self) -> AnalyticsResult<ReportOutput<LocationLeaderRow>> {
        let working = self.working_set(ReportKind::TopRestaurantPerLocation, false)?;
        let groups = aggregate(
            working.orders.iter().copied(),
            &OrderFilter::Delivered,
            |o| Some(o.restaurant_id),
            JoinMode::Inner,
        );

        let entries = groups.iter().filter_map(|(id, m)| {
            self.snapshot
                .restaurant(*id)
                .map(|r| (r.location.clone(), *id, m.total))
        });
        let partitions = dense_rank_partitioned(entries, SortDirection::Descending);

        let rows = partitions
            .into_iter()
            .flat_map(|(location, ranked)| {
                top_n(ranked, 1).into_iter().map(move |r| (location.clone(), r))
            })
            .map(|(location, r)| LocationLeaderRow {
                location,
                restaurant_id:   r.key,
                restaurant_name: self.restaurant_name(r.key),
                revenue:         r.metric,
            })
            .collect();

        Ok(ReportOutput::new(rows, working.skipped.len()))
    }
}
