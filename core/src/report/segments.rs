use super::{ReportBuilder, ReportKind, ReportOutput};
use crate::{
    aggregation::{customer_aggregates, CustomerAggregate, OrderFilter},
    error::AnalyticsResult,
    segmentation::{score_customers, tier_customers, CustomerTier, RevenueTier, RfmScore, RfmSegment},
    table::TableRow,
    types::{round_cents, Amount},
};
use serde::Serialize;
use std::cmp::Ordering;

// ── Rows ─────────────────────────────────────────────────────────────────────

impl TableRow for RfmScore {
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "recency_days",
        "total_orders",
        "total_revenue",
        "r_score",
        "f_score",
        "m_score",
        "total",
        "segment",
    ];
}

impl TableRow for CustomerTier {
    const COLUMNS: &'static [&'static str] = &["customer_id", "total_revenue", "tier"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummaryRow {
    pub segment:        RfmSegment,
    pub customer_count: usize,
}

impl TableRow for SegmentSummaryRow {
    const COLUMNS: &'static [&'static str] = &["segment", "customer_count"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummaryRow {
    pub tier:           RevenueTier,
    pub customer_count: usize,
    pub total_revenue:  Amount,
}

impl TableRow for TierSummaryRow {
    const COLUMNS: &'static [&'static str] = &["tier", "customer_count", "total_revenue"];
}

// ── Views ────────────────────────────────────────────────────────────────────

impl ReportBuilder<'_> {
    /// Delivered-only customer aggregates; customers without a Delivered
    /// order have no row.
    fn delivered_aggregates(&self, kind: ReportKind) -> AnalyticsResult<(Vec<CustomerAggregate>, usize)> {
        let working = self.working_set(kind, false)?;
        let aggregates = customer_aggregates(
            working.orders.iter().copied(),
            self.snapshot.customers(),
            &OrderFilter::Delivered,
            false,
            self.params.as_of,
        );
        Ok((aggregates, working.skipped.len()))
    }

    /// RFM scores and segment per customer, by customer id.
    pub fn rfm_segmentation(&self) -> AnalyticsResult<ReportOutput<RfmScore>> {
        let (aggregates, skipped) = self.delivered_aggregates(ReportKind::RfmSegmentation)?;
        Ok(ReportOutput::new(score_customers(&aggregates, &self.params.rfm), skipped))
    }

    /// Customer count per segment, in rule order. Counts sum to the number
    /// of customers with at least one Delivered order.
    pub fn rfm_segment_summary(&self) -> AnalyticsResult<ReportOutput<SegmentSummaryRow>> {
        let (aggregates, skipped) = self.delivered_aggregates(ReportKind::RfmSegmentSummary)?;
        let scores = score_customers(&aggregates, &self.params.rfm);

        let rows = RfmSegment::ALL
            .into_iter()
            .map(|segment| SegmentSummaryRow {
                segment,
                customer_count: scores.iter().filter(|s| s.segment == segment).count(),
            })
            .collect();

        Ok(ReportOutput::new(rows, skipped))
    }

    /// Revenue tier per customer, highest revenue first.
    pub fn customer_classification(&self) -> AnalyticsResult<ReportOutput<CustomerTier>> {
        let (aggregates, skipped) = self.delivered_aggregates(ReportKind::CustomerClassification)?;
        let mut rows = tier_customers(&aggregates, &self.params.tiers);
        rows.sort_by(|a, b| {
            b.total_revenue
                .partial_cmp(&a.total_revenue)
                .unwrap_or(Ordering::Equal)
                .then(a.customer_id.cmp(&b.customer_id))
        });

        Ok(ReportOutput::new(rows, skipped))
    }

    /// Customers and revenue per tier, Gold first.
    pub fn tier_summary(&self) -> AnalyticsResult<ReportOutput<TierSummaryRow>> {
        let (aggregates, skipped) = self.delivered_aggregates(ReportKind::TierSummary)?;
        let tiers = tier_customers(&aggregates, &self.params.tiers);

        let rows = RevenueTier::ALL
            .into_iter()
            .map(|tier| {
                let members = tiers.iter().filter(|t| t.tier == tier);
                TierSummaryRow {
                    tier,
                    customer_count: members.clone().count(),
                    total_revenue:  round_cents(members.map(|t| t.total_revenue).sum()),
                }
            })
            .collect();

        Ok(ReportOutput::new(rows, skipped))
    }
}
