//! Segmentation engine — RFM scoring and revenue tiers.
//!
//! Both classifiers consume per-customer aggregates over Delivered orders.
//! A customer with no Delivered order has no aggregate row and therefore
//! gets neither a segment nor a tier; they are never defaulted to
//! Others or Bronze.
//!
//! Segment rules are checked in a fixed order and the first match wins:
//!   1. Champion  r = 5, f >= 4, m >= 4
//!   2. Loyal     r >= 4, f >= 3
//!   3. At Risk   r <= 2, f <= 2
//!   4. Others

use crate::{
    aggregation::CustomerAggregate,
    config::{RfmConfig, TierConfig},
    types::{Amount, CustomerId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RfmSegment {
    Champion,
    Loyal,
    #[serde(rename = "At Risk")]
    AtRisk,
    Others,
}

impl RfmSegment {
    pub const ALL: [RfmSegment; 4] = [
        RfmSegment::Champion,
        RfmSegment::Loyal,
        RfmSegment::AtRisk,
        RfmSegment::Others,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RfmSegment::Champion => "Champion",
            RfmSegment::Loyal    => "Loyal",
            RfmSegment::AtRisk   => "At Risk",
            RfmSegment::Others   => "Others",
        }
    }
}

impl fmt::Display for RfmSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RevenueTier {
    Gold,
    Silver,
    Bronze,
}

impl RevenueTier {
    pub const ALL: [RevenueTier; 3] = [RevenueTier::Gold, RevenueTier::Silver, RevenueTier::Bronze];

    pub fn label(&self) -> &'static str {
        match self {
            RevenueTier::Gold   => "Gold",
            RevenueTier::Silver => "Silver",
            RevenueTier::Bronze => "Bronze",
        }
    }
}

impl fmt::Display for RevenueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmScore {
    pub customer_id:   CustomerId,
    pub recency_days:  i64,
    pub total_orders:  usize,
    pub total_revenue: Amount,
    pub r_score:       u8,
    pub f_score:       u8,
    pub m_score:       u8,
    pub total:         u8,
    pub segment:       RfmSegment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerTier {
    pub customer_id:   CustomerId,
    pub total_revenue: Amount,
    pub tier:          RevenueTier,
}

// ── Scores ───────────────────────────────────────────────────────────────────

/// Fewer days since the last order scores higher.
pub fn recency_score(recency_days: i64, bands: &RfmConfig) -> u8 {
    bands
        .recency_days
        .iter()
        .position(|&limit| recency_days <= limit)
        .map(|i| 5 - i as u8)
        .unwrap_or(1)
}

pub fn frequency_score(total_orders: usize, bands: &RfmConfig) -> u8 {
    let orders = total_orders as i64;
    bands
        .frequency_orders
        .iter()
        .position(|&floor| orders >= floor)
        .map(|i| 5 - i as u8)
        .unwrap_or(1)
}

pub fn monetary_score(total_revenue: Amount, bands: &RfmConfig) -> u8 {
    bands
        .monetary
        .iter()
        .position(|&floor| total_revenue >= floor)
        .map(|i| 5 - i as u8)
        .unwrap_or(1)
}

type SegmentRule = (RfmSegment, fn(u8, u8, u8) -> bool);

fn is_champion(r: u8, f: u8, m: u8) -> bool {
    r == 5 && f >= 4 && m >= 4
}

fn is_loyal(r: u8, f: u8, _m: u8) -> bool {
    r >= 4 && f >= 3
}

fn is_at_risk(r: u8, f: u8, _m: u8) -> bool {
    r <= 2 && f <= 2
}

const SEGMENT_RULES: [SegmentRule; 3] = [
    (RfmSegment::Champion, is_champion),
    (RfmSegment::Loyal,    is_loyal),
    (RfmSegment::AtRisk,   is_at_risk),
];

pub fn classify_segment(r_score: u8, f_score: u8, m_score: u8) -> RfmSegment {
    SEGMENT_RULES
        .iter()
        .find(|(_, rule)| rule(r_score, f_score, m_score))
        .map(|(segment, _)| *segment)
        .unwrap_or(RfmSegment::Others)
}

/// Strict cutoffs: revenue equal to a cutoff falls to the tier below.
pub fn classify_tier(total_revenue: Amount, tiers: &TierConfig) -> RevenueTier {
    if total_revenue > tiers.gold_above {
        RevenueTier::Gold
    } else if total_revenue > tiers.silver_above {
        RevenueTier::Silver
    } else {
        RevenueTier::Bronze
    }
}

// ── Views ────────────────────────────────────────────────────────────────────

/// Score every aggregate that has at least one order.
pub fn score_customers(aggregates: &[CustomerAggregate], bands: &RfmConfig) -> Vec<RfmScore> {
    aggregates
        .iter()
        .filter(|a| a.total_orders > 0)
        .filter_map(|a| a.recency_days.map(|days| (a, days)))
        .map(|(a, recency_days)| {
            let r_score = recency_score(recency_days, bands);
            let f_score = frequency_score(a.total_orders, bands);
            let m_score = monetary_score(a.total_revenue, bands);
            RfmScore {
                customer_id: a.customer_id,
                recency_days,
                total_orders: a.total_orders,
                total_revenue: a.total_revenue,
                r_score,
                f_score,
                m_score,
                total: r_score + f_score + m_score,
                segment: classify_segment(r_score, f_score, m_score),
            }
        })
        .collect()
}

/// Tier every aggregate that has at least one order.
pub fn tier_customers(aggregates: &[CustomerAggregate], tiers: &TierConfig) -> Vec<CustomerTier> {
    aggregates
        .iter()
        .filter(|a| a.total_orders > 0)
        .map(|a| CustomerTier {
            customer_id:   a.customer_id,
            total_revenue: a.total_revenue,
            tier:          classify_tier(a.total_revenue, tiers),
        })
        .collect()
}
