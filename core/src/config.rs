//! Report configuration — thresholds, breakpoints and defaults.
//!
//! RULE: Every threshold a report compares against lives here.
//! Reports never hardcode a number that a business user might tune.
//! A config is validated once, when it is turned into `ReportParams`,
//! so an invalid value fails before any computation runs.

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: i64 = 5;
pub const DEFAULT_INACTIVITY_DAYS: i64 = 90;
pub const DEFAULT_HVLF_MAX_ORDERS: i64 = 3;
pub const DEFAULT_HVLF_MIN_SPEND: f64 = 3000.0;
pub const DEFAULT_RIDER_LOW_ACTIVITY: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InactivityConfig {
    /// A customer is inactive when their last order is strictly older
    /// than `as_of - threshold_days`.
    pub threshold_days: i64,
    /// List customers who never ordered (last order date null).
    pub include_never_ordered: bool,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            threshold_days:        DEFAULT_INACTIVITY_DAYS,
            include_never_ordered: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighValueLowFrequencyConfig {
    /// Inclusive ceiling on delivered order count.
    pub max_orders: i64,
    /// Exclusive floor on delivered spend.
    pub min_spend:  f64,
}

impl Default for HighValueLowFrequencyConfig {
    fn default() -> Self {
        Self {
            max_orders: DEFAULT_HVLF_MAX_ORDERS,
            min_spend:  DEFAULT_HVLF_MIN_SPEND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiderUtilizationConfig {
    /// Riders with strictly fewer deliveries are flagged low-activity.
    pub low_activity_threshold: i64,
}

impl Default for RiderUtilizationConfig {
    fn default() -> Self {
        Self { low_activity_threshold: DEFAULT_RIDER_LOW_ACTIVITY }
    }
}

/// RFM breakpoints, best score first.
///
/// `recency_days[i]` is the upper bound (inclusive) for score `5 - i`;
/// `frequency_orders[i]` and `monetary[i]` are lower bounds (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RfmConfig {
    pub recency_days:     [i64; 4],
    pub frequency_orders: [i64; 4],
    pub monetary:         [f64; 4],
}

impl Default for RfmConfig {
    fn default() -> Self {
        Self {
            recency_days:     [15, 30, 45, 60],
            frequency_orders: [15, 10, 5, 3],
            monetary:         [3000.0, 2000.0, 1000.0, 500.0],
        }
    }
}

/// Revenue tier cutoffs. Both are strict: revenue must exceed the cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub gold_above:   f64,
    pub silver_above: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self { gold_above: 4000.0, silver_above: 2000.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n:                    i64,
    pub inactivity:               InactivityConfig,
    pub high_value_low_frequency: HighValueLowFrequencyConfig,
    pub rider_utilization:        RiderUtilizationConfig,
    pub rfm:                      RfmConfig,
    pub tiers:                    TierConfig,
    /// Fail a report instead of skipping orders with dangling references.
    pub strict_integrity:         bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n:                    DEFAULT_TOP_N,
            inactivity:               InactivityConfig::default(),
            high_value_low_frequency: HighValueLowFrequencyConfig::default(),
            rider_utilization:        RiderUtilizationConfig::default(),
            rfm:                      RfmConfig::default(),
            tiers:                    TierConfig::default(),
            strict_integrity:         false,
        }
    }
}

/// Validated, typed parameters handed to the report builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportParams {
    pub as_of:                  NaiveDate,
    pub top_n:                  usize,
    pub inactivity_days:        u32,
    pub include_never_ordered:  bool,
    pub hvlf_max_orders:        usize,
    pub hvlf_min_spend:         f64,
    pub rider_low_activity:     usize,
    pub rfm:                    RfmConfig,
    pub tiers:                  TierConfig,
    pub strict_integrity:       bool,
}

impl ReportConfig {
    /// Load from a JSON file. Keys that are absent keep their defaults.
    pub fn load(path: &str) -> AnalyticsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalyticsError::Io {
            path: path.to_string(),
            source,
        })?;
        let config: ReportConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.top_n < 1 {
            return Err(config_err(format!("top_n must be at least 1, got {}", self.top_n)));
        }
        if self.inactivity.threshold_days < 0 {
            return Err(config_err(format!(
                "inactivity.threshold_days must be non-negative, got {}",
                self.inactivity.threshold_days
            )));
        }
        if self.inactivity.threshold_days > u32::MAX as i64 {
            return Err(config_err("inactivity.threshold_days is out of range".into()));
        }
        if self.high_value_low_frequency.max_orders < 0 {
            return Err(config_err(format!(
                "high_value_low_frequency.max_orders must be non-negative, got {}",
                self.high_value_low_frequency.max_orders
            )));
        }
        let min_spend = self.high_value_low_frequency.min_spend;
        if !min_spend.is_finite() || min_spend < 0.0 {
            return Err(config_err(format!(
                "high_value_low_frequency.min_spend must be a non-negative amount, got {min_spend}"
            )));
        }
        if self.rider_utilization.low_activity_threshold < 0 {
            return Err(config_err(format!(
                "rider_utilization.low_activity_threshold must be non-negative, got {}",
                self.rider_utilization.low_activity_threshold
            )));
        }

        validate_bands(&self.rfm, &self.tiers)
    }

    /// Validate and freeze into the parameters one report run uses.
    pub fn params(&self, as_of: NaiveDate) -> AnalyticsResult<ReportParams> {
        self.validate()?;
        Ok(ReportParams {
            as_of,
            top_n:                 self.top_n as usize,
            inactivity_days:       self.inactivity.threshold_days as u32,
            include_never_ordered: self.inactivity.include_never_ordered,
            hvlf_max_orders:       self.high_value_low_frequency.max_orders as usize,
            hvlf_min_spend:        self.high_value_low_frequency.min_spend,
            rider_low_activity:    self.rider_utilization.low_activity_threshold as usize,
            rfm:                   self.rfm.clone(),
            tiers:                 self.tiers.clone(),
            strict_integrity:      self.strict_integrity,
        })
    }
}

impl ReportParams {
    /// Re-check the parts of hand-built params the type system cannot.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if !self.hvlf_min_spend.is_finite() || self.hvlf_min_spend < 0.0 {
            return Err(config_err(format!(
                "hvlf_min_spend must be a non-negative amount, got {}",
                self.hvlf_min_spend
            )));
        }
        if self.top_n == 0 {
            return Err(config_err("top_n must be at least 1".into()));
        }
        validate_bands(&self.rfm, &self.tiers)
    }

    /// Defaults for every threshold, anchored at `as_of`.
    pub fn with_defaults(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            top_n:                 DEFAULT_TOP_N as usize,
            inactivity_days:       DEFAULT_INACTIVITY_DAYS as u32,
            include_never_ordered: true,
            hvlf_max_orders:       DEFAULT_HVLF_MAX_ORDERS as usize,
            hvlf_min_spend:        DEFAULT_HVLF_MIN_SPEND,
            rider_low_activity:    DEFAULT_RIDER_LOW_ACTIVITY as usize,
            rfm:                   RfmConfig::default(),
            tiers:                 TierConfig::default(),
            strict_integrity:      false,
        }
    }
}

fn validate_bands(rfm: &RfmConfig, tiers: &TierConfig) -> AnalyticsResult<()> {
    let r = &rfm.recency_days;
    if r[0] < 0 || !r.windows(2).all(|w| w[0] < w[1]) {
        return Err(config_err(format!(
            "rfm.recency_days must be non-negative and strictly increasing, got {r:?}"
        )));
    }
    let f = &rfm.frequency_orders;
    if f[3] < 0 || !f.windows(2).all(|w| w[0] > w[1]) {
        return Err(config_err(format!(
            "rfm.frequency_orders must be non-negative and strictly decreasing, got {f:?}"
        )));
    }
    let m = &rfm.monetary;
    if m.iter().any(|v| !v.is_finite() || *v < 0.0) || !m.windows(2).all(|w| w[0] > w[1]) {
        return Err(config_err(format!(
            "rfm.monetary must be non-negative and strictly decreasing, got {m:?}"
        )));
    }

    let t = tiers;
    if !t.gold_above.is_finite() || !t.silver_above.is_finite() || t.silver_above < 0.0 {
        return Err(config_err("tier cutoffs must be non-negative amounts".into()));
    }
    if t.silver_above >= t.gold_above {
        return Err(config_err(format!(
            "tiers.silver_above ({}) must be below tiers.gold_above ({})",
            t.silver_above, t.gold_above
        )));
    }
    Ok(())
}

fn config_err(msg: String) -> AnalyticsError {
    AnalyticsError::Configuration(msg)
}
