//! Report configuration: file loading, defaults and validation.

use chrono::NaiveDate;
use delivery_analytics_core::{
    config::{ReportConfig, ReportParams},
    error::AnalyticsError,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

const SHIPPED_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/report_config.json");

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn assert_config_error(config: &ReportConfig, needle: &str) {
    match config.params(as_of()) {
        Err(AnalyticsError::Configuration(msg)) => {
            assert!(msg.contains(needle), "expected '{needle}' in '{msg}'")
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn shipped_config_matches_defaults() {
    let loaded = ReportConfig::load(SHIPPED_CONFIG).expect("shipped config loads");
    assert_eq!(loaded, ReportConfig::default());
}

#[test]
fn default_params_match_hand_built_defaults() {
    let params = ReportConfig::default().params(as_of()).unwrap();
    assert_eq!(params, ReportParams::with_defaults(as_of()));
    assert_eq!(params.top_n, 5);
    assert_eq!(params.inactivity_days, 90);
    assert_eq!(params.hvlf_max_orders, 3);
    assert_eq!(params.hvlf_min_spend, 3000.0);
    assert_eq!(params.rider_low_activity, 5);
}

#[test]
fn absent_keys_keep_their_defaults() {
    let config: ReportConfig =
        serde_json::from_str(r#"{ "top_n": 10, "inactivity": { "threshold_days": 30 } }"#).unwrap();

    assert_eq!(config.top_n, 10);
    assert_eq!(config.inactivity.threshold_days, 30);
    assert!(config.inactivity.include_never_ordered);
    assert_eq!(config.rfm, ReportConfig::default().rfm);
}

#[test]
fn missing_file_is_an_error() {
    let err = ReportConfig::load("/nonexistent/report_config.json").unwrap_err();
    assert!(matches!(err, AnalyticsError::Io { .. }));
    assert!(err.to_string().contains("Cannot read /nonexistent/report_config.json"));
}

#[test]
fn negative_thresholds_are_rejected() {
    let mut config = ReportConfig::default();
    config.inactivity.threshold_days = -1;
    assert_config_error(&config, "threshold_days");

    let mut config = ReportConfig::default();
    config.high_value_low_frequency.min_spend = -0.01;
    assert_config_error(&config, "min_spend");

    let mut config = ReportConfig::default();
    config.rider_utilization.low_activity_threshold = -3;
    assert_config_error(&config, "low_activity_threshold");
}

#[test]
fn top_n_must_be_positive() {
    let mut config = ReportConfig::default();
    config.top_n = 0;
    assert_config_error(&config, "top_n");
}

#[test]
fn silver_cutoff_must_stay_below_gold() {
    let mut config = ReportConfig::default();
    config.tiers.silver_above = 4000.0;
    assert_config_error(&config, "silver_above");
}

#[test]
fn rfm_breakpoints_must_be_ordered() {
    let mut config = ReportConfig::default();
    config.rfm.recency_days = [15, 45, 30, 60];
    assert_config_error(&config, "recency_days");

    let mut config = ReportConfig::default();
    config.rfm.frequency_orders = [15, 10, 10, 3];
    assert_config_error(&config, "frequency_orders");

    let mut config = ReportConfig::default();
    config.rfm.monetary = [3000.0, 2000.0, 1000.0, -1.0];
    assert_config_error(&config, "monetary");
}

#[test]
fn invalid_file_fails_on_load() {
    let path = std::env::temp_dir().join(format!("report-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "tiers": { "gold_above": 1000.0, "silver_above": 2000.0 } }"#).unwrap();

    let result = ReportConfig::load(path.to_str().unwrap());
    let _ = std::fs::remove_file(&path);

    assert!(matches!(result, Err(AnalyticsError::Configuration(_))));
}
