//! report-runner: headless report runner for the delivery analytics core.
//!
//! Usage:
//!   report-runner --db delivery.db --report all --format table
//!   report-runner --snapshot snapshot.json --report rfm_segmentation --as-of 2024-06-30
//!   report-runner --db delivery.db --export-snapshot snapshot.json
//!   report-runner --db new.db --init-schema

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use delivery_analytics_core::{
    config::ReportConfig,
    report::{ReportBuilder, ReportKind},
    snapshot::DatasetSnapshot,
    store::RecordStore,
    table::ReportTable,
};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(serde::Serialize)]
struct RunOutput<'a> {
    as_of:   NaiveDate,
    reports: &'a [ReportTable],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = arg_value(&args, "--db");
    let snapshot_path = arg_value(&args, "--snapshot");
    let config_path = arg_value(&args, "--config");
    let export_path = arg_value(&args, "--export-snapshot");
    let report = arg_value(&args, "--report").unwrap_or("all");
    let strict = args.iter().any(|a| a == "--strict");
    let init_schema = args.iter().any(|a| a == "--init-schema");

    let format = match arg_value(&args, "--format").unwrap_or("json") {
        "json" => OutputFormat::Json,
        "table" => OutputFormat::Table,
        other => bail!("Unknown --format '{other}' (expected json or table)"),
    };

    let as_of = match arg_value(&args, "--as-of") {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("--as-of '{s}' is not a YYYY-MM-DD date"))?,
        None => chrono::Local::now().date_naive(),
    };

    let mut config = match config_path {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    config.strict_integrity |= strict;
    // Fail on bad thresholds before touching any data.
    let params = config.params(as_of)?;

    let snapshot = match (db, snapshot_path) {
        (Some(db), None) => {
            let store = RecordStore::open(db)?;
            if init_schema {
                store.migrate()?;
                log::info!("schema ready in {db}");
            }
            let (snapshot, load) = store.load_snapshot()?;
            if load.total_dropped() > 0 {
                log::warn!("{} source row(s) dropped while loading", load.total_dropped());
            }
            snapshot
        }
        (None, Some(path)) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read snapshot {path}"))?;
            DatasetSnapshot::from_json(&json)?
        }
        (Some(_), Some(_)) => bail!("Pass either --db or --snapshot, not both"),
        (None, None) => bail!("Missing input: pass --db <path> or --snapshot <file.json>"),
    };

    if let Some(path) = export_path {
        std::fs::write(path, snapshot.to_json()?)
            .with_context(|| format!("Cannot write snapshot {path}"))?;
        log::info!("snapshot written to {path}");
        return Ok(());
    }
    if init_schema {
        return Ok(());
    }

    let builder = ReportBuilder::new(&snapshot, params)?;
    let tables = if report == "all" {
        builder.run_all()?
    } else {
        let kind: ReportKind = report.parse()?;
        vec![builder.run(kind)?]
    };

    match format {
        OutputFormat::Json => {
            let output = RunOutput { as_of, reports: &tables };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("Delivery analytics as of {as_of}");
            println!();
            for table in &tables {
                println!("{}", table.render_text());
            }
        }
    }

    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
