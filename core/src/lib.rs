//! Analytics core for a food-delivery dataset.
//!
//! Record store → snapshot → aggregation → {ranking, segmentation} → reports.
//! Every report is a pure function of a `DatasetSnapshot` and its
//! `ReportParams`.

pub mod aggregation;
pub mod config;
pub mod error;
pub mod ranking;
pub mod record;
pub mod report;
pub mod segmentation;
pub mod snapshot;
pub mod store;
pub mod table;
pub mod types;
