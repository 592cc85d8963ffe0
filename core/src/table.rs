//! Report tables — the one output shape every report is rendered into.
//!
//! A table keeps its column order. JSON output writes each row as an object
//! whose keys follow that order; text output pads columns to a common width.

use crate::error::{AnalyticsError, AnalyticsResult};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::Value;

/// A typed report row. `COLUMNS` names the serialized fields to emit, in
/// output order.
pub trait TableRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub report:       String,
    pub columns:      Vec<String>,
    pub rows:         Vec<Vec<Value>>,
    /// Orders left out because they reference missing entities.
    pub skipped_rows: usize,
}

impl ReportTable {
    pub fn from_rows<R: TableRow>(
        report: &str,
        rows: &[R],
        skipped_rows: usize,
    ) -> AnalyticsResult<Self> {
        let mut cells = Vec::with_capacity(rows.len());
        for row in rows {
            let Value::Object(mut fields) = serde_json::to_value(row)? else {
                return Err(AnalyticsError::Other(anyhow::anyhow!(
                    "report '{report}' row did not serialize to an object"
                )));
            };
            cells.push(
                R::COLUMNS
                    .iter()
                    .map(|c| fields.remove(*c).unwrap_or(Value::Null))
                    .collect(),
            );
        }

        Ok(Self {
            report: report.to_string(),
            columns: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: cells,
            skipped_rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` for the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Every value of one column, top to bottom.
    pub fn column(&self, column: &str) -> Vec<&Value> {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => self.rows.iter().filter_map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    pub fn to_json(&self) -> AnalyticsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering with a header rule, for terminals and logs.
    pub fn render_text(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(format_cell).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&format!("== {} ({} rows", self.report, self.rows.len()));
        if self.skipped_rows > 0 {
            out.push_str(&format!(", {} skipped", self.skipped_rows));
        }
        out.push_str(") ==\n");

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect();
        out.push_str(header.join(" | ").trim_end());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("-+-"));
        out.push('\n');

        for row in rendered {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{cell:<w$}"))
                .collect();
            out.push_str(line.join(" | ").trim_end());
            out.push('\n');
        }
        out
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".into(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => format!("{:.2}", n.as_f64().unwrap_or_default()),
        other => other.to_string(),
    }
}

/// One row as a column → value object, keys in column order.
struct RowView<'a> {
    columns: &'a [String],
    cells:   &'a [Value],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

impl Serialize for ReportTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowView<'_>> = self
            .rows
            .iter()
            .map(|cells| RowView { columns: &self.columns, cells })
            .collect();

        let mut s = serializer.serialize_struct("ReportTable", 4)?;
        s.serialize_field("report", &self.report)?;
        s.serialize_field("columns", &self.columns)?;
        s.serialize_field("skipped_rows", &self.skipped_rows)?;
        s.serialize_field("rows", &rows)?;
        s.end()
    }
}
