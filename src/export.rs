// 📤 Export - One CSV "sheet" per report collection
// The report is written as-is; nothing is recomputed here.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::duplicates::RecordSource;
use crate::report::AuditReport;

pub const SUMMARY_SHEET: &str = "audit_summary.csv";
pub const MAPPING_SHEET: &str = "transaction_mapping.csv";
pub const DUPLICATES_SHEET: &str = "duplicate_transactions.csv";
pub const ITEM_ERRORS_SHEET: &str = "item_errors.csv";

#[derive(Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Check")]
    check: &'a str,
    #[serde(rename = "Result")]
    result: String,
}

#[derive(Serialize)]
struct MappingRow<'a> {
    #[serde(rename = "transactionId")]
    transaction_id: &'a str,
    revenue: String,
    #[serde(rename = "reportedCount")]
    reported_count: u64,
    source: &'a str,
    #[serde(rename = "itemId")]
    item_id: &'a str,
    #[serde(rename = "itemName")]
    item_name: &'a str,
}

#[derive(Serialize)]
struct ItemErrorRow<'a> {
    #[serde(rename = "transactionId")]
    transaction_id: &'a str,
    #[serde(rename = "itemId")]
    item_id: &'a str,
    #[serde(rename = "itemName")]
    item_name: &'a str,
    revenue: String,
    kind: String,
}

/// Write the report into `dir`, returning the files written.
///
/// The summary sheet is always written; detail sheets only when non-empty.
pub fn write_csv_sheets<P: AsRef<Path>>(report: &AuditReport, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory: {:?}", dir))?;

    let mut written = Vec::new();

    let summary = report.summary_entries().map(|e| SummaryRow {
        category: &e.category,
        check: &e.check,
        result: e.result.to_string(),
    });
    written.push(write_sheet(dir, SUMMARY_SHEET, summary)?);

    if !report.transaction_mapping.is_empty() {
        let rows = report.transaction_mapping.iter().map(|r| MappingRow {
            transaction_id: &r.id,
            revenue: sheet_revenue(&r.reported_revenue, r.revenue),
            reported_count: r.reported_count,
            source: match r.source {
                RecordSource::Revenue => "Revenue Table",
                RecordSource::Item => "Item Table",
            },
            item_id: r.item_id.as_deref().unwrap_or(""),
            item_name: r.item_name.as_deref().unwrap_or(""),
        });
        written.push(write_sheet(dir, MAPPING_SHEET, rows)?);
    }

    if !report.duplicates.is_empty() {
        written.push(write_sheet(dir, DUPLICATES_SHEET, report.duplicates.iter())?);
    }

    if !report.item_errors.is_empty() {
        let rows = report.item_errors.iter().map(|e| ItemErrorRow {
            transaction_id: &e.transaction_id,
            item_id: e.item_id.as_deref().unwrap_or(""),
            item_name: e.item_name.as_deref().unwrap_or(""),
            revenue: sheet_revenue(&e.reported_revenue, e.revenue),
            kind: format!("{:?}", e.kind),
        });
        written.push(write_sheet(dir, ITEM_ERRORS_SHEET, rows)?);
    }

    tracing::info!(dir = ?dir, sheets = written.len(), "report exported");
    Ok(written)
}

/// Revenue as reported; the parsed value only when the raw text is gone
fn sheet_revenue(reported: &str, parsed: f64) -> String {
    if reported.is_empty() {
        parsed.to_string()
    } else {
        reported.to_string()
    }
}

fn write_sheet<I, R>(dir: &Path, name: &str, rows: I) -> Result<PathBuf>
where
    I: IntoIterator<Item = R>,
    R: Serialize,
{
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create sheet: {:?}", path))?;

    for row in rows {
        writer.serialize(row).with_context(|| format!("Failed to write row to {:?}", path))?;
    }
    writer.flush()?;

    Ok(path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit_log::{categories, AuditLog};
    use crate::duplicates::{DuplicateFinding, TransactionRecord};
    use crate::report::{AuditDetails, ReportAssembler};

    #[test]
    fn test_writes_summary_and_non_empty_sheets() {
        let mut log = AuditLog::new();
        log.append(categories::LIMITS, "Audiences Used", "3 / 100");
        let details = AuditDetails {
            transaction_mapping: vec![TransactionRecord {
                id: "T1".to_string(),
                revenue: 799.0,
                reported_revenue: "799.00".to_string(),
                reported_count: 2,
                source: RecordSource::Revenue,
                item_id: None,
                item_name: None,
            }],
            duplicates: vec![DuplicateFinding {
                transaction_id: "T1".to_string(),
                reported_count: 2,
            }],
            ..AuditDetails::default()
        };
        let report = ReportAssembler::assemble(&log, &details);

        let dir = tempfile::tempdir().unwrap();
        let written = write_csv_sheets(&report, dir.path()).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![SUMMARY_SHEET, MAPPING_SHEET, DUPLICATES_SHEET]);

        let summary = fs::read_to_string(dir.path().join(SUMMARY_SHEET)).unwrap();
        assert_eq!(summary, "Category,Check,Result\nLimits,Audiences Used,3 / 100\n");

        let duplicates = fs::read_to_string(dir.path().join(DUPLICATES_SHEET)).unwrap();
        assert_eq!(duplicates, "transactionId,count\nT1,2\n");

        let mapping = fs::read_to_string(dir.path().join(MAPPING_SHEET)).unwrap();
        assert_eq!(
            mapping,
            "transactionId,revenue,reportedCount,source,itemId,itemName\nT1,799.00,2,Revenue Table,,\n"
        );
    }

    #[test]
    fn test_revenue_falls_back_to_parsed_value() {
        assert_eq!(sheet_revenue("", 12.5), "12.5");
        assert_eq!(sheet_revenue("12.50", 12.5), "12.50");
    }
}
