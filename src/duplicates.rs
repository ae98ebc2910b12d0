// 🔍 Duplicate Detector - Transactions reported more than once
//
// Rows of the revenue report already carry an aggregate `transactions`
// count per id. Counts are summed per id, so an id split across several
// rows is judged on its total, independent of row order.
//
// Note: this is stricter than judging each row on its own count. Two rows
// for the same id with a count of 1 each are reported as one duplicate
// with count 2, where a per-row rule would report nothing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::audit_log::{categories, AuditLog, AuditValue};
use crate::source::ReportRow;

pub const NO_DUPLICATES: &str = "✅ No duplicates found";

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSource {
    #[serde(rename = "Revenue Table")]
    Revenue,
    #[serde(rename = "Item Table")]
    Item,
}

/// One observation of a transaction id on one side of the audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "transactionId")]
    pub id: String,

    pub revenue: f64,

    /// Revenue exactly as the report returned it, for the spreadsheet sheets
    #[serde(rename = "reportedRevenue", default)]
    pub reported_revenue: String,

    #[serde(rename = "reportedCount")]
    pub reported_count: u64,

    pub source: RecordSource,

    #[serde(rename = "itemId", default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    #[serde(rename = "itemName", default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateFinding {
    #[serde(rename = "transactionId")]
    pub transaction_id: String,

    #[serde(rename = "count")]
    pub reported_count: u64,
}

/// One row of the `transactionId` x (`transactions`, `purchaseRevenue`) report
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRow {
    pub transaction_id: String,
    pub count: String,
    pub revenue: String,
}

impl RevenueRow {
    pub const DIMENSIONS: [&'static str; 1] = ["transactionId"];
    pub const METRICS: [&'static str; 2] = ["transactions", "purchaseRevenue"];

    pub fn from_report_row(row: &ReportRow) -> Self {
        RevenueRow {
            transaction_id: row.dimension(0).to_string(),
            count: row.metric(0).to_string(),
            revenue: row.metric(1).to_string(),
        }
    }
}

// ============================================================================
// DETECTION OUTPUT
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DuplicateSummary {
    /// Distinct non-empty ids seen on the revenue side
    pub revenue_ids: BTreeSet<String>,

    pub records: Vec<TransactionRecord>,

    /// Sorted by transaction id
    pub duplicates: Vec<DuplicateFinding>,

    pub missing_id_rows: usize,
}

// ============================================================================
// DUPLICATE DETECTOR
// ============================================================================

#[derive(Debug, Default)]
pub struct DuplicateDetector {
    /// Multiset of ids: summed reported counts
    counts: BTreeMap<String, u64>,

    records: Vec<TransactionRecord>,

    missing_id_rows: usize,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one revenue-report row
    pub fn observe(&mut self, row: &RevenueRow, log: &mut AuditLog) {
        let id = row.transaction_id.trim();

        if id.is_empty() {
            self.missing_id_rows += 1;
            log.append(
                categories::TRANSACTIONS,
                "Missing transactionId",
                format!("Detected (revenue {})", row.revenue),
            );
            return;
        }

        let count = parse_count(&row.count, id, log);
        let revenue = parse_revenue(&row.revenue, id, "purchaseRevenue", log);

        *self.counts.entry(id.to_string()).or_insert(0) += count;

        self.records.push(TransactionRecord {
            id: id.to_string(),
            revenue,
            reported_revenue: row.revenue.trim().to_string(),
            reported_count: count,
            source: RecordSource::Revenue,
            item_id: None,
            item_name: None,
        });
    }

    /// Feed a whole batch
    pub fn observe_rows(&mut self, rows: &[ReportRow], log: &mut AuditLog) {
        for row in rows {
            self.observe(&RevenueRow::from_report_row(row), log);
        }
    }

    /// Emit the totals and hand over what was collected
    pub fn finish(self, log: &mut AuditLog) -> DuplicateSummary {
        let duplicates: Vec<DuplicateFinding> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(id, &count)| DuplicateFinding {
                transaction_id: id.clone(),
                reported_count: count,
            })
            .collect();

        let revenue_ids: BTreeSet<String> = self.counts.into_keys().collect();

        log.append(
            categories::TRANSACTIONS,
            "Total Unique transactionId",
            revenue_ids.len(),
        );

        if duplicates.is_empty() {
            log.append(categories::TRANSACTIONS, "Duplicate Transaction Count", NO_DUPLICATES);
        } else {
            log.append(
                categories::TRANSACTIONS,
                "Duplicate Transaction Count",
                duplicates.len(),
            );
            let ids = duplicates
                .iter()
                .map(|d| (d.transaction_id.clone(), AuditValue::Integer(d.reported_count as i64)))
                .collect();
            log.append(
                categories::TRANSACTIONS,
                "Duplicate Transaction IDs",
                AuditValue::Map(ids),
            );
        }

        DuplicateSummary {
            revenue_ids,
            records: self.records,
            duplicates,
            missing_id_rows: self.missing_id_rows,
        }
    }
}

/// Parse a `transactions` metric; malformed or zero counts as one observation
fn parse_count(raw: &str, id: &str, log: &mut AuditLog) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(n) => n.max(1),
        Err(_) => {
            log.append(
                categories::TRANSACTIONS,
                format!("Malformed transactions count for {}", id),
                raw,
            );
            1
        }
    }
}

/// Parse a revenue metric; malformed values count as zero
pub(crate) fn parse_revenue(raw: &str, id: &str, metric: &str, log: &mut AuditLog) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            log.append(
                categories::TRANSACTIONS,
                format!("Malformed {} for {}", metric, id),
                raw,
            );
            0.0
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
