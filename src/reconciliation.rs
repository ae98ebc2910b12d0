// ⚖️ Reconciliation Engine - Revenue ids vs purchase item ids
//
//   revenue_only = revenue_ids - item_ids
//   items_only   = item_ids - revenue_ids
//
// Unset ids (empty or "(not set)") are filtered before either set is built,
// so an id that is never usable on either side lands in neither difference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::audit_log::{categories, AuditLog, AuditValue};
use crate::duplicates::{parse_revenue, RecordSource, TransactionRecord};
use crate::source::ReportRow;

pub const NOT_SET: &str = "(not set)";
pub const PURCHASE_EVENT: &str = "purchase";

pub const ALL_REVENUE_LINKED: &str = "✅ All revenue transactions are linked to items.";
pub const ALL_ITEMS_LINKED: &str = "✅ All item transactions have matching revenue data.";

/// Empty, whitespace or the platform's "(not set)" sentinel
pub fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == NOT_SET
}

// ============================================================================
// ITEM RECORD
// ============================================================================

/// One row of the eventName x transactionId x itemId x itemName report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub transaction_id: String,
    pub item_id: Option<String>,
    pub item_name: Option<String>,
    pub item_revenue: f64,
    /// Raw `itemRevenue` text
    pub reported_revenue: String,
    pub event_name: String,
}

impl ItemRecord {
    pub const DIMENSIONS: [&'static str; 4] = ["eventName", "transactionId", "itemId", "itemName"];
    pub const METRICS: [&'static str; 1] = ["itemRevenue"];

    /// Parse a report row; a malformed `itemRevenue` is logged and read as zero
    pub fn from_report_row(row: &ReportRow, log: &mut AuditLog) -> Self {
        let optional = |s: &str| if s.is_empty() { None } else { Some(s.to_string()) };
        let transaction_id = row.dimension(1).to_string();

        ItemRecord {
            item_revenue: parse_revenue(row.metric(0), &transaction_id, "itemRevenue", log),
            reported_revenue: row.metric(0).trim().to_string(),
            event_name: row.dimension(0).to_string(),
            item_id: optional(row.dimension(2)),
            item_name: optional(row.dimension(3)),
            transaction_id,
        }
    }

    pub fn is_purchase(&self) -> bool {
        self.event_name == PURCHASE_EVENT
    }

    fn has_usable_name(&self) -> bool {
        self.item_name.as_deref().map(|n| !is_unset(n)).unwrap_or(false)
    }
}

// ============================================================================
// ITEM ERRORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemErrorKind {
    /// Revenue attributed to an item with no identifying name
    UnnamedItemWithRevenue,
    /// Purchase item row whose transaction id is unset
    MissingTransactionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemError {
    #[serde(rename = "transactionId")]
    pub transaction_id: String,

    #[serde(rename = "itemId")]
    pub item_id: Option<String>,

    #[serde(rename = "itemName")]
    pub item_name: Option<String>,

    pub revenue: f64,

    #[serde(rename = "reportedRevenue", default)]
    pub reported_revenue: String,

    pub kind: ItemErrorKind,
}

impl ItemError {
    fn from_record(record: &ItemRecord, kind: ItemErrorKind) -> Self {
        ItemError {
            transaction_id: record.transaction_id.clone(),
            item_id: record.item_id.clone(),
            item_name: record.item_name.clone(),
            revenue: record.item_revenue,
            reported_revenue: record.reported_revenue.clone(),
            kind,
        }
    }
}

// ============================================================================
// RECONCILIATION RESULT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub revenue_only_ids: BTreeSet<String>,
    pub items_only_ids: BTreeSet<String>,
}

impl ReconciliationResult {
    pub fn is_reconciled(&self) -> bool {
        self.revenue_only_ids.is_empty() && self.items_only_ids.is_empty()
    }
}

/// Compute both asymmetric differences
pub fn reconcile_sets(revenue_ids: &BTreeSet<String>, item_ids: &BTreeSet<String>) -> ReconciliationResult {
    ReconciliationResult {
        revenue_only_ids: revenue_ids.difference(item_ids).cloned().collect(),
        items_only_ids: item_ids.difference(revenue_ids).cloned().collect(),
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

/// Collects the item side of the audit, then reconciles it against revenue ids
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    item_ids: BTreeSet<String>,
    records: Vec<TransactionRecord>,
    item_errors: Vec<ItemError>,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one item-level row. Only purchase rows participate.
    pub fn observe(&mut self, record: &ItemRecord, log: &mut AuditLog) {
        if !record.is_purchase() {
            return;
        }

        if is_unset(&record.transaction_id) {
            log.append(
                categories::TRANSACTIONS,
                "Item missing valid transactionId",
                format!(
                    "Item ID: {} / Name: {}",
                    record.item_id.as_deref().unwrap_or(""),
                    record.item_name.as_deref().unwrap_or("")
                ),
            );
            self.item_errors
                .push(ItemError::from_record(record, ItemErrorKind::MissingTransactionId));
            return;
        }

        let id = record.transaction_id.trim().to_string();
        self.item_ids.insert(id.clone());
        self.records.push(TransactionRecord {
            id,
            revenue: record.item_revenue,
            reported_revenue: record.reported_revenue.clone(),
            reported_count: 1,
            source: RecordSource::Item,
            item_id: record.item_id.clone(),
            item_name: record.item_name.clone(),
        });

        if !record.has_usable_name() && record.item_revenue > 0.0 {
            self.item_errors
                .push(ItemError::from_record(record, ItemErrorKind::UnnamedItemWithRevenue));
        }
    }

    /// Feed a whole item report batch. Non-purchase rows are dropped before
    /// their metrics are parsed, so they never leave entries in the log.
    pub fn observe_rows(&mut self, rows: &[ReportRow], log: &mut AuditLog) {
        for row in rows {
            if row.dimension(0) != PURCHASE_EVENT {
                continue;
            }
            let record = ItemRecord::from_report_row(row, log);
            self.observe(&record, log);
        }
    }

    pub fn item_ids(&self) -> &BTreeSet<String> {
        &self.item_ids
    }

    /// Reconcile against the revenue side and log both differences
    pub fn reconcile(&self, revenue_ids: &BTreeSet<String>, log: &mut AuditLog) -> ReconciliationResult {
        let result = reconcile_sets(revenue_ids, &self.item_ids);

        log.append(
            categories::TRANSACTIONS,
            "With Revenue but Missing Items",
            difference_value(&result.revenue_only_ids, ALL_REVENUE_LINKED),
        );
        log.append(
            categories::TRANSACTIONS,
            "With Items but No Revenue",
            difference_value(&result.items_only_ids, ALL_ITEMS_LINKED),
        );

        result
    }

    /// Hand over item-side mapping rows and item errors
    pub fn into_parts(self) -> (Vec<TransactionRecord>, Vec<ItemError>) {
        (self.records, self.item_errors)
    }
}

fn difference_value(ids: &BTreeSet<String>, sentinel: &str) -> AuditValue {
    if ids.is_empty() {
        AuditValue::text(sentinel)
    } else {
        AuditValue::Ids(ids.iter().cloned().collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
