// 📋 Report Assembler - Group the audit log into named sections
//
// Grouping and renaming only. Every number in the report was computed
// by the component that logged it.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;

use crate::audit_log::{categories, AuditEntry, AuditLog};
use crate::duplicates::{DuplicateFinding, TransactionRecord};
use crate::reconciliation::{ItemError, ReconciliationResult};

pub const TRANSACTION_MAPPING: &str = "Transaction Mapping";
pub const DUPLICATE_TRANSACTIONS: &str = "Duplicate Transactions";
pub const ITEM_ERRORS: &str = "Transaction Where Item Data Missing";
pub const REVENUE_WITHOUT_ITEMS: &str = "Revenue Without Items";
pub const ITEMS_WITHOUT_REVENUE: &str = "Items Without Revenue";

/// Display title of a category's section
pub fn section_title(category: &str) -> &str {
    match category {
        categories::SETTINGS => "Property Details",
        categories::STREAMS => "Streams Configuration",
        categories::LIMITS => "GA4 Property Limits",
        categories::EVENT_INVENTORY => "GA4 Events",
        categories::PII => "PII Check",
        categories::TRANSACTIONS => "Transactions",
        other => other,
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub category: String,
    pub title: String,
    pub entries: Vec<AuditEntry>,
}

/// Raw detail collections handed to the assembler
#[derive(Debug, Clone, Default)]
pub struct AuditDetails {
    pub transaction_mapping: Vec<TransactionRecord>,
    pub duplicates: Vec<DuplicateFinding>,
    pub item_errors: Vec<ItemError>,
    pub reconciliation: ReconciliationResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    /// In first-append order of the categories
    pub sections: Vec<ReportSection>,
    pub transaction_mapping: Vec<TransactionRecord>,
    pub duplicates: Vec<DuplicateFinding>,
    pub item_errors: Vec<ItemError>,
    pub revenue_only_ids: BTreeSet<String>,
    pub items_only_ids: BTreeSet<String>,
}

impl AuditReport {
    pub fn section(&self, category: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.category == category)
    }

    /// All log entries, section by section
    pub fn summary_entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }
}

/// One ordered JSON object: section titles first, then the detail collections
impl Serialize for AuditReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len() + 5))?;
        for section in &self.sections {
            map.serialize_entry(&section.title, &section.entries)?;
        }
        map.serialize_entry(TRANSACTION_MAPPING, &self.transaction_mapping)?;
        map.serialize_entry(DUPLICATE_TRANSACTIONS, &self.duplicates)?;
        map.serialize_entry(ITEM_ERRORS, &self.item_errors)?;
        map.serialize_entry(REVENUE_WITHOUT_ITEMS, &self.revenue_only_ids)?;
        map.serialize_entry(ITEMS_WITHOUT_REVENUE, &self.items_only_ids)?;
        map.end()
    }
}

// ============================================================================
// ASSEMBLER
// ============================================================================

pub struct ReportAssembler;

impl ReportAssembler {
    /// Pure: the same log and details always produce the same report
    pub fn assemble(log: &AuditLog, details: &AuditDetails) -> AuditReport {
        let sections = log
            .categories()
            .map(|category| ReportSection {
                category: category.to_string(),
                title: section_title(category).to_string(),
                entries: log.entries_of(category).cloned().collect(),
            })
            .collect();

        AuditReport {
            sections,
            transaction_mapping: details.transaction_mapping.clone(),
            duplicates: details.duplicates.clone(),
            item_errors: details.item_errors.clone(),
            revenue_only_ids: details.reconciliation.revenue_only_ids.clone(),
            items_only_ids: details.reconciliation.items_only_ids.clone(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::RecordSource;

    fn sample_log() -> AuditLog {
        let mut log = AuditLog::new();
        log.append(categories::SETTINGS, "Display Name", "Shop");
        log.append(categories::LIMITS, "Custom Dimensions Used", "0 / 50");
        log.append(categories::SETTINGS, "Time Zone", "Europe/Berlin");
        log.append("Custom", "note", "kept as-is");
        log
    }

    fn sample_details() -> AuditDetails {
        AuditDetails {
            transaction_mapping: vec![TransactionRecord {
                id: "T1".to_string(),
                revenue: 10.0,
                reported_revenue: "10.00".to_string(),
                reported_count: 1,
                source: RecordSource::Revenue,
                item_id: None,
                item_name: None,
            }],
            duplicates: vec![DuplicateFinding {
                transaction_id: "T2".to_string(),
                reported_count: 2,
            }],
            item_errors: vec![],
            reconciliation: ReconciliationResult {
                revenue_only_ids: ["T1".to_string()].into_iter().collect(),
                items_only_ids: BTreeSet::new(),
            },
        }
    }

    #[test]
    fn test_sections_follow_first_append_order() {
        let report = ReportAssembler::assemble(&sample_log(), &sample_details());

        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Property Details", "GA4 Property Limits", "Custom"]);

        let settings = report.section(categories::SETTINGS).unwrap();
        let checks: Vec<&str> = settings.entries.iter().map(|e| e.check.as_str()).collect();
        assert_eq!(checks, vec!["Display Name", "Time Zone"]);
        assert_eq!(report.summary_entries().count(), 4);
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let log = sample_log();
        let details = sample_details();

        let first = ReportAssembler::assemble(&log, &details);
        let second = ReportAssembler::assemble(&log, &details);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_json_key_order() {
        let report = ReportAssembler::assemble(&sample_log(), &sample_details());
        let json = serde_json::to_string(&report).unwrap();

        let positions: Vec<usize> = [
            "\"Property Details\"",
            "\"GA4 Property Limits\"",
            "\"Custom\"",
            "\"Transaction Mapping\"",
            "\"Duplicate Transactions\"",
            "\"Transaction Where Item Data Missing\"",
            "\"Revenue Without Items\"",
            "\"Items Without Revenue\"",
        ]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();

        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(json.contains("\"Revenue Without Items\":[\"T1\"]"));
        assert!(json.contains("\"Duplicate Transactions\":[{\"transactionId\":\"T2\",\"count\":2}]"));
    }
}
