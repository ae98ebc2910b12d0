// 📒 Audit Log - Append-only record of every finding
// Every check writes here; the report assembler reads it back by category.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================================================
// CATEGORIES
// ============================================================================

/// Category names used by the audit run, in canonical order
pub mod categories {
    pub const SETTINGS: &str = "Settings";
    pub const STREAMS: &str = "Streams";
    pub const LIMITS: &str = "Limits";
    pub const EVENT_INVENTORY: &str = "Event Inventory";
    pub const PII: &str = "PII";
    pub const TRANSACTIONS: &str = "Transactions";
}

// ============================================================================
// AUDIT VALUE
// ============================================================================

/// Result of a single check.
///
/// Serialized untagged so a report consumer sees plain JSON values:
/// a string, a number, an object or an array of ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditValue {
    Integer(i64),
    Text(String),
    Map(BTreeMap<String, AuditValue>),
    Ids(Vec<String>),
}

impl AuditValue {
    pub fn text(value: impl Into<String>) -> Self {
        AuditValue::Text(value.into())
    }

    /// Integer if the metric parses, raw text otherwise
    pub fn from_metric(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(n) => AuditValue::Integer(n),
            Err(_) => AuditValue::Text(raw.to_string()),
        }
    }
}

impl From<usize> for AuditValue {
    fn from(n: usize) -> Self {
        AuditValue::Integer(n as i64)
    }
}

impl From<&str> for AuditValue {
    fn from(s: &str) -> Self {
        AuditValue::Text(s.to_string())
    }
}

impl From<String> for AuditValue {
    fn from(s: String) -> Self {
        AuditValue::Text(s)
    }
}

impl fmt::Display for AuditValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditValue::Integer(n) => write!(f, "{}", n),
            AuditValue::Text(s) => write!(f, "{}", s),
            AuditValue::Map(map) => {
                let parts: Vec<String> =
                    map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            AuditValue::Ids(ids) => write!(f, "[{}]", ids.join(", ")),
        }
    }
}

// ============================================================================
// AUDIT ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Check")]
    pub check: String,

    #[serde(rename = "Result")]
    pub result: AuditValue,
}

// ============================================================================
// AUDIT LOG
// ============================================================================

/// Insertion-ordered log of findings, indexed by category on append.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,

    /// Categories in first-append order, each with its entry positions
    sections: Vec<(String, Vec<usize>)>,

    /// Category name -> position in `sections`
    lookup: HashMap<String, usize>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding. Never fails; entries are never mutated afterwards.
    pub fn append(&mut self, category: &str, check: impl Into<String>, result: impl Into<AuditValue>) {
        let entry = AuditEntry {
            category: category.to_string(),
            check: check.into(),
            result: result.into(),
        };

        tracing::info!(
            category = %entry.category,
            check = %entry.check,
            result = %entry.result,
            "audit finding"
        );

        let position = self.entries.len();
        let slot = match self.lookup.get(category) {
            Some(&slot) => slot,
            None => {
                self.sections.push((category.to_string(), Vec::new()));
                self.lookup.insert(category.to_string(), self.sections.len() - 1);
                self.sections.len() - 1
            }
        };
        self.sections[slot].1.push(position);
        self.entries.push(entry);
    }

    /// Entries of one category in insertion order.
    ///
    /// The iterator is `Clone`, so it can be restarted without touching
    /// the log again.
    pub fn entries_of<'a>(
        &'a self,
        category: &str,
    ) -> impl Iterator<Item = &'a AuditEntry> + Clone + 'a {
        let positions: &'a [usize] = match self.lookup.get(category) {
            Some(&slot) => &self.sections[slot].1,
            None => &[],
        };
        positions.iter().map(move |&i| &self.entries[i])
    }

    /// Category names in first-append order
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
