// 🔌 Data Sources - What the audit consumes
// Report rows and property configuration come from injected collaborators.
// The engine never fetches anything itself.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quota::ConfigEntity;

// ============================================================================
// DATE RANGE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        DateRange {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::new("30daysAgo", "today")
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_date, self.end_date)
    }
}

// ============================================================================
// REPORT REQUEST / ROW
// ============================================================================

/// A named report query: dimensions x metrics over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub property: String,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub date_range: DateRange,
    pub limit: Option<usize>,
}

impl ReportRequest {
    pub fn new(property: &str, dimensions: &[&str], metrics: &[&str], date_range: &DateRange) -> Self {
        ReportRequest {
            property: property.to_string(),
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
            date_range: date_range.clone(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One row of a report, positionally aligned with the request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportRow {
    pub dimension_values: Vec<String>,
    pub metric_values: Vec<String>,
}

impl ReportRow {
    pub fn new(dimensions: &[&str], metrics: &[&str]) -> Self {
        ReportRow {
            dimension_values: dimensions.iter().map(|d| d.to_string()).collect(),
            metric_values: metrics.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Dimension at `index`, empty when the source returned a short row
    pub fn dimension(&self, index: usize) -> &str {
        self.dimension_values.get(index).map(String::as_str).unwrap_or("")
    }

    /// Metric at `index`, empty when the source returned a short row
    pub fn metric(&self, index: usize) -> &str {
        self.metric_values.get(index).map(String::as_str).unwrap_or("")
    }
}

// ============================================================================
// PROPERTY CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub display_name: String,
    pub time_zone: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    Web,
    Android,
    #[serde(rename = "iOS")]
    Ios,
    Unknown,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StreamKind::Web => "Web",
            StreamKind::Android => "Android",
            StreamKind::Ios => "iOS",
            StreamKind::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStream {
    /// Resource name, e.g. `properties/123/dataStreams/456`
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    pub kind: StreamKind,
}

impl DataStream {
    /// Check label used in the Streams section
    pub fn label(&self) -> String {
        let name = match self.display_name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => "Unnamed Stream",
        };
        format!("{} ({})", name, self.kind)
    }
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Anything that can answer a report query.
pub trait ReportSource {
    fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>>;
}

/// Property configuration accessors. Each call may fail independently.
pub trait AdminSource {
    fn property(&self, property: &str) -> Result<PropertyMetadata>;

    fn data_streams(&self, property: &str) -> Result<Vec<DataStream>>;

    /// Number of configured entities of one kind
    fn entity_count(&self, property: &str, entity: ConfigEntity) -> Result<usize>;

    /// Event data retention as the platform enum name, e.g. `FOURTEEN_MONTHS`
    fn data_retention(&self, property: &str) -> Result<String>;

    fn acknowledge_user_data_collection(&self, property: &str, acknowledgement: &str) -> Result<()>;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_row_reads_empty() {
        let row = ReportRow::new(&["T1"], &[]);
        assert_eq!(row.dimension(0), "T1");
        assert_eq!(row.dimension(3), "");
        assert_eq!(row.metric(0), "");
    }

    #[test]
    fn test_stream_label() {
        let named = DataStream {
            name: "properties/1/dataStreams/2".to_string(),
            display_name: Some("Main site".to_string()),
            kind: StreamKind::Web,
        };
        assert_eq!(named.label(), "Main site (Web)");

        let unnamed = DataStream {
            name: "properties/1/dataStreams/3".to_string(),
            display_name: Some(String::new()),
            kind: StreamKind::Ios,
        };
        assert_eq!(unnamed.label(), "Unnamed Stream (iOS)");
    }

    #[test]
    fn test_request_limit() {
        let request = ReportRequest::new("properties/1", &["eventName"], &["eventCount"], &DateRange::default())
            .with_limit(200);
        assert_eq!(request.limit, Some(200));
        assert_eq!(request.date_range.start_date, "30daysAgo");
    }
}
