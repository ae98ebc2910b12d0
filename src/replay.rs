// 📼 Replay Source - Recorded property data served from a JSON fixture
// Implements both collaborator traits so audits run without network access.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::quota::ConfigEntity;
use crate::source::{AdminSource, DataStream, PropertyMetadata, ReportRequest, ReportRow, ReportSource};

// ============================================================================
// FIXTURE FORMAT
// ============================================================================

/// Outcome of a recorded call: a value, or the error text it failed with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recorded<T> {
    Ok(T),
    Error(String),
}

impl<T: Clone> Recorded<T> {
    fn get(&self) -> Result<T> {
        match self {
            Recorded::Ok(value) => Ok(value.clone()),
            Recorded::Error(message) => Err(anyhow!(message.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedReport {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub result: Recorded<Vec<ReportRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub custom_dimensions: Recorded<usize>,
    pub custom_metrics: Recorded<usize>,
    pub key_events: Recorded<usize>,
    pub audiences: Recorded<usize>,
}

impl Default for EntityCounts {
    fn default() -> Self {
        EntityCounts {
            custom_dimensions: Recorded::Ok(0),
            custom_metrics: Recorded::Ok(0),
            key_events: Recorded::Ok(0),
            audiences: Recorded::Ok(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySource {
    /// Numeric id of the recorded property
    pub property_id: String,

    pub property: PropertyMetadata,

    #[serde(default = "empty_streams")]
    pub streams: Recorded<Vec<DataStream>>,

    #[serde(default)]
    pub entity_counts: EntityCounts,

    #[serde(default = "unrecorded_retention")]
    pub retention: Recorded<String>,

    #[serde(default = "acknowledged")]
    pub acknowledgement: Recorded<()>,

    #[serde(default)]
    pub reports: Vec<RecordedReport>,
}

fn empty_streams() -> Recorded<Vec<DataStream>> {
    Recorded::Ok(Vec::new())
}

fn unrecorded_retention() -> Recorded<String> {
    Recorded::Error("retention settings were not recorded".to_string())
}

fn acknowledged() -> Recorded<()> {
    Recorded::Ok(())
}

impl ReplaySource {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read fixture: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse fixture JSON")
    }

    fn resource(&self) -> String {
        format!("properties/{}", self.property_id)
    }

    fn check_property(&self, property: &str) -> Result<()> {
        if property != self.resource() {
            bail!("property {} not found in fixture (recorded: {})", property, self.resource());
        }
        Ok(())
    }
}

// ============================================================================
// COLLABORATOR IMPLS
// ============================================================================

impl ReportSource for ReplaySource {
    fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>> {
        self.check_property(&request.property)?;

        let recorded = self
            .reports
            .iter()
            .find(|r| r.dimensions == request.dimensions && r.metrics == request.metrics)
            .ok_or_else(|| {
                anyhow!(
                    "no recorded report for dimensions {:?} and metrics {:?}",
                    request.dimensions,
                    request.metrics
                )
            })?;

        let mut rows = recorded.result.get()?;
        if let Some(limit) = request.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}

impl AdminSource for ReplaySource {
    fn property(&self, property: &str) -> Result<PropertyMetadata> {
        self.check_property(property)?;
        Ok(self.property.clone())
    }

    fn data_streams(&self, property: &str) -> Result<Vec<DataStream>> {
        self.check_property(property)?;
        self.streams.get()
    }

    fn entity_count(&self, property: &str, entity: ConfigEntity) -> Result<usize> {
        self.check_property(property)?;
        let counts = &self.entity_counts;
        match entity {
            ConfigEntity::CustomDimensions => counts.custom_dimensions.get(),
            ConfigEntity::CustomMetrics => counts.custom_metrics.get(),
            ConfigEntity::KeyEvents => counts.key_events.get(),
            ConfigEntity::Audiences => counts.audiences.get(),
        }
    }

    fn data_retention(&self, property: &str) -> Result<String> {
        self.check_property(property)?;
        self.retention.get()
    }

    fn acknowledge_user_data_collection(&self, property: &str, acknowledgement: &str) -> Result<()> {
        self.check_property(property)?;
        if acknowledgement.trim().is_empty() {
            bail!("acknowledgement text is empty");
        }
        self.acknowledgement.get()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DateRange;
    use std::io::Write;

    const FIXTURE: &str = r#"{
        "property_id": "42",
        "property": {"display_name": "Shop", "time_zone": "UTC", "currency_code": "EUR"},
        "entity_counts": {
            "custom_dimensions": {"ok": 3},
            "custom_metrics": {"error": "permission denied"},
            "key_events": {"ok": 1},
            "audiences": {"ok": 0}
        },
        "retention": {"ok": "FOURTEEN_MONTHS"},
        "reports": [
            {
                "dimensions": ["eventName"],
                "metrics": ["eventCount"],
                "result": {"ok": [
                    {"dimension_values": ["page_view"], "metric_values": ["100"]},
                    {"dimension_values": ["purchase"], "metric_values": ["4"]}
                ]}
            },
            {
                "dimensions": ["pagePath"],
                "metrics": ["eventCount"],
                "result": {"error": "quota exceeded"}
            }
        ]
    }"#;

    fn load() -> ReplaySource {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();
        ReplaySource::from_file(file.path()).unwrap()
    }

    #[test]
    fn test_recorded_report_and_limit() {
        let source = load();
        let request = ReportRequest::new("properties/42", &["eventName"], &["eventCount"], &DateRange::default())
            .with_limit(1);

        let rows = source.run_report(&request).unwrap();
        assert_eq!(rows, vec![ReportRow::new(&["page_view"], &["100"])]);
    }

    #[test]
    fn test_recorded_errors_surface() {
        let source = load();
        let request = ReportRequest::new("properties/42", &["pagePath"], &["eventCount"], &DateRange::default());

        let err = source.run_report(&request).unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");

        let err = source
            .entity_count("properties/42", ConfigEntity::CustomMetrics)
            .unwrap_err();
        assert_eq!(err.to_string(), "permission denied");
    }

    #[test]
    fn test_unknown_report_and_property() {
        let source = load();
        let request = ReportRequest::new("properties/42", &["itemName"], &["itemRevenue"], &DateRange::default());
        assert!(source.run_report(&request).is_err());

        assert!(source.property("properties/7").is_err());
        assert_eq!(source.property("properties/42").unwrap().currency_code, "EUR");
    }

    #[test]
    fn test_defaults_for_unrecorded_sections() {
        let source = load();
        assert!(source.data_streams("properties/42").unwrap().is_empty());
        assert!(source
            .acknowledge_user_data_collection("properties/42", "I acknowledge")
            .is_ok());
        assert_eq!(source.data_retention("properties/42").unwrap(), "FOURTEEN_MONTHS");
    }
}
