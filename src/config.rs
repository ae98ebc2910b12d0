// ⚙️ Audit Configuration - Dates, scanned dimensions, row limits, server address
// Loaded from JSON; env vars override the file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuditError;
use crate::source::DateRange;

pub const DEFAULT_ACKNOWLEDGEMENT: &str = "I acknowledge that I have the necessary privacy disclosures and rights from my end users for the collection and processing of their data, including the association of such data with the visitation information Google Analytics collects from my site and/or app property.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub start_date: String,
    pub end_date: String,

    /// Free-text dimensions scanned for PII
    pub pii_dimensions: Vec<String>,

    pub event_inventory_limit: usize,
    pub pii_row_limit: usize,
    pub item_row_limit: usize,

    pub acknowledgement: String,

    pub bind_address: String,

    /// Replay fixture used instead of a live source
    pub fixture: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            start_date: "30daysAgo".to_string(),
            end_date: "today".to_string(),
            pii_dimensions: vec!["pagePath".to_string(), "pageLocation".to_string()],
            event_inventory_limit: 200,
            pii_row_limit: 100,
            item_row_limit: 1000,
            acknowledgement: DEFAULT_ACKNOWLEDGEMENT.to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            fixture: None,
        }
    }
}

impl AuditConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AuditConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// `AUDIT_CONFIG` file (if set), then `AUDIT_BIND` / `AUDIT_FIXTURE` overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("AUDIT_CONFIG") {
            Ok(path) => AuditConfig::from_file(path)?,
            Err(_) => AuditConfig::default(),
        };

        if let Ok(bind) = std::env::var("AUDIT_BIND") {
            config.bind_address = bind;
        }
        if let Ok(fixture) = std::env::var("AUDIT_FIXTURE") {
            config.fixture = Some(PathBuf::from(fixture));
        }

        Ok(config)
    }

    pub fn default_range(&self) -> DateRange {
        DateRange::new(self.start_date.clone(), self.end_date.clone())
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Accepts `YYYY-MM-DD`, `today`, `yesterday` and `NdaysAgo`
pub fn validate_date_token(token: &str) -> Result<(), AuditError> {
    if token == "today" || token == "yesterday" {
        return Ok(());
    }

    if let Some(days) = token.strip_suffix("daysAgo") {
        if !days.is_empty() && days.chars().all(|c| c.is_ascii_digit()) {
            return Ok(());
        }
    }

    if NaiveDate::parse_from_str(token, "%Y-%m-%d").is_ok() {
        return Ok(());
    }

    Err(AuditError::InvalidDateRange(token.to_string()))
}

pub fn validate_range(range: &DateRange) -> Result<(), AuditError> {
    validate_date_token(&range.start_date)?;
    validate_date_token(&range.end_date)?;

    // Two absolute dates must be in order
    if let (Ok(start), Ok(end)) = (
        NaiveDate::parse_from_str(&range.start_date, "%Y-%m-%d"),
        NaiveDate::parse_from_str(&range.end_date, "%Y-%m-%d"),
    ) {
        if start > end {
            return Err(AuditError::InvalidDateRange(range.to_string()));
        }
    }

    Ok(())
}

/// Numeric property id -> `properties/<id>`
pub fn property_resource(property_id: &str) -> Result<String, AuditError> {
    let id = property_id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuditError::InvalidPropertyId(property_id.to_string()));
    }
    Ok(format!("properties/{}", id))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();
        assert_eq!(config.start_date, "30daysAgo");
        assert_eq!(config.end_date, "today");
        assert_eq!(config.pii_dimensions, vec!["pagePath", "pageLocation"]);
        assert_eq!(config.item_row_limit, 1000);
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"start_date": "7daysAgo", "pii_dimensions": ["pagePath"]}}"#).unwrap();

        let config = AuditConfig::from_file(file.path()).unwrap();
        assert_eq!(config.start_date, "7daysAgo");
        assert_eq!(config.end_date, "today");
        assert_eq!(config.pii_dimensions, vec!["pagePath"]);
        assert_eq!(config.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AuditConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON"));
    }

    #[test]
    fn test_date_tokens() {
        assert!(validate_date_token("today").is_ok());
        assert!(validate_date_token("yesterday").is_ok());
        assert!(validate_date_token("30daysAgo").is_ok());
        assert!(validate_date_token("2025-01-31").is_ok());

        assert!(validate_date_token("daysAgo").is_err());
        assert!(validate_date_token("2025-02-30").is_err());
        assert!(validate_date_token("last week").is_err());
    }

    #[test]
    fn test_range_order() {
        assert!(validate_range(&DateRange::new("2025-01-01", "2025-01-31")).is_ok());
        assert!(validate_range(&DateRange::new("2025-02-01", "2025-01-31")).is_err());
        assert!(validate_range(&DateRange::new("30daysAgo", "today")).is_ok());
    }

    #[test]
    fn test_property_resource() {
        assert_eq!(property_resource("123456").unwrap(), "properties/123456");
        assert!(matches!(
            property_resource("abc"),
            Err(AuditError::InvalidPropertyId(_))
        ));
        assert!(property_resource("").is_err());
    }
}
