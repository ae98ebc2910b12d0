// 🛡️ Service Boundary - Nothing escapes as an unhandled failure
// Every outcome becomes {success, data} or {success: false, error}.

use serde::Serialize;

use crate::audit::run_audit;
use crate::config::AuditConfig;
use crate::report::AuditReport;
use crate::source::{AdminSource, DateRange, ReportSource};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Parameters of one audit request, defaults applied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRequest {
    pub property_id: String,
    pub range: DateRange,
}

impl AuditRequest {
    /// Missing or blank dates fall back to the configured defaults
    pub fn new(
        property_id: impl Into<String>,
        start_date: Option<String>,
        end_date: Option<String>,
        config: &AuditConfig,
    ) -> Self {
        let pick = |value: Option<String>, default: String| match value {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => default,
        };
        let defaults = config.default_range();

        AuditRequest {
            property_id: property_id.into().trim().to_string(),
            range: DateRange::new(
                pick(start_date, defaults.start_date),
                pick(end_date, defaults.end_date),
            ),
        }
    }
}

/// Run an audit and fold any error into a tagged failure
pub fn run_audit_safely(
    reports: &dyn ReportSource,
    admin: &dyn AdminSource,
    config: &AuditConfig,
    request: &AuditRequest,
) -> ApiResponse<AuditReport> {
    match run_audit(reports, admin, config, &request.property_id, &request.range) {
        Ok(report) => ApiResponse::ok(report),
        Err(e) => {
            tracing::error!(property_id = %request.property_id, error = %format!("{:#}", e), "audit failed");
            ApiResponse::failure(format!("{:#}", e))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let config = AuditConfig::default();
        let request = AuditRequest::new(" 123 ", None, Some("  ".to_string()), &config);

        assert_eq!(request.property_id, "123");
        assert_eq!(request.range, DateRange::new("30daysAgo", "today"));
    }

    #[test]
    fn test_request_uses_configured_range() {
        let config = AuditConfig {
            start_date: "7daysAgo".to_string(),
            end_date: "yesterday".to_string(),
            ..AuditConfig::default()
        };

        let request = AuditRequest::new("123", None, Some("2024-01-31".to_string()), &config);
        assert_eq!(request.range, DateRange::new("7daysAgo", "2024-01-31"));
        assert_eq!(AuditRequest::new("123", None, None, &config).range, config.default_range());
    }

    #[test]
    fn test_failure_shape() {
        let response: ApiResponse<()> = ApiResponse::failure("boom");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_ok_shape() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));
    }
}
