// 🧭 Audit Run - Fixed sequence of fetches feeding the engine
//
// Order: Settings, Streams, Limits, Event Inventory, PII, Transactions.
// Every fetch failure except property metadata becomes a finding.

use anyhow::Result;

use crate::audit_log::{categories, AuditLog, AuditValue};
use crate::config::{property_resource, validate_range, AuditConfig};
use crate::duplicates::{DuplicateDetector, DuplicateSummary, RevenueRow};
use crate::error::AuditError;
use crate::pii::PiiScanner;
use crate::quota::{ConfigEntity, QuotaClassifier};
use crate::reconciliation::{ItemRecord, ReconciliationEngine};
use crate::report::{AuditDetails, AuditReport, ReportAssembler};
use crate::source::{AdminSource, DateRange, ReportRequest, ReportSource};

/// Runs one audit against injected sources
pub struct Auditor<'a> {
    reports: &'a dyn ReportSource,
    admin: &'a dyn AdminSource,
    config: AuditConfig,
}

impl<'a> Auditor<'a> {
    pub fn new(reports: &'a dyn ReportSource, admin: &'a dyn AdminSource) -> Self {
        Auditor {
            reports,
            admin,
            config: AuditConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    /// Audit one property over one date range
    pub fn run(&self, property_id: &str, range: &DateRange) -> Result<AuditReport> {
        let property = property_resource(property_id)?;
        validate_range(range)?;

        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("audit_run", %run_id, property = %property, range = %range);
        let _guard = span.enter();

        let mut log = AuditLog::new();

        self.audit_settings(&property, &mut log)?;
        self.audit_streams(&property, &mut log);
        self.audit_limits(&property, &mut log);
        self.audit_events(&property, range, &mut log);
        self.audit_pii(&property, range, &mut log);
        let details = self.audit_transactions(&property, range, &mut log);

        tracing::info!(entries = log.len(), "audit run complete");
        Ok(ReportAssembler::assemble(&log, &details))
    }

    fn audit_settings(&self, property: &str, log: &mut AuditLog) -> Result<()> {
        // No property, no audit
        let metadata = self.admin.property(property).map_err(|e| AuditError::PropertyUnavailable {
            property: property.to_string(),
            reason: format!("{:#}", e),
        })?;

        log.append(categories::SETTINGS, "Display Name", metadata.display_name);
        log.append(categories::SETTINGS, "Time Zone", metadata.time_zone);
        log.append(categories::SETTINGS, "Currency", metadata.currency_code);

        let acknowledgement = match self
            .admin
            .acknowledge_user_data_collection(property, &self.config.acknowledgement)
        {
            Ok(()) => "✅ Acknowledged successfully.".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "acknowledgement failed");
                format!("❌ Failed to acknowledge: {}", e)
            }
        };
        log.append(categories::SETTINGS, "User Data Collection Acknowledgment", acknowledgement);

        let retention = match self.admin.data_retention(property) {
            Ok(raw) => retention_label(&raw),
            Err(e) => format!("Not available via API ({})", e),
        };
        log.append(categories::SETTINGS, "Retention Period", retention);

        Ok(())
    }

    fn audit_streams(&self, property: &str, log: &mut AuditLog) {
        match self.admin.data_streams(property) {
            Ok(streams) => {
                for stream in streams {
                    log.append(categories::STREAMS, stream.label(), stream.name);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "stream listing failed");
                log.append(categories::STREAMS, "Stream listing failed", e.to_string());
            }
        }
    }

    fn audit_limits(&self, property: &str, log: &mut AuditLog) {
        for entity in ConfigEntity::ALL {
            match self.admin.entity_count(property, entity) {
                Ok(used) => {
                    QuotaClassifier::classify(entity, used, log);
                }
                Err(e) => {
                    tracing::warn!(?entity, error = %e, "entity count failed");
                    QuotaClassifier::unavailable(entity, &e.to_string(), log);
                }
            }
        }
    }

    fn audit_events(&self, property: &str, range: &DateRange, log: &mut AuditLog) {
        let request = ReportRequest::new(property, &["eventName"], &["eventCount"], range)
            .with_limit(self.config.event_inventory_limit);

        match self.reports.run_report(&request) {
            Ok(rows) => {
                for row in &rows {
                    log.append(
                        categories::EVENT_INVENTORY,
                        row.dimension(0),
                        AuditValue::from_metric(row.metric(0)),
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "event inventory failed");
                log.append(categories::EVENT_INVENTORY, "Event inventory failed", e.to_string());
            }
        }
    }

    fn audit_pii(&self, property: &str, range: &DateRange, log: &mut AuditLog) {
        let mut scanner = PiiScanner::new();

        for dimension in &self.config.pii_dimensions {
            let request = ReportRequest::new(property, &[dimension.as_str()], &["eventCount"], range)
                .with_limit(self.config.pii_row_limit);

            match self.reports.run_report(&request) {
                Ok(rows) => {
                    scanner.scan(dimension, rows.iter().map(|r| r.dimension(0)), log);
                }
                Err(e) => scanner.scan_failed(dimension, &e.to_string(), log),
            }
        }

        scanner.finish(log);
    }

    fn audit_transactions(&self, property: &str, range: &DateRange, log: &mut AuditLog) -> AuditDetails {
        let revenue_request =
            ReportRequest::new(property, &RevenueRow::DIMENSIONS, &RevenueRow::METRICS, range);

        let revenue: Option<DuplicateSummary> = match self.reports.run_report(&revenue_request) {
            Ok(rows) => {
                let mut detector = DuplicateDetector::new();
                detector.observe_rows(&rows, log);
                Some(detector.finish(log))
            }
            Err(e) => {
                tracing::warn!(error = %e, "revenue report failed");
                log.append(categories::TRANSACTIONS, "Transaction-level check failed", e.to_string());
                None
            }
        };

        let item_request =
            ReportRequest::new(property, &ItemRecord::DIMENSIONS, &ItemRecord::METRICS, range)
                .with_limit(self.config.item_row_limit);

        let items: Option<ReconciliationEngine> = match self.reports.run_report(&item_request) {
            Ok(rows) => {
                let mut engine = ReconciliationEngine::new();
                engine.observe_rows(&rows, log);
                Some(engine)
            }
            Err(e) => {
                tracing::warn!(error = %e, "item report failed");
                log.append(categories::TRANSACTIONS, "Item-level check failed", e.to_string());
                None
            }
        };

        let mut details = AuditDetails::default();

        // A difference against a side that was never fetched means nothing
        if let (Some(summary), Some(engine)) = (&revenue, &items) {
            details.reconciliation = engine.reconcile(&summary.revenue_ids, log);
        }

        if let Some(summary) = revenue {
            details.transaction_mapping.extend(summary.records);
            details.duplicates = summary.duplicates;
        }
        if let Some(engine) = items {
            let (records, errors) = engine.into_parts();
            details.transaction_mapping.extend(records);
            details.item_errors = errors;
        }

        details
    }
}

/// `FOURTEEN_MONTHS` -> `Fourteen Months`
pub fn retention_label(raw: &str) -> String {
    raw.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Convenience used by the CLI and the server
pub fn run_audit(
    reports: &dyn ReportSource,
    admin: &dyn AdminSource,
    config: &AuditConfig,
    property_id: &str,
    range: &DateRange,
) -> Result<AuditReport> {
    Auditor::new(reports, admin)
        .with_config(config.clone())
        .run(property_id, range)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_label() {
        assert_eq!(retention_label("FOURTEEN_MONTHS"), "Fourteen Months");
        assert_eq!(retention_label("TWO_MONTHS"), "Two Months");
        assert_eq!(retention_label("RETENTION_DURATION_UNSPECIFIED"), "Retention Duration Unspecified");
    }
}
