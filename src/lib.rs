// Analytics Audit - Core Library
// Reconciliation & classification engine plus the plumbing used by the CLI and API server

pub mod audit_log;
pub mod source;
pub mod pii;
pub mod quota;
pub mod duplicates;
pub mod reconciliation;
pub mod report;
pub mod audit;
pub mod service;
pub mod config;
pub mod error;
pub mod replay;
pub mod export;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use audit_log::{categories, AuditEntry, AuditLog, AuditValue};
pub use source::{
    AdminSource, DataStream, DateRange, PropertyMetadata, ReportRequest, ReportRow, ReportSource,
    StreamKind,
};
pub use pii::{PiiFinding, PiiPattern, PiiScanner};
pub use quota::{ConfigEntity, QuotaClassifier, QuotaUsage};
pub use duplicates::{
    DuplicateDetector, DuplicateFinding, DuplicateSummary, RecordSource, RevenueRow,
    TransactionRecord,
};
pub use reconciliation::{
    is_unset, reconcile_sets, ItemError, ItemErrorKind, ItemRecord, ReconciliationEngine,
    ReconciliationResult,
};
pub use report::{AuditDetails, AuditReport, ReportAssembler, ReportSection};
pub use audit::{run_audit, Auditor};
pub use service::{run_audit_safely, ApiResponse, AuditRequest};
pub use config::AuditConfig;
pub use error::AuditError;
pub use replay::ReplaySource;
pub use export::write_csv_sheets;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
