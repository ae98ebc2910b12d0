use thiserror::Error;

/// Errors that end an audit run before a report exists.
///
/// Everything else a collaborator can fail at is logged as a finding.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("property {property} could not be loaded: {reason}")]
    PropertyUnavailable { property: String, reason: String },

    #[error("invalid date '{0}': expected YYYY-MM-DD, today, yesterday or NdaysAgo")]
    InvalidDateRange(String),

    #[error("invalid property id '{0}': expected a numeric id")]
    InvalidPropertyId(String),
}
