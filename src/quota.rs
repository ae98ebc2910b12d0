// 📏 Quota Classifier - Configuration usage against platform ceilings

use serde::{Deserialize, Serialize};

use crate::audit_log::{categories, AuditLog};

// ============================================================================
// CONFIG ENTITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigEntity {
    CustomDimensions,
    CustomMetrics,
    KeyEvents,
    Audiences,
}

impl ConfigEntity {
    /// Canonical order of the Limits section
    pub const ALL: [ConfigEntity; 4] = [
        ConfigEntity::CustomDimensions,
        ConfigEntity::CustomMetrics,
        ConfigEntity::KeyEvents,
        ConfigEntity::Audiences,
    ];

    /// Fixed platform ceiling
    pub fn limit(self) -> usize {
        match self {
            ConfigEntity::CustomDimensions => 50,
            ConfigEntity::CustomMetrics => 50,
            ConfigEntity::KeyEvents => 50,
            ConfigEntity::Audiences => 100,
        }
    }

    pub fn check_name(self) -> &'static str {
        match self {
            ConfigEntity::CustomDimensions => "Custom Dimensions Used",
            ConfigEntity::CustomMetrics => "Custom Metrics Used",
            ConfigEntity::KeyEvents => "Key Events Used",
            ConfigEntity::Audiences => "Audiences Used",
        }
    }
}

// ============================================================================
// QUOTA USAGE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    pub check_name: String,
    pub used: usize,
    pub limit: usize,
}

impl QuotaUsage {
    pub fn ratio(&self) -> String {
        format!("{} / {}", self.used, self.limit)
    }
}

// ============================================================================
// QUOTA CLASSIFIER
// ============================================================================

pub struct QuotaClassifier;

impl QuotaClassifier {
    /// Record `"<used> / <limit>"` under Limits. No thresholds are applied.
    pub fn classify(entity: ConfigEntity, used: usize, log: &mut AuditLog) -> QuotaUsage {
        let usage = QuotaUsage {
            check_name: entity.check_name().to_string(),
            used,
            limit: entity.limit(),
        };
        log.append(categories::LIMITS, usage.check_name.clone(), usage.ratio());
        usage
    }

    /// Record that a count could not be fetched
    pub fn unavailable(entity: ConfigEntity, reason: &str, log: &mut AuditLog) {
        log.append(
            categories::LIMITS,
            entity.check_name(),
            format!("Not available ({})", reason),
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
