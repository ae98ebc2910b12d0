// 🕵️ PII Pattern Scanner - Flag personal data leaking into page paths and URLs
//
// A fixed disjunction of patterns. Every matching row is reported, repeats
// included, so the report shows how often a value leaks.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::audit_log::{categories, AuditLog};

pub const NO_PII_FOUND: &str = "✅ No potential PII found in page paths or URLs.";

// ============================================================================
// PATTERNS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PiiPattern {
    /// Address at a known webmail provider
    WebmailAddress,
    /// `email=`, `phone=` or `pno=` query fragments
    ContactParameter,
    /// `+<country code><10 digits>`, with the plus raw or URL-encoded
    CountryCodePhone,
    /// Any run of 10 digits, even inside a longer number or glued to letters
    TenDigitNumber,
}

static PATTERNS: LazyLock<Vec<(PiiPattern, Regex)>> = LazyLock::new(|| {
    vec![
        (
            PiiPattern::WebmailAddress,
            Regex::new(r"(?i)(?:gmail|googlemail|yahoo|hotmail|outlook|live|icloud|aol)\.com")
                .expect("webmail pattern is valid"),
        ),
        (
            PiiPattern::ContactParameter,
            Regex::new(r"(?i)(?:email|phone|pno)=").expect("contact parameter pattern is valid"),
        ),
        (
            PiiPattern::CountryCodePhone,
            Regex::new(r"(?i)(?:\+|%2B)\d{1,3}[\s-]?\d{10}").expect("phone pattern is valid"),
        ),
        (
            PiiPattern::TenDigitNumber,
            Regex::new(r"\d{10}").expect("digit pattern is valid"),
        ),
    ]
});

/// First pattern that matches `value`, if any
pub fn match_pattern(value: &str) -> Option<PiiPattern> {
    PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(value))
        .map(|(pattern, _)| *pattern)
}

// ============================================================================
// FINDING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PiiFinding {
    pub dimension: String,
    pub value: String,
    pub pattern: PiiPattern,
}

// ============================================================================
// SCANNER
// ============================================================================

/// Accumulates findings across dimensions for one audit run
#[derive(Debug, Default)]
pub struct PiiScanner {
    findings: Vec<PiiFinding>,
}

impl PiiScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every value of one dimension
    pub fn scan<'a, I>(&mut self, dimension: &str, values: I, log: &mut AuditLog) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let before = self.findings.len();

        for value in values {
            if let Some(pattern) = match_pattern(value) {
                log.append(
                    categories::PII,
                    format!("Potential PII in {}", dimension),
                    value,
                );
                self.findings.push(PiiFinding {
                    dimension: dimension.to_string(),
                    value: value.to_string(),
                    pattern,
                });
            }
        }

        self.findings.len() - before
    }

    /// A dimension's rows could not be fetched; the other dimensions still get scanned
    pub fn scan_failed(&mut self, dimension: &str, error: &str, log: &mut AuditLog) {
        tracing::warn!(dimension, error, "PII scan fetch failed");
        log.append(categories::PII, format!("{} scan failed", dimension), error);
    }

    /// Close the scan: a single summary entry when nothing was found
    pub fn finish(self, log: &mut AuditLog) -> Vec<PiiFinding> {
        if self.findings.is_empty() {
            log.append(categories::PII, "Scan Result", NO_PII_FOUND);
        }
        self.findings
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit_log::AuditValue;

    #[test]
    fn test_country_code_phone_matches() {
        assert_eq!(match_pattern("+919876543210"), Some(PiiPattern::CountryCodePhone));
        assert_eq!(match_pattern("/contact?ref=+44 7911123456"), Some(PiiPattern::CountryCodePhone));
        assert_eq!(match_pattern("/thanks?ref=%2B919876543210"), Some(PiiPattern::CountryCodePhone));
        assert_eq!(match_pattern("/thanks?ref=%2b919876543210"), Some(PiiPattern::CountryCodePhone));
    }

    #[test]
    fn test_plain_path_does_not_match() {
        assert_eq!(match_pattern("/blog/post-1"), None);
        assert_eq!(match_pattern("/products?id=12345"), None);
    }

    #[test]
    fn test_other_patterns() {
        assert_eq!(match_pattern("/signup?u=jane.doe@gmail.com"), Some(PiiPattern::WebmailAddress));
        assert_eq!(match_pattern("/thanks?Email=x"), Some(PiiPattern::ContactParameter));
        assert_eq!(match_pattern("/form?pno=1"), Some(PiiPattern::ContactParameter));
        assert_eq!(match_pattern("/order/9876543210"), Some(PiiPattern::TenDigitNumber));
        assert_eq!(match_pattern("/order/98765432101"), Some(PiiPattern::TenDigitNumber));
        assert_eq!(match_pattern("/checkout?mobile=919876543210"), Some(PiiPattern::TenDigitNumber));
        assert_eq!(match_pattern("/u/id9876543210"), Some(PiiPattern::TenDigitNumber));
        // nine digits stays below the threshold
        assert_eq!(match_pattern("/order/987654321"), None);
    }

    #[test]
    fn test_scan_flags_embedded_numbers() {
        let mut log = AuditLog::new();
        let mut scanner = PiiScanner::new();
        let values = [
            "/checkout?mobile=919876543210",
            "/thanks?ref=%2B919876543210",
            "/u/id9876543210",
            "/p?x=98765432101",
        ];

        assert_eq!(scanner.scan("pageLocation", values, &mut log), 4);
    }

    #[test]
    fn test_repeats_are_preserved() {
        let mut log = AuditLog::new();
        let mut scanner = PiiScanner::new();

        let found = scanner.scan("pagePath", ["/a?email=x", "/b", "/a?email=x"], &mut log);
        assert_eq!(found, 2);

        let findings = scanner.finish(&mut log);
        assert_eq!(findings.len(), 2);
        assert_eq!(log.entries_of(categories::PII).count(), 2);
    }

    #[test]
    fn test_summary_only_when_nothing_found() {
        let mut log = AuditLog::new();
        let mut scanner = PiiScanner::new();
        scanner.scan("pagePath", ["/", "/about"], &mut log);
        scanner.scan("pageLocation", ["https://example.com/"], &mut log);
        let findings = scanner.finish(&mut log);

        assert!(findings.is_empty());
        let entries: Vec<_> = log.entries_of(categories::PII).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].check, "Scan Result");
        assert_eq!(entries[0].result, AuditValue::text(NO_PII_FOUND));
    }

    #[test]
    fn test_failure_does_not_stop_other_dimensions() {
        let mut log = AuditLog::new();
        let mut scanner = PiiScanner::new();
        scanner.scan_failed("pagePath", "quota exceeded", &mut log);
        scanner.scan("pageLocation", ["https://example.com/?phone=1"], &mut log);
        let findings = scanner.finish(&mut log);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].dimension, "pageLocation");

        let checks: Vec<&str> = log
            .entries_of(categories::PII)
            .map(|e| e.check.as_str())
            .collect();
        assert_eq!(checks, vec!["pagePath scan failed", "Potential PII in pageLocation"]);
    }
}
