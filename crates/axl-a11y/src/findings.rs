//! Findings
//!
//! The report-facing record of one detected defect.

use serde::Serialize;

use axl_dom::SourceLocation;
use axl_engine::Confidence;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// One detected accessibility defect.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Stable rule identifier, e.g. `click-without-keyboard`.
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// How much the merged picture backs this finding.
    pub confidence: Confidence,
    /// Why the confidence is what it is.
    pub reason: String,
}

impl Finding {
    pub fn new(
        rule: &'static str,
        severity: Severity,
        message: String,
        location: &SourceLocation,
        confidence: Confidence,
        reason: String,
    ) -> Self {
        Self {
            rule,
            severity,
            message,
            file: location.file.clone(),
            line: location.line,
            column: location.column,
            confidence,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
        assert_eq!(Severity::parse("WARNING"), Some(Severity::Warning));
        assert_eq!(Severity::parse("fatal"), None);
    }
}
