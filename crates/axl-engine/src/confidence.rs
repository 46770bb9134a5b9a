//! Completeness and confidence
//!
//! Quantifies how much of the real cross-file picture a document graph
//! captured, so analyzers can report risk-adjusted findings instead of
//! asserting certainty they don't have. Findings are never dropped on low
//! confidence — only annotated.

use serde::Serialize;

use crate::document::DocumentGraph;
use crate::source::Scope;

/// Per-issue confidence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Completeness of a merged graph, in `[0.0, 1.0]`.
///
/// Base score by element-fragment count: zero fragments mean nothing was
/// seen; exactly one is mostly self-contained but unproven against the
/// rest of the project; each further fragment is a further opportunity for
/// an unresolved reference. The resolution rate over every linking
/// decision then buys back up to 0.3.
pub(crate) fn completeness_score(fragments: usize, resolved: usize, unresolved: usize) -> f64 {
    let base = match fragments {
        0 => 0.0,
        1 => 0.7,
        n => (1.0 - 0.1 * n as f64).max(0.3),
    };
    let attempts = resolved + unresolved;
    let adjusted = if attempts == 0 {
        base
    } else {
        base + (resolved as f64 / attempts as f64) * 0.3
    };
    adjusted.clamp(0.0, 1.0)
}

impl DocumentGraph {
    /// Confidence label for findings on this graph, with a human-readable
    /// reason.
    pub fn confidence(&self) -> (Confidence, String) {
        let completeness = self.tree_completeness();
        let unresolved = self.unresolved_references();
        let resolved = self.resolved_references();
        let fragments = self.fragment_count();

        let broad = matches!(self.scope(), Scope::Page | Scope::Workspace);
        if completeness >= 0.9 || (broad && unresolved == 0) {
            let reason = if unresolved == 0 {
                format!(
                    "all {resolved} cross-file reference(s) resolved across {fragments} fragment(s)"
                )
            } else {
                format!("completeness {completeness:.2} with {unresolved} unresolved reference(s)")
            };
            return (Confidence::High, reason);
        }

        if self.scope() == Scope::File {
            return (
                Confidence::Medium,
                "single file, cross-file handlers not visible".to_string(),
            );
        }
        if completeness >= 0.5 {
            return (
                Confidence::Medium,
                format!(
                    "completeness {completeness:.2}: {unresolved} of {} reference(s) unresolved",
                    resolved + unresolved
                ),
            );
        }

        (
            Confidence::Low,
            format!(
                "completeness {completeness:.2}: {fragments} fragment(s), {unresolved} unresolved reference(s)"
            ),
        )
    }
}
