//! AXL Accessibility Analyzers
//!
//! Pattern checks over the merged document graph. Each analyzer is a pure
//! function from the graph's read-only query surface to findings, and
//! every finding carries the graph's confidence label with a reason, so a
//! single-file pass reports risk instead of certainty.

mod analyzers;
mod findings;

pub use analyzers::{
    analyze, broken_aria_references, click_without_keyboard, duplicate_ids,
    focus_outline_suppressed, focusable_without_label, missing_alt_text, positive_tabindex,
};
pub use findings::{Finding, Severity};
