//! AXL Style Graph
//!
//! Style rules extracted from one stylesheet: selector text, a specificity
//! tuple for cascade ordering, and the property set relevant to
//! accessibility, with visibility/focus/contrast flags computed once at
//! parse time.

mod parser;
mod style;

pub use parser::{CssParser, parse_declaration_text};
pub use style::{Specificity, StyleGraph, StyleRule, compute_specificity, split_pseudo};

/// Stylesheet parsing error.
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("cannot parse stylesheet {file}: {message}")]
    Parse { file: String, message: String },
}
