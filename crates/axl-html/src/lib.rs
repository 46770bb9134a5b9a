//! AXL HTML Parser
//!
//! Parses HTML text into an element graph using html5ever's RcDom and
//! converting to the arena representation. html5ever recovers from almost
//! anything, so a parse failure here is rare; when it happens the caller
//! drops the fragment and carries on.

mod parser;

pub use parser::HtmlParser;

/// Markup parsing error.
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("cannot parse {file}: {message}")]
    Parse { file: String, message: String },
}
