//! AXL Engine — unified cross-file document model
//!
//! Merges independently-parsed fragments (element graphs, behavior graphs,
//! style graphs) contributed by any number of source files into one logical
//! page or workspace view. Cross-file association never uses object
//! references: behaviors name their targets through selector descriptors,
//! resolved here at merge time against each element's candidate-selector
//! set. The merged graph is immutable, exposes a read-only query surface to
//! analyzers, and carries a completeness score describing how much of the
//! true cross-file picture it captured.

mod confidence;
mod context;
mod document;
mod link;
mod source;

pub use confidence::Confidence;
pub use context::ElementContext;
pub use document::{DocumentGraph, ElementHandle, FragmentWarning};
pub use source::{Scope, SourceCollection, SourceFiles};

/// Document graph construction error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The cooperative cancellation flag was raised; nothing was published.
    #[error("document graph build cancelled")]
    Cancelled,
}
