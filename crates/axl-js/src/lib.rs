//! AXL Behavior Graph
//!
//! UI behaviors extracted from one script file: event handlers, focus
//! changes, ARIA state changes, DOM manipulation, navigation. Each behavior
//! names its target element through a selector descriptor — a best-effort
//! CSS selector plus a human-readable binding label — never a node
//! reference, because the script file cannot see the markup files.

mod behavior;
mod extract;

pub use behavior::{ActionType, BehaviorGraph, BehaviorRecord, ElementRef};
pub use extract::BehaviorExtractor;
