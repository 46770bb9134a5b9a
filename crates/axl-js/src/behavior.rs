//! Behavior records
//!
//! Flat per-file collection with query helpers. No linking logic lives
//! here — resolving selectors against elements needs visibility across
//! files, which only the merged document view has.

use std::collections::HashMap;

use axl_dom::SourceLocation;

/// Kind of UI behavior a script performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    EventHandler,
    FocusChange,
    AriaStateChange,
    DomManipulation,
    Navigation,
}

/// Deferred reference to a target element.
///
/// `selector` is a best-effort CSS selector synthesized from the referenced
/// expression (`#submit`, `.nav-link`, a bare tag name, or empty when
/// nothing reasonable could be synthesized). `binding` is a human-readable
/// label — typically the variable or expression text — for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub selector: String,
    pub binding: String,
}

impl ElementRef {
    pub fn new(selector: &str, binding: &str) -> Self {
        Self {
            selector: selector.to_string(),
            binding: binding.to_string(),
        }
    }
}

/// One extracted behavior.
#[derive(Debug, Clone)]
pub struct BehaviorRecord {
    /// Graph-local identifier, assigned on insertion.
    pub id: u32,
    pub action_type: ActionType,
    pub element_ref: ElementRef,
    /// Event name, present for `ActionType::EventHandler`.
    pub event: Option<String>,
    /// Free-form extension bag (framework tag, API used, attribute touched).
    pub metadata: HashMap<String, String>,
    pub location: SourceLocation,
}

impl BehaviorRecord {
    pub fn new(action_type: ActionType, element_ref: ElementRef, location: SourceLocation) -> Self {
        Self {
            id: 0,
            action_type,
            element_ref,
            event: None,
            metadata: HashMap::new(),
            location,
        }
    }

    pub fn with_event(mut self, event: &str) -> Self {
        self.event = Some(event.to_ascii_lowercase());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// All behaviors extracted from one source file.
#[derive(Debug, Default)]
pub struct BehaviorGraph {
    source_file: String,
    records: Vec<BehaviorRecord>,
}

impl BehaviorGraph {
    pub fn new(source_file: &str) -> Self {
        Self {
            source_file: source_file.to_string(),
            records: Vec::new(),
        }
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Insert a record, assigning its graph-local id.
    pub fn push(&mut self, mut record: BehaviorRecord) {
        record.id = self.records.len() as u32;
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BehaviorRecord] {
        &self.records
    }

    pub fn find_by_selector(&self, selector: &str) -> Vec<&BehaviorRecord> {
        self.records
            .iter()
            .filter(|r| r.element_ref.selector == selector)
            .collect()
    }

    pub fn find_by_binding(&self, binding: &str) -> Vec<&BehaviorRecord> {
        self.records
            .iter()
            .filter(|r| r.element_ref.binding == binding)
            .collect()
    }

    pub fn find_by_action_type(&self, action_type: ActionType) -> Vec<&BehaviorRecord> {
        self.records
            .iter()
            .filter(|r| r.action_type == action_type)
            .collect()
    }

    /// Event-handler records for one event name.
    pub fn event_handlers(&self, event: &str) -> Vec<&BehaviorRecord> {
        self.records
            .iter()
            .filter(|r| {
                r.action_type == ActionType::EventHandler
                    && r.event.as_deref() == Some(event)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> BehaviorGraph {
        let loc = SourceLocation::file_only("app.js");
        let mut g = BehaviorGraph::new("app.js");
        g.push(
            BehaviorRecord::new(
                ActionType::EventHandler,
                ElementRef::new("#submit", "submitBtn"),
                loc.clone(),
            )
            .with_event("click"),
        );
        g.push(
            BehaviorRecord::new(
                ActionType::EventHandler,
                ElementRef::new("#submit", "submitBtn"),
                loc.clone(),
            )
            .with_event("keydown"),
        );
        g.push(BehaviorRecord::new(
            ActionType::FocusChange,
            ElementRef::new(".search", "searchBox"),
            loc,
        ));
        g
    }

    #[test]
    fn test_ids_assigned_in_order() {
        let g = graph();
        let ids: Vec<u32> = g.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, [0, 1, 2]);
    }

    #[test]
    fn test_queries() {
        let g = graph();
        assert_eq!(g.find_by_selector("#submit").len(), 2);
        assert_eq!(g.find_by_binding("searchBox").len(), 1);
        assert_eq!(g.find_by_action_type(ActionType::FocusChange).len(), 1);
        assert_eq!(g.event_handlers("click").len(), 1);
        assert_eq!(g.event_handlers("keydown").len(), 1);
        assert!(g.event_handlers("keyup").is_empty());
    }
}
