//! Element context
//!
//! The analyzer-facing view of one element: structure, resolved behaviors
//! and styles, and the derived accessibility facts. Always computed fresh
//! from the element's resolved state — never cached — so it cannot go
//! stale against the graph it came from.

use axl_css::StyleRule;
use axl_dom::{ElementData, SourceLocation, accessible_label, is_focusable, role_of};
use axl_js::{ActionType, BehaviorRecord};

use crate::document::{DocumentGraph, ElementHandle};

const KEYBOARD_EVENTS: [&str; 3] = ["keydown", "keypress", "keyup"];

/// Derived view of one merged element.
#[derive(Debug)]
pub struct ElementContext<'a> {
    pub handle: ElementHandle,
    pub element: &'a ElementData,
    pub location: &'a SourceLocation,
    /// Resolved event-handler behaviors targeting this element.
    pub js_handlers: Vec<&'a BehaviorRecord>,
    /// Resolved style rules, highest specificity first.
    pub css_rules: Vec<&'a StyleRule>,
    pub focusable: bool,
    /// Any resolved behavior, or focusable.
    pub interactive: bool,
    pub has_click_handler: bool,
    pub has_keyboard_handler: bool,
    pub role: Option<String>,
    pub label: Option<String>,
}

impl<'a> ElementContext<'a> {
    pub(crate) fn derive(graph: &'a DocumentGraph, handle: ElementHandle) -> Option<Self> {
        let node = graph.element(handle)?;
        let element = node.as_element()?;
        let fragment = graph.fragment(handle.fragment)?;

        let behaviors = graph.behaviors_of(handle);
        let js_handlers: Vec<&BehaviorRecord> = behaviors
            .iter()
            .copied()
            .filter(|r| r.action_type == ActionType::EventHandler)
            .collect();
        let focusable = is_focusable(element);

        Some(Self {
            handle,
            element,
            location: &node.location,
            css_rules: graph.style_rules_of(handle),
            focusable,
            interactive: !behaviors.is_empty() || focusable,
            has_click_handler: graph.has_event(handle, &["click"]),
            has_keyboard_handler: graph.has_event(handle, &KEYBOARD_EVENTS),
            role: role_of(element),
            label: accessible_label(fragment, handle.node),
            js_handlers,
        })
    }

    /// Short diagnostic name: `button#submit`, `div.nav`, `span`.
    pub fn describe(&self) -> String {
        if let Some(id) = &self.element.id {
            format!("{}#{id}", self.element.tag_name)
        } else if let Some(class) = self.element.classes.first() {
            format!("{}.{class}", self.element.tag_name)
        } else {
            self.element.tag_name.clone()
        }
    }
}
