//! Structural accessibility heuristics
//!
//! Focusability, implicit ARIA roles and accessible-name synthesis, computed
//! from the element tree alone. Behavior-aware facts (click/keyboard handler
//! presence) belong to the merged document view.

use crate::graph::ElementGraph;
use crate::node::ElementData;
use crate::NodeId;

/// Parsed `tabindex` attribute, if present and numeric.
pub fn tab_index(elem: &ElementData) -> Option<i32> {
    elem.attr("tabindex")?.trim().parse().ok()
}

/// Whether the element can receive keyboard focus.
///
/// `tabindex >= 0` always wins; otherwise natively focusable tags count
/// unless disabled. An `<a>` is only focusable with an `href`.
pub fn is_focusable(elem: &ElementData) -> bool {
    if let Some(t) = tab_index(elem) {
        if t >= 0 {
            return true;
        }
    }
    let native = match elem.tag_name.as_str() {
        "a" => elem.attr("href").is_some(),
        "button" | "input" | "select" | "textarea" => true,
        _ => false,
    };
    native && !is_disabled(elem)
}

fn is_disabled(elem: &ElementData) -> bool {
    // Bare `disabled` parses as an empty value; "false" is the only opt-out.
    matches!(elem.attr("disabled"), Some(v) if v != "false")
}

/// Implicit ARIA role for a tag name, per the fixed mapping.
pub fn implicit_role(tag_name: &str) -> Option<&'static str> {
    Some(match tag_name {
        "button" => "button",
        "a" => "link",
        "input" | "textarea" => "textbox",
        "select" => "listbox",
        "nav" => "navigation",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "img" => "img",
        "main" => "main",
        "header" => "banner",
        "footer" => "contentinfo",
        "ul" | "ol" => "list",
        "li" => "listitem",
        "form" => "form",
        "table" => "table",
        _ => return None,
    })
}

/// Effective role: explicit `role` attribute, else the implicit table.
pub fn role_of(elem: &ElementData) -> Option<String> {
    if let Some(role) = elem.attr("role") {
        let role = role.trim();
        if !role.is_empty() {
            return Some(role.to_ascii_lowercase());
        }
    }
    implicit_role(&elem.tag_name).map(String::from)
}

/// Best-effort accessible name for the element.
///
/// `aria-labelledby` is reported as a placeholder carrying the referenced
/// IDs; the engine does not inline the referenced text, callers needing it
/// follow the reference themselves.
pub fn accessible_label(graph: &ElementGraph, id: NodeId) -> Option<String> {
    let elem = graph.get(id)?.as_element()?;

    if let Some(label) = non_empty(elem.attr("aria-label")) {
        return Some(label);
    }
    if let Some(ids) = non_empty(elem.attr("aria-labelledby")) {
        return Some(format!("[labelledby: {ids}]"));
    }
    let text = graph.child_text(id);
    if !text.is_empty() {
        return Some(text);
    }
    if elem.tag_name == "img" {
        if let Some(alt) = non_empty(elem.attr("alt")) {
            return Some(alt);
        }
    }
    if matches!(elem.tag_name.as_str(), "input" | "button") {
        if let Some(value) = non_empty(elem.attr("value")) {
            return Some(value);
        }
        if let Some(placeholder) = non_empty(elem.attr("placeholder")) {
            return Some(placeholder);
        }
    }
    None
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceLocation;

    fn elem(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
        let mut e = ElementData::new(tag);
        for (k, v) in attrs {
            e.set_attr(k, v);
        }
        e
    }

    #[test]
    fn test_focusable_native_tags() {
        assert!(is_focusable(&elem("button", &[])));
        assert!(is_focusable(&elem("input", &[])));
        assert!(is_focusable(&elem("select", &[])));
        assert!(is_focusable(&elem("textarea", &[])));
        assert!(!is_focusable(&elem("div", &[])));
        assert!(!is_focusable(&elem("span", &[])));
    }

    #[test]
    fn test_anchor_needs_href() {
        assert!(!is_focusable(&elem("a", &[])));
        assert!(is_focusable(&elem("a", &[("href", "/home")])));
    }

    #[test]
    fn test_tabindex_rules() {
        assert!(is_focusable(&elem("div", &[("tabindex", "0")])));
        assert!(is_focusable(&elem("div", &[("tabindex", "3")])));
        assert!(!is_focusable(&elem("div", &[("tabindex", "-1")])));
        assert!(!is_focusable(&elem("div", &[("tabindex", "abc")])));
    }

    #[test]
    fn test_disabled_suppresses_native_focus() {
        assert!(!is_focusable(&elem("button", &[("disabled", "true")])));
        assert!(!is_focusable(&elem("button", &[("disabled", "")])));
        assert!(is_focusable(&elem("button", &[("disabled", "false")])));
    }

    #[test]
    fn test_roles() {
        assert_eq!(role_of(&elem("button", &[])).as_deref(), Some("button"));
        assert_eq!(role_of(&elem("a", &[])).as_deref(), Some("link"));
        assert_eq!(role_of(&elem("h2", &[])).as_deref(), Some("heading"));
        assert_eq!(
            role_of(&elem("div", &[("role", "Tab")])).as_deref(),
            Some("tab")
        );
        assert_eq!(role_of(&elem("div", &[])), None);
    }

    #[test]
    fn test_label_priority() {
        let loc = SourceLocation::file_only("t.html");
        let mut g = ElementGraph::new("t.html");
        let b = g.create_element("button", loc.clone());
        g.add_root(b);
        let t = g.create_text("  Submit  ", loc.clone());
        g.append_child(b, t);

        // Text content is the fallback...
        assert_eq!(accessible_label(&g, b).as_deref(), Some("Submit"));
        // ...aria-label beats it...
        g.element_mut(b).unwrap().set_attr("aria-label", "Send form");
        assert_eq!(accessible_label(&g, b).as_deref(), Some("Send form"));
    }

    #[test]
    fn test_labelledby_placeholder() {
        let loc = SourceLocation::file_only("t.html");
        let mut g = ElementGraph::new("t.html");
        let b = g.create_element("button", loc);
        g.element_mut(b)
            .unwrap()
            .set_attr("aria-labelledby", "l1 l2");
        g.add_root(b);

        assert_eq!(
            accessible_label(&g, b).as_deref(),
            Some("[labelledby: l1 l2]")
        );
    }

    #[test]
    fn test_img_alt_and_input_value() {
        let loc = SourceLocation::file_only("t.html");
        let mut g = ElementGraph::new("t.html");
        let img = g.create_element("img", loc.clone());
        g.element_mut(img).unwrap().set_attr("alt", "Logo");
        g.add_root(img);
        assert_eq!(accessible_label(&g, img).as_deref(), Some("Logo"));

        let input = g.create_element("input", loc.clone());
        g.element_mut(input).unwrap().set_attr("placeholder", "Search");
        g.add_root(input);
        assert_eq!(accessible_label(&g, input).as_deref(), Some("Search"));

        let bare = g.create_element("input", loc);
        g.add_root(bare);
        assert_eq!(accessible_label(&g, bare), None);
    }
}
