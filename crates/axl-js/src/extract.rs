//! Behavior extraction from JS/TS source
//!
//! Lexical, best-effort and never-failing: the extractor scans source text
//! for the DOM APIs that matter to accessibility and synthesizes a selector
//! descriptor for each hit. When no reasonable selector can be synthesized
//! it emits an empty selector rather than dropping the record.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use axl_dom::{SourceLocation, line_col};

use crate::behavior::{ActionType, BehaviorGraph, BehaviorRecord, ElementRef};

/// Receiver expression: a dotted identifier chain, optionally ending in a
/// single string-literal call (`document.getElementById('x')`).
const RECV: &str = r#"[\w$]+(?:\.[\w$]+)*(?:\(\s*['"][^'"]*['"]\s*\))?"#;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new(&$re).unwrap());
    };
}

pattern!(
    BINDING,
    format!(
        r#"(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*document\.(getElementById|querySelector|querySelectorAll|getElementsByClassName|getElementsByTagName)\(\s*['"]([^'"]+)['"]"#
    )
);
pattern!(
    ADD_LISTENER,
    format!(r#"({RECV})\.addEventListener\(\s*['"]([\w-]+)['"]"#)
);
pattern!(ON_ASSIGN, format!(r#"({RECV})\.on([a-z]+)\s*=\s*[^=\s]"#));
pattern!(
    JQUERY_ON,
    format!(r#"[$]\(\s*['"]([^'"]+)['"]\s*\)\.on\(\s*['"]([\w-]+)['"]"#)
);
pattern!(FOCUS_CALL, format!(r#"({RECV})\.(focus|blur)\(\s*\)"#));
pattern!(
    SET_ATTRIBUTE,
    format!(r#"({RECV})\.setAttribute\(\s*['"]([\w-]+)['"]"#)
);
pattern!(ARIA_PROP, format!(r#"({RECV})\.aria([A-Z]\w*)\s*=\s*[^=\s]"#));
pattern!(
    CONTENT_ASSIGN,
    format!(r#"({RECV})\.(innerHTML|outerHTML|textContent)\s*=\s*[^=\s]"#)
);
pattern!(
    CLASS_LIST,
    format!(r#"({RECV})\.classList\.(add|remove|toggle)\("#)
);
pattern!(
    CHILD_OP,
    format!(r#"({RECV})\.(appendChild|removeChild|replaceChild|insertBefore)\("#)
);
pattern!(
    NAVIGATION,
    format!(
        r#"(?:window\.)?location\.(?:href\s*=\s*[^=\s]|assign\(|replace\()|history\.(?:pushState|replaceState)\(|window\.open\("#
    )
);

/// Lexical behavior extractor for plain JS/TS sources.
#[derive(Debug, Default)]
pub struct BehaviorExtractor;

impl BehaviorExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every recognizable behavior from `source`. Never fails;
    /// unrecognized code is simply not reported.
    pub fn extract(&self, source: &str, file: &str) -> BehaviorGraph {
        let mut graph = BehaviorGraph::new(file);
        let bindings = collect_bindings(source);

        for caps in ADD_LISTENER.captures_iter(source) {
            let target = element_ref_for(&caps[1], &bindings);
            graph.push(
                BehaviorRecord::new(
                    ActionType::EventHandler,
                    target,
                    at(source, file, &caps),
                )
                .with_event(&caps[2])
                .with_metadata("api", "addEventListener"),
            );
        }
        for caps in ON_ASSIGN.captures_iter(source) {
            let target = element_ref_for(&caps[1], &bindings);
            graph.push(
                BehaviorRecord::new(
                    ActionType::EventHandler,
                    target,
                    at(source, file, &caps),
                )
                .with_event(&caps[2])
                .with_metadata("api", "property"),
            );
        }
        for caps in JQUERY_ON.captures_iter(source) {
            graph.push(
                BehaviorRecord::new(
                    ActionType::EventHandler,
                    ElementRef::new(&caps[1], &caps[1]),
                    at(source, file, &caps),
                )
                .with_event(&caps[2])
                .with_metadata("framework", "jquery"),
            );
        }
        for caps in FOCUS_CALL.captures_iter(source) {
            let target = element_ref_for(&caps[1], &bindings);
            graph.push(
                BehaviorRecord::new(ActionType::FocusChange, target, at(source, file, &caps))
                    .with_metadata("call", &caps[2]),
            );
        }
        for caps in SET_ATTRIBUTE.captures_iter(source) {
            let target = element_ref_for(&caps[1], &bindings);
            let attr = caps[2].to_ascii_lowercase();
            let action = if attr.starts_with("aria-") {
                ActionType::AriaStateChange
            } else {
                ActionType::DomManipulation
            };
            graph.push(
                BehaviorRecord::new(action, target, at(source, file, &caps))
                    .with_metadata("attribute", &attr),
            );
        }
        for caps in ARIA_PROP.captures_iter(source) {
            let target = element_ref_for(&caps[1], &bindings);
            graph.push(
                BehaviorRecord::new(
                    ActionType::AriaStateChange,
                    target,
                    at(source, file, &caps),
                )
                .with_metadata("attribute", &aria_property_to_attribute(&caps[2])),
            );
        }
        for caps in CONTENT_ASSIGN.captures_iter(source) {
            let target = element_ref_for(&caps[1], &bindings);
            graph.push(
                BehaviorRecord::new(
                    ActionType::DomManipulation,
                    target,
                    at(source, file, &caps),
                )
                .with_metadata("property", &caps[2]),
            );
        }
        for caps in CLASS_LIST.captures_iter(source) {
            let target = element_ref_for(&caps[1], &bindings);
            graph.push(
                BehaviorRecord::new(
                    ActionType::DomManipulation,
                    target,
                    at(source, file, &caps),
                )
                .with_metadata("classlist", &caps[2]),
            );
        }
        for caps in CHILD_OP.captures_iter(source) {
            let target = element_ref_for(&caps[1], &bindings);
            graph.push(
                BehaviorRecord::new(
                    ActionType::DomManipulation,
                    target,
                    at(source, file, &caps),
                )
                .with_metadata("call", &caps[2]),
            );
        }
        for m in NAVIGATION.find_iter(source) {
            let (line, column) = line_col(source, m.start());
            graph.push(BehaviorRecord::new(
                ActionType::Navigation,
                ElementRef::new(
                    "",
                    m.as_str()
                        .trim_end_matches(|c: char| !c.is_ascii_alphanumeric()),
                ),
                SourceLocation::new(file, line, column),
            ));
        }

        tracing::debug!(
            "extracted {} behaviors from {} ({} bindings)",
            graph.len(),
            file,
            bindings.len()
        );
        graph
    }
}

fn at(source: &str, file: &str, caps: &regex::Captures<'_>) -> SourceLocation {
    let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
    let (line, column) = line_col(source, start);
    SourceLocation::new(file, line, column)
}

/// First pass: `const btn = document.getElementById('go')` style variable
/// bindings, so later `btn.addEventListener(...)` resolves to `#go`.
fn collect_bindings(source: &str) -> HashMap<String, String> {
    let mut bindings = HashMap::new();
    for caps in BINDING.captures_iter(source) {
        if let Some(selector) = synthesize_selector(&caps[2], &caps[3]) {
            bindings.insert(caps[1].to_string(), selector);
        }
    }
    bindings
}

fn synthesize_selector(method: &str, literal: &str) -> Option<String> {
    match method {
        "getElementById" => Some(format!("#{literal}")),
        "querySelector" | "querySelectorAll" => Some(literal.to_string()),
        "getElementsByClassName" => Some(format!(".{literal}")),
        "getElementsByTagName" => Some(literal.to_ascii_lowercase()),
        _ => None,
    }
}

/// Turn a receiver expression into a selector descriptor.
fn element_ref_for(recv: &str, bindings: &HashMap<String, String>) -> ElementRef {
    // Inline lookup call: the string literal is the selector source.
    for method in [
        "getElementById",
        "querySelectorAll",
        "querySelector",
        "getElementsByClassName",
        "getElementsByTagName",
    ] {
        if recv.contains(&format!("{method}(")) {
            if let Some(literal) = quoted_literal(recv) {
                if let Some(selector) = synthesize_selector(method, &literal) {
                    return ElementRef::new(&selector, recv);
                }
            }
        }
    }
    // Plain identifier: resolve through the binding table when possible.
    if !recv.contains('.') && !recv.contains('(') {
        if let Some(selector) = bindings.get(recv) {
            return ElementRef::new(selector, recv);
        }
        return ElementRef::new("", recv);
    }
    ElementRef::new("", recv)
}

fn quoted_literal(expr: &str) -> Option<String> {
    let open = expr.find(['\'', '"'])?;
    let quote = expr.as_bytes()[open] as char;
    let rest = &expr[open + 1..];
    let close = rest.find(quote)?;
    Some(rest[..close].to_string())
}

/// `ariaValueNow` -> `aria-valuenow` (DOM reflection drops the camel hump).
fn aria_property_to_attribute(property: &str) -> String {
    format!("aria-{}", property.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(src: &str) -> BehaviorGraph {
        BehaviorExtractor::new().extract(src, "app.js")
    }

    #[test]
    fn test_inline_get_element_by_id_listener() {
        let g = extract("document.getElementById('submit').addEventListener('click', onClick);");
        assert_eq!(g.len(), 1);
        let r = &g.records()[0];
        assert_eq!(r.action_type, ActionType::EventHandler);
        assert_eq!(r.element_ref.selector, "#submit");
        assert_eq!(r.event.as_deref(), Some("click"));
    }

    #[test]
    fn test_binding_resolution() {
        let src = r#"
            const btn = document.getElementById('go');
            btn.addEventListener('keydown', onKey);
        "#;
        let g = extract(src);
        assert_eq!(g.len(), 1);
        assert_eq!(g.records()[0].element_ref.selector, "#go");
        assert_eq!(g.records()[0].element_ref.binding, "btn");
        assert_eq!(g.records()[0].location.line, 3);
    }

    #[test]
    fn test_query_selector_literal_kept() {
        let g = extract("document.querySelector('.nav-link').addEventListener('click', f);");
        assert_eq!(g.records()[0].element_ref.selector, ".nav-link");
    }

    #[test]
    fn test_on_property_assignment() {
        let g = extract("menu.onclick = toggleMenu;");
        let r = &g.records()[0];
        assert_eq!(r.action_type, ActionType::EventHandler);
        assert_eq!(r.event.as_deref(), Some("click"));
        assert_eq!(r.element_ref.binding, "menu");
        assert_eq!(r.element_ref.selector, "");
        assert_eq!(r.metadata.get("api").map(String::as_str), Some("property"));
    }

    #[test]
    fn test_comparison_is_not_an_assignment() {
        assert!(extract("if (el.onclick == null) {}").is_empty());
        assert!(extract("if (el.onclick === fn) {}").is_empty());
    }

    #[test]
    fn test_jquery_on() {
        let g = extract("$('.dropdown').on('click', open);");
        let r = &g.records()[0];
        assert_eq!(r.element_ref.selector, ".dropdown");
        assert_eq!(r.event.as_deref(), Some("click"));
        assert_eq!(
            r.metadata.get("framework").map(String::as_str),
            Some("jquery")
        );
    }

    #[test]
    fn test_focus_and_blur() {
        let src = r#"
            const field = document.querySelector('#email');
            field.focus();
        "#;
        let g = extract(src);
        let focus = g.find_by_action_type(ActionType::FocusChange);
        assert_eq!(focus.len(), 1);
        assert_eq!(focus[0].element_ref.selector, "#email");
    }

    #[test]
    fn test_aria_set_attribute_vs_plain() {
        let src = r#"
            toggle.setAttribute('aria-expanded', 'true');
            box.setAttribute('data-open', 'true');
        "#;
        let g = extract(src);
        assert_eq!(g.find_by_action_type(ActionType::AriaStateChange).len(), 1);
        assert_eq!(g.find_by_action_type(ActionType::DomManipulation).len(), 1);
        let aria = g.find_by_action_type(ActionType::AriaStateChange)[0];
        assert_eq!(
            aria.metadata.get("attribute").map(String::as_str),
            Some("aria-expanded")
        );
    }

    #[test]
    fn test_aria_reflection_property() {
        let g = extract("toggle.ariaExpanded = 'true';");
        let r = &g.records()[0];
        assert_eq!(r.action_type, ActionType::AriaStateChange);
        assert_eq!(
            r.metadata.get("attribute").map(String::as_str),
            Some("aria-expanded")
        );
    }

    #[test]
    fn test_dom_manipulation_forms() {
        let src = r#"
            panel.innerHTML = markup;
            panel.classList.toggle('open');
            list.appendChild(item);
        "#;
        let g = extract(src);
        assert_eq!(g.find_by_action_type(ActionType::DomManipulation).len(), 3);
    }

    #[test]
    fn test_navigation() {
        let src = r#"
            window.location.href = '/next';
            history.pushState({}, '', '/deep');
            window.open('/popup');
        "#;
        let g = extract(src);
        assert_eq!(g.find_by_action_type(ActionType::Navigation).len(), 3);
    }

    #[test]
    fn test_unbound_identifier_gets_empty_selector() {
        let g = extract("mystery.addEventListener('click', f);");
        let r = &g.records()[0];
        assert_eq!(r.element_ref.selector, "");
        assert_eq!(r.element_ref.binding, "mystery");
    }

    #[test]
    fn test_garbage_input_never_fails() {
        let g = extract("this is not javascript at all {{{ ((( ");
        assert!(g.is_empty());
    }
}
