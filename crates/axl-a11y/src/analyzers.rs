//! Pattern analyzers
//!
//! Each analyzer reads only the document graph's query surface and the
//! derived element contexts. Unresolved references and duplicate IDs are
//! diagnosed here, not rejected by the merge layer: a linter has to accept
//! the pages it exists to criticize.

use std::collections::HashMap;

use axl_dom::tab_index;
use axl_engine::DocumentGraph;

use crate::findings::{Finding, Severity};

/// Run every analyzer, findings ordered by file and line.
pub fn analyze(graph: &DocumentGraph) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(click_without_keyboard(graph));
    findings.extend(focusable_without_label(graph));
    findings.extend(missing_alt_text(graph));
    findings.extend(duplicate_ids(graph));
    findings.extend(positive_tabindex(graph));
    findings.extend(broken_aria_references(graph));
    findings.extend(focus_outline_suppressed(graph));

    findings.sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
    tracing::debug!("{} finding(s) across all analyzers", findings.len());
    findings
}

/// Click handler with no keyboard equivalent anywhere in the merged view.
pub fn click_without_keyboard(graph: &DocumentGraph) -> Vec<Finding> {
    let (confidence, reason) = graph.confidence();
    graph
        .all_elements()
        .into_iter()
        .filter_map(|handle| graph.context(handle))
        .filter(|ctx| ctx.has_click_handler && !ctx.has_keyboard_handler)
        .map(|ctx| {
            Finding::new(
                "click-without-keyboard",
                Severity::Error,
                format!(
                    "{} handles click but no keyboard event; keyboard users cannot activate it",
                    ctx.describe()
                ),
                ctx.location,
                confidence,
                reason.clone(),
            )
        })
        .collect()
}

/// Focusable element without an accessible name.
pub fn focusable_without_label(graph: &DocumentGraph) -> Vec<Finding> {
    let (confidence, reason) = graph.confidence();
    graph
        .all_elements()
        .into_iter()
        .filter_map(|handle| graph.context(handle))
        .filter(|ctx| {
            ctx.focusable
                && ctx.label.is_none()
                && ctx.element.attr("type") != Some("hidden")
        })
        .map(|ctx| {
            Finding::new(
                "focusable-without-label",
                Severity::Error,
                format!(
                    "{} is focusable but has no accessible name",
                    ctx.describe()
                ),
                ctx.location,
                confidence,
                reason.clone(),
            )
        })
        .collect()
}

/// `<img>` without an `alt` attribute. An empty `alt=""` marks decorative
/// images and is fine.
pub fn missing_alt_text(graph: &DocumentGraph) -> Vec<Finding> {
    let (confidence, reason) = graph.confidence();
    graph
        .query_selector_all("img")
        .into_iter()
        .filter_map(|handle| {
            let elem = graph.element_data(handle)?;
            if elem.attr("alt").is_some() {
                return None;
            }
            let location = &graph.element(handle)?.location;
            Some(Finding::new(
                "missing-alt-text",
                Severity::Error,
                "img has no alt attribute".to_string(),
                location,
                confidence,
                reason.clone(),
            ))
        })
        .collect()
}

/// The same ID on more than one element across the merged fragments.
pub fn duplicate_ids(graph: &DocumentGraph) -> Vec<Finding> {
    let (confidence, reason) = graph.confidence();
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut findings = Vec::new();

    for handle in graph.all_elements() {
        let Some(elem) = graph.element_data(handle) else {
            continue;
        };
        let Some(id) = elem.id.clone() else { continue };
        let Some(node) = graph.element(handle) else {
            continue;
        };
        let here = format!("{}:{}", node.location.file, node.location.line);
        match seen.get(&id) {
            None => {
                seen.insert(id, here);
            }
            Some(first) => findings.push(Finding::new(
                "duplicate-id",
                Severity::Warning,
                format!("id \"{id}\" already used at {first}; lookups resolve to the first"),
                &node.location,
                confidence,
                reason.clone(),
            )),
        }
    }
    findings
}

/// `tabindex` above zero creates a parallel tab order that rarely matches
/// the visual one.
pub fn positive_tabindex(graph: &DocumentGraph) -> Vec<Finding> {
    let (confidence, reason) = graph.confidence();
    graph
        .all_elements()
        .into_iter()
        .filter_map(|handle| {
            let elem = graph.element_data(handle)?;
            let t = tab_index(elem)?;
            if t <= 0 {
                return None;
            }
            let location = &graph.element(handle)?.location;
            Some(Finding::new(
                "positive-tabindex",
                Severity::Warning,
                format!("tabindex={t} overrides the natural tab order"),
                location,
                confidence,
                reason.clone(),
            ))
        })
        .collect()
}

/// ARIA ID references that resolve nowhere in the merged graph.
pub fn broken_aria_references(graph: &DocumentGraph) -> Vec<Finding> {
    let (confidence, reason) = graph.confidence();
    let ref_attrs = ["aria-labelledby", "aria-describedby", "aria-controls"];
    let mut findings = Vec::new();

    for handle in graph.all_elements() {
        let Some(elem) = graph.element_data(handle) else {
            continue;
        };
        for attr in ref_attrs {
            let Some(value) = elem.attr(attr) else { continue };
            for id in value.split_whitespace() {
                if graph.get_element_by_id(id).is_none() {
                    let Some(node) = graph.element(handle) else {
                        continue;
                    };
                    findings.push(Finding::new(
                        "broken-aria-reference",
                        Severity::Error,
                        format!("{attr} references \"{id}\", which does not exist"),
                        &node.location,
                        confidence,
                        reason.clone(),
                    ));
                }
            }
        }
    }
    findings
}

/// A `:focus` rule that removes the outline without replacing it hides
/// keyboard position entirely.
pub fn focus_outline_suppressed(graph: &DocumentGraph) -> Vec<Finding> {
    let (confidence, reason) = graph.confidence();
    let mut findings = Vec::new();

    for style_graph in graph.style_graphs() {
        for rule in style_graph.rules() {
            let on_focus = rule
                .pseudo_classes()
                .iter()
                .any(|p| p == "focus" || p == "focus-visible");
            if !on_focus {
                continue;
            }
            let removes_outline = matches!(
                rule.property("outline").map(str::trim),
                Some("none") | Some("0")
            ) || matches!(rule.property("outline-style"), Some("none"))
                || matches!(rule.property("outline-width").map(str::trim), Some("0"));
            let replaces = rule.property("box-shadow").is_some_and(|v| v != "none");
            if removes_outline && !replaces {
                findings.push(Finding::new(
                    "focus-outline-suppressed",
                    Severity::Warning,
                    format!(
                        "\"{}\" removes the focus outline without a visible replacement",
                        rule.selector
                    ),
                    &rule.location,
                    confidence,
                    reason.clone(),
                ));
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use axl_engine::{Scope, SourceCollection};

    fn build(html: &str) -> DocumentGraph {
        DocumentGraph::build(
            &SourceCollection::new().with_html(html, "page.html"),
            Scope::Page,
        )
    }

    #[test]
    fn test_click_without_keyboard_spans_files() {
        let collection = SourceCollection::new()
            .with_html(r#"<button id="go">Go</button>"#, "page.html")
            .with_javascript(
                "document.getElementById('go').addEventListener('click', f);",
                "a.js",
            );
        let graph = DocumentGraph::build(&collection, Scope::Page);
        let findings = click_without_keyboard(&graph);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("button#go"));

        // A keyboard handler in a second file clears the finding.
        let collection = collection.with_javascript(
            "document.getElementById('go').addEventListener('keydown', f);",
            "b.js",
        );
        let graph = DocumentGraph::build(&collection, Scope::Page);
        assert!(click_without_keyboard(&graph).is_empty());
    }

    #[test]
    fn test_inline_onclick_counts_as_click_handler() {
        let graph = build(r#"<div onclick="go()">Go</div>"#);
        let findings = click_without_keyboard(&graph);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, "click-without-keyboard");
    }

    #[test]
    fn test_focusable_without_label() {
        let graph = build(r#"<input type="text"><button aria-label="Ok">x</button>"#);
        let findings = focusable_without_label(&graph);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("input"));
    }

    #[test]
    fn test_missing_alt() {
        let graph = build(r#"<img src="a.png"><img src="b.png" alt=""><img src="c.png" alt="C">"#);
        assert_eq!(missing_alt_text(&graph).len(), 1);
    }

    #[test]
    fn test_duplicate_ids() {
        let graph = build(r#"<p id="x">a</p><span id="x">b</span><em id="y">c</em>"#);
        let findings = duplicate_ids(&graph);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("\"x\""));
    }

    #[test]
    fn test_positive_tabindex() {
        let graph = build(r#"<div tabindex="2">x</div><div tabindex="0">y</div>"#);
        let findings = positive_tabindex(&graph);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("tabindex=2"));
    }

    #[test]
    fn test_broken_aria_reference() {
        let graph = build(r#"<button aria-labelledby="ghost">x</button>"#);
        let findings = broken_aria_references(&graph);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("ghost"));

        let graph = build(r#"<button aria-labelledby="l">x</button><span id="l">Send</span>"#);
        assert!(broken_aria_references(&graph).is_empty());
    }

    #[test]
    fn test_focus_outline_suppressed() {
        let collection = SourceCollection::new()
            .with_html("<button>x</button>", "page.html")
            .with_css(
                "button:focus { outline: none; }\n.safe:focus { outline: none; box-shadow: 0 0 0 2px blue; }",
                "app.css",
            );
        let graph = DocumentGraph::build(&collection, Scope::Page);
        let findings = focus_outline_suppressed(&graph);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("button:focus"));
    }

    #[test]
    fn test_analyze_sorts_and_annotates() {
        let graph = build(r#"<img src="x.png"><input type="text">"#);
        let findings = analyze(&graph);
        assert!(findings.len() >= 2);
        for f in &findings {
            assert!(!f.reason.is_empty());
        }
        for pair in findings.windows(2) {
            assert!((&pair[0].file, pair[0].line) <= (&pair[1].file, pair[1].line));
        }
    }
}
