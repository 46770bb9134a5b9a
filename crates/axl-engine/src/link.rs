//! Merge-time linking
//!
//! Candidate-selector synthesis and the three resolution passes: behaviors
//! to elements, style rules to elements, ARIA ID references across
//! fragments. Fragments stay immutable; every pass writes only derived
//! attachment tables keyed by element handle.

use std::collections::{HashMap, HashSet};

use axl_css::{Specificity, StyleGraph, StyleRule, parse_declaration_text};
use axl_dom::{ElementData, ElementGraph, Selector};
use axl_js::BehaviorGraph;

use crate::document::ElementHandle;

/// Attribute names whose values are space-separated element-ID references.
pub(crate) const ARIA_REF_ATTRS: [&str; 3] =
    ["aria-labelledby", "aria-describedby", "aria-controls"];

/// Index of a behavior record: (behavior graph, record).
pub(crate) type BehaviorKey = (usize, usize);
/// Index of a style rule: (style graph, rule).
pub(crate) type StyleKey = (usize, usize);

/// Derived attachment tables and reference counters produced by the merge.
#[derive(Debug, Default)]
pub(crate) struct LinkTables {
    pub behavior_links: HashMap<ElementHandle, Vec<BehaviorKey>>,
    pub style_links: HashMap<ElementHandle, Vec<StyleKey>>,
    /// Reference-resolution decisions that found a target.
    pub resolved: usize,
    /// Decisions that found none.
    pub unresolved: usize,
    /// Per-fragment ARIA reference stats, indexed like the fragments.
    pub fragment_refs: Vec<FragmentRefStats>,
}

/// ARIA references originating in one fragment.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FragmentRefStats {
    /// All ID references written in the fragment.
    pub total: usize,
    /// Those that resolve within the same fragment.
    pub local: usize,
}

/// Selector strings that could plausibly target an element.
///
/// Deliberately over-generates — `#id`, one `.class` per token, the bare
/// tag name, `[attr]` for every `aria-*` attribute and `[role="value"]` —
/// because a behavior's selector may arrive in any of these forms.
pub(crate) fn candidate_selectors(elem: &ElementData) -> HashSet<String> {
    let mut candidates = HashSet::new();
    if let Some(id) = &elem.id {
        candidates.insert(format!("#{id}"));
    }
    for class in &elem.classes {
        candidates.insert(format!(".{class}"));
    }
    candidates.insert(elem.tag_name.clone());
    for name in elem.attributes.keys() {
        if name.starts_with("aria-") {
            candidates.insert(format!("[{name}]"));
        }
    }
    if let Some(role) = elem.attr("role") {
        candidates.insert(format!("[role=\"{role}\"]"));
    }
    candidates
}

/// Resolve every behavior record's selector against the candidate sets.
///
/// Zero, one or many matches are all legal outcomes; ambiguity is recorded
/// as-is and feeds the completeness estimate.
pub(crate) fn resolve_behaviors(
    elements: &[(ElementHandle, HashSet<String>)],
    behaviors: &[BehaviorGraph],
    tables: &mut LinkTables,
) {
    for (gi, graph) in behaviors.iter().enumerate() {
        for (ri, record) in graph.records().iter().enumerate() {
            let selector = record.element_ref.selector.trim();
            let mut matched = false;
            if !selector.is_empty() {
                for (handle, candidates) in elements {
                    if candidates.contains(selector) {
                        tables
                            .behavior_links
                            .entry(*handle)
                            .or_default()
                            .push((gi, ri));
                        matched = true;
                    }
                }
            }
            if matched {
                tables.resolved += 1;
            } else {
                tables.unresolved += 1;
            }
        }
    }
}

/// Attach style rules to the elements their structural selector matches,
/// ordered so the first attached rule is the cascade winner for the
/// properties this engine inspects.
pub(crate) fn attach_styles(
    fragments: &[ElementGraph],
    elements: &[(ElementHandle, HashSet<String>)],
    styles: &[StyleGraph],
    tables: &mut LinkTables,
) {
    for (handle, _) in elements {
        let Some(elem) = fragments
            .get(handle.fragment)
            .and_then(|f| f.get(handle.node))
            .and_then(|n| n.as_element())
        else {
            continue;
        };

        let mut matches: Vec<(StyleKey, Specificity)> = Vec::new();
        for (si, graph) in styles.iter().enumerate() {
            for (ri, rule) in graph.rules().iter().enumerate() {
                let Some(parsed) = Selector::parse(&rule.structural_selector()) else {
                    continue;
                };
                if parsed.matches(elem) {
                    matches.push(((si, ri), rule.specificity));
                }
            }
        }
        // Highest specificity first; among equals the later rule in source
        // order wins, so it sorts first.
        matches.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
        if !matches.is_empty() {
            tables
                .style_links
                .insert(*handle, matches.into_iter().map(|(k, _)| k).collect());
        }
    }
}

/// Build one synthetic style graph from `style=""` attributes across all
/// fragments, returning it with the direct element links. Inline
/// declarations outrank any stylesheet rule.
pub(crate) fn inline_style_rules(
    fragments: &[ElementGraph],
) -> Option<(StyleGraph, Vec<(ElementHandle, usize)>)> {
    let mut graph = StyleGraph::new("<inline>");
    let mut links = Vec::new();

    for (fi, fragment) in fragments.iter().enumerate() {
        for node in fragment.all_elements() {
            let Some(elem) = fragment.get(node).and_then(|n| n.as_element()) else {
                continue;
            };
            let Some(style_text) = elem.attr("style") else {
                continue;
            };
            let properties = parse_declaration_text(style_text);
            if properties.is_empty() {
                continue;
            }
            let selector = elem
                .id
                .as_ref()
                .map(|id| format!("#{id}"))
                .unwrap_or_else(|| elem.tag_name.clone());
            let location = fragment
                .get(node)
                .map(|n| n.location.clone())
                .unwrap_or_default();
            links.push((ElementHandle { fragment: fi, node }, graph.len()));
            graph.push(StyleRule::with_specificity(
                &selector,
                Specificity::inline(),
                properties,
                location,
            ));
        }
    }

    if graph.is_empty() {
        None
    } else {
        Some((graph, links))
    }
}

/// Resolve `aria-labelledby` / `aria-describedby` / `aria-controls` ID
/// lists against every fragment, counting global and per-fragment results.
pub(crate) fn resolve_aria_references(fragments: &[ElementGraph], tables: &mut LinkTables) {
    tables.fragment_refs = vec![FragmentRefStats::default(); fragments.len()];

    for (fi, fragment) in fragments.iter().enumerate() {
        for node in fragment.all_elements() {
            let Some(elem) = fragment.get(node).and_then(|n| n.as_element()) else {
                continue;
            };
            for attr in ARIA_REF_ATTRS {
                let Some(value) = elem.attr(attr) else { continue };
                for id in value.split_whitespace() {
                    tables.fragment_refs[fi].total += 1;
                    let local = fragment.get_element_by_id(id).is_some();
                    let anywhere = local
                        || fragments
                            .iter()
                            .enumerate()
                            .any(|(oi, other)| oi != fi && other.get_element_by_id(id).is_some());
                    if local {
                        tables.fragment_refs[fi].local += 1;
                    }
                    if anywhere {
                        tables.resolved += 1;
                    } else {
                        tables.unresolved += 1;
                    }
                }
            }
        }
    }
}
