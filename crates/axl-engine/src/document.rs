//! Document graph
//!
//! Composes element, behavior and style fragments into one merged view.
//! Built once per analysis pass from an immutable source snapshot, merged
//! once, then queried any number of times; a re-analysis constructs a new
//! graph instead of mutating this one. After merge the graph is safe to
//! read from any number of threads.

use std::sync::atomic::{AtomicBool, Ordering};

use axl_css::{CssParser, StyleGraph, StyleRule};
use axl_dom::{ElementData, ElementGraph, Node, NodeId};
use axl_html::HtmlParser;
use axl_js::{ActionType, BehaviorExtractor, BehaviorGraph, BehaviorRecord};

use crate::context::ElementContext;
use crate::link::{self, LinkTables};
use crate::source::{Scope, SourceCollection};
use crate::{BuildError, confidence};

/// Reference to one element across the merged fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle {
    /// Index of the owning element fragment.
    pub fragment: usize,
    /// Node within that fragment.
    pub node: NodeId,
}

/// A fragment that could not be parsed and was omitted from the merge.
#[derive(Debug, Clone)]
pub struct FragmentWarning {
    pub file: String,
    pub message: String,
}

/// The unified cross-file document model.
#[derive(Debug)]
pub struct DocumentGraph {
    scope: Scope,
    fragments: Vec<ElementGraph>,
    behaviors: Vec<BehaviorGraph>,
    styles: Vec<StyleGraph>,
    warnings: Vec<FragmentWarning>,
    links: LinkTables,
    completeness: f64,
}

impl DocumentGraph {
    /// Parse every text in the collection and merge the resulting
    /// fragments. A fragment that fails to parse is dropped with a
    /// recorded warning; it never aborts the build.
    pub fn build(collection: &SourceCollection, scope: Scope) -> Self {
        match Self::build_inner(collection, scope, None) {
            Ok(graph) => graph,
            Err(BuildError::Cancelled) => unreachable!("no cancel flag was supplied"),
        }
    }

    /// `build`, checking a cooperative cancellation flag between
    /// per-fragment parse steps. A cancelled build publishes nothing.
    pub fn build_cancellable(
        collection: &SourceCollection,
        scope: Scope,
        cancel: &AtomicBool,
    ) -> Result<Self, BuildError> {
        Self::build_inner(collection, scope, Some(cancel))
    }

    fn build_inner(
        collection: &SourceCollection,
        scope: Scope,
        cancel: Option<&AtomicBool>,
    ) -> Result<Self, BuildError> {
        let check = |cancel: Option<&AtomicBool>| -> Result<(), BuildError> {
            match cancel {
                Some(flag) if flag.load(Ordering::Relaxed) => Err(BuildError::Cancelled),
                _ => Ok(()),
            }
        };

        let mut fragments = Vec::new();
        let mut behaviors = Vec::new();
        let mut styles = Vec::new();
        let mut warnings = Vec::new();

        if let Some(html) = &collection.html {
            check(cancel)?;
            let file = collection
                .source_files
                .html
                .as_deref()
                .unwrap_or("<inline>.html");
            match HtmlParser::new().parse(html, file) {
                Ok(graph) => fragments.push(graph),
                Err(e) => warnings.push(FragmentWarning {
                    file: file.to_string(),
                    message: e.to_string(),
                }),
            }
        }

        let extractor = BehaviorExtractor::new();
        for (i, text) in collection.javascript.iter().enumerate() {
            check(cancel)?;
            let fallback = format!("<script-{i}>.js");
            let file = collection
                .source_files
                .javascript
                .get(i)
                .map(String::as_str)
                .unwrap_or(&fallback);
            // Extraction is best-effort and never fails.
            behaviors.push(extractor.extract(text, file));
        }

        let css_parser = CssParser::new();
        for (i, text) in collection.css.iter().enumerate() {
            check(cancel)?;
            let fallback = format!("<style-{i}>.css");
            let file = collection
                .source_files
                .css
                .get(i)
                .map(String::as_str)
                .unwrap_or(&fallback);
            match css_parser.parse(text, file) {
                Ok(graph) => styles.push(graph),
                Err(e) => warnings.push(FragmentWarning {
                    file: file.to_string(),
                    message: e.to_string(),
                }),
            }
        }

        check(cancel)?;
        Ok(Self::merge(scope, fragments, behaviors, styles, warnings))
    }

    /// Merge already-parsed fragments. This is the entry point for callers
    /// with their own front-end parsers (templates, frameworks) or with
    /// fragments from many markup files.
    pub fn from_fragments(
        scope: Scope,
        fragments: Vec<ElementGraph>,
        behaviors: Vec<BehaviorGraph>,
        styles: Vec<StyleGraph>,
    ) -> Self {
        Self::merge(scope, fragments, behaviors, styles, Vec::new())
    }

    /// The linking pass. Pure: the same fragments always produce the same
    /// resolved graph.
    fn merge(
        scope: Scope,
        fragments: Vec<ElementGraph>,
        behaviors: Vec<BehaviorGraph>,
        mut styles: Vec<StyleGraph>,
        warnings: Vec<FragmentWarning>,
    ) -> Self {
        let mut links = LinkTables::default();

        // Candidate-selector sets, computed once per element.
        let mut elements: Vec<(ElementHandle, std::collections::HashSet<String>)> = Vec::new();
        for (fi, fragment) in fragments.iter().enumerate() {
            for node in fragment.all_elements() {
                if let Some(elem) = fragment.get(node).and_then(Node::as_element) {
                    elements.push((
                        ElementHandle { fragment: fi, node },
                        link::candidate_selectors(elem),
                    ));
                }
            }
        }

        link::resolve_behaviors(&elements, &behaviors, &mut links);

        link::attach_styles(&fragments, &elements, &styles, &mut links);

        // Inline `style=""` declarations become one synthetic style graph,
        // linked directly to the declaring element only. Inline specificity
        // outranks every stylesheet rule, so it heads the sorted list.
        if let Some((graph, rule_links)) = link::inline_style_rules(&fragments) {
            let graph_index = styles.len();
            styles.push(graph);
            for (handle, rule_index) in rule_links {
                links
                    .style_links
                    .entry(handle)
                    .or_default()
                    .insert(0, (graph_index, rule_index));
            }
        }

        link::resolve_aria_references(&fragments, &mut links);

        let completeness =
            confidence::completeness_score(fragments.len(), links.resolved, links.unresolved);

        tracing::debug!(
            "merged {} element fragment(s), {} behavior graph(s), {} style graph(s): \
             {} resolved / {} unresolved references, completeness {completeness:.2}",
            fragments.len(),
            behaviors.len(),
            styles.len(),
            links.resolved,
            links.unresolved,
        );

        Self {
            scope,
            fragments,
            behaviors,
            styles,
            warnings,
            links,
            completeness,
        }
    }

    // ------------------------------------------------------------------
    // Query surface (read-only)
    // ------------------------------------------------------------------

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn fragment(&self, index: usize) -> Option<&ElementGraph> {
        self.fragments.get(index)
    }

    pub fn fragments(&self) -> &[ElementGraph] {
        &self.fragments
    }

    pub fn behavior_graphs(&self) -> &[BehaviorGraph] {
        &self.behaviors
    }

    pub fn style_graphs(&self) -> &[StyleGraph] {
        &self.styles
    }

    /// Fragments that failed to parse and were omitted from the merge.
    pub fn warnings(&self) -> &[FragmentWarning] {
        &self.warnings
    }

    /// Completeness of the merged picture, in `[0.0, 1.0]`.
    pub fn tree_completeness(&self) -> f64 {
        self.completeness
    }

    pub fn resolved_references(&self) -> usize {
        self.links.resolved
    }

    pub fn unresolved_references(&self) -> usize {
        self.links.unresolved
    }

    /// True iff every ARIA ID reference originating in the fragment
    /// resolves within that same fragment.
    pub fn is_fragment_complete(&self, index: usize) -> bool {
        self.links
            .fragment_refs
            .get(index)
            .is_some_and(|s| s.local == s.total)
    }

    pub fn element(&self, handle: ElementHandle) -> Option<&Node> {
        self.fragments.get(handle.fragment)?.get(handle.node)
    }

    pub fn element_data(&self, handle: ElementHandle) -> Option<&ElementData> {
        self.element(handle)?.as_element()
    }

    /// Every element across every fragment, fragment by fragment in
    /// document order.
    pub fn all_elements(&self) -> Vec<ElementHandle> {
        self.fragments
            .iter()
            .enumerate()
            .flat_map(|(fi, fragment)| {
                fragment
                    .all_elements()
                    .into_iter()
                    .map(move |node| ElementHandle { fragment: fi, node })
            })
            .collect()
    }

    /// First element with the ID anywhere in the merged graph.
    pub fn get_element_by_id(&self, id: &str) -> Option<ElementHandle> {
        self.fragments.iter().enumerate().find_map(|(fi, f)| {
            f.get_element_by_id(id)
                .map(|node| ElementHandle { fragment: fi, node })
        })
    }

    pub fn query_selector(&self, selector: &str) -> Option<ElementHandle> {
        self.fragments.iter().enumerate().find_map(|(fi, f)| {
            f.query_selector(selector)
                .map(|node| ElementHandle { fragment: fi, node })
        })
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<ElementHandle> {
        self.fragments
            .iter()
            .enumerate()
            .flat_map(|(fi, f)| {
                f.query_selector_all(selector)
                    .into_iter()
                    .map(move |node| ElementHandle { fragment: fi, node })
            })
            .collect()
    }

    /// Behaviors resolved onto the element at merge time.
    pub fn behaviors_of(&self, handle: ElementHandle) -> Vec<&BehaviorRecord> {
        self.links
            .behavior_links
            .get(&handle)
            .map(|keys| {
                keys.iter()
                    .filter_map(|(gi, ri)| self.behaviors.get(*gi)?.records().get(*ri))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Style rules resolved onto the element, highest specificity first;
    /// `rules[0]` is the effective winner for the properties it sets.
    pub fn style_rules_of(&self, handle: ElementHandle) -> Vec<&StyleRule> {
        self.links
            .style_links
            .get(&handle)
            .map(|keys| {
                keys.iter()
                    .filter_map(|(gi, ri)| self.styles.get(*gi)?.rules().get(*ri))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Derive the analyzer-facing view of one element. Computed fresh on
    /// every call — a pure function of the element's resolved state.
    pub fn context(&self, handle: ElementHandle) -> Option<ElementContext<'_>> {
        ElementContext::derive(self, handle)
    }

    /// Elements with any resolved behavior, or focusable ones.
    pub fn interactive_elements(&self) -> Vec<ElementHandle> {
        self.all_elements()
            .into_iter()
            .filter(|h| {
                self.links.behavior_links.contains_key(h)
                    || self
                        .element_data(*h)
                        .is_some_and(axl_dom::is_focusable)
            })
            .collect()
    }

    /// Pre-filter for the two most common defect shapes: a click handler
    /// without a keyboard equivalent, and a focusable element without an
    /// accessible name.
    pub fn elements_with_issues(&self) -> Vec<ElementHandle> {
        self.all_elements()
            .into_iter()
            .filter(|h| {
                let Some(ctx) = self.context(*h) else {
                    return false;
                };
                (ctx.has_click_handler && !ctx.has_keyboard_handler)
                    || (ctx.focusable && ctx.label.is_none())
            })
            .collect()
    }

    /// True if any of `events` is handled on the element, either through a
    /// resolved behavior or an inline `onX` attribute the markup declares.
    pub(crate) fn has_event(&self, handle: ElementHandle, events: &[&str]) -> bool {
        let scripted = self.behaviors_of(handle).iter().any(|r| {
            r.action_type == ActionType::EventHandler
                && r.event.as_deref().is_some_and(|e| events.contains(&e))
        });
        if scripted {
            return true;
        }
        self.element_data(handle).is_some_and(|elem| {
            events
                .iter()
                .any(|e| elem.attr(&format!("on{e}")).is_some())
        })
    }
}
