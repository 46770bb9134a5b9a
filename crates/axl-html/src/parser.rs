//! HTML to element-graph conversion
//!
//! Uses html5ever's built-in RcDom and converts to the arena format. RcDom
//! carries no source spans, so locations are assigned afterwards by an
//! ordered scan of the raw text; they are best-effort diagnostics, never
//! identity.

use axl_dom::{ElementGraph, NodeId, SourceLocation, line_col};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

/// HTML parser.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML text into one element graph.
    pub fn parse(&self, html: &str, file: &str) -> Result<ElementGraph, HtmlError> {
        tracing::debug!("parsing markup fragment: {file}");

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .map_err(|e| HtmlError::Parse {
                file: file.to_string(),
                message: e.to_string(),
            })?;

        let mut graph = ElementGraph::new(file);
        convert_node(&dom.document, &mut graph, None, file);
        assign_locations(&mut graph, html, file);

        tracing::debug!("parsed {} nodes from {file}", graph.len());
        Ok(graph)
    }
}

/// Convert one RcDom node (and its subtree) into the graph.
fn convert_node(handle: &Handle, graph: &mut ElementGraph, parent: Option<NodeId>, file: &str) {
    match &handle.data {
        RcNodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert_node(child, graph, parent, file);
            }
        }
        RcNodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_string();
            let id = graph.create_element(&tag, SourceLocation::file_only(file));
            {
                let elem = graph.element_mut(id).expect("just created an element");
                for attr in attrs.borrow().iter() {
                    elem.set_attr(&attr.name.local, &attr.value);
                }
            }
            attach(graph, parent, id);
            for child in handle.children.borrow().iter() {
                convert_node(child, graph, Some(id), file);
            }
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                let id = graph.create_text(&text, SourceLocation::file_only(file));
                attach(graph, parent, id);
            }
        }
        RcNodeData::Comment { contents } => {
            let id = graph.create_comment(&contents.to_string(), SourceLocation::file_only(file));
            attach(graph, parent, id);
        }
        // Doctype and processing instructions carry nothing the analysis
        // reads.
        _ => {}
    }
}

fn attach(graph: &mut ElementGraph, parent: Option<NodeId>, id: NodeId) {
    match parent {
        Some(p) => graph.append_child(p, id),
        None => graph.add_root(id),
    }
}

/// Walk nodes in document order, locating each in the raw text with a
/// forward-only cursor. Synthesized elements (html5ever inserts `<html>`,
/// `<head>`, `<body>` even when absent) keep a file-only location.
fn assign_locations(graph: &mut ElementGraph, html: &str, file: &str) {
    let lower = html.to_ascii_lowercase();
    let mut cursor = 0usize;

    for id in graph.all_nodes() {
        let (needle, is_text, is_element) = {
            let Some(node) = graph.get(id) else { continue };
            let needle = match &node.data {
                axl_dom::NodeData::Element(e) => Some(format!("<{}", e.tag_name)),
                axl_dom::NodeData::Comment(_) => Some("<!--".to_string()),
                axl_dom::NodeData::Text(t) => {
                    let t = t.trim();
                    if t.is_empty() {
                        None
                    } else {
                        Some(t.chars().take(24).collect())
                    }
                }
            };
            (needle, node.is_text(), node.is_element())
        };
        let Some(needle) = needle else { continue };

        let haystack = if is_text { html } else { &lower };
        if let Some(rel) = haystack[cursor.min(html.len())..].find(&needle) {
            let pos = cursor + rel;
            // A tag needle must end at a name boundary, or `<b` would claim
            // `<button`.
            if is_element {
                let after = lower.as_bytes().get(pos + needle.len());
                let boundary = !matches!(after, Some(b) if b.is_ascii_alphanumeric() || *b == b'-');
                if !boundary {
                    continue;
                }
            }
            let (line, column) = line_col(html, pos);
            graph.set_location(
                id,
                SourceLocation {
                    file: file.to_string(),
                    line,
                    column,
                    length: Some(needle.len() as u32),
                },
            );
            cursor = pos + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> ElementGraph {
        HtmlParser::new().parse(html, "test.html").unwrap()
    }

    #[test]
    fn test_basic_structure() {
        let graph = parse(
            r#"<!DOCTYPE html>
            <html><body>
                <div id="main">Hello</div>
            </body></html>"#,
        );
        let div = graph.get_element_by_id("main").unwrap();
        let elem = graph.get(div).unwrap().as_element().unwrap();
        assert_eq!(elem.tag_name, "div");
        assert_eq!(graph.child_text(div), "Hello");
    }

    #[test]
    fn test_attributes_survive() {
        let graph = parse(r#"<button id="go" CLASS="btn" aria-label="Go">x</button>"#);
        let id = graph.get_element_by_id("go").unwrap();
        let elem = graph.get(id).unwrap().as_element().unwrap();
        assert!(elem.has_class("btn"));
        assert_eq!(elem.attr("aria-label"), Some("Go"));
    }

    #[test]
    fn test_malformed_markup_recovers() {
        let graph = parse("<div><p>unclosed<div>nested");
        assert!(graph.len() > 1);
        assert!(!graph.query_selector_all("div").is_empty());
    }

    #[test]
    fn test_empty_input() {
        let graph = parse("");
        // html5ever still synthesizes the document scaffolding.
        assert!(graph.query_selector("html").is_some());
    }

    #[test]
    fn test_locations_assigned_in_order() {
        let html = "<main>\n  <button id=\"a\">A</button>\n  <button id=\"b\">B</button>\n</main>";
        let graph = parse(html);

        let a = graph.get_element_by_id("a").unwrap();
        let b = graph.get_element_by_id("b").unwrap();
        let loc_a = &graph.get(a).unwrap().location;
        let loc_b = &graph.get(b).unwrap().location;

        assert_eq!(loc_a.line, 2);
        assert_eq!(loc_b.line, 3);
        assert_eq!(loc_a.file, "test.html");
    }

    #[test]
    fn test_synthesized_elements_keep_file_only_location() {
        let graph = parse("<p>just a paragraph</p>");
        let head = graph.query_selector("head").unwrap();
        assert_eq!(graph.get(head).unwrap().location.line, 0);
    }

    #[test]
    fn test_whitespace_only_text_skipped() {
        let graph = parse("<div>\n   \n</div>");
        let div = graph.query_selector("div").unwrap();
        assert!(graph.get(div).unwrap().children.is_empty());
    }
}
