//! Element graph (arena-based allocation)
//!
//! Holds one fragment's structural tree and answers structural queries.
//! A fragment may have several root nodes (a component template, a partial).

use crate::node::{ElementData, Node, NodeData};
use crate::selectors::Selector;
use crate::{NodeId, SourceLocation, accessibility};

/// Arena-based tree for one parsed markup fragment.
#[derive(Debug, Default)]
pub struct ElementGraph {
    source_file: String,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl ElementGraph {
    pub fn new(source_file: &str) -> Self {
        Self {
            source_file: source_file.to_string(),
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Mutable element data, for producers building the graph.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id.index()).and_then(Node::as_element_mut)
    }

    pub fn set_location(&mut self, id: NodeId, location: SourceLocation) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.location = location;
        }
    }

    pub fn create_element(&mut self, tag_name: &str, location: SourceLocation) -> NodeId {
        self.push(NodeData::Element(ElementData::new(tag_name)), location)
    }

    pub fn create_text(&mut self, text: &str, location: SourceLocation) -> NodeId {
        self.push(NodeData::Text(text.to_string()), location)
    }

    pub fn create_comment(&mut self, text: &str, location: SourceLocation) -> NodeId {
        self.push(NodeData::Comment(text.to_string()), location)
    }

    fn push(&mut self, data: NodeData, location: SourceLocation) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
            location,
        });
        id
    }

    /// Register a top-level node of the fragment.
    pub fn add_root(&mut self, id: NodeId) {
        assert!(
            self.get(id).is_some_and(|n| n.parent.is_none()),
            "root node must exist and have no parent"
        );
        self.roots.push(id);
    }

    /// Append `child` under `parent`.
    ///
    /// Each node has exactly one parent; appending an already-attached node
    /// is a caller bug and fails loudly.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(parent != child, "node cannot be its own child");
        assert!(
            self.get(child).is_some_and(|n| n.parent.is_none()),
            "child already attached to a parent"
        );
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// All nodes in document order (depth-first).
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.get(id) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// All element nodes in document order.
    pub fn all_elements(&self) -> Vec<NodeId> {
        self.all_nodes()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(Node::is_element))
            .collect()
    }

    /// First element with the given `id` attribute, in document order.
    ///
    /// Duplicate IDs are a latent page defect the analyzers may flag; this
    /// layer just returns the first match.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.all_elements().into_iter().find(|n| {
            self.get(*n)
                .and_then(Node::as_element)
                .is_some_and(|e| e.id.as_deref() == Some(id))
        })
    }

    /// First element matching the selector, or `None`.
    ///
    /// Selector syntax outside the supported subset matches nothing rather
    /// than failing; one odd selector must never abort a whole pass.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// All elements matching the selector, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(parsed) = Selector::parse(selector) else {
            tracing::trace!("unsupported selector ignored: {selector:?}");
            return Vec::new();
        };
        self.all_elements()
            .into_iter()
            .filter(|id| {
                self.get(*id)
                    .and_then(Node::as_element)
                    .is_some_and(|e| parsed.matches(e))
            })
            .collect()
    }

    /// Elements that can receive keyboard focus.
    pub fn focusable_elements(&self) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|id| {
                self.get(*id)
                    .and_then(Node::as_element)
                    .is_some_and(accessibility::is_focusable)
            })
            .collect()
    }

    /// Structurally interactive elements: focusable, or carrying an inline
    /// `on*` handler attribute. Behavior-aware interactivity lives in the
    /// merged document view, which sees handlers from other files.
    pub fn interactive_elements(&self) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|id| {
                self.get(*id).and_then(Node::as_element).is_some_and(|e| {
                    accessibility::is_focusable(e)
                        || e.attributes.keys().any(|k| k.starts_with("on"))
                })
            })
            .collect()
    }

    /// Concatenated trimmed text of the node's direct text children.
    pub fn child_text(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        let parts: Vec<&str> = node
            .children
            .iter()
            .filter_map(|c| self.get(*c))
            .filter(|n| n.is_text())
            .filter_map(Node::text_content)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        parts.join(" ")
    }
}
