//! Graph nodes
//!
//! Element, text and comment nodes. Parent and child links are `NodeId`s
//! into the owning graph's arena, never owning pointers.

use std::collections::HashMap;

use crate::{NodeId, SourceLocation};

/// One node of an element graph.
#[derive(Debug)]
pub struct Node {
    /// Parent node (`None` for fragment roots). Lookup only, never owns.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// Node-specific data.
    pub data: NodeData,
    /// Where this node came from.
    pub location: SourceLocation,
}

impl Node {
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Text content of text and comment nodes.
    #[inline]
    pub fn text_content(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) | NodeData::Comment(t) => Some(t),
            NodeData::Element(_) => None,
        }
    }
}

/// Node-specific data.
#[derive(Debug)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Element-specific data.
#[derive(Debug, Default)]
pub struct ElementData {
    /// Tag name, lowercased.
    pub tag_name: String,
    /// Attributes: lowercased name -> value, one value per name.
    pub attributes: HashMap<String, String>,
    /// Cached `id` attribute (very common lookup).
    pub id: Option<String>,
    /// Cached class list, split on whitespace.
    pub classes: Vec<String>,
}

impl ElementData {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Get an attribute value by case-insensitive name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Set an attribute. Later duplicates overwrite earlier values.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "id" {
            self.id = Some(value.to_string());
        } else if name == "class" {
            self.classes = value.split_whitespace().map(String::from).collect();
        }
        self.attributes.insert(name, value.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}
