//! Analysis inputs
//!
//! A `SourceCollection` is an immutable snapshot of raw texts plus their
//! file names; texts and names correspond positionally. One collection
//! feeds exactly one document graph build.

use serde::Serialize;

/// Breadth of one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One source file in isolation.
    File,
    /// One markup entry point and its linked resources.
    Page,
    /// Everything discoverable in the project.
    Workspace,
}

impl Scope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Some(Self::File),
            "page" => Some(Self::Page),
            "workspace" => Some(Self::Workspace),
            _ => None,
        }
    }
}

/// File names matching a collection's texts, position by position.
#[derive(Debug, Clone, Default)]
pub struct SourceFiles {
    pub html: Option<String>,
    pub javascript: Vec<String>,
    pub css: Vec<String>,
}

/// Raw source texts for one analysis pass.
#[derive(Debug, Clone, Default)]
pub struct SourceCollection {
    pub html: Option<String>,
    pub javascript: Vec<String>,
    pub css: Vec<String>,
    pub source_files: SourceFiles,
}

impl SourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_html(mut self, text: &str, file: &str) -> Self {
        self.html = Some(text.to_string());
        self.source_files.html = Some(file.to_string());
        self
    }

    pub fn with_javascript(mut self, text: &str, file: &str) -> Self {
        self.javascript.push(text.to_string());
        self.source_files.javascript.push(file.to_string());
        self
    }

    pub fn with_css(mut self, text: &str, file: &str) -> Self {
        self.css.push(text.to_string());
        self.source_files.css.push(file.to_string());
        self
    }

    /// Total number of contributed texts.
    pub fn len(&self) -> usize {
        usize::from(self.html.is_some()) + self.javascript.len() + self.css.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
