//! Style rules and specificity
//!
//! The specificity tuple orders (inline, id, class/attribute, tag) counts;
//! deriving `Ord` on that field order gives cascade-correct comparison.

use std::collections::HashMap;

use axl_dom::SourceLocation;

/// Selector specificity: (inline, id-count, class/attr-count, tag-count).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32, pub u32);

impl Specificity {
    /// Specificity of a `style=""` attribute declaration.
    pub fn inline() -> Self {
        Self(1, 0, 0, 0)
    }
}

/// One style rule: a single selector plus its declarations.
///
/// Rule lists with several selectors are split into one rule per selector
/// at parse time, so specificity is always per-selector.
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// Graph-local identifier, assigned on insertion.
    pub id: u32,
    /// Full selector text as written.
    pub selector: String,
    pub specificity: Specificity,
    /// Declarations: lowercased property -> value.
    pub properties: HashMap<String, String>,
    /// Whether the rule can hide or reveal content.
    pub affects_visibility: bool,
    /// Whether the rule touches the focus indicator.
    pub affects_focus: bool,
    /// Whether the rule changes foreground/background color.
    pub affects_contrast: bool,
    pub location: SourceLocation,
}

impl StyleRule {
    pub fn new(
        selector: &str,
        properties: HashMap<String, String>,
        location: SourceLocation,
    ) -> Self {
        Self::with_specificity(selector, compute_specificity(selector), properties, location)
    }

    pub fn with_specificity(
        selector: &str,
        specificity: Specificity,
        properties: HashMap<String, String>,
        location: SourceLocation,
    ) -> Self {
        let affects_visibility = properties
            .keys()
            .any(|p| matches!(p.as_str(), "display" | "visibility" | "opacity" | "clip" | "clip-path" | "content-visibility"));
        let affects_focus = properties
            .keys()
            .any(|p| p.starts_with("outline") || p == "box-shadow");
        let affects_contrast = properties.keys().any(|p| {
            matches!(p.as_str(), "color" | "background" | "background-color" | "opacity")
        });
        Self {
            id: 0,
            selector: selector.to_string(),
            specificity,
            properties,
            affects_visibility,
            affects_focus,
            affects_contrast,
            location,
        }
    }

    /// Structural part of the selector (pseudo-classes stripped).
    pub fn structural_selector(&self) -> String {
        split_pseudo(&self.selector).0
    }

    /// Pseudo-class names on the selector (`focus`, `hover`, ...).
    pub fn pseudo_classes(&self) -> Vec<String> {
        split_pseudo(&self.selector).1
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

/// All style rules parsed from one stylesheet.
#[derive(Debug, Default)]
pub struct StyleGraph {
    source_file: String,
    rules: Vec<StyleRule>,
}

impl StyleGraph {
    pub fn new(source_file: &str) -> Self {
        Self {
            source_file: source_file.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Insert a rule, assigning its graph-local id (source order).
    pub fn push(&mut self, mut rule: StyleRule) {
        rule.id = self.rules.len() as u32;
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn find_by_selector(&self, selector: &str) -> Vec<&StyleRule> {
        self.rules.iter().filter(|r| r.selector == selector).collect()
    }

    pub fn visibility_rules(&self) -> Vec<&StyleRule> {
        self.rules.iter().filter(|r| r.affects_visibility).collect()
    }

    pub fn focus_rules(&self) -> Vec<&StyleRule> {
        self.rules.iter().filter(|r| r.affects_focus).collect()
    }
}

/// Split a selector into its structural part and its pseudo-class names.
///
/// Only the subject compound is inspected; the structural part is what the
/// element matcher understands, the pseudo-classes are matched separately
/// by interested analyzers.
pub fn split_pseudo(selector: &str) -> (String, Vec<String>) {
    let mut structural = String::new();
    let mut pseudos = Vec::new();
    let mut chars = selector.char_indices().peekable();
    let mut in_brackets = false;

    while let Some((_, c)) = chars.next() {
        match c {
            '[' => {
                in_brackets = true;
                structural.push(c);
            }
            ']' => {
                in_brackets = false;
                structural.push(c);
            }
            ':' if !in_brackets => {
                // Consume `:` or `::` plus the pseudo name and any arguments.
                let double = matches!(chars.peek(), Some((_, ':')));
                if double {
                    chars.next();
                }
                let mut name = String::new();
                while let Some((_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || *c == '-' {
                        name.push(*c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if matches!(chars.peek(), Some((_, '('))) {
                    let mut depth = 0;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '(' => depth += 1,
                            ')' => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                }
                if !double && !name.is_empty() {
                    pseudos.push(name);
                }
            }
            _ => structural.push(c),
        }
    }
    (structural.trim().to_string(), pseudos)
}

/// Count selector components into a specificity tuple.
///
/// Pseudo-classes count as classes, pseudo-elements as tags, per the
/// cascade rules. The inline slot stays zero for stylesheet rules.
pub fn compute_specificity(selector: &str) -> Specificity {
    let mut spec = Specificity::default();
    let chars: Vec<char> = selector.chars().collect();
    let mut i = 0;

    let ident_end = |start: usize| {
        let mut end = start;
        while end < chars.len()
            && (chars[end].is_ascii_alphanumeric() || chars[end] == '-' || chars[end] == '_')
        {
            end += 1;
        }
        end
    };

    while i < chars.len() {
        match chars[i] {
            '#' => {
                spec.1 += 1;
                i = ident_end(i + 1);
            }
            '.' => {
                spec.2 += 1;
                i = ident_end(i + 1);
            }
            '[' => {
                spec.2 += 1;
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                i += 1;
            }
            ':' => {
                if i + 1 < chars.len() && chars[i + 1] == ':' {
                    spec.3 += 1;
                    i = ident_end(i + 2);
                } else {
                    let end = ident_end(i + 1);
                    let name: String = chars[i + 1..end].iter().collect();
                    // :not() and friends contribute only their argument.
                    if !matches!(name.as_str(), "not" | "is" | "where") {
                        spec.2 += 1;
                    }
                    i = end;
                }
            }
            c if c.is_ascii_alphabetic() => {
                spec.3 += 1;
                i = ident_end(i);
            }
            _ => i += 1,
        }
    }
    spec
}
