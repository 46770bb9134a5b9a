//! Selector subset
//!
//! Supports `#id`, `.class` (including compound `.a.b`), bare tag names and
//! `[attr]` / `[attr="value"]` attribute selectors. Anything else —
//! combinators, pseudo-classes, selector lists, the universal selector —
//! parses to `None`, and callers treat that as "matches nothing".

use crate::node::ElementData;

/// A component of a compound selector.
#[derive(Debug, Clone, PartialEq)]
enum Component {
    Tag(String),
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
}

/// One parsed compound selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    components: Vec<Component>,
}

impl Selector {
    /// Parse a selector in the supported subset. Returns `None` for anything
    /// beyond it.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }

        let mut components = Vec::new();
        let chars: Vec<char> = s.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '#' => {
                    let (ident, next) = read_ident(&chars, i + 1);
                    if ident.is_empty() {
                        return None;
                    }
                    components.push(Component::Id(ident));
                    i = next;
                }
                '.' => {
                    let (ident, next) = read_ident(&chars, i + 1);
                    if ident.is_empty() {
                        return None;
                    }
                    components.push(Component::Class(ident));
                    i = next;
                }
                '[' => {
                    let close = chars[i..].iter().position(|c| *c == ']')? + i;
                    let inner: String = chars[i + 1..close].iter().collect();
                    components.push(parse_attr(&inner)?);
                    i = close + 1;
                }
                c if is_ident_char(c) => {
                    // A tag name is only valid as the leading component.
                    if i != 0 {
                        return None;
                    }
                    let (ident, next) = read_ident(&chars, i);
                    components.push(Component::Tag(ident.to_ascii_lowercase()));
                    i = next;
                }
                // Whitespace, combinators, pseudo-classes, lists, `*`.
                _ => return None,
            }
        }

        if components.is_empty() {
            None
        } else {
            Some(Self { components })
        }
    }

    /// True if every component matches the element.
    pub fn matches(&self, elem: &ElementData) -> bool {
        self.components.iter().all(|c| match c {
            Component::Tag(tag) => elem.tag_name.eq_ignore_ascii_case(tag),
            Component::Id(id) => elem.id.as_deref() == Some(id.as_str()),
            Component::Class(class) => elem.has_class(class),
            Component::Attr { name, value: None } => elem.attr(name).is_some(),
            Component::Attr {
                name,
                value: Some(v),
            } => elem.attr(name) == Some(v.as_str()),
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn parse_attr(inner: &str) -> Option<Component> {
    let inner = inner.trim();
    if inner.is_empty() {
        return None;
    }
    match inner.split_once('=') {
        None => {
            if inner.chars().all(is_ident_char) {
                Some(Component::Attr {
                    name: inner.to_ascii_lowercase(),
                    value: None,
                })
            } else {
                None
            }
        }
        Some((name, raw)) => {
            let name = name.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return None;
            }
            let raw = raw.trim();
            let value = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| raw.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(raw);
            Some(Component::Attr {
                name: name.to_ascii_lowercase(),
                value: Some(value.to_string()),
            })
        }
    }
}
