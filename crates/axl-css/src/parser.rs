//! Stylesheet parsing
//!
//! lightningcss does the heavy lifting; a small brace-matching scanner
//! takes over for sheets it rejects outright, so one broken construct
//! degrades the fragment instead of losing it. A sheet that defeats both
//! parsers is reported as a fragment parse failure.

use std::collections::HashMap;
use std::ops::Range;

use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;

use axl_dom::{SourceLocation, line_col};

use crate::style::{StyleGraph, StyleRule};
use crate::CssError;

/// Stylesheet parser.
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one stylesheet into a style graph.
    pub fn parse(&self, css: &str, file: &str) -> Result<StyleGraph, CssError> {
        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };
        match StyleSheet::parse(css, options) {
            Ok(sheet) => {
                let mut graph = StyleGraph::new(file);
                for rule in sheet.rules.0.iter() {
                    convert_rule(rule, file, &mut graph);
                }
                tracing::debug!("parsed {} style rules from {}", graph.len(), file);
                Ok(graph)
            }
            Err(e) => {
                tracing::warn!("lightningcss rejected {file}: {e:?}; using fallback scanner");
                self.fallback_parse(css, file)
            }
        }
    }

    fn fallback_parse(&self, css: &str, file: &str) -> Result<StyleGraph, CssError> {
        let mut graph = StyleGraph::new(file);
        scan_rules(css, 0..css.len(), file, &mut graph);
        if graph.is_empty() && css.contains('{') {
            return Err(CssError::Parse {
                file: file.to_string(),
                message: "no parseable rules".to_string(),
            });
        }
        Ok(graph)
    }
}

fn convert_rule(rule: &CssRule<'_>, file: &str, graph: &mut StyleGraph) {
    match rule {
        CssRule::Style(style) => {
            let properties = convert_declarations(&style.declarations);
            let location = SourceLocation::new(file, style.loc.line + 1, style.loc.column);
            for selector in style.selectors.0.iter() {
                let Ok(text) = selector.to_css_string(PrinterOptions::default()) else {
                    continue;
                };
                graph.push(StyleRule::new(&text, properties.clone(), location.clone()));
            }
        }
        // Conditional groups still contribute rules; the condition itself is
        // out of scope for a static pass.
        CssRule::Media(media) => {
            for inner in media.rules.0.iter() {
                convert_rule(inner, file, graph);
            }
        }
        CssRule::Supports(supports) => {
            for inner in supports.rules.0.iter() {
                convert_rule(inner, file, graph);
            }
        }
        _ => {}
    }
}

fn convert_declarations(block: &DeclarationBlock<'_>) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    for property in block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
    {
        let name = property.property_id().name().to_ascii_lowercase();
        if let Ok(value) = property.value_to_css_string(PrinterOptions::default()) {
            properties.insert(name, value);
        }
    }
    properties
}

/// Brace-matching scanner for sheets lightningcss cannot handle.
fn scan_rules(css: &str, range: Range<usize>, file: &str, graph: &mut StyleGraph) {
    let bytes = css.as_bytes();
    let mut i = range.start;

    while i < range.end {
        let Some(open_rel) = css[i..range.end].find('{') else {
            break;
        };
        let open = i + open_rel;

        let mut sel_start = i;
        let mut selector_text = &css[i..open];
        // Skip over statements like `@import ...;` before the selector.
        if let Some(semi) = selector_text.rfind(';') {
            sel_start = i + semi + 1;
            selector_text = &css[sel_start..open];
        }
        sel_start += selector_text.len() - selector_text.trim_start().len();

        let mut depth = 1usize;
        let mut j = open + 1;
        while j < range.end && depth > 0 {
            match bytes[j] {
                b'{' => depth += 1,
                b'}' => depth -= 1,
                _ => {}
            }
            j += 1;
        }
        let close = if depth == 0 { j - 1 } else { range.end };
        let body = open + 1..close;

        let selector = selector_text.trim();
        if selector.starts_with('@') {
            if css[body.clone()].contains('{') {
                scan_rules(css, body, file, graph);
            }
        } else if !selector.is_empty() {
            let properties = parse_declaration_text(&css[body]);
            if !properties.is_empty() {
                let (line, column) = line_col(css, sel_start);
                for part in selector.split(',') {
                    let part = part.trim();
                    if !part.is_empty() {
                        graph.push(StyleRule::new(
                            part,
                            properties.clone(),
                            SourceLocation::new(file, line, column),
                        ));
                    }
                }
            }
        }
        i = j.max(open + 1);
    }
}

/// Parse bare `prop: value; ...` declaration text, as found in rule bodies
/// and `style=""` attributes. Unparseable declarations are skipped.
pub fn parse_declaration_text(body: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    for decl in body.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim().trim_end_matches("!important").trim();
        let valid_name =
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if valid_name && !value.is_empty() {
            properties.insert(name, value.to_string());
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Specificity;

    #[test]
    fn test_parse_simple() {
        let css = r#"
            .foo { display: block; }
            #bar { color: red; }
        "#;
        let graph = CssParser::new().parse(css, "t.css").unwrap();
        assert_eq!(graph.len(), 2);

        let foo = &graph.rules()[0];
        assert_eq!(foo.selector, ".foo");
        assert_eq!(foo.specificity, Specificity(0, 0, 1, 0));
        assert_eq!(foo.property("display"), Some("block"));
        assert!(foo.affects_visibility);

        let bar = &graph.rules()[1];
        assert_eq!(bar.specificity, Specificity(0, 1, 0, 0));
        assert!(bar.affects_contrast);
    }

    #[test]
    fn test_selector_list_split_per_selector() {
        let css = "h1, .title { color: navy; }";
        let graph = CssParser::new().parse(css, "t.css").unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.rules()[0].specificity, Specificity(0, 0, 0, 1));
        assert_eq!(graph.rules()[1].specificity, Specificity(0, 0, 1, 0));
    }

    #[test]
    fn test_media_query_rules_surface() {
        let css = r#"
            @media (max-width: 600px) {
                .nav { display: none; }
            }
        "#;
        let graph = CssParser::new().parse(css, "t.css").unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.rules()[0].selector, ".nav");
        assert!(graph.rules()[0].affects_visibility);
    }

    #[test]
    fn test_focus_rule_flag() {
        let css = "button:focus { outline: none; }";
        let graph = CssParser::new().parse(css, "t.css").unwrap();
        assert_eq!(graph.len(), 1);
        let rule = &graph.rules()[0];
        assert!(rule.affects_focus);
        assert_eq!(rule.structural_selector(), "button");
        assert_eq!(rule.pseudo_classes(), ["focus"]);
    }

    #[test]
    fn test_fallback_scanner() {
        let css = r#"
            @import url("base.css");
            .a { color: red; }
            @media screen {
                .b { display: none !important; }
            }
            .broken {
        "#;
        let mut graph = StyleGraph::new("t.css");
        scan_rules(css, 0..css.len(), "t.css", &mut graph);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.rules()[0].selector, ".a");
        assert_eq!(graph.rules()[1].selector, ".b");
        assert_eq!(graph.rules()[1].property("display"), Some("none"));
    }

    #[test]
    fn test_unparseable_sheet_is_empty_not_fatal() {
        let graph = CssParser::new().parse("not a stylesheet at all", "t.css");
        assert!(graph.is_ok_and(|g| g.is_empty()));
    }
}
