//! AXL command line
//!
//! Classifies input files by extension, assembles one source collection,
//! builds the merged document graph and runs every analyzer. The exit code
//! reflects findings at or above the configured severity — never internal
//! engine trouble, which is reported separately as tool diagnostics.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use axl_a11y::{Finding, Severity, analyze};
use axl_engine::{DocumentGraph, Scope, SourceCollection};

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Parsed command line.
#[derive(Debug)]
pub struct Config {
    pub files: Vec<PathBuf>,
    pub scope: Scope,
    pub format: OutputFormat,
    pub min_severity: Severity,
}

impl Config {
    /// Parse arguments (program name already stripped).
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut files = Vec::new();
        let mut scope = Scope::Page;
        let mut format = OutputFormat::Text;
        let mut min_severity = Severity::Warning;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--scope" => {
                    let value = args.next().context("--scope needs a value")?;
                    scope = Scope::parse(&value)
                        .with_context(|| format!("unknown scope: {value}"))?;
                }
                "--format" => {
                    let value = args.next().context("--format needs a value")?;
                    format = match value.as_str() {
                        "text" => OutputFormat::Text,
                        "json" => OutputFormat::Json,
                        other => bail!("unknown format: {other}"),
                    };
                }
                "--min-severity" => {
                    let value = args.next().context("--min-severity needs a value")?;
                    min_severity = Severity::parse(&value)
                        .with_context(|| format!("unknown severity: {value}"))?;
                }
                "--help" | "-h" => bail!("{}", USAGE),
                flag if flag.starts_with('-') => bail!("unknown flag: {flag}\n{USAGE}"),
                _ => files.push(PathBuf::from(arg)),
            }
        }

        if files.is_empty() {
            bail!("no input files\n{USAGE}");
        }
        Ok(Self {
            files,
            scope,
            format,
            min_severity,
        })
    }
}

pub const USAGE: &str = "\
usage: axl [options] <files...>
  --scope <file|page|workspace>     analysis breadth (default: page)
  --format <text|json>              report format (default: text)
  --min-severity <info|warning|error>  reporting threshold (default: warning)";

/// Kind of source a path contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Markup,
    Script,
    Stylesheet,
}

/// Classify a path by extension. `None` means the file is skipped.
pub fn classify(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "html" | "htm" => Some(SourceKind::Markup),
        "js" | "jsx" | "ts" | "tsx" | "mjs" => Some(SourceKind::Script),
        "css" => Some(SourceKind::Stylesheet),
        _ => None,
    }
}

/// Run one analysis pass; returns the process exit code.
pub fn run(config: &Config) -> anyhow::Result<i32> {
    let mut collection = SourceCollection::new();
    let mut extra_markup: Vec<(String, String)> = Vec::new();

    for path in &config.files {
        let Some(kind) = classify(path) else {
            log::warn!("skipping {} (unrecognized extension)", path.display());
            continue;
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let name = path.display().to_string();
        collection = match kind {
            SourceKind::Markup => {
                if collection.html.is_none() {
                    collection.with_html(&text, &name)
                } else {
                    // Extra markup files become their own fragments below.
                    extra_markup.push((text, name));
                    collection
                }
            }
            SourceKind::Script => collection.with_javascript(&text, &name),
            SourceKind::Stylesheet => collection.with_css(&text, &name),
        };
    }

    if collection.is_empty() && extra_markup.is_empty() {
        bail!("none of the inputs could be classified as HTML, JS/TS or CSS");
    }

    let graph = build_graph(&collection, &extra_markup, config.scope);

    for warning in graph.warnings() {
        log::warn!("{}: {}", warning.file, warning.message);
    }
    if graph.fragment_count() == 0
        && !graph.warnings().is_empty()
        && graph.behavior_graphs().is_empty()
        && graph.style_graphs().is_empty()
    {
        bail!("no fragment could be parsed");
    }

    let findings: Vec<Finding> = analyze(&graph)
        .into_iter()
        .filter(|f| f.severity >= config.min_severity)
        .collect();

    match config.format {
        OutputFormat::Text => print!("{}", text_report(&graph, &findings)),
        OutputFormat::Json => println!("{}", json_report(&graph, &findings)),
    }

    Ok(if findings.is_empty() { 0 } else { 1 })
}

/// Build the graph, merging any markup files beyond the first as extra
/// fragments through the parser front-ends.
fn build_graph(
    collection: &SourceCollection,
    extra_markup: &[(String, String)],
    scope: Scope,
) -> DocumentGraph {
    if extra_markup.is_empty() {
        return DocumentGraph::build(collection, scope);
    }

    use axl_css::CssParser;
    use axl_html::HtmlParser;
    use axl_js::BehaviorExtractor;

    let parser = HtmlParser::new();
    let mut fragments = Vec::new();
    if let Some(html) = &collection.html {
        let file = collection.source_files.html.as_deref().unwrap_or("<inline>");
        if let Ok(graph) = parser.parse(html, file) {
            fragments.push(graph);
        }
    }
    for (text, file) in extra_markup {
        if let Ok(graph) = parser.parse(text, file) {
            fragments.push(graph);
        }
    }

    let extractor = BehaviorExtractor::new();
    let behaviors = collection
        .javascript
        .iter()
        .zip(&collection.source_files.javascript)
        .map(|(text, file)| extractor.extract(text, file))
        .collect();

    let css_parser = CssParser::new();
    let styles = collection
        .css
        .iter()
        .zip(&collection.source_files.css)
        .filter_map(|(text, file)| css_parser.parse(text, file).ok())
        .collect();

    DocumentGraph::from_fragments(scope, fragments, behaviors, styles)
}

fn text_report(graph: &DocumentGraph, findings: &[Finding]) -> String {
    let mut out = String::new();
    for f in findings {
        let _ = writeln!(
            out,
            "{}:{}:{} [{}] {}: {} (confidence: {} — {})",
            f.file, f.line, f.column, f.severity, f.rule, f.message, f.confidence, f.reason
        );
    }
    let _ = writeln!(
        out,
        "{} finding(s); completeness {:.2} across {} fragment(s)",
        findings.len(),
        graph.tree_completeness(),
        graph.fragment_count()
    );
    out
}

fn json_report(graph: &DocumentGraph, findings: &[Finding]) -> String {
    let warnings: Vec<serde_json::Value> = graph
        .warnings()
        .iter()
        .map(|w| serde_json::json!({ "file": w.file, "message": w.message }))
        .collect();
    serde_json::json!({
        "completeness": graph.tree_completeness(),
        "fragments": graph.fragment_count(),
        "resolvedReferences": graph.resolved_references(),
        "unresolvedReferences": graph.unresolved_references(),
        "findings": findings,
        "warnings": warnings,
    })
    .to_string()
}
