//! loupe - inspect, query and re-save HTML from the terminal
//!
//! Usage:
//!   loupe page.html                       # Print the node tree
//!   loupe page.html -s 'ul > li' --text   # Print text of matching nodes
//!   loupe --html '<p>Hi</p>' --json       # Print the node table as JSON

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use loupe::common::warning::set_warnings_enabled;
use loupe::dom::{Accessor, AttrValue, ParseIssue};
use loupe::html::DEFAULT_MAX_SIZE;
use loupe::{Document, LoadedDocument, NodeId, ParseOptions, Query};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{Map, Value};

/// loupe - forgiving HTML parser with selector queries
#[derive(Parser, Debug)]
#[command(name = "loupe")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the node tree
    loupe page.html

    # Print the markup of every matching node
    loupe page.html --select 'div#main > p.note'

    # Print the text of the last list item
    loupe page.html --select 'li' --nth -1 --text

    # Print an attribute of every link
    loupe page.html --select 'a[href^=http]' --attr href

    # Parse inline HTML and list repaired markup
    loupe --html '<div><p>a</div>' --issues

    # Re-save a document (byte-identical when unedited)
    loupe page.html --output copy.html
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE", required_unless_present = "html")]
    path: Option<PathBuf>,

    /// Parse HTML string directly instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Print nodes matching a selector
    #[arg(short, long, value_name = "SELECTOR")]
    select: Option<String>,

    /// Print the plain text of each match instead of its markup
    #[arg(long, requires = "select", conflicts_with = "attr")]
    text: bool,

    /// Print this attribute of each match instead of its markup
    #[arg(long, value_name = "NAME", requires = "select")]
    attr: Option<String>,

    /// Print only the match at this index; negative counts from the end
    #[arg(long, value_name = "INDEX", requires = "select", allow_hyphen_values = true)]
    nth: Option<isize>,

    /// Compare tags, classes and predicate values case-insensitively
    #[arg(short = 'i', long, requires = "select")]
    ignore_case: bool,

    /// Print the node tree (default when nothing else is requested)
    #[arg(short, long)]
    tree: bool,

    /// Print the node table and parse issues as JSON
    #[arg(long)]
    json: bool,

    /// List markup the parser had to repair
    #[arg(long)]
    issues: bool,

    /// Write the serialized document to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Keep tag and attribute names as written
    #[arg(long)]
    keep_case: bool,

    /// Trust the input to be well formed; skip implicit-close recovery
    #[arg(long)]
    no_force_close: bool,

    /// Replace CR and LF with spaces before parsing
    #[arg(long)]
    strip_newlines: bool,

    /// Protect `{x...}` template directives from the tokenizer
    #[arg(long)]
    template_directives: bool,

    /// Reject inputs larger than this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_SIZE)]
    max_size: usize,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
            .with_lowercase(!self.keep_case)
            .with_force_tags_closed(!self.no_force_close)
            .with_normalize_newlines(self.strip_newlines)
            .with_strip_template_directives(self.template_directives)
            .with_max_size(self.max_size)
    }

    fn accessor(&self) -> Accessor {
        if self.text {
            Accessor::PlainText
        } else if let Some(name) = &self.attr {
            Accessor::Attribute(name.clone())
        } else {
            Accessor::OuterHtml
        }
    }
}

/// One row of the JSON node table.
#[derive(Serialize)]
struct NodeRecord {
    id: NodeId,
    kind: String,
    tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<NodeId>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    nodes: Vec<NodeRecord>,
    issues: &'a [ParseIssue],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.quiet {
        set_warnings_enabled(false);
    }

    let options = cli.parse_options();
    let loaded = if let Some(html) = &cli.html {
        loupe::parse_html_string(html, &options).context("failed to parse --html input")?
    } else if let Some(path) = &cli.path {
        loupe::load_document(path, &options)?
    } else {
        bail!("no input: pass a FILE or --html");
    };

    let nothing_requested = cli.select.is_none() && !cli.json && !cli.issues && cli.output.is_none();
    if cli.tree || nothing_requested {
        print_tree(&loaded);
    }
    if let Some(selector) = &cli.select {
        print_matches(&cli, &loaded.document, selector)?;
    }
    if cli.json {
        print_json(&loaded.document)?;
    }
    if cli.issues {
        print_issues(&loaded);
    }
    if let Some(output) = &cli.output {
        loupe::save_document(&loaded.document, output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("Saved to: {}", output.display().green());
    }

    Ok(())
}

fn print_tree(loaded: &LoadedDocument) {
    let source = if loaded.source_path.is_empty() {
        "<inline>"
    } else {
        loaded.source_path.as_str()
    };
    println!("{}", format!("=== {source} ({} nodes) ===", loaded.document.node_count()).bold());
    print!("{}", loaded.document.dump_tree());
}

fn print_matches(cli: &Cli, document: &Document, selector: &str) -> Result<()> {
    let accessor = cli.accessor();
    let found = match cli.nth {
        Some(index) => {
            let Some(id) = document.find_nth(selector, index, cli.ignore_case) else {
                bail!("no match for '{selector}' at index {index}");
            };
            vec![id]
        }
        None => document.find(selector, cli.ignore_case),
    };
    if found.is_empty() {
        eprintln!("{}", format!("no match for '{selector}'").red());
    }
    for id in found {
        if let Some(value) = document.get_property(id, &accessor) {
            println!("{value}");
        }
    }
    Ok(())
}

fn print_json(document: &Document) -> Result<()> {
    let nodes = document.node_ids().filter_map(|id| node_record(document, id)).collect();
    let output = JsonOutput {
        nodes,
        issues: document.issues(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn node_record(document: &Document, id: NodeId) -> Option<NodeRecord> {
    let node = document.get(id)?;
    let attributes = node
        .attributes()
        .iter()
        .map(|attr| {
            let value = match &attr.value {
                AttrValue::Text(text) => Value::String(document.restore(text).into_owned()),
                AttrValue::Present => Value::Bool(true),
            };
            (attr.name.clone(), value)
        })
        .collect();
    let text = node.raw_text().map(|raw| document.restore(raw).into_owned());

    Some(NodeRecord {
        id,
        kind: node.kind().to_string(),
        tag: node.tag().to_string(),
        parent: document.parent(id),
        attributes,
        children: node.children().to_vec(),
        text,
    })
}

fn print_issues(loaded: &LoadedDocument) {
    if loaded.parse_issues.is_empty() {
        println!("{}", "No parse issues".green());
        return;
    }
    println!("{}", format!("=== {} parse issues ===", loaded.parse_issues.len()).bold());
    for issue in &loaded.parse_issues {
        println!("  {}", issue.yellow());
    }
}
