//! Sylva CLI
//!
//! Parse XML and HTML documents, resolve their CSS and run XSLT
//! transformations from the terminal.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser as ClapParser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use sylva_common::{DefaultLoader, ResourceLoader, clear_warnings};
use sylva_css::{Property, Rules, StyleResolver, Value, collect_rules};
use sylva_dom::serialize::{Mode, to_markup};
use sylva_dom::{DocumentFlavor, DomTree, NodeId, NodeType};
use sylva_markup::{CharReader, HtmlFactory, ParseResult, Parser, XmlFactory};
use sylva_xslt::{Stylesheet, Transformer};

/// Sylva: XML/HTML parser, CSS cascade and XSLT transformer
#[derive(ClapParser, Debug)]
#[command(name = "sylva")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the element tree of a document
    sylva parse catalog.xml

    # Parse as HTML and write the repaired markup back out
    sylva parse --html --xml-out https://example.com

    # Resolved styles for print media, as JSON
    sylva style --media print --json page.html

    # Transform with the style sheet named in the document
    sylva transform catalog.xml -o catalog.html
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a document and print its tree and parse issues
    Parse {
        /// Path or URL of the document
        #[arg(value_name = "FILE|URL")]
        path: String,

        /// Parse as HTML even without an .html extension or content type
        #[arg(long)]
        html: bool,

        /// Keep whitespace-only text
        #[arg(long)]
        blanks: bool,

        /// Print the tree as markup instead of an outline
        #[arg(long)]
        xml_out: bool,
    },

    /// Resolve the CSS of every element of a document
    Style {
        /// Path or URL of the document
        #[arg(value_name = "FILE|URL")]
        path: String,

        /// Media to filter rules by
        #[arg(long, default_value = sylva_css::DEFAULT_MEDIA)]
        media: String,

        /// Extra style sheet applied after the document's own
        #[arg(long, value_name = "FILE")]
        css: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run an XSLT transformation
    Transform {
        /// Path or URL of the source document
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Style sheet to use instead of the document's xml-stylesheet
        #[arg(long, value_name = "FILE")]
        xsl: Option<String>,

        /// Write the result here instead of stdout
        #[arg(short = 'o', long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    clear_warnings();

    match cli.command {
        Command::Parse {
            path,
            html,
            blanks,
            xml_out,
        } => {
            let parsed = load_document(&path, html, blanks)?;
            if xml_out {
                println!("{}", to_markup(&parsed.tree, NodeId::ROOT, mode_of(&parsed.tree)));
            } else {
                println!("=== Element Tree ===");
                print_tree(&parsed.tree, NodeId::ROOT, 0);
            }
            print_issues(&parsed);
        }
        Command::Style {
            path,
            media,
            css,
            json,
        } => {
            let parsed = load_document(&path, false, false)?;
            let tree = &parsed.tree;
            let mut rules = collect_rules(tree, &DefaultLoader);
            if let Some(css) = css {
                let sheet = DefaultLoader
                    .load(&css)
                    .with_context(|| format!("Failed to load style sheet {css}"))?;
                rules.extend(Rules::parse(&sheet.text()));
            }
            print_styles(tree, &rules, &media, json)?;
        }
        Command::Transform {
            source,
            xsl,
            output,
        } => {
            let parsed = load_document(&source, false, false)?;
            let transformer = match xsl {
                Some(xsl) => Transformer::new(&parsed.tree, Stylesheet::load(&xsl, &DefaultLoader)?),
                None => Transformer::discover(&parsed.tree, &DefaultLoader)?,
            };
            let markup = transformer.transform()?.to_markup();
            match output {
                Some(path) => fs::write(&path, markup)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{markup}"),
            }
        }
    }
    Ok(())
}

/// Load and parse a document. HTML is chosen by flag, content type or
/// file extension.
fn load_document(path: &str, html: bool, blanks: bool) -> anyhow::Result<ParseResult> {
    let resource = DefaultLoader
        .load(path)
        .with_context(|| format!("Failed to load {path}"))?;
    let lower = resource.location.to_ascii_lowercase();
    let is_html = html
        || resource
            .content_type
            .as_deref()
            .is_some_and(|kind| kind.contains("html"))
        || lower.ends_with(".html")
        || lower.ends_with(".htm");

    let location = resource.location.clone();
    let parsed = if is_html {
        let utf8 = std::str::from_utf8(&resource.bytes).is_ok();
        let mut reader = CharReader::from_bytes(resource.bytes);
        reader.set_utf8_mode(utf8);
        Parser::new(reader, HtmlFactory)
            .include_blanks(blanks)
            .location(location)
            .parse()
    } else {
        Parser::new(CharReader::from_bytes(resource.bytes), XmlFactory)
            .include_blanks(blanks)
            .location(location)
            .parse()
    };
    Ok(parsed)
}

const fn mode_of(tree: &DomTree) -> Mode {
    match tree.flavor() {
        DocumentFlavor::Xml => Mode::Xml,
        DocumentFlavor::Html => Mode::Html,
    }
}

/// Print an indented outline of the tree.
fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node_type) = tree.node_type(id) else {
        return;
    };
    match node_type {
        NodeType::Document => println!("{prefix}{}", "Document".bold()),
        NodeType::Element(data) => {
            let attrs: Vec<String> = data
                .attrs
                .entries()
                .map(|(k, v)| format!("{}=\"{v}\"", k.yellow()))
                .collect();
            if attrs.is_empty() {
                println!("{prefix}<{}>", data.tag_name.cyan());
            } else {
                println!("{prefix}<{} {}>", data.tag_name.cyan(), attrs.join(" "));
            }
        }
        NodeType::Text(text) => {
            let display = text.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}\"{}\"", display.green());
        }
        NodeType::CData(text) => println!("{prefix}<![CDATA[{}]]>", text.green()),
        NodeType::Comment(text) => println!("{prefix}{}", format!("<!--{text}-->").dimmed()),
        NodeType::DocType(text) => println!("{prefix}{}", format!("<!DOCTYPE {text}>").magenta()),
        NodeType::Declaration(_)
        | NodeType::StyleSheet(_)
        | NodeType::ProcessingInstruction { .. } => {
            println!("{prefix}{}", to_markup(tree, id, Mode::Xml).magenta());
        }
    }
    for &child in tree.children(id) {
        print_tree(tree, child, indent + 1);
    }
}

fn print_issues(parsed: &ParseResult) {
    if !parsed.issues.is_empty() {
        println!("\n=== Parse Issues ===");
        for issue in &parsed.issues {
            println!("  - {issue}");
        }
    }
}

/// Resolved values of one element.
#[derive(Serialize)]
struct StyledElement<'a> {
    node: usize,
    tag: &'a str,
    values: BTreeMap<Property, Value>,
}

fn print_styles(tree: &DomTree, rules: &Rules, media: &str, json: bool) -> anyhow::Result<()> {
    let mut resolver = StyleResolver::new(tree, rules).with_media(media);
    resolver.apply_css_rules(NodeId::ROOT);

    let elements: Vec<StyledElement<'_>> = tree
        .descendants(NodeId::ROOT)
        .into_iter()
        .filter_map(|id| {
            Some(StyledElement {
                node: id.0,
                tag: tree.tag_name(id)?,
                values: resolver.resolved(id),
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&elements)?);
        return Ok(());
    }

    println!("=== Style Sheet ===");
    println!("{} rules, media {media}", rules.len());
    println!("\n=== Resolved Styles ===");
    for element in &elements {
        println!("<{}> #{}", element.tag.cyan(), element.node);
        for (property, value) in &element.values {
            let mut flags = Vec::new();
            if value.important {
                flags.push("important");
            }
            if value.inherited {
                flags.push("inherited");
            }
            if flags.is_empty() {
                println!("  {}: {}", property.yellow(), value.text);
            } else {
                println!(
                    "  {}: {} {}",
                    property.yellow(),
                    value.text,
                    format!("({})", flags.join(", ")).dimmed()
                );
            }
        }
    }
    Ok(())
}
