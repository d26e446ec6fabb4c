//! Writing a tree back out as markup.

use crate::entities::html_entity_name;
use crate::{DomTree, NodeId, NodeType};

/// Output syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// `<tag/>` for empty elements, CDATA sections kept.
    #[default]
    Xml,
    /// Void elements without end tags, named entities, raw CDATA.
    Html,
}

/// Serialize the subtree rooted at `id`.
///
/// Serializing the document node writes all of its children.
#[must_use]
pub fn to_markup(tree: &DomTree, id: NodeId, mode: Mode) -> String {
    let mut out = String::new();
    write_node(tree, id, mode, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, mode: Mode, out: &mut String) {
    let Some(node_type) = tree.node_type(id) else {
        return;
    };
    match node_type {
        NodeType::Document => {
            for &child in tree.children(id) {
                write_node(tree, child, mode, out);
            }
        }
        NodeType::Element(data) => {
            out.push('<');
            out.push_str(&data.tag_name);
            write_attributes(data.attrs.entries(), mode, out);
            let children = tree.children(id);
            if children.is_empty() {
                match mode {
                    Mode::Xml => out.push_str("/>"),
                    Mode::Html if data.kind.is_simple() => out.push('>'),
                    Mode::Html => {
                        out.push_str("></");
                        out.push_str(&data.tag_name);
                        out.push('>');
                    }
                }
                return;
            }
            out.push('>');
            for &child in children {
                write_node(tree, child, mode, out);
            }
            out.push_str("</");
            out.push_str(&data.tag_name);
            out.push('>');
        }
        NodeType::Text(text) => escape_into(text, mode, false, out),
        NodeType::CData(text) => match mode {
            Mode::Xml => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            Mode::Html => out.push_str(text),
        },
        NodeType::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeType::DocType(content) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(content);
            out.push('>');
        }
        NodeType::Declaration(attrs) => {
            out.push_str("<?xml");
            write_attributes(attrs.entries(), mode, out);
            out.push_str("?>");
        }
        NodeType::StyleSheet(attrs) => {
            out.push_str("<?xml-stylesheet");
            write_attributes(attrs.entries(), mode, out);
            out.push_str("?>");
        }
        NodeType::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
    }
}

fn write_attributes<'a>(
    attrs: impl Iterator<Item = (&'a str, &'a str)>,
    mode: Mode,
    out: &mut String,
) {
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(value, mode, true, out);
        out.push('"');
    }
}

fn escape_into(text: &str, mode: Mode, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c if mode == Mode::Html && !c.is_ascii() => {
                if let Some(name) = html_entity_name(c) {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                } else {
                    out.push_str(&format!("&#{};", u32::from(c)));
                }
            }
            c => out.push(c),
        }
    }
}
