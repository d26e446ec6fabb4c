//! Style sheets referenced by a document.

use sylva_common::{ResourceLoader, resolve_reference, warn_once};
use sylva_dom::{DomTree, NodeId, NodeType};

use crate::rules::Rules;

const TEXT_CSS: &str = "text/css";

/// Gather the rules of every style sheet of `tree`, in document order:
/// `<?xml-stylesheet type="text/css" href?>` instructions, `<style>`
/// contents and `<link rel="stylesheet" href>` elements.
///
/// Relative references are resolved against the document location. A
/// `media` attribute becomes the media of rules that do not name their own.
/// Sheets that fail to load are reported once and skipped.
#[must_use]
pub fn collect_rules<L: ResourceLoader + ?Sized>(tree: &DomTree, loader: &L) -> Rules {
    let mut rules = Rules::new();
    for node in tree.descendants(NodeId::ROOT) {
        match tree.node_type(node) {
            Some(NodeType::StyleSheet(attrs)) => {
                let is_css = attrs
                    .get("type")
                    .is_some_and(|kind| kind.trim().eq_ignore_ascii_case(TEXT_CSS));
                if let Some(href) = attrs.get("href").filter(|_| is_css) {
                    load_into(&mut rules, tree, loader, href, attrs.get("media"));
                }
            }
            Some(NodeType::Element(element)) if element.tag_is("style") => {
                let is_css = element
                    .attrs
                    .get("type")
                    .is_none_or(|kind| kind.trim().eq_ignore_ascii_case(TEXT_CSS));
                if is_css {
                    rules.extend(Rules::parse_with_media(
                        &tree.text_value(node),
                        element.attrs.get("media"),
                    ));
                }
            }
            Some(NodeType::Element(element)) if element.tag_is("link") => {
                let is_stylesheet = element.attrs.get("rel").is_some_and(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
                });
                if let Some(href) = element.attrs.get("href").filter(|_| is_stylesheet) {
                    load_into(&mut rules, tree, loader, href, element.attrs.get("media"));
                }
            }
            _ => {}
        }
    }
    rules
}

fn load_into<L: ResourceLoader + ?Sized>(
    rules: &mut Rules,
    tree: &DomTree,
    loader: &L,
    href: &str,
    media: Option<&str>,
) {
    let location = resolve_reference(href, tree.location());
    match loader.load(&location) {
        Ok(resource) => rules.extend(Rules::parse_with_media(&resource.text(), media)),
        Err(e) => {
            let _ = warn_once("CSS", &format!("cannot load style sheet '{location}': {e}"));
        }
    }
}
