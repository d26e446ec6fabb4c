//! Template application.
//!
//! [`Transformer::transform`] starts by applying templates to the source
//! document node. Each selected node runs the template whose match set
//! (the `match` pattern located from the node `apply-templates` ran on)
//! contains it and is the smallest; ties go to the earlier template. Nodes
//! without a template fall back to the built-in rule: elements and the
//! document apply templates to their children, text is copied.
//!
//! The result document is created lazily. `xsl:output method` creates it up
//! front; otherwise the first literal element decides (`html` gives HTML,
//! anything else XML) and `xsl:processing-instruction` gives XML. Output
//! instructions that run before then have nowhere to write and are dropped.

use sylva_common::{ResourceLoader, resolve_reference, warn_once};
use sylva_dom::{Attributes, DomTree, NodeId, NodeType};

use crate::error::XsltError;
use crate::stylesheet::{
    OUTPUT_ENCODING, Output, OutputMethod, OutputSettings, Stylesheet, Template, is_instruction,
};
use crate::xpath::{self, NodeSet};

const TEXT_XSL: &str = "text/xsl";

/// Default for [`TransformOptions::max_depth`]. Each level costs several
/// stack frames, so this stays well inside a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Limits for one transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    /// Deepest nesting of template application; deeper `apply-templates`
    /// calls are skipped with a warning
    pub max_depth: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A source document paired with the style sheet that transforms it.
#[derive(Debug)]
pub struct Transformer<'a> {
    source: &'a DomTree,
    stylesheet: Stylesheet,
    options: TransformOptions,
}

impl<'a> Transformer<'a> {
    /// Transform `source` with an explicit style sheet.
    #[must_use]
    pub fn new(source: &'a DomTree, stylesheet: Stylesheet) -> Self {
        Self {
            source,
            stylesheet,
            options: TransformOptions::default(),
        }
    }

    /// Transform `source` with the style sheet named by its
    /// `<?xml-stylesheet type="text/xsl" href?>` instruction, resolved
    /// against the source location.
    ///
    /// # Errors
    ///
    /// Returns [`XsltError::NoStylesheetReference`] without such an
    /// instruction, or the error of [`Stylesheet::load`].
    pub fn discover<L: ResourceLoader + ?Sized>(
        source: &'a DomTree,
        loader: &L,
    ) -> Result<Self, XsltError> {
        let href = source
            .children(NodeId::ROOT)
            .iter()
            .find_map(|&id| match source.node_type(id) {
                Some(NodeType::StyleSheet(attrs))
                    if attrs
                        .get("type")
                        .is_some_and(|kind| kind.trim().eq_ignore_ascii_case(TEXT_XSL)) =>
                {
                    attrs.get("href").filter(|href| !href.trim().is_empty())
                }
                _ => None,
            })
            .ok_or(XsltError::NoStylesheetReference)?;
        let location = resolve_reference(href.trim(), source.location());
        Ok(Self::new(source, Stylesheet::load(&location, loader)?))
    }

    /// Replace the limits.
    #[must_use]
    pub const fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    /// The style sheet in use.
    #[must_use]
    pub const fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// Run the transformation.
    ///
    /// # Errors
    ///
    /// Returns [`XsltError::NoOutput`] when neither `xsl:output` nor any
    /// executed template created the result document.
    pub fn transform(&self) -> Result<Output, XsltError> {
        let settings = self.stylesheet.output_settings();
        let mut run = Run {
            source: self.source,
            sheet: self.stylesheet.tree(),
            templates: self.stylesheet.templates(),
            method: None,
            result: DomTree::new(),
            depth: 0,
            max_depth: self.options.max_depth,
        };
        let target = settings.method.map(|method| {
            let _ = run.initialize(method);
            NodeId::ROOT
        });
        run.apply_templates("/", "", NodeId::ROOT, false, target);

        let method = run.method.ok_or(XsltError::NoOutput)?;
        let mut tree = run.result;
        finish(&mut tree, method, &settings);
        Ok(Output { tree, method })
    }
}

/// State of one transformation.
struct Run<'a> {
    source: &'a DomTree,
    sheet: &'a DomTree,
    templates: Vec<Template>,
    method: Option<OutputMethod>,
    result: DomTree,
    depth: usize,
    max_depth: usize,
}

impl Run<'_> {
    /// Create the result document unless it exists. Returns the method in
    /// effect.
    fn initialize(&mut self, method: OutputMethod) -> OutputMethod {
        if let Some(existing) = self.method {
            return existing;
        }
        self.method = Some(method);
        self.result = DomTree::with_flavor(method.flavor());
        if let Some(location) = self.source.location() {
            self.result.set_location(location);
        }
        method
    }

    fn append(&mut self, target: Option<NodeId>, node: NodeType) -> Option<NodeId> {
        let target = target?;
        let id = self.result.alloc(node);
        self.result.append_child(target, id);
        Some(id)
    }

    fn apply_templates(
        &mut self,
        select: &str,
        mode: &str,
        context: NodeId,
        include_text: bool,
        target: Option<NodeId>,
    ) {
        if self.depth >= self.max_depth {
            depth_exceeded(self.max_depth);
            return;
        }
        self.depth += 1;

        let source = self.source;
        let selected = NodeSet::new(xpath::locate(source, context, select, include_text).nodes);
        let candidates = self.match_sets(context, mode);
        let mut set = selected.clone();

        for (index, &node) in selected.nodes().iter().enumerate() {
            if let Some(template) = narrowest(&candidates, node) {
                set.seek(index);
                self.transform_template(template, &set, target);
                continue;
            }
            match source.node_type(node) {
                Some(NodeType::Element(_) | NodeType::Document) => {
                    self.apply_templates("*", "", node, true, target);
                }
                Some(NodeType::Text(text)) => {
                    let _ = self.append(target, NodeType::Text(text.clone()));
                }
                Some(NodeType::CData(text)) => {
                    let _ = self.append(target, NodeType::CData(text.clone()));
                }
                _ => {}
            }
        }

        self.depth -= 1;
    }

    /// Templates of `mode` with the nodes their pattern locates from
    /// `context`.
    fn match_sets(&self, context: NodeId, mode: &str) -> Vec<(NodeId, Vec<NodeId>)> {
        self.templates
            .iter()
            .filter(|template| !template.pattern.is_empty() && template.mode == mode)
            .map(|template| {
                let matched = xpath::locate(self.source, context, &template.pattern, false).nodes;
                (template.node, matched)
            })
            .collect()
    }

    /// Execute the children of `template` with the context node of `set`.
    fn transform_template(&mut self, template: NodeId, set: &NodeSet, target: Option<NodeId>) {
        let sheet = self.sheet;
        let mut target = target;
        for &child in sheet.children(template) {
            match sheet.node_type(child) {
                Some(NodeType::Text(text)) => {
                    let _ = self.append(target, NodeType::Text(text.clone()));
                }
                Some(NodeType::CData(text)) => {
                    let _ = self.append(target, NodeType::CData(text.clone()));
                }
                Some(NodeType::Element(element)) if is_instruction(sheet, child) => {
                    self.instruction(child, element.local_name(), set, &mut target);
                }
                Some(NodeType::Element(element)) => {
                    let method = self.initialize(match element.local_name() {
                        "html" | "HTML" => OutputMethod::Html,
                        _ => OutputMethod::Xml,
                    });
                    let target = *target.get_or_insert(NodeId::ROOT);
                    let mut created = method.create(&element.tag_name);
                    for (name, value) in element.attrs.entries() {
                        created.attrs.set(name, value);
                    }
                    let created = self.result.alloc(NodeType::Element(created));
                    self.result.append_child(target, created);
                    self.transform_template(child, set, Some(created));
                }
                _ => {}
            }
        }
    }

    fn instruction(
        &mut self,
        node: NodeId,
        name: &str,
        set: &NodeSet,
        target: &mut Option<NodeId>,
    ) {
        let sheet = self.sheet;
        let attribute = |name: &str| sheet.attribute(node, name).unwrap_or_default();
        match name {
            "value-of" => self.value_of(attribute("select"), set, *target),
            "attribute" => {
                let name = attribute("name");
                if let Some(element) = target.filter(|_| !name.is_empty()) {
                    self.attribute(node, name, set, element);
                }
            }
            "text" => {
                let _ = self.append(*target, NodeType::CData(sheet.text_value(node)));
            }
            "if" => {
                if xpath::truthy(&xpath::evaluate(self.source, set, attribute("test"))) {
                    self.transform_template(node, set, *target);
                }
            }
            "apply-templates" => {
                let select = Some(attribute("select"))
                    .filter(|select| !select.trim().is_empty())
                    .unwrap_or("*");
                if let Some(context) = set.current() {
                    self.apply_templates(select, attribute("mode"), context, false, *target);
                }
            }
            "copy-of" => {
                if let Some(context) = set.current() {
                    self.copy_of(context, attribute("select"), *target);
                }
            }
            "for-each" => {
                if let Some(context) = set.current() {
                    self.for_each(node, attribute("select"), context, *target);
                }
            }
            "processing-instruction" => {
                let _ = self.initialize(OutputMethod::Xml);
                let target = *target.get_or_insert(NodeId::ROOT);
                self.processing_instruction(node, attribute("name").trim(), target);
            }
            "template" | "output" => {}
            other => {
                let _ = warn_once("XSLT", &format!("unsupported instruction xsl:{other}"));
            }
        }
    }

    fn value_of(&mut self, select: &str, set: &NodeSet, target: Option<NodeId>) {
        if target.is_some() {
            let value = xpath::evaluate(self.source, set, select);
            let _ = self.append(target, NodeType::Text(value));
        }
    }

    /// Run the body into a short-lived tree and set its text on `element`.
    fn attribute(&mut self, node: NodeId, name: &str, set: &NodeSet, element: NodeId) {
        let outer = std::mem::take(&mut self.result);
        self.transform_template(node, set, Some(NodeId::ROOT));
        let scratch = std::mem::replace(&mut self.result, outer);
        let value = scratch.text_value(NodeId::ROOT);
        let _ = self.result.set_attribute(element, name, value.trim());
    }

    fn for_each(&mut self, node: NodeId, select: &str, context: NodeId, target: Option<NodeId>) {
        let located = xpath::locate(self.source, context, select, false);
        let mut each = NodeSet::new(located.nodes);
        for index in 0..each.len() {
            each.seek(index);
            self.transform_template(node, &each, target);
        }
    }

    fn processing_instruction(&mut self, node: NodeId, instruction: &str, target: NodeId) {
        let body = self.sheet.text_value(node);
        if instruction == "xml-stylesheet" {
            let attrs = pseudo_attributes(&body);
            if attrs.get("href").is_some_and(|href| !href.is_empty()) {
                let _ = self.append(Some(target), NodeType::StyleSheet(attrs));
            }
        } else if !instruction.is_empty() {
            let _ = self.append(
                Some(target),
                NodeType::ProcessingInstruction {
                    target: instruction.to_string(),
                    data: body.trim().to_string(),
                },
            );
        }
    }

    /// Deep copy of the nodes `select` locates, built with the active
    /// output factory.
    fn copy_of(&mut self, context: NodeId, select: &str, target: Option<NodeId>) {
        let (Some(target), Some(method)) = (target, self.method) else {
            return;
        };
        let source = self.source;
        for node in xpath::locate(source, context, select, true).nodes {
            match source.node_type(node) {
                Some(NodeType::Element(element)) => {
                    let mut copy = method.create(&element.tag_name);
                    for (name, value) in element.attrs.entries() {
                        copy.attrs.set(name, value);
                    }
                    let copy = self.result.alloc(NodeType::Element(copy));
                    self.result.append_child(target, copy);
                    self.copy_of(node, "*", Some(copy));
                }
                Some(NodeType::Document) => self.copy_of(node, "*", Some(target)),
                Some(NodeType::Text(_) | NodeType::CData(_)) => {
                    let _ = self.append(Some(target), NodeType::Text(source.text_value(node)));
                }
                _ => {}
            }
        }
    }
}

#[cold]
fn depth_exceeded(max_depth: usize) {
    let message = format!("templates nested deeper than {max_depth} levels, output truncated");
    let _ = warn_once("XSLT", &message);
}

/// The template whose match set contains `node` and is smallest; the
/// earlier template wins ties.
fn narrowest(candidates: &[(NodeId, Vec<NodeId>)], node: NodeId) -> Option<NodeId> {
    let mut best: Option<(NodeId, usize)> = None;
    for (template, matched) in candidates {
        if matched.contains(&node) && best.is_none_or(|(_, size)| matched.len() < size) {
            best = Some((*template, matched.len()));
        }
    }
    best.map(|(template, _)| template)
}

/// `name="value"` pairs of a processing-instruction body.
fn pseudo_attributes(body: &str) -> Attributes {
    let mut attrs = Attributes::new();
    let mut rest = body;
    while let Some(equals) = rest.find('=') {
        let name = rest[..equals].trim();
        let value = rest[equals + 1..].trim_start();
        let Some(quote) = value.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            break;
        };
        let Some(end) = value[1..].find(quote) else {
            break;
        };
        if !name.is_empty() {
            attrs.set(name, &value[1..=end]);
        }
        rest = &value[end + 2..];
    }
    attrs
}

/// Declaration, DOCTYPE and the HTML `META` charset.
fn finish(tree: &mut DomTree, method: OutputMethod, settings: &OutputSettings) {
    if let Some(doctype) = doctype(tree, settings) {
        let doctype = tree.alloc(NodeType::DocType(doctype));
        tree.insert_child(NodeId::ROOT, 0, doctype);
    }
    if method == OutputMethod::Xml && !settings.omit_xml_declaration {
        let version = settings.version.as_deref().unwrap_or("1.0");
        let attrs = [("version", version), ("encoding", OUTPUT_ENCODING)].into_iter().collect();
        let declaration = tree.alloc(NodeType::Declaration(attrs));
        tree.insert_child(NodeId::ROOT, 0, declaration);
    }
    if method == OutputMethod::Html {
        let head = tree
            .find_child_element(NodeId::ROOT, "HTML")
            .and_then(|html| tree.find_child_element(html, "HEAD"));
        if let Some(head) = head {
            let mut meta = method.create("meta");
            meta.attrs.set("http-equiv", "Content-Type");
            meta.attrs.set("content", format!("text/html; charset={OUTPUT_ENCODING}"));
            let meta = tree.alloc(NodeType::Element(meta));
            tree.append_child(head, meta);
        }
    }
}

fn doctype(tree: &DomTree, settings: &OutputSettings) -> Option<String> {
    if settings.doctype_public.is_none() && settings.doctype_system.is_none() {
        return None;
    }
    let mut doctype = tree.tag_name(tree.document_element()?)?.to_string();
    if let Some(public) = &settings.doctype_public {
        doctype.push_str(&format!(" PUBLIC \"{public}\""));
    }
    match (&settings.doctype_public, &settings.doctype_system) {
        (Some(_), Some(system)) => doctype.push_str(&format!(" \"{system}\"")),
        (None, Some(system)) => doctype.push_str(&format!(" SYSTEM \"{system}\"")),
        _ => {}
    }
    Some(doctype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudo_attributes() {
        let attrs = pseudo_attributes(r#" type="text/css" href='style.css' "#);
        assert_eq!(attrs.get("type"), Some("text/css"));
        assert_eq!(attrs.get("href"), Some("style.css"));
        assert!(pseudo_attributes("href=unquoted").is_empty());
        assert!(pseudo_attributes("href=\"open").is_empty());
    }

    #[test]
    fn test_doctype_forms() {
        let tree = sylva_markup::parse_xml("<html/>").tree;
        let public = OutputSettings {
            doctype_public: Some("-//W3C//DTD HTML 4.01//EN".into()),
            doctype_system: Some("http://www.w3.org/TR/html4/strict.dtd".into()),
            ..OutputSettings::default()
        };
        assert_eq!(
            doctype(&tree, &public).as_deref(),
            Some(
                "html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\""
            )
        );
        let system = OutputSettings {
            doctype_system: Some("doc.dtd".into()),
            ..OutputSettings::default()
        };
        assert_eq!(doctype(&tree, &system).as_deref(), Some("html SYSTEM \"doc.dtd\""));
        assert_eq!(doctype(&tree, &OutputSettings::default()), None);
    }
}
