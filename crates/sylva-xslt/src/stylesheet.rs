//! Parsed XSLT style sheets.

use strum_macros::{Display, EnumString};
use sylva_common::{ResourceLoader, warn_once};
use sylva_dom::serialize::{self, Mode};
use sylva_dom::{DocumentFlavor, DomTree, ElementData, NodeId};
use sylva_markup::{CharReader, Factory, HtmlFactory, ParseResult, Parser, XmlFactory};

use crate::error::XsltError;

/// Namespace of the instruction elements.
pub const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// Encoding announced in the declaration and the HTML `META`.
pub const OUTPUT_ENCODING: &str = "ISO-8859-1";

/// Flavor of the result document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputMethod {
    /// Generic XML, preceded by a declaration
    Xml,
    /// HTML 4 with canonical tags
    Html,
}

impl OutputMethod {
    /// Element for `tag` as the matching factory spells it.
    #[must_use]
    pub fn create(self, tag: &str) -> ElementData {
        match self {
            Self::Xml => XmlFactory.create(tag),
            Self::Html => HtmlFactory.create(tag),
        }
    }

    /// Document flavor of the result tree.
    #[must_use]
    pub const fn flavor(self) -> DocumentFlavor {
        match self {
            Self::Xml => DocumentFlavor::Xml,
            Self::Html => DocumentFlavor::Html,
        }
    }

    /// Serializer mode for the result tree.
    #[must_use]
    pub const fn mode(self) -> Mode {
        match self {
            Self::Xml => Mode::Xml,
            Self::Html => Mode::Html,
        }
    }
}

/// Attributes of `xsl:output`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    /// Declared method; decided by the first literal element when absent
    pub method: Option<OutputMethod>,
    /// Version written into the XML declaration
    pub version: Option<String>,
    /// `doctype-system`
    pub doctype_system: Option<String>,
    /// `doctype-public`
    pub doctype_public: Option<String>,
    /// `omit-xml-declaration="yes"`
    pub omit_xml_declaration: bool,
}

/// One `xsl:template`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// The template element
    pub node: NodeId,
    /// Its `match` pattern, empty for named-only templates
    pub pattern: String,
    /// Its `mode`, empty when absent
    pub mode: String,
}

/// A style sheet document and its `xsl:stylesheet` element.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    tree: DomTree,
    root: NodeId,
}

impl Stylesheet {
    /// Wrap a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`XsltError::MissingStylesheetRoot`] when no top-level
    /// element is a `stylesheet` or `transform` in the XSLT namespace.
    pub fn from_tree(tree: DomTree) -> Result<Self, XsltError> {
        let root = tree.children(NodeId::ROOT).iter().copied().find(|&id| {
            is_instruction(&tree, id)
                && tree
                    .as_element(id)
                    .is_some_and(|e| matches!(e.local_name(), "stylesheet" | "transform"))
        });
        match root {
            Some(root) => Ok(Self { tree, root }),
            None => Err(XsltError::MissingStylesheetRoot(
                tree.location().unwrap_or("<inline>").to_string(),
            )),
        }
    }

    /// Parse style sheet text.
    ///
    /// # Errors
    ///
    /// See [`Stylesheet::from_tree`].
    pub fn parse(text: &str) -> Result<Self, XsltError> {
        Self::from_parse(Parser::new(CharReader::from_text(text), XmlFactory).parse())
    }

    /// Load and parse the style sheet at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`XsltError::Load`] when the loader fails, otherwise see
    /// [`Stylesheet::from_tree`].
    pub fn load<L: ResourceLoader + ?Sized>(location: &str, loader: &L) -> Result<Self, XsltError> {
        let resource = loader.load(location)?;
        Self::from_parse(
            Parser::new(CharReader::from_bytes(resource.bytes), XmlFactory)
                .location(resource.location)
                .parse(),
        )
    }

    fn from_parse(result: ParseResult) -> Result<Self, XsltError> {
        for issue in &result.issues {
            let _ = warn_once("XSLT", &format!("stylesheet {issue}"));
        }
        Self::from_tree(result.tree)
    }

    /// The style sheet document.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The `xsl:stylesheet` element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Settings of the first `xsl:output` element, defaults without one.
    ///
    /// Methods other than `xml` and `html` are ignored.
    #[must_use]
    pub fn output_settings(&self) -> OutputSettings {
        let Some(output) = self.instructions("output").next() else {
            return OutputSettings::default();
        };
        let get = |name: &str| {
            self.tree
                .attribute(output, name)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        OutputSettings {
            method: get("method").and_then(|method| method.parse().ok()),
            version: get("version"),
            doctype_system: get("doctype-system"),
            doctype_public: get("doctype-public"),
            omit_xml_declaration: get("omit-xml-declaration").is_some_and(|v| v == "yes"),
        }
    }

    /// All `xsl:template` children in document order.
    #[must_use]
    pub fn templates(&self) -> Vec<Template> {
        self.instructions("template")
            .map(|node| Template {
                node,
                pattern: self.tree.attribute(node, "match").unwrap_or_default().to_string(),
                mode: self.tree.attribute(node, "mode").unwrap_or_default().to_string(),
            })
            .collect()
    }

    fn instructions<'s>(&'s self, name: &'s str) -> impl Iterator<Item = NodeId> + 's {
        self.tree.children(self.root).iter().copied().filter(move |&id| {
            is_instruction(&self.tree, id)
                && self.tree.as_element(id).is_some_and(|e| e.local_name() == name)
        })
    }
}

/// Whether `id` is an element in the XSLT namespace.
pub(crate) fn is_instruction(tree: &DomTree, id: NodeId) -> bool {
    tree.namespace_uri(id) == Some(XSLT_NAMESPACE)
}

/// A finished transformation.
#[derive(Debug, Clone)]
pub struct Output {
    /// The result document
    pub tree: DomTree,
    /// How it was built
    pub method: OutputMethod,
}

impl Output {
    /// The result as markup text.
    #[must_use]
    pub fn to_markup(&self) -> String {
        serialize::to_markup(&self.tree, NodeId::ROOT, self.method.mode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"<?xml version="1.0"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:output method="html" doctype-public="-//W3C//DTD HTML 4.01//EN"/>
  <xsl:template match="/"><html/></xsl:template>
  <xsl:template match="item" mode="toc"/>
  <xsl:template name="helper"/>
</xsl:stylesheet>"#;

    #[test]
    fn test_root_and_templates() {
        let sheet = Stylesheet::parse(SHEET).expect("stylesheet");
        assert_eq!(sheet.tree().tag_name(sheet.root()), Some("xsl:stylesheet"));

        let templates = sheet.templates();
        assert_eq!(templates.len(), 3);
        assert_eq!(templates[0].pattern, "/");
        assert_eq!(templates[1].mode, "toc");
        assert!(templates[2].pattern.is_empty());
    }

    #[test]
    fn test_output_settings() {
        let settings = Stylesheet::parse(SHEET).expect("stylesheet").output_settings();
        assert_eq!(settings.method, Some(OutputMethod::Html));
        assert_eq!(settings.doctype_public.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
        assert_eq!(settings.doctype_system, None);
        assert!(!settings.omit_xml_declaration);
    }

    #[test]
    fn test_any_prefix_bound_to_the_namespace() {
        let sheet = Stylesheet::parse(
            r#"<t:transform xmlns:t="http://www.w3.org/1999/XSL/Transform"><t:output method="text"/></t:transform>"#,
        )
        .expect("stylesheet");
        assert_eq!(sheet.output_settings().method, None);
    }

    #[test]
    fn test_missing_root() {
        let err = Stylesheet::parse(r#"<xsl:stylesheet xmlns:xsl="urn:other"/>"#).unwrap_err();
        assert!(matches!(err, XsltError::MissingStylesheetRoot(_)));
        assert!(Stylesheet::parse("<html/>").is_err());
    }

    #[test]
    fn test_output_method_factories() {
        assert_eq!(OutputMethod::Html.create("table").tag_name, "TABLE");
        assert_eq!(OutputMethod::Xml.create("table").tag_name, "table");
        assert_eq!("html".parse::<OutputMethod>(), Ok(OutputMethod::Html));
        assert_eq!(OutputMethod::Xml.to_string(), "xml");
    }
}
