//! Element tree for the sylva document engine.
//!
//! This crate provides the arena-based tree shared by the markup parser, the
//! CSS engine and the XSLT transformer.
//!
//! # Design
//!
//! All nodes live in one vector owned by [`DomTree`]. Relationships are
//! [`NodeId`] indices: a parent owns its children through its child list, and
//! the child's `parent` index is used purely for upward navigation. Removing a
//! node only detaches it; the slot stays allocated until the tree is dropped.

pub mod attributes;
pub mod entities;
pub mod kind;
pub mod serialize;

pub use attributes::Attributes;
pub use kind::{ContentModel, ElementKind};

/// A type-safe index into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// Whether the tree was built by the XML or the HTML front end.
///
/// The HTML document node only accepts comments, a DOCTYPE and the `HTML`
/// element; the XML document node accepts anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFlavor {
    /// Generic XML document
    #[default]
    Xml,
    /// HTML document
    Html,
}

/// One node of the tree with its structural links.
#[derive(Debug, Clone)]
pub struct Node {
    /// Payload of the node
    pub node_type: NodeType,
    /// Parent node, `None` for the document and for detached nodes
    pub parent: Option<NodeId>,
    /// Ordered children
    pub children: Vec<NodeId>,
    /// Sibling immediately after this node in its parent's child list
    pub next_sibling: Option<NodeId>,
    /// Sibling immediately before this node in its parent's child list
    pub prev_sibling: Option<NodeId>,
}

/// The kinds of node the tree can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// Root container
    Document,
    /// An element with tag, attributes and children
    Element(ElementData),
    /// Decoded character data
    Text(String),
    /// Unparsed character data (`<![CDATA[...]]>`, script bodies)
    CData(String),
    /// `<!-- ... -->`
    Comment(String),
    /// Content of `<!DOCTYPE ...>`
    DocType(String),
    /// `<?xml version=... encoding=...?>`
    Declaration(Attributes),
    /// `<?xml-stylesheet type=... href=...?>`
    StyleSheet(Attributes),
    /// Any other `<?target data?>`
    ProcessingInstruction {
        /// Instruction name
        target: String,
        /// Verbatim body
        data: String,
    },
}

impl NodeType {
    /// Short lowercase name of the variant, used in diagnostics and dumps.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Element(_) => "element",
            Self::Text(_) => "text",
            Self::CData(_) => "cdata",
            Self::Comment(_) => "comment",
            Self::DocType(_) => "doctype",
            Self::Declaration(_) => "declaration",
            Self::StyleSheet(_) => "stylesheet",
            Self::ProcessingInstruction { .. } => "processing-instruction",
        }
    }
}

/// Element-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Qualified tag name as produced by the factory (`xsl:template`, `TABLE`)
    pub tag_name: String,
    /// Attribute list
    pub attrs: Attributes,
    /// Structural behaviour chosen by the factory
    pub kind: ElementKind,
}

impl ElementData {
    /// Element without attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: Attributes::new(),
            kind,
        }
    }

    /// Namespace prefix (`xsl` for `xsl:template`).
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.tag_name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Tag name without its prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.tag_name
            .split_once(':')
            .map_or(self.tag_name.as_str(), |(_, local)| local)
    }

    /// Compare the tag name honouring the kind's case sensitivity.
    #[must_use]
    pub fn tag_is(&self, tag: &str) -> bool {
        if self.kind.case_sensitive {
            self.tag_name == tag
        } else {
            self.tag_name.eq_ignore_ascii_case(tag)
        }
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }
}

/// Arena-based element tree.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes, indexed by `NodeId`. The document is at index 0.
    nodes: Vec<Node>,
    flavor: DocumentFlavor,
    location: Option<String>,
}

impl DomTree {
    /// Create a new XML tree with just the document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_flavor(DocumentFlavor::Xml)
    }

    /// Create a new tree of the given flavor.
    #[must_use]
    pub fn with_flavor(flavor: DocumentFlavor) -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        };
        Self {
            nodes: vec![document],
            flavor,
            location: None,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// XML or HTML.
    #[must_use]
    pub const fn flavor(&self) -> DocumentFlavor {
        self.flavor
    }

    /// File path or URL the document was read from.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Record where the document came from.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Node payload.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> Option<&NodeType> {
        self.get(id).map(|n| &n.node_type)
    }

    /// Number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the document node exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.last_child(parent);
        self.nodes[parent.0].children.push(child);
        self.link(parent, last, child, None);
    }

    /// Insert `child` at `index` in `parent`'s child list (clamped to the end),
    /// detaching it from any previous parent first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        let prev = index.checked_sub(1).map(|i| children[i]);
        let next = children.get(index).copied();
        children.insert(index, child);
        self.link(parent, prev, child, next);
    }

    /// Remove `child` from `parent`. Returns `false` if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Unlink `id` from its parent, if any. The subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let node = &mut self.nodes[id.0];
        let prev = node.prev_sibling.take();
        let next = node.next_sibling.take();
        node.parent = None;

        let children = &mut self.nodes[parent.0].children;
        if let Some(index) = children.iter().position(|&c| c == id) {
            let _ = children.remove(index);
        }
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }
    }

    /// Splice `child` between `prev` and `next` under `parent`.
    fn link(
        &mut self,
        parent: NodeId,
        prev: Option<NodeId>,
        child: NodeId,
        next: Option<NodeId>,
    ) {
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = next;
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = Some(child);
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = Some(child);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Closest preceding sibling that is an element.
    #[must_use]
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.preceding_siblings(id)
            .find(|&sibling| self.as_element(sibling).is_some())
    }

    /// Position of `id` in its parent's child list.
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// All descendants of `id` in document order, `id` itself excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// Attribute of an element, declaration or stylesheet reference.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)?.get(name)
    }

    /// Attribute list of a node that has one.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        match self.node_type(id)? {
            NodeType::Element(data) => Some(&data.attrs),
            NodeType::Declaration(attrs) | NodeType::StyleSheet(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Set an attribute on an element, declaration or stylesheet reference.
    /// Returns `false` for nodes without attributes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(node) = self.get_mut(id) else {
            return false;
        };
        match &mut node.node_type {
            NodeType::Element(ElementData { attrs, .. })
            | NodeType::Declaration(attrs)
            | NodeType::StyleSheet(attrs) => {
                attrs.set(name, value);
                true
            }
            _ => false,
        }
    }

    /// Plain value of a node: the concatenated text and CDATA of its
    /// descendants (or its own text for leaves).
    #[must_use]
    pub fn text_value(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.node_type(id) {
            Some(NodeType::Text(text) | NodeType::CData(text)) => out.push_str(text),
            Some(NodeType::ProcessingInstruction { data, .. }) => out.push_str(data),
            Some(NodeType::Element(_) | NodeType::Document) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            _ => {}
        }
    }

    /// The first element child of the document.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// First element child of `parent` whose tag matches `tag`.
    #[must_use]
    pub fn find_child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .find(|&&id| self.as_element(id).is_some_and(|e| e.tag_is(tag)))
            .copied()
    }

    /// Namespace URI bound to the element's prefix (or the default namespace)
    /// by an `xmlns` attribute on the element or one of its ancestors.
    #[must_use]
    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        let element = self.as_element(id)?;
        let declaration = element
            .prefix()
            .map_or_else(|| "xmlns".to_string(), |p| format!("xmlns:{p}"));
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|node| self.as_element(node)?.attrs.get(&declaration))
    }

    /// The first `<?xml-stylesheet?>` of the document as `(href, type)`.
    #[must_use]
    pub fn stylesheet_reference(&self) -> Option<(&str, &str)> {
        self.children(NodeId::ROOT)
            .iter()
            .find_map(|&id| match self.node_type(id)? {
                NodeType::StyleSheet(attrs) => Some((
                    attrs.get("href").unwrap_or_default(),
                    attrs.get("type").unwrap_or_default(),
                )),
                _ => None,
            })
    }

    /// Whether `child` may be inserted into `parent`.
    ///
    /// Elements defer to their [`ElementKind`]; the document node defers to
    /// the tree's [`DocumentFlavor`]; leaves accept nothing.
    #[must_use]
    pub fn accepts(&self, parent: NodeId, child: &NodeType) -> bool {
        match self.node_type(parent) {
            Some(NodeType::Element(data)) => data.kind.accepts(child),
            Some(NodeType::Document) => match self.flavor {
                DocumentFlavor::Xml => !matches!(child, NodeType::Document),
                DocumentFlavor::Html => match child {
                    NodeType::Comment(_) | NodeType::DocType(_) => true,
                    NodeType::Element(data) => data.tag_name.eq_ignore_ascii_case("HTML"),
                    _ => false,
                },
            },
            _ => false,
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}
