//! Recursive-descent markup parser.
//!
//! One algorithm serves both dialects; the [`Factory`] supplies element kinds,
//! entities and attribute leniency. Malformed input never aborts the parse:
//! every problem becomes a [`ParseIssue`] and the best-effort tree is returned.

use std::fmt;
use std::str::FromStr;

use strum_macros::EnumString;
use sylva_common::warning::warn_once;
use sylva_dom::{Attributes, DomTree, NodeId, NodeType};

use crate::factory::Factory;
use crate::reader::CharReader;

/// Characters that end an identifier besides whitespace.
const IDENTIFIER_DELIMITERS: &str = "?=&<>\"'/";

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Human-readable description.
    pub message: String,
    /// 1-based line where the reader was when the issue was recorded.
    pub line: usize,
    /// Column on that line.
    pub column: usize,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// A finished parse: the tree plus everything that went wrong on the way.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Best-effort element tree.
    pub tree: DomTree,
    /// Diagnostics in the order they were found.
    pub issues: Vec<ParseIssue>,
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Keep whitespace-only text inside elements.
    pub include_blanks: bool,
    /// Echo every issue through the warning channel as it is found.
    pub verbose: bool,
}

/// How one level of [`Parser::read_object`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The container's own end tag was read.
    Closed,
    /// An end tag for the container's parent was read: both are closed.
    ClosedAncestor,
    /// The container rejected this (detached) element but its parent accepts
    /// it. The container is implicitly closed and the caller adopts the node.
    Reparent(NodeId),
    /// Input ended before the container was closed.
    Eof,
}

/// What follows `<!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
enum Special {
    #[strum(serialize = "--")]
    Comment,
    #[strum(serialize = "[CDATA[")]
    CData,
    #[strum(serialize = "DOCTYPE", ascii_case_insensitive)]
    DocType,
}

/// What follows `<`.
enum Tag {
    Special,
    End(String),
    Instruction(String),
    Start(String),
}

/// Parser over one input stream.
pub struct Parser<F: Factory> {
    reader: CharReader,
    factory: F,
    tree: DomTree,
    issues: Vec<ParseIssue>,
    options: ParserOptions,
}

impl<F: Factory> Parser<F> {
    /// Create a parser reading from `reader` and building with `factory`.
    #[must_use]
    pub fn new(reader: CharReader, factory: F) -> Self {
        let tree = DomTree::with_flavor(factory.document_flavor());
        Self {
            reader,
            factory,
            tree,
            issues: Vec::new(),
            options: ParserOptions::default(),
        }
    }

    /// Keep whitespace-only text below the document level.
    #[must_use]
    pub const fn include_blanks(mut self, include_blanks: bool) -> Self {
        self.options.include_blanks = include_blanks;
        self
    }

    /// Echo issues through [`warn_once`] as they are recorded.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.options.verbose = verbose;
        self
    }

    /// Replace all options at once.
    #[must_use]
    pub const fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Record the file path or URL the input came from.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.tree.set_location(location);
        self
    }

    /// Read the whole input.
    #[must_use]
    pub fn parse(mut self) -> ParseResult {
        // A document node has no parent, so nothing can be handed upwards.
        let _ = self.read_object(NodeId::ROOT, 0);
        ParseResult {
            tree: self.tree,
            issues: self.issues,
        }
    }

    fn issue(&mut self, message: String) {
        if self.options.verbose {
            let _ = warn_once("Markup", &message);
        }
        let (line, column) = self.reader.position();
        self.issues.push(ParseIssue {
            message,
            line,
            column,
        });
    }

    fn container_tag(&self, id: NodeId) -> String {
        self.tree.tag_name(id).unwrap_or_default().to_string()
    }

    /// Whether `</name>` closes `id`. The document node has no end tag.
    fn closes(&self, id: NodeId, name: &str) -> bool {
        self.tree
            .as_element(id)
            .is_some_and(|element| element.tag_name.eq_ignore_ascii_case(name))
    }

    /// Read the content of `container` up to its end tag.
    fn read_object(&mut self, container: NodeId, level: usize) -> ReadOutcome {
        let mut pending = String::new();
        let mut terminated = false;

        while !self.reader.eof() {
            let (text, at_tag) = self.read_pcdata();
            pending = if self.process_pcdata(container, level, &text) {
                String::new()
            } else {
                text
            };
            if !at_tag {
                break;
            }

            match self.read_tag() {
                Tag::End(name) => {
                    if self.process_end_tag(container, &name) {
                        terminated = true;
                        break;
                    }
                    let parent = self.tree.parent(container);
                    if parent.is_some_and(|p| self.closes(p, &name)) {
                        self.issue("--> terminating parent".to_string());
                        return ReadOutcome::ClosedAncestor;
                    }
                    self.issue("--> ignoring".to_string());
                }
                Tag::Special => {
                    pending.clear();
                    if let Some(node) = self.read_special_tag() {
                        let id = self.tree.alloc(node);
                        self.tree.append_child(container, id);
                    }
                }
                Tag::Instruction(target) => {
                    pending.clear();
                    self.process_instruction(container, &target);
                }
                Tag::Start(name) => {
                    pending.clear();
                    if let Some(outcome) = self.process_tag(container, level, &name) {
                        return outcome;
                    }
                }
            }
        }

        if !terminated {
            let tag = self.container_tag(container);
            if !tag.is_empty() {
                self.issue(format!("<{tag}> was not terminated correctly"));
            }
            return ReadOutcome::Eof;
        }
        if self.tree.children(container).is_empty() && !pending.is_empty() {
            self.add_text(container, pending);
        }
        ReadOutcome::Closed
    }

    /// Handle character data. Returns `true` when the text counted as
    /// content (even if it was rejected).
    fn process_pcdata(&mut self, container: NodeId, level: usize, text: &str) -> bool {
        let keep_blanks = level > 0 && self.options.include_blanks;
        let meaningful = if keep_blanks {
            !text.is_empty()
        } else {
            !text.trim().is_empty()
        };
        if meaningful {
            self.add_text(container, text.to_string());
        }
        meaningful
    }

    fn add_text(&mut self, container: NodeId, text: String) {
        let node = NodeType::Text(text);
        if self.tree.accepts(container, &node) {
            let id = self.tree.alloc(node);
            self.tree.append_child(container, id);
        } else {
            self.issue("PCDATA not allowed here".to_string());
        }
    }

    /// `true` when `name` closes `container`; otherwise the mismatch is
    /// recorded.
    fn process_end_tag(&mut self, container: NodeId, name: &str) -> bool {
        let _ = self.reader.find_meta_char(">");
        if self.closes(container, name) {
            return true;
        }
        let tag = self.container_tag(container);
        self.issue(format!("end tag </{name}> does not match start tag <{tag}>"));
        false
    }

    /// Create `name`, attach it and read its content. `Some` ends the
    /// container's `read_object` with that outcome.
    fn process_tag(&mut self, container: NodeId, level: usize, name: &str) -> Option<ReadOutcome> {
        if self.reader.eof() {
            return None;
        }
        if name.is_empty() {
            self.issue("missing tag name after <".to_string());
            return None;
        }
        let data = self.factory.create(name);
        let mut element = self.tree.alloc(NodeType::Element(data));

        loop {
            let tag = self.container_tag(element);
            if !self.place_element(container, element) {
                let rejected = self.container_tag(container);
                self.issue(format!("<{tag}> is not allowed within <{rejected}>"));
                let parent_accepts = self.tree.parent(container).is_some_and(|parent| {
                    self.tree
                        .node_type(element)
                        .is_some_and(|node| self.tree.accepts(parent, node))
                });
                if parent_accepts {
                    return Some(ReadOutcome::Reparent(element));
                }
            }
            self.tree.append_child(container, element);

            while let Some((attr, value)) = self.read_attribute() {
                let _ = self.tree.set_attribute(element, &attr, &value);
            }

            let Some(data) = self.tree.as_element(element) else {
                return None;
            };
            let (raw_text, simple) = (data.kind.raw_text, data.kind.is_simple());
            match self.reader.find_meta_char("/>") {
                Some('/') => {
                    let _ = self.reader.find_meta_char(">");
                    return None;
                }
                None => return None,
                Some(_) if raw_text => {
                    let (code, _) = self.reader.read_until_ignore_case(&format!("</{tag}>"));
                    let code = code.trim();
                    if !code.is_empty() {
                        let id = self.tree.alloc(NodeType::CData(code.to_string()));
                        self.tree.append_child(element, id);
                    }
                    return None;
                }
                Some(_) if simple => return None,
                Some(_) => match self.read_object(element, level + 1) {
                    ReadOutcome::Closed | ReadOutcome::Eof => return None,
                    ReadOutcome::ClosedAncestor => return Some(ReadOutcome::Closed),
                    ReadOutcome::Reparent(adopted) => element = adopted,
                },
            }
        }
    }

    /// Whether `element` may go into `container`. Elements of another
    /// namespace prefix are checked against the closest ancestor sharing
    /// their prefix, and accepted if there is none.
    fn place_element(&self, container: NodeId, element: NodeId) -> bool {
        let prefix_of = |id: NodeId| {
            self.tree
                .as_element(id)
                .and_then(|e| e.prefix().map(str::to_string))
        };
        let prefix = prefix_of(element);
        let target = std::iter::once(container)
            .chain(self.tree.ancestors(container))
            .find(|&id| prefix_of(id) == prefix);
        match (target, self.tree.node_type(element)) {
            (Some(target), Some(node)) => self.tree.accepts(target, node),
            _ => true,
        }
    }

    fn process_instruction(&mut self, container: NodeId, target: &str) {
        let node = match target {
            "xml" | "XML" => {
                let attrs = self.read_instruction_attributes();
                if attrs
                    .get("encoding")
                    .is_some_and(|e| e.eq_ignore_ascii_case("utf-8"))
                {
                    self.reader.set_utf8_mode(true);
                }
                NodeType::Declaration(attrs)
            }
            "xml-stylesheet" => NodeType::StyleSheet(self.read_instruction_attributes()),
            _ => {
                let (data, found) = self.reader.read_until("?>");
                if !found {
                    self.issue(format!("<?{target} was not terminated correctly"));
                }
                NodeType::ProcessingInstruction {
                    target: target.to_string(),
                    data: data.trim().to_string(),
                }
            }
        };
        let id = self.tree.alloc(node);
        self.tree.append_child(container, id);
    }

    fn read_instruction_attributes(&mut self) -> Attributes {
        let mut attrs = Attributes::new();
        while let Some((name, value)) = self.read_attribute() {
            attrs.set(name, value);
        }
        let _ = self.reader.find_meta_char("?");
        let _ = self.reader.find_meta_char(">");
        attrs
    }

    /// Read text up to the next `<`. The flag is `false` at end of input.
    fn read_pcdata(&mut self) -> (String, bool) {
        let mut raw = String::new();
        let mut at_tag = false;
        while let Some(c) = self.reader.next_with_blank() {
            if c == '<' {
                at_tag = true;
                break;
            }
            raw.push(c);
        }
        (self.decode_entities(&raw), at_tag)
    }

    /// Classify the tag after a `<`.
    fn read_tag(&mut self) -> Tag {
        match self.reader.next_non_blank() {
            Some('!') => Tag::Special,
            Some('/') => Tag::End(self.read_identifier()),
            Some('?') => Tag::Instruction(self.read_identifier()),
            Some(c) => {
                self.reader.putback(c);
                Tag::Start(self.read_identifier())
            }
            None => Tag::Start(String::new()),
        }
    }

    /// Comment, CDATA section or DOCTYPE after `<!`.
    fn read_special_tag(&mut self) -> Option<NodeType> {
        let mut opener = String::new();
        let mut special = None;
        while let Some(c) = self.reader.next_with_blank() {
            if c.is_whitespace() || c == '>' || c == '<' {
                self.reader.putback(c);
                break;
            }
            opener.push(c);
            if let Ok(found) = Special::from_str(&opener) {
                special = Some(found);
                break;
            }
        }

        match special {
            Some(Special::Comment) => {
                let (content, found) = self.reader.read_until("-->");
                if found {
                    return Some(NodeType::Comment(content));
                }
                self.issue("comment was not terminated correctly".to_string());
                None
            }
            Some(Special::CData) => {
                let (content, found) = self.reader.read_until("]]>");
                if found {
                    return Some(NodeType::CData(content));
                }
                self.issue("CDATA section was not terminated correctly".to_string());
                None
            }
            Some(Special::DocType) => {
                let mut content = String::new();
                let mut depth = 0usize;
                while let Some(c) = self.reader.next_with_blank() {
                    if c == '>' {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    } else if c == '<' {
                        depth += 1;
                    }
                    content.push(c);
                }
                Some(NodeType::DocType(content.trim().to_string()))
            }
            None => {
                self.issue(format!("unknown declaration <!{opener}"));
                let _ = self.reader.read_until_char('>');
                None
            }
        }
    }

    /// Element or attribute name. Empty when a delimiter comes first.
    fn read_identifier(&mut self) -> String {
        let mut token = String::new();
        let Some(mut c) = self.reader.next_non_blank() else {
            return token;
        };
        loop {
            if c.is_whitespace() || IDENTIFIER_DELIMITERS.contains(c) {
                self.reader.putback(c);
                break;
            }
            token.push(c);
            match self.reader.next_with_blank() {
                Some(next) => c = next,
                None => break,
            }
        }
        token
    }

    /// `name="value"`; in lenient mode also `name=value` and bare `name`
    /// (value `"1"`).
    fn read_attribute(&mut self) -> Option<(String, String)> {
        let name = self.read_identifier();
        if name.is_empty() {
            return None;
        }
        match self.reader.next_non_blank() {
            Some('=') => {}
            other => {
                if let Some(c) = other {
                    self.reader.putback(c);
                }
                if self.factory.lenient_attributes() {
                    return Some((name, "1".to_string()));
                }
                self.issue(format!("attribute {name} has no value"));
                return Some((name, String::new()));
            }
        }

        let raw = match self.reader.next_non_blank() {
            Some(quote @ ('"' | '\'')) => self.reader.read_until_char(quote),
            Some(c) if self.factory.lenient_attributes() => {
                self.reader.putback(c);
                self.read_identifier()
            }
            Some(c) => {
                self.issue(format!("value of attribute {name} is not quoted"));
                self.reader.putback(c);
                self.read_identifier()
            }
            None => String::new(),
        };
        Some((name, self.decode_entities(&raw)))
    }

    /// Replace `&name;` references. Broken references are reported and kept
    /// literally.
    fn decode_entities(&mut self, raw: &str) -> String {
        if !raw.contains('&') {
            return raw.to_string();
        }
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '&' {
                out.push(c);
                continue;
            }
            let mut body = String::new();
            let mut end = None;
            for c in chars.by_ref() {
                if c == ';' || c.is_whitespace() {
                    end = Some(c);
                    break;
                }
                body.push(c);
            }
            match end {
                Some(';') => {
                    if let Some(decoded) = self.factory.entity(&body) {
                        out.push(decoded);
                    } else {
                        self.issue(format!("Unknown entity &{body};"));
                        out.push('&');
                        out.push_str(&body);
                        out.push(';');
                    }
                }
                other => {
                    self.issue(format!("Invalid entity &{body}"));
                    out.push('&');
                    out.push_str(&body);
                    if let Some(c) = other {
                        out.push(c);
                    }
                }
            }
        }
        out
    }
}
