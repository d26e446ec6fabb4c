//! Node selection and expression evaluation.
//!
//! A small path language over a [`DomTree`]: steps separated by `/`, each an
//! optional `axis::`, a name test and `[...]` predicates, with a trailing
//! `@name` selecting an attribute. Expressions add integer arithmetic,
//! comparisons and boolean logic on top. Every value is a string; booleans
//! are `"1"` and `"0"`.

use strum_macros::EnumString;
use sylva_common::warn_once;
use sylva_dom::{DomTree, NodeId, NodeType};

/// Boolean true.
pub const TRUE: &str = "1";
/// Boolean false.
pub const FALSE: &str = "0";
/// Result of a division or modulo by zero.
pub const NAN: &str = "NaN";

/// Ordered nodes with a cursor on the context node.
///
/// `position()` and `last()` are read from the cursor and the length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: Vec<NodeId>,
    cursor: usize,
}

impl NodeSet {
    /// Set positioned on its first node.
    #[must_use]
    pub const fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes, cursor: 0 }
    }

    /// Set holding `node` only.
    #[must_use]
    pub fn single(node: NodeId) -> Self {
        Self::new(vec![node])
    }

    /// The context node.
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.nodes.get(self.cursor).copied()
    }

    /// 1-based position of the context node.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor + 1
    }

    /// Size of the set.
    #[must_use]
    pub fn last(&self) -> usize {
        self.nodes.len()
    }

    /// Move the cursor to `index` (0-based).
    pub fn seek(&mut self, index: usize) {
        self.cursor = index;
    }

    /// All nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// No nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Outcome of [`locate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    /// Selected nodes in axis order
    pub nodes: Vec<NodeId>,
    /// Attribute named by a trailing `@name`, to be read from each node
    pub attribute: Option<String>,
}

/// Navigation direction of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Axis {
    /// Children (the default)
    Child,
    /// All descendants in document order
    Descendant,
    /// Later siblings and their descendants
    Following,
    /// Later siblings
    FollowingSibling,
    /// Earlier siblings and their descendants, nearest first
    Preceding,
    /// Earlier siblings, nearest first
    PrecedingSibling,
    /// The context node
    #[strum(serialize = "self")]
    SelfNode,
    /// The parent
    Parent,
}

/// Select nodes relative to `context`.
///
/// A leading `/` starts at the document, `//` searches all its descendants,
/// `../` steps to the parent and `./` is ignored. `@name` and `.` select the
/// context itself, the former also naming an attribute. Text and CDATA
/// nodes are only selected when `include_text` is set.
#[must_use]
pub fn locate(tree: &DomTree, context: NodeId, path: &str, include_text: bool) -> Located {
    let mut nodes = Vec::new();
    let attribute = locate_into(tree, context, path.trim(), include_text, &mut nodes);
    Located { nodes, attribute }
}

fn locate_into(
    tree: &DomTree,
    context: NodeId,
    path: &str,
    include_text: bool,
    out: &mut Vec<NodeId>,
) -> Option<String> {
    if let Some(rest) = path.strip_prefix("//") {
        let path = format!("descendant::{rest}");
        return locate_into(tree, document_of(tree, context), &path, include_text, out);
    }
    if let Some(rest) = path.strip_prefix('/') {
        return locate_into(tree, document_of(tree, context), rest, include_text, out);
    }
    if let Some(rest) = path.strip_prefix("../") {
        let parent = tree.parent(context).unwrap_or(context);
        return locate_into(tree, parent, rest, include_text, out);
    }

    let local = path.strip_prefix("./").unwrap_or(path);
    if let Some(attribute) = local.strip_prefix('@') {
        out.push(context);
        return Some(attribute.trim().to_string());
    }
    if local.is_empty() || local == "." {
        out.push(context);
        return None;
    }
    if local == ".." {
        out.push(tree.parent(context).unwrap_or(context));
        return None;
    }

    let (step, rest) = split_step(local);
    let (rest, mut attribute) = match rest.strip_prefix('@') {
        Some(name) => ("", Some(name.trim().to_string())),
        None => (rest, None),
    };

    let (axis, test) = match step.split_once("::") {
        Some((axis, test)) => (axis.trim(), test),
        None => ("child", step),
    };
    let (name, mut predicates) = match test.find('[') {
        Some(i) => (test[..i].trim(), test[i..].trim()),
        None => (test.trim(), ""),
    };
    let Ok(axis) = axis.parse::<Axis>() else {
        let _ = warn_once("XSLT", &format!("unsupported axis '{axis}'"));
        return attribute;
    };

    let mut nodes: Vec<NodeId> = axis_nodes(tree, context, axis, include_text)
        .into_iter()
        .filter(|&node| name_test(tree, node, name))
        .collect();
    while !nodes.is_empty() {
        let Some((expression, remainder)) = next_predicate(predicates) else {
            break;
        };
        predicates = remainder;
        nodes = filter_predicate(tree, nodes, expression);
    }

    if rest.is_empty() {
        out.extend(nodes);
        return attribute;
    }
    let rest = match rest.strip_prefix('/') {
        Some(descendant) => format!("descendant::{descendant}"),
        None => rest.to_string(),
    };
    for node in nodes {
        let found = locate_into(tree, node, &rest, include_text, out);
        if attribute.is_none() {
            attribute = found;
        }
    }
    attribute
}

/// The outermost ancestor of `node` (the document for attached nodes).
fn document_of(tree: &DomTree, node: NodeId) -> NodeId {
    tree.ancestors(node).last().unwrap_or(node)
}

/// Split off the first step at a `/` outside brackets and quotes.
fn split_step(path: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in path.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => return (&path[..i], &path[i + 1..]),
            _ => {}
        }
    }
    (path, "")
}

fn selectable(tree: &DomTree, node: NodeId, include_text: bool) -> bool {
    match tree.node_type(node) {
        Some(NodeType::Element(_)) => true,
        Some(NodeType::Text(_) | NodeType::CData(_)) => include_text,
        _ => false,
    }
}

fn axis_nodes(tree: &DomTree, context: NodeId, axis: Axis, include_text: bool) -> Vec<NodeId> {
    let keep = |node: &NodeId| selectable(tree, *node, include_text);
    let following = || std::iter::successors(tree.next_sibling(context), |&id| tree.next_sibling(id));
    match axis {
        Axis::Child => tree.children(context).iter().copied().filter(keep).collect(),
        Axis::Descendant => tree.descendants(context).into_iter().filter(keep).collect(),
        Axis::FollowingSibling => following().filter(keep).collect(),
        Axis::Following => {
            let mut out = Vec::new();
            for sibling in following().filter(keep) {
                out.push(sibling);
                out.extend(tree.descendants(sibling).into_iter().filter(keep));
            }
            out
        }
        Axis::PrecedingSibling => tree.preceding_siblings(context).filter(keep).collect(),
        Axis::Preceding => {
            let mut out = Vec::new();
            for sibling in tree.preceding_siblings(context).filter(keep) {
                reverse_descendants(tree, sibling, include_text, &mut out);
                out.push(sibling);
            }
            out
        }
        Axis::SelfNode => vec![context],
        Axis::Parent => tree.parent(context).into_iter().collect(),
    }
}

/// Descendants in reverse document order.
fn reverse_descendants(tree: &DomTree, node: NodeId, include_text: bool, out: &mut Vec<NodeId>) {
    for &child in tree.children(node).iter().rev() {
        if selectable(tree, child, include_text) {
            reverse_descendants(tree, child, include_text, out);
            out.push(child);
        }
    }
}

fn name_test(tree: &DomTree, node: NodeId, name: &str) -> bool {
    match name {
        "*" | "node()" => true,
        "text()" => matches!(
            tree.node_type(node),
            Some(NodeType::Text(_) | NodeType::CData(_))
        ),
        _ => tree.as_element(node).is_some_and(|element| element.tag_is(name)),
    }
}

/// The expression of the leading `[...]` and what follows it.
fn next_predicate(predicates: &str) -> Option<(&str, &str)> {
    if !predicates.starts_with('[') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in predicates.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some((predicates[1..i].trim(), predicates[i + 1..].trim()));
                }
            }
            _ => {}
        }
    }
    None
}

/// `[N]` keeps the N-th node (1-based); any other expression keeps the
/// nodes for which it evaluates to `"1"`, with the shrinking set as context.
fn filter_predicate(tree: &DomTree, nodes: Vec<NodeId>, expression: &str) -> Vec<NodeId> {
    if expression.is_empty() {
        return nodes;
    }
    if expression.bytes().all(|b| b.is_ascii_digit()) {
        return expression
            .parse::<usize>()
            .ok()
            .and_then(|position| position.checked_sub(1))
            .and_then(|index| nodes.get(index).copied())
            .into_iter()
            .collect();
    }

    let mut set = NodeSet::new(nodes);
    while set.cursor < set.nodes.len() {
        if evaluate(tree, &set, expression) == TRUE {
            set.cursor += 1;
        } else {
            let _ = set.nodes.remove(set.cursor);
        }
    }
    set.nodes
}

/// String value of `select` for the context node of `set`.
///
/// `position()` and `last()` read the set itself. Otherwise the path is
/// located (text included) and the text of every selected node, or its
/// attribute when the path ends in `@name`, is concatenated.
#[must_use]
pub fn value_of(tree: &DomTree, set: &NodeSet, select: &str) -> String {
    match select.trim() {
        "position()" => set.position().to_string(),
        "last()" => set.last().to_string(),
        select => {
            let Some(context) = set.current() else {
                return String::new();
            };
            let located = locate(tree, context, select, true);
            match located.attribute {
                None => located
                    .nodes
                    .iter()
                    .map(|&node| tree.text_value(node))
                    .collect(),
                Some(name) => located
                    .nodes
                    .iter()
                    .filter_map(|&node| tree.attribute(node, &name))
                    .collect(),
            }
        }
    }
}

/// Whether a value counts as true: non-empty and not `"0"`.
#[must_use]
pub fn truthy(value: &str) -> bool {
    !value.is_empty() && value != FALSE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Or,
    And,
    Equal,
    NotEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl Operator {
    /// Lower binds looser.
    const fn priority(self) -> u8 {
        match self {
            Self::Or => 0,
            Self::And => 1,
            Self::Equal | Self::NotEqual => 2,
            Self::Plus | Self::Minus => 4,
            Self::Multiply | Self::Divide | Self::Modulo => 5,
        }
    }

    fn apply(self, left: &str, right: &str) -> String {
        let flag = |value: bool| String::from(if value { TRUE } else { FALSE });
        let (l, r) = (integer(left), integer(right));
        let number = |value: Option<i64>| value.map_or_else(|| NAN.to_string(), |n| n.to_string());
        match self {
            Self::Or => flag(truthy(left) || truthy(right)),
            Self::And => flag(truthy(left) && truthy(right)),
            Self::Equal => flag(left == right),
            Self::NotEqual => flag(left != right),
            Self::Plus => number(l.checked_add(r)),
            Self::Minus => number(l.checked_sub(r)),
            Self::Multiply => number(l.checked_mul(r)),
            Self::Divide => number(l.checked_div(r)),
            Self::Modulo => number(l.checked_rem(r)),
        }
    }
}

/// Evaluate an expression for the context node of `set`.
///
/// The loosest top-level operator splits the expression (the last one when
/// several share that priority, so operators associate to the left). Both
/// sides are evaluated recursively. Without an operator, a quoted literal
/// yields its contents, a number yields itself and anything else is handed
/// to [`value_of`].
#[must_use]
pub fn evaluate(tree: &DomTree, set: &NodeSet, expression: &str) -> String {
    let expression = strip_parentheses(expression);
    if let Some((operator, left, right)) = split_operator(expression) {
        let left = evaluate(tree, set, left);
        let right = evaluate(tree, set, right);
        return operator.apply(&left, &right);
    }
    if let Some(literal) = unquote(expression) {
        return literal.to_string();
    }
    if expression.is_empty() || is_number(expression) {
        return expression.to_string();
    }
    value_of(tree, set, expression)
}

/// Remove parentheses enclosing the whole expression, repeatedly.
fn strip_parentheses(expression: &str) -> &str {
    let expression = expression.trim();
    if !expression.starts_with('(') {
        return expression;
    }
    let mut depth = 0usize;
    for (i, c) in expression.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return if i + 1 == expression.len() {
                        strip_parentheses(&expression[1..i])
                    } else {
                        expression
                    };
                }
            }
            _ => {}
        }
    }
    expression
}

fn split_operator(expression: &str) -> Option<(Operator, &str, &str)> {
    let bytes = expression.as_bytes();
    let mut depth = 0usize;
    let mut best: Option<(Operator, usize, usize)> = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if let Some((operator, len)) = operator_at(bytes, i) {
                    if best.is_none_or(|(found, ..)| operator.priority() <= found.priority()) {
                        best = Some((operator, i, len));
                    }
                    i += len;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    best.map(|(operator, at, len)| (operator, &expression[..at], &expression[at + len..]))
}

const WORD_OPERATORS: [(&[u8], Operator, bool); 4] = [
    (b"or", Operator::Or, true),
    (b"and", Operator::And, true),
    (b"mod", Operator::Modulo, false),
    (b"div", Operator::Divide, false),
];

fn operator_at(bytes: &[u8], i: usize) -> Option<(Operator, usize)> {
    let rest = &bytes[i..];
    if rest.starts_with(b"||") {
        return Some((Operator::Or, 2));
    }
    if rest.starts_with(b"&&") {
        return Some((Operator::And, 2));
    }
    if rest.starts_with(b"!=") {
        return Some((Operator::NotEqual, 2));
    }
    match rest[0] {
        b'=' => return Some((Operator::Equal, 1)),
        b'+' => return Some((Operator::Plus, 1)),
        b'%' => return Some((Operator::Modulo, 1)),
        b'-' if !is_sign(bytes, i) && !inside_name(bytes, i) => return Some((Operator::Minus, 1)),
        b'*' if has_left_operand(bytes, i) => return Some((Operator::Multiply, 1)),
        _ => {}
    }
    WORD_OPERATORS
        .iter()
        .find(|(word, _, ignore_case)| {
            rest.len() >= word.len()
                && if *ignore_case {
                    rest[..word.len()].eq_ignore_ascii_case(word)
                } else {
                    &rest[..word.len()] == *word
                }
                && i > 0
                && !is_name_byte(bytes[i - 1])
                && !matches!(bytes[i - 1], b'/' | b'@' | b':')
                && bytes.get(i + word.len()).is_none_or(|&b| !is_name_byte(b))
        })
        .map(|&(word, operator, _)| (operator, word.len()))
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')
}

fn previous_significant(bytes: &[u8], i: usize) -> Option<u8> {
    bytes[..i].iter().rev().copied().find(|b| !b.is_ascii_whitespace())
}

/// A `-` with no operand on its left is a sign.
fn is_sign(bytes: &[u8], i: usize) -> bool {
    match previous_significant(bytes, i) {
        None => true,
        Some(b) if b"+-*%=(,[|&!".contains(&b) => true,
        Some(_) => ends_with_word_operator(&bytes[..i]),
    }
}

fn ends_with_word_operator(prefix: &[u8]) -> bool {
    let end = prefix
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |p| p + 1);
    let prefix = &prefix[..end];
    WORD_OPERATORS.iter().any(|(word, _, _)| {
        prefix.len() > word.len()
            && prefix[prefix.len() - word.len()..].eq_ignore_ascii_case(word)
            && !is_name_byte(prefix[prefix.len() - word.len() - 1])
    })
}

/// `item-count`: a hyphen between a name character and a letter.
fn inside_name(bytes: &[u8], i: usize) -> bool {
    i > 0
        && (bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'_')
        && bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic)
}

/// `*` multiplies only after an operand; elsewhere it is a name test.
fn has_left_operand(bytes: &[u8], i: usize) -> bool {
    previous_significant(bytes, i)
        .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b')' | b']' | b'\'' | b'"' | b'.'))
        && !bytes[..i].ends_with(b"::")
}

fn unquote(expression: &str) -> Option<&str> {
    ['\'', '"']
        .into_iter()
        .find_map(|q| expression.strip_prefix(q)?.strip_suffix(q))
        .filter(|_| expression.len() >= 2)
}

fn is_number(expression: &str) -> bool {
    let digits = expression.strip_prefix('-').unwrap_or(expression);
    digits.bytes().any(|b| b.is_ascii_digit())
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

/// Integer value of an operand; empty is 0, a decimal is truncated and
/// anything unparsable is 0.
#[allow(clippy::cast_possible_truncation)]
fn integer(value: &str) -> i64 {
    let value = value.trim();
    if value.is_empty() {
        return 0;
    }
    value.parse::<i64>().unwrap_or_else(|_| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map_or(0, |f| f.trunc() as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylva_markup::parse_xml;

    const CATALOG: &str = r#"<catalog><item id="a" price="3">Apple</item><item id="b" price="5">Bread<note>fresh</note></item><item id="c" price="7">Cheese</item><extra/></catalog>"#;

    fn catalog() -> (DomTree, NodeId) {
        let tree = parse_xml(CATALOG).tree;
        let root = tree.document_element().expect("catalog");
        (tree, root)
    }

    fn ids(tree: &DomTree, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| tree.attribute(n, "id").unwrap_or("-").to_string())
            .collect()
    }

    fn eval(expression: &str) -> String {
        let (tree, root) = catalog();
        evaluate(&tree, &NodeSet::single(root), expression)
    }

    // ========== locate ==========

    #[test]
    fn test_child_steps_and_positions() {
        let (tree, root) = catalog();
        let items = locate(&tree, root, "item", false);
        assert_eq!(ids(&tree, &items.nodes), vec!["a", "b", "c"]);
        assert_eq!(items.attribute, None);

        let second = locate(&tree, root, "item[2]", false);
        assert_eq!(ids(&tree, &second.nodes), vec!["b"]);
        assert!(locate(&tree, root, "item[9]", false).nodes.is_empty());
        assert_eq!(locate(&tree, root, "*", false).nodes.len(), 4);
    }

    #[test]
    fn test_absolute_and_relative_paths() {
        let (tree, root) = catalog();
        assert_eq!(locate(&tree, root, "/", false).nodes, vec![NodeId::ROOT]);
        assert_eq!(locate(&tree, root, "/catalog", false).nodes, vec![root]);

        let note = locate(&tree, root, "item/note", false).nodes[0];
        assert_eq!(locate(&tree, note, "../", false).nodes.len(), 1);
        assert_eq!(ids(&tree, &locate(&tree, note, "..", false).nodes), vec!["b"]);
        assert_eq!(locate(&tree, root, "//note", false).nodes, vec![note]);
        assert_eq!(locate(&tree, NodeId::ROOT, "catalog//note", false).nodes, vec![note]);
    }

    #[test]
    fn test_attribute_selection() {
        let (tree, root) = catalog();
        let located = locate(&tree, root, "item/@price", false);
        assert_eq!(located.nodes.len(), 3);
        assert_eq!(located.attribute.as_deref(), Some("price"));

        let own = locate(&tree, root, "@id", false);
        assert_eq!(own.nodes, vec![root]);
        assert_eq!(own.attribute.as_deref(), Some("id"));
    }

    #[test]
    fn test_axes() {
        let (tree, root) = catalog();
        let b = locate(&tree, root, "item[2]", false).nodes[0];
        assert_eq!(ids(&tree, &locate(&tree, b, "following-sibling::item", false).nodes), vec!["c"]);
        assert_eq!(ids(&tree, &locate(&tree, b, "preceding-sibling::*", false).nodes), vec!["a"]);
        assert_eq!(locate(&tree, b, "self::item", false).nodes, vec![b]);
        assert_eq!(locate(&tree, b, "parent::catalog", false).nodes, vec![root]);
        assert_eq!(locate(&tree, root, "descendant::*", false).nodes.len(), 5);
        assert_eq!(locate(&tree, b, "following::*", false).nodes.len(), 2);
        assert!(locate(&tree, b, "ancestor::*", false).nodes.is_empty());
    }

    #[test]
    fn test_text_nodes_only_when_requested() {
        let (tree, root) = catalog();
        let b = locate(&tree, root, "item[2]", false).nodes[0];
        assert_eq!(locate(&tree, b, "*", false).nodes.len(), 1);
        assert_eq!(locate(&tree, b, "*", true).nodes.len(), 2);
        assert_eq!(locate(&tree, b, "text()", true).nodes.len(), 1);
    }

    #[test]
    fn test_expression_predicates() {
        let (tree, root) = catalog();
        let cheap = locate(&tree, root, "item[@price = '3' or @id = 'c']", false);
        assert_eq!(ids(&tree, &cheap.nodes), vec!["a", "c"]);

        let nested = locate(&tree, root, "item[note = 'fresh']", false);
        assert_eq!(ids(&tree, &nested.nodes), vec!["b"]);

        let chained = locate(&tree, root, "item[@price != '5'][2]", false);
        assert_eq!(ids(&tree, &chained.nodes), vec!["c"]);
    }

    // ========== value_of ==========

    #[test]
    fn test_value_of() {
        let (tree, root) = catalog();
        let set = NodeSet::single(root);
        assert_eq!(value_of(&tree, &set, "item[1]"), "Apple");
        assert_eq!(value_of(&tree, &set, "item/@id"), "abc");
        assert_eq!(value_of(&tree, &set, "item[2]"), "Breadfresh");
        assert_eq!(value_of(&tree, &set, "missing"), "");

        let mut items = NodeSet::new(locate(&tree, root, "item", false).nodes);
        items.seek(1);
        assert_eq!(value_of(&tree, &items, "position()"), "2");
        assert_eq!(value_of(&tree, &items, "last()"), "3");
        assert_eq!(value_of(&tree, &items, "@id"), "b");
    }

    // ========== evaluate ==========

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), "7");
        assert_eq!(eval("(1 + 2) * 3"), "9");
        assert_eq!(eval("10 - 2 - 3"), "5");
        assert_eq!(eval("-4 + 1"), "-3");
        assert_eq!(eval("7 div 2"), "3");
        assert_eq!(eval("7 mod 4"), "3");
        assert_eq!(eval("7 % 0"), NAN);
        assert_eq!(eval("1 div 0"), NAN);
        assert_eq!(eval(" + 5"), "5");
    }

    #[test]
    fn test_comparisons_and_logic() {
        assert_eq!(eval("item[1]/@price = 3"), TRUE);
        assert_eq!(eval("'a' != 'a'"), FALSE);
        assert_eq!(eval("1 and 0"), FALSE);
        assert_eq!(eval("0 or 'x'"), TRUE);
        assert_eq!(eval("1 = 1 && 2 = 2"), TRUE);
        assert_eq!(eval("item[2]/@price + item[3]/@price"), "12");
    }

    #[test]
    fn test_literals_and_names() {
        assert_eq!(eval("'or and'"), "or and");
        assert_eq!(eval("\"x\""), "x");
        assert_eq!(eval("1.50"), "1.50");
        assert_eq!(eval("item[3]"), "Cheese");
        assert!(!truthy(&eval("extra")));
    }

    #[test]
    fn test_operator_words_as_step_names() {
        let tree =
            parse_xml(r#"<page><div>left</div><or>right</or><mod div="9">m</mod></page>"#).tree;
        let set = NodeSet::single(NodeId::ROOT);
        assert_eq!(evaluate(&tree, &set, "page/div"), "left");
        assert_eq!(evaluate(&tree, &set, "page/or"), "right");
        assert_eq!(evaluate(&tree, &set, "page/child::mod"), "m");
        assert_eq!(evaluate(&tree, &set, "page/mod/@div"), "9");
        assert_eq!(evaluate(&tree, &set, "page/mod/@div div 3"), "3");
        assert_eq!(evaluate(&tree, &set, "page/div = 'left' and page/or"), TRUE);
    }
}
