//! Integration tests for the markup parser.

use sylva_dom::serialize::{Mode, to_markup};
use sylva_dom::{DomTree, NodeId, NodeType};
use sylva_markup::{
    CharReader, HtmlFactory, ParseResult, Parser, XmlFactory, parse_html, parse_xml,
    parse_xml_bytes,
};

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if tree.as_element(from).is_some_and(|e| e.tag_name == tag) {
        return Some(from);
    }
    tree.children(from)
        .iter()
        .find_map(|&child| find_element(tree, child, tag))
}

fn messages(result: &ParseResult) -> Vec<&str> {
    result.issues.iter().map(|i| i.message.as_str()).collect()
}

fn child_tags(tree: &DomTree, id: NodeId) -> Vec<&str> {
    tree.children(id)
        .iter()
        .filter_map(|&c| tree.tag_name(c))
        .collect()
}

// ========== XML structure ==========

#[test]
fn test_nested_elements_and_attributes() {
    let result = parse_xml(r#"<doc version="2"><item id="a">one</item><item id="b"/></doc>"#);
    let tree = &result.tree;
    assert!(result.issues.is_empty());

    let doc = tree.document_element().expect("document element");
    assert_eq!(tree.tag_name(doc), Some("doc"));
    assert_eq!(tree.attribute(doc, "version"), Some("2"));
    assert_eq!(child_tags(tree, doc), vec!["item", "item"]);

    let first = tree.children(doc)[0];
    assert_eq!(tree.attribute(first, "id"), Some("a"));
    assert_eq!(tree.text_value(first), "one");
    assert!(tree.children(tree.children(doc)[1]).is_empty());
}

#[test]
fn test_tag_mismatch_recovery() {
    let result = parse_xml("<a><b>text</a>");
    let tree = &result.tree;

    let a = find_element(tree, NodeId::ROOT, "a").expect("a");
    let b = find_element(tree, NodeId::ROOT, "b").expect("b");
    assert_eq!(tree.children(a), &[b]);
    assert_eq!(tree.text_value(b), "text");
    assert_eq!(
        messages(&result),
        vec![
            "end tag </a> does not match start tag <b>",
            "--> terminating parent"
        ]
    );
}

#[test]
fn test_stray_end_tag_is_ignored() {
    let result = parse_xml("<a>x</c>y</a>");
    let a = result.tree.document_element().expect("a");
    assert_eq!(result.tree.text_value(a), "xy");
    assert_eq!(
        messages(&result),
        vec!["end tag </c> does not match start tag <a>", "--> ignoring"]
    );
}

#[test]
fn test_empty_end_tag_is_ignored() {
    let result = parse_xml("<a><x/></><b/></a>");
    let tree = &result.tree;
    let a = tree.document_element().expect("a");
    assert_eq!(child_tags(tree, a), vec!["x", "b"]);
    assert_eq!(
        messages(&result),
        vec!["end tag </> does not match start tag <a>", "--> ignoring"]
    );
}

#[test]
fn test_unterminated_element_reported() {
    let result = parse_xml("<a><b>");
    assert_eq!(
        messages(&result),
        vec![
            "<b> was not terminated correctly",
            "<a> was not terminated correctly"
        ]
    );
}

#[test]
fn test_self_closing_vs_normal() {
    let result = parse_xml(r#"<p><img src="x.png"/><p></p></p>"#);
    let tree = &result.tree;
    assert!(result.issues.is_empty());

    let img = find_element(tree, NodeId::ROOT, "img").expect("img");
    assert!(tree.children(img).is_empty());
    assert_eq!(tree.as_element(img).map(|e| e.attrs.len()), Some(1));
    assert_eq!(tree.attribute(img, "src"), Some("x.png"));

    let outer = tree.document_element().expect("outer p");
    let inner = tree.children(outer)[1];
    assert!(tree.children(inner).is_empty());
}

// ========== special tags ==========

#[test]
fn test_comment_cdata_and_instructions() {
    let result = parse_xml(
        r#"<?xml-stylesheet type="text/xsl" href="s.xsl"?><?php echo 1; ?><a><!-- note --><![CDATA[<raw>]]></a>"#,
    );
    let tree = &result.tree;
    assert!(result.issues.is_empty());
    assert_eq!(tree.stylesheet_reference(), Some(("s.xsl", "text/xsl")));

    let pi = tree.children(NodeId::ROOT)[1];
    assert_eq!(
        tree.node_type(pi),
        Some(&NodeType::ProcessingInstruction {
            target: "php".to_string(),
            data: "echo 1;".to_string()
        })
    );

    let a = tree.document_element().expect("a");
    let kids: Vec<_> = tree
        .children(a)
        .iter()
        .filter_map(|&c| tree.node_type(c))
        .collect();
    assert_eq!(
        kids,
        vec![
            &NodeType::Comment(" note ".to_string()),
            &NodeType::CData("<raw>".to_string())
        ]
    );
}

#[test]
fn test_doctype_balances_brackets() {
    let result = parse_xml(r#"<!DOCTYPE doc [ <!ENTITY x "y"> ]><doc/>"#);
    let first = result.tree.children(NodeId::ROOT)[0];
    assert_eq!(
        result.tree.node_type(first),
        Some(&NodeType::DocType(r#"doc [ <!ENTITY x "y"> ]"#.to_string()))
    );
}

// ========== entities and encoding ==========

#[test]
fn test_entities_decoded() {
    let result = parse_xml("<t a=\"&quot;q&quot;\">a &lt; b &amp; &#65;&#x42;</t>");
    let t = result.tree.document_element().expect("t");
    assert_eq!(result.tree.text_value(t), "a < b & AB");
    assert_eq!(result.tree.attribute(t, "a"), Some("\"q\""));
}

#[test]
fn test_unknown_entity_kept_literally() {
    let result = parse_xml("<t>&bogus;</t>");
    let t = result.tree.document_element().expect("t");
    assert_eq!(result.tree.text_value(t), "&bogus;");
    assert_eq!(messages(&result), vec!["Unknown entity &bogus;"]);
}

#[test]
fn test_html_entities_only_in_html() {
    let html = parse_html("<html><body>&auml;</body></html>");
    let body = find_element(&html.tree, NodeId::ROOT, "BODY").expect("body");
    assert_eq!(html.tree.text_value(body), "ä");

    let xml = parse_xml("<t>&auml;</t>");
    assert_eq!(messages(&xml), vec!["Unknown entity &auml;"]);
}

#[test]
fn test_utf8_declaration_switches_decoding() {
    let declared = parse_xml_bytes("<?xml version=\"1.0\" encoding=\"UTF-8\"?><t>é</t>".as_bytes());
    let t = declared.tree.document_element().expect("t");
    assert_eq!(declared.tree.text_value(t), "é");

    let latin = parse_xml_bytes("<t>é</t>".as_bytes());
    let t = latin.tree.document_element().expect("t");
    assert_eq!(latin.tree.text_value(t), "\u{00C3}\u{00A9}");
}

// ========== whitespace ==========

#[test]
fn test_blank_text_dropped_by_default() {
    let result = parse_xml("<a> <b/> </a>");
    let a = result.tree.document_element().expect("a");
    assert_eq!(result.tree.children(a).len(), 1);
}

#[test]
fn test_include_blanks_keeps_whitespace() {
    let result = Parser::new(CharReader::from_text("<a> <b/> </a>"), XmlFactory)
        .include_blanks(true)
        .parse();
    let a = result.tree.document_element().expect("a");
    assert_eq!(result.tree.children(a).len(), 3);
}

#[test]
fn test_blank_only_leaf_keeps_pending_text() {
    let result = parse_xml("<a>  </a>");
    let a = result.tree.document_element().expect("a");
    assert_eq!(result.tree.text_value(a), "  ");
}

// ========== HTML ==========

#[test]
fn test_html_self_closing_and_empty_paragraph() {
    let result = parse_html(r#"<html><body><img src="x.png"/><p></p></body></html>"#);
    let tree = &result.tree;
    assert!(result.issues.is_empty());

    let img = find_element(tree, NodeId::ROOT, "IMG").expect("img");
    assert!(tree.children(img).is_empty());
    assert_eq!(tree.attribute(img, "SRC"), Some("x.png"));

    let p = find_element(tree, NodeId::ROOT, "P").expect("p");
    assert!(tree.children(p).is_empty());
}

#[test]
fn test_html_lenient_attributes() {
    let result = parse_html("<html><body><input type=checkbox checked></body></html>");
    let input = find_element(&result.tree, NodeId::ROOT, "INPUT").expect("input");
    assert_eq!(result.tree.attribute(input, "type"), Some("checkbox"));
    assert_eq!(result.tree.attribute(input, "checked"), Some("1"));
}

#[test]
fn test_html_void_element_has_no_children() {
    let result = parse_html("<html><body><p>a<br>b</p></body></html>");
    let tree = &result.tree;
    let p = find_element(tree, NodeId::ROOT, "P").expect("p");
    assert_eq!(tree.children(p).len(), 3);
    let br = find_element(tree, NodeId::ROOT, "BR").expect("br");
    assert!(tree.children(br).is_empty());
    assert!(result.issues.is_empty());
}

#[test]
fn test_html_block_inside_paragraph_moves_up() {
    let result = parse_html("<html><body><p>one<div>two</div></body></html>");
    let tree = &result.tree;
    let body = find_element(tree, NodeId::ROOT, "BODY").expect("body");
    assert_eq!(child_tags(tree, body), vec!["P", "DIV"]);

    let p = tree.children(body)[0];
    assert_eq!(tree.text_value(p), "one");
    assert_eq!(messages(&result), vec!["<DIV> is not allowed within <P>"]);
}

#[test]
fn test_html_script_is_raw_text() {
    let result =
        parse_html("<html><head><script>if (a < b) { run(); }</SCRIPT></head></html>");
    let tree = &result.tree;
    assert!(result.issues.is_empty());

    let script = find_element(tree, NodeId::ROOT, "SCRIPT").expect("script");
    let children = tree.children(script);
    assert_eq!(children.len(), 1);
    assert_eq!(
        tree.node_type(children[0]),
        Some(&NodeType::CData("if (a < b) { run(); }".to_string()))
    );
}

#[test]
fn test_html_document_rejects_text() {
    let result = parse_html("stray<html></html>");
    assert_eq!(messages(&result), vec!["PCDATA not allowed here"]);
    assert_eq!(child_tags(&result.tree, NodeId::ROOT), vec!["HTML"]);
}

#[test]
fn test_html_doctype_and_comment() {
    let result = parse_html("<!DOCTYPE html><!-- hi --><html></html>");
    let tree = &result.tree;
    let kinds: Vec<_> = tree
        .children(NodeId::ROOT)
        .iter()
        .filter_map(|&c| tree.node_type(c).map(NodeType::kind_name))
        .collect();
    assert_eq!(kinds, vec!["doctype", "comment", "element"]);
}

#[test]
fn test_html_unterminated_chain() {
    let result = Parser::new(CharReader::from_text("<html><body><p>text"), HtmlFactory).parse();
    assert_eq!(
        messages(&result),
        vec![
            "<P> was not terminated correctly",
            "<BODY> was not terminated correctly",
            "<HTML> was not terminated correctly"
        ]
    );
}

// ========== round trip ==========

#[test]
fn test_xml_round_trip() {
    let input = r#"<root a="1"><item id="x">Hello &amp; bye</item><empty/></root>"#;
    let first = parse_xml(input);
    let written = to_markup(&first.tree, NodeId::ROOT, Mode::Xml);
    assert_eq!(written, input);

    let second = parse_xml(&written);
    assert_eq!(
        to_markup(&second.tree, NodeId::ROOT, Mode::Xml),
        written
    );
}

#[test]
fn test_html_round_trip() {
    let input = "<HTML><BODY><P>a<BR>b &eacute;</P></BODY></HTML>";
    let parsed = parse_html(input);
    assert!(parsed.issues.is_empty());
    assert_eq!(to_markup(&parsed.tree, NodeId::ROOT, Mode::Html), input);
}
