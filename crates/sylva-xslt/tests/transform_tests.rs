//! Integration tests for template selection, instructions and output
//! post-processing.

use std::collections::HashMap;

use quickcheck_macros::quickcheck;
use sylva_common::{LoadError, Resource, ResourceLoader};
use sylva_dom::{DomTree, NodeId};
use sylva_markup::{CharReader, Parser, XmlFactory, parse_xml};
use sylva_xslt::{
    DEFAULT_MAX_DEPTH, NodeSet, Output, OutputMethod, Stylesheet, TransformOptions, Transformer,
    XsltError, evaluate,
};

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if tree.as_element(from).is_some_and(|e| e.tag_is(tag)) {
        return Some(from);
    }
    tree.children(from)
        .iter()
        .find_map(|&child| find_element(tree, child, tag))
}

fn sheet(body: &str) -> String {
    format!(
        r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">{body}</xsl:stylesheet>"#
    )
}

fn run(source: &str, body: &str) -> Result<Output, XsltError> {
    let tree = parse_xml(source).tree;
    let stylesheet = Stylesheet::parse(&sheet(body)).expect("stylesheet");
    Transformer::new(&tree, stylesheet).transform()
}

fn markup(source: &str, body: &str) -> String {
    run(source, body).expect("transform").to_markup()
}

const BARE_XML: &str = r#"<xsl:output method="xml" omit-xml-declaration="yes"/>"#;

/// In-memory loader keyed by location.
struct MapLoader(HashMap<&'static str, String>);

impl ResourceLoader for MapLoader {
    fn load(&self, location: &str) -> Result<Resource, LoadError> {
        self.0
            .get(location)
            .map(|text| Resource {
                bytes: text.as_bytes().to_vec(),
                content_type: Some("text/xsl".to_string()),
                location: location.to_string(),
            })
            .ok_or_else(|| LoadError::Network(format!("no such sheet: {location}")))
    }
}

// ========== Template selection ==========

#[test]
fn test_narrowest_match_wins() {
    let body = format!(
        r#"{BARE_XML}
        <xsl:template match="items"><list><xsl:apply-templates select="item"/></list></xsl:template>
        <xsl:template match="item"><entry><xsl:value-of select="."/></entry></xsl:template>
        <xsl:template match="item[1]"><first><xsl:value-of select="."/></first></xsl:template>"#
    );
    assert_eq!(
        markup("<items><item>one</item><item>two</item></items>", &body),
        "<list><first>one</first><entry>two</entry></list>"
    );
}

#[test]
fn test_default_rule_copies_text() {
    let body = format!(
        r#"{BARE_XML}<xsl:template match="doc"><out><xsl:apply-templates select="*"/></out></xsl:template>"#
    );
    assert_eq!(
        markup("<doc><note>remember<b>this</b></note></doc>", &body),
        "<out>rememberthis</out>"
    );
}

#[test]
fn test_modes_select_templates() {
    let body = format!(
        r#"{BARE_XML}
        <xsl:template match="list"><out><toc><xsl:apply-templates select="item" mode="toc"/></toc><xsl:apply-templates select="item"/></out></xsl:template>
        <xsl:template match="item" mode="toc"><ref><xsl:value-of select="."/></ref></xsl:template>
        <xsl:template match="item"><para><xsl:value-of select="."/></para></xsl:template>"#
    );
    assert_eq!(
        markup("<list><item>a</item><item>b</item></list>", &body),
        "<out><toc><ref>a</ref><ref>b</ref></toc><para>a</para><para>b</para></out>"
    );
}

// ========== Instructions ==========

#[test]
fn test_for_each_visits_every_node_in_order() {
    let body = format!(
        r#"{BARE_XML}
        <xsl:template match="/"><out><xsl:for-each select="list/item"><row><xsl:attribute name="n"><xsl:value-of select="@n"/></xsl:attribute><xsl:value-of select="position()"/>/<xsl:value-of select="last()"/></row></xsl:for-each></out></xsl:template>"#
    );
    assert_eq!(
        markup(r#"<list><item n="x"/><item n="y"/><item n="z"/></list>"#, &body),
        r#"<out><row n="x">1/3</row><row n="y">2/3</row><row n="z">3/3</row></out>"#
    );
}

#[test]
fn test_if_copy_of_and_text() {
    let body = format!(
        r#"{BARE_XML}
        <xsl:template match="doc"><out><xsl:if test="keep/@a = 1"><yes/></xsl:if><xsl:if test="drop/@a = 1"><no/></xsl:if><xsl:copy-of select="keep"/><xsl:text>plain</xsl:text></out></xsl:template>"#
    );
    assert_eq!(
        markup(r#"<doc><keep a="1"><x>y</x></keep><drop/></doc>"#, &body),
        r#"<out><yes/><keep a="1"><x>y</x></keep><![CDATA[plain]]></out>"#
    );
}

#[test]
fn test_value_of_expressions() {
    let body = format!(
        r#"{BARE_XML}<xsl:template match="order"><total><xsl:value-of select="@qty * @price + 1"/></total></xsl:template>"#
    );
    assert_eq!(
        markup(r#"<order qty="3" price="4"/>"#, &body),
        "<total>13</total>"
    );
}

#[test]
fn test_processing_instructions_start_xml_output() {
    let body = r#"<xsl:template match="/"><xsl:processing-instruction name="xml-stylesheet">type="text/css" href="look.css"</xsl:processing-instruction><xsl:processing-instruction name="render">fast</xsl:processing-instruction><root/></xsl:template>"#;
    let output = run("<doc/>", body).expect("transform");
    assert_eq!(output.method, OutputMethod::Xml);
    assert_eq!(
        output.to_markup(),
        r#"<?xml version="1.0" encoding="ISO-8859-1"?><?xml-stylesheet type="text/css" href="look.css"?><?render fast?><root/>"#
    );
}

#[test]
fn test_output_needs_a_result_document() {
    let body = r#"<xsl:template match="/"><xsl:value-of select="'lost'"/></xsl:template>"#;
    assert!(matches!(run("<doc/>", body), Err(XsltError::NoOutput)));
}

// ========== Output ==========

#[test]
fn test_xml_declaration_and_doctype() {
    let body = r#"<xsl:output method="xml" version="1.1" doctype-system="doc.dtd"/><xsl:template match="/"><doc/></xsl:template>"#;
    assert_eq!(
        markup("<src/>", body),
        r#"<?xml version="1.1" encoding="ISO-8859-1"?><!DOCTYPE doc SYSTEM "doc.dtd"><doc/>"#
    );
}

#[test]
fn test_html_output_gets_meta_charset() {
    let body = r#"<xsl:output method="html" doctype-public="-//W3C//DTD HTML 4.01//EN"/>
        <xsl:template match="/"><html><head><title><xsl:value-of select="page/title"/></title></head><body/></html></xsl:template>"#;
    let output = run("<page><title>Hello</title></page>", body).expect("transform");
    assert_eq!(output.method, OutputMethod::Html);

    let tree = &output.tree;
    let head = find_element(tree, NodeId::ROOT, "HEAD").expect("head");
    assert_eq!(tree.tag_name(head), Some("HEAD"));
    let meta = find_element(tree, head, "META").expect("meta");
    assert_eq!(tree.attribute(meta, "http-equiv"), Some("Content-Type"));
    assert_eq!(
        tree.attribute(meta, "content"),
        Some("text/html; charset=ISO-8859-1")
    );
    let title = find_element(tree, head, "TITLE").expect("title");
    assert_eq!(tree.text_value(title), "Hello");

    let text = output.to_markup();
    assert!(text.starts_with(r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN"><HTML>"#));
    assert!(!text.contains("<?xml"));
}

#[test]
fn test_first_literal_element_picks_html() {
    let output = run(
        "<doc/>",
        r#"<xsl:template match="/"><html><body/></html></xsl:template>"#,
    )
    .expect("transform");
    assert_eq!(output.method, OutputMethod::Html);
    assert!(find_element(&output.tree, NodeId::ROOT, "BODY").is_some());
}

// ========== Limits ==========

#[test]
fn test_recursion_budget_truncates_output() {
    let tree = parse_xml("<doc/>").tree;
    let stylesheet = Stylesheet::parse(&sheet(
        r#"<xsl:template match="/"><out><xsl:apply-templates select="/"/></out></xsl:template>"#,
    ))
    .expect("stylesheet");
    let output = Transformer::new(&tree, stylesheet)
        .with_options(TransformOptions { max_depth: 5 })
        .transform()
        .expect("transform");
    assert_eq!(output.to_markup().matches("<out").count(), 5);
}

#[test]
fn test_default_budget_fits_a_standard_thread_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let tree = parse_xml("<doc/>").tree;
            let stylesheet = Stylesheet::parse(&sheet(
                r#"<xsl:template match="/"><out><xsl:apply-templates select="/"/></out></xsl:template>"#,
            ))
            .expect("stylesheet");
            Transformer::new(&tree, stylesheet)
                .with_options(TransformOptions::default())
                .transform()
                .expect("transform")
                .to_markup()
        })
        .expect("spawn");
    let text = handle.join().expect("runaway templates stay on the stack");
    assert_eq!(text.matches("<out").count(), DEFAULT_MAX_DEPTH);
}

#[test]
fn test_attribute_values_leave_no_nodes_behind() {
    let body = format!(
        r#"{BARE_XML}
        <xsl:template match="list"><out><xsl:for-each select="item"><row><xsl:attribute name="label"><b><xsl:value-of select="@n"/></b><i>!</i></xsl:attribute></row></xsl:for-each></out></xsl:template>"#
    );
    let output = run(r#"<list><item n="x"/><item n="y"/></list>"#, &body).expect("transform");
    assert_eq!(
        output.to_markup(),
        r#"<out><row label="x!"/><row label="y!"/></out>"#
    );
    let attached = output.tree.descendants(NodeId::ROOT).len() + 1;
    assert_eq!(output.tree.len(), attached);
}

// ========== Discovery ==========

#[test]
fn test_discover_resolves_against_source_location() {
    let source = Parser::new(
        CharReader::from_text(
            r#"<?xml-stylesheet type="text/css" href="look.css"?><?xml-stylesheet type="text/xsl" href="show.xsl"?><doc>hi</doc>"#,
        ),
        XmlFactory,
    )
    .location("data/doc.xml")
    .parse()
    .tree;
    let loader = MapLoader(HashMap::from([(
        "data/show.xsl",
        sheet(&format!(
            r#"{BARE_XML}<xsl:template match="doc"><said><xsl:value-of select="."/></said></xsl:template>"#
        )),
    )]));

    let transformer = Transformer::discover(&source, &loader).expect("discover");
    assert_eq!(transformer.stylesheet().templates().len(), 1);
    assert_eq!(
        transformer.transform().expect("transform").to_markup(),
        "<said>hi</said>"
    );
}

#[test]
fn test_discover_failures() {
    let loader = MapLoader(HashMap::new());
    let plain = parse_xml("<doc/>").tree;
    assert!(matches!(
        Transformer::discover(&plain, &loader),
        Err(XsltError::NoStylesheetReference)
    ));

    let missing = parse_xml(r#"<?xml-stylesheet type="text/xsl" href="gone.xsl"?><doc/>"#).tree;
    assert!(matches!(
        Transformer::discover(&missing, &loader),
        Err(XsltError::Load(LoadError::Network(_)))
    ));
}

// ========== Expressions ==========

#[quickcheck]
fn prop_integer_arithmetic(a: i32, b: i32) -> bool {
    let tree = parse_xml("<n/>").tree;
    let set = NodeSet::single(NodeId::ROOT);
    let (a64, b64) = (i64::from(a), i64::from(b));
    evaluate(&tree, &set, &format!("{a} + {b}")) == (a64 + b64).to_string()
        && evaluate(&tree, &set, &format!("{a} - {b}")) == (a64 - b64).to_string()
        && evaluate(&tree, &set, &format!("({a}) * {b}")) == (a64 * b64).to_string()
}
