//! XML and HTML parser for the sylva document engine.
//!
//! # Scope
//!
//! - **Character reader** with putback, Latin-1/UTF-8 decoding and
//!   line/column tracking
//! - **Factories** mapping tag names to element kinds (generic XML, HTML 4)
//! - **Parser** building a [`sylva_dom::DomTree`] with best-effort recovery
//!   from mismatched, misplaced and unterminated tags
//!
//! # Not Implemented
//!
//! - DTD validation and external entities
//! - Streaming (SAX-style) parsing

/// Tag-name factories.
pub mod factory;
/// Recursive-descent parser.
pub mod parser;
/// Character source.
pub mod reader;

pub use factory::{Factory, HtmlFactory, XmlFactory};
pub use parser::{ParseIssue, ParseResult, Parser, ParserOptions, ReadOutcome};
pub use reader::CharReader;

/// Parse XML text.
#[must_use]
pub fn parse_xml(text: &str) -> ParseResult {
    Parser::new(CharReader::from_text(text), XmlFactory).parse()
}

/// Parse HTML text.
#[must_use]
pub fn parse_html(text: &str) -> ParseResult {
    Parser::new(CharReader::from_text(text), HtmlFactory).parse()
}

/// Parse raw XML bytes. The input is read as Latin-1 until the XML
/// declaration announces UTF-8.
#[must_use]
pub fn parse_xml_bytes(bytes: &[u8]) -> ParseResult {
    Parser::new(CharReader::from_bytes(bytes), XmlFactory).parse()
}

/// Parse raw HTML bytes, decoded as UTF-8 when valid and Latin-1 otherwise.
#[must_use]
pub fn parse_html_bytes(bytes: &[u8]) -> ParseResult {
    let mut reader = CharReader::from_bytes(bytes);
    reader.set_utf8_mode(std::str::from_utf8(bytes).is_ok());
    Parser::new(reader, HtmlFactory).parse()
}
