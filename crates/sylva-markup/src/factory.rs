//! Tag-name factories.
//!
//! A [`Factory`] decides which [`ElementKind`] an element gets, which entity
//! table applies and how attributes are spelled. The XML factory treats every
//! tag alike; the HTML factory carries the HTML 4 content models.

use std::collections::HashMap;
use std::sync::LazyLock;

use sylva_dom::entities::{EntitySet, decode_entity};
use sylva_dom::{ContentModel, DocumentFlavor, ElementData, ElementKind};

/// Maps tag names to elements for one markup dialect.
pub trait Factory {
    /// Create an element for `tag` with the dialect's kind and spelling.
    fn create(&self, tag: &str) -> ElementData;

    /// Flavor of the document node the parser starts from.
    fn document_flavor(&self) -> DocumentFlavor;

    /// Decode an entity body (`amp`, `#65`, `#x41`).
    fn entity(&self, body: &str) -> Option<char>;

    /// Whether attributes may omit `=value` and quotes.
    fn lenient_attributes(&self) -> bool;
}

/// Generic XML: every element accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFactory;

impl Factory for XmlFactory {
    fn create(&self, tag: &str) -> ElementData {
        ElementData::new(tag, ElementKind::ANY)
    }

    fn document_flavor(&self) -> DocumentFlavor {
        DocumentFlavor::Xml
    }

    fn entity(&self, body: &str) -> Option<char> {
        decode_entity(EntitySet::Xml, body)
    }

    fn lenient_attributes(&self) -> bool {
        false
    }
}

/// HTML 4 with the transitional and frameset elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFactory;

impl Factory for HtmlFactory {
    fn create(&self, tag: &str) -> ElementData {
        match HTML_ELEMENTS.get(tag.to_ascii_lowercase().as_str()) {
            Some(&(canonical, kind)) => ElementData::new(canonical, kind),
            None => ElementData::new(tag, ElementKind::html(ContentModel::Any)),
        }
    }

    fn document_flavor(&self) -> DocumentFlavor {
        DocumentFlavor::Html
    }

    fn entity(&self, body: &str) -> Option<char> {
        decode_entity(EntitySet::Html, body)
    }

    fn lenient_attributes(&self) -> bool {
        true
    }
}

const EMPTY: ElementKind = ElementKind::html(ContentModel::Empty);
const TEXT: ElementKind = ElementKind::html(ContentModel::Text);
const INLINE: ElementKind = ElementKind::html(ContentModel::Inline);
const BLOCK: ElementKind = ElementKind::html(ContentModel::Block);

const fn only(tags: &'static [&'static str]) -> ElementKind {
    ElementKind::html(ContentModel::Only(tags))
}

const LIST_ITEMS: &[&str] = &["LI"];
const TABLE_ROWS: &[&str] = &["TR"];

/// Everything a `BUTTON` may hold besides text.
const BUTTON_CONTENT: &[&str] = &[
    "ABBR", "ACRONYM", "ADDRESS", "APPLET", "B", "BASEFONT", "BDO", "BIG", "BLOCKQUOTE", "BR",
    "CENTER", "CITE", "CODE", "DFN", "DL", "DIR", "DIV", "EM", "FONT", "H1", "H2", "H3", "H4",
    "H5", "H6", "HR", "I", "IMG", "KBD", "MAP", "MENU", "NOFRAMES", "NOSCRIPT", "OBJECT", "OL",
    "P", "PRE", "Q", "SAMP", "SCRIPT", "SMALL", "SPAN", "STRONG", "SUB", "SUP", "TABLE", "TT",
    "UL", "VAR",
];

/// Lower-case tag -> (canonical spelling, kind), built once.
static HTML_ELEMENTS: LazyLock<HashMap<String, (&'static str, ElementKind)>> =
    LazyLock::new(|| {
        let mut table = HashMap::new();
        let mut register = |tags: &[&'static str], kind: ElementKind| {
            for &tag in tags {
                let _ = table.insert(tag.to_ascii_lowercase(), (tag, kind));
            }
        };

        register(
            &[
                "IMG", "BR", "HR", "META", "LINK", "BASE", "BASEFONT", "FRAME", "AREA", "INPUT",
                "ISINDEX", "COL", "PARAM",
            ],
            EMPTY,
        );
        register(&["TITLE", "OPTION", "TEXTAREA"], TEXT);
        register(&["STYLE", "SCRIPT"], TEXT.raw_text());
        register(&["SELECT"], TEXT.also(&["OPTGROUP", "OPTION"]));
        register(&["BUTTON"], TEXT.also(BUTTON_CONTENT));

        register(
            &[
                "SPAN", "H1", "H2", "H3", "H4", "H5", "H6", "P", "FONT", "ABBR", "ACRONYM", "B",
                "BLINK", "BDO", "BIG", "CITE", "CODE", "DFN", "EM", "I", "KBD", "Q", "STRIKE",
                "SAMP", "SMALL", "SUB", "SUP", "TT", "U", "VAR", "STRONG", "LABEL", "CAPTION",
                "DT",
            ],
            INLINE,
        );
        register(&["ADDRESS"], INLINE.also(&["P"]));
        register(&["A"], INLINE.except(&["A"]));

        register(
            &[
                "BODY", "DIV", "CENTER", "BLOCKQUOTE", "PRE", "IFRAME", "NOSCRIPT", "TD", "TH",
                "LI", "DD", "LEGEND",
            ],
            BLOCK,
        );
        register(&["FORM"], BLOCK.except(&["FORM"]));
        register(&["FIELDSET"], BLOCK.also(&["LEGEND"]));
        register(&["MAP"], BLOCK.also(&["AREA"]));
        register(&["OBJECT", "APPLET"], BLOCK.also(&["PARAM"]));

        register(
            &["HEAD"],
            only(&["BASE", "ISINDEX", "LINK", "META", "OBJECT", "SCRIPT", "STYLE", "TITLE"]),
        );
        register(
            &["TABLE"],
            only(&["CAPTION", "COL", "COLGROUP", "TBODY", "TFOOT", "THEAD", "TR"]),
        );
        register(&["TR"], only(&["TH", "TD"]));
        register(&["THEAD", "TBODY", "TFOOT"], only(TABLE_ROWS));
        register(&["COLGROUP"], only(&["COL"]));
        register(&["UL", "OL", "MENU", "DIR"], only(LIST_ITEMS));
        register(&["DL"], only(&["DD", "DT"]));
        register(&["HTML"], only(&["HEAD", "BODY", "FRAMESET"]));
        register(&["FRAMESET"], only(&["FRAMESET", "FRAME", "NOFRAMES"]));
        register(&["NOFRAMES"], only(&["BODY"]));

        // `S` is an alias of `STRIKE`.
        let _ = table.insert("s".to_string(), ("STRIKE", INLINE));

        table
    });
