//! Character entity tables.
//!
//! XML knows only the five predefined entities (plus `&nbsp;`, which the
//! documents this engine handles use freely). HTML adds the Latin-1 letters
//! and a handful of common symbols. The same tables drive decoding in the
//! parser and encoding in the serializer.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Entities understood in XML mode, keyed by name without `&` and `;`.
const XML_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
];

/// Additional entities understood in HTML mode.
const HTML_ENTITIES: &[(&str, char)] = &[
    ("auml", 'ä'),
    ("Auml", 'Ä'),
    ("agrave", 'à'),
    ("Agrave", 'À'),
    ("aacute", 'á'),
    ("Aacute", 'Á'),
    ("acirc", 'â'),
    ("Acirc", 'Â'),
    ("egrave", 'è'),
    ("Egrave", 'È'),
    ("eacute", 'é'),
    ("Eacute", 'É'),
    ("ecirc", 'ê'),
    ("Ecirc", 'Ê'),
    ("igrave", 'ì'),
    ("Igrave", 'Ì'),
    ("iacute", 'í'),
    ("Iacute", 'Í'),
    ("icirc", 'î'),
    ("Icirc", 'Î'),
    ("ouml", 'ö'),
    ("Ouml", 'Ö'),
    ("ograve", 'ò'),
    ("Ograve", 'Ò'),
    ("oacute", 'ó'),
    ("Oacute", 'Ó'),
    ("ocirc", 'ô'),
    ("Ocirc", 'Ô'),
    ("szlig", 'ß'),
    ("uuml", 'ü'),
    ("Uuml", 'Ü'),
    ("ugrave", 'ù'),
    ("Ugrave", 'Ù'),
    ("uacute", 'ú'),
    ("Uacute", 'Ú'),
    ("ucirc", 'û'),
    ("Ucirc", 'Û'),
    ("yacute", 'ý'),
    ("Yacute", 'Ý'),
    ("ccedil", 'ç'),
    ("Ccedil", 'Ç'),
    ("ntilde", 'ñ'),
    ("Ntilde", 'Ñ'),
    ("sect", '§'),
    ("iquest", '¿'),
    ("iexcl", '¡'),
    ("copy", '©'),
    ("reg", '®'),
    ("deg", '°'),
    ("euro", '€'),
    ("pound", '£'),
    ("yen", '¥'),
    ("cent", '¢'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("middot", '·'),
    ("times", '×'),
    ("divide", '÷'),
    ("mdash", '—'),
    ("ndash", '–'),
    ("hellip", '…'),
    ("bull", '•'),
];

static XML_TABLE: LazyLock<HashMap<&'static str, char>> =
    LazyLock::new(|| XML_ENTITIES.iter().copied().collect());

static HTML_TABLE: LazyLock<HashMap<&'static str, char>> = LazyLock::new(|| {
    XML_ENTITIES
        .iter()
        .chain(HTML_ENTITIES.iter())
        .copied()
        .collect()
});

static HTML_REVERSE: LazyLock<HashMap<char, &'static str>> = LazyLock::new(|| {
    HTML_ENTITIES
        .iter()
        .map(|&(name, c)| (c, name))
        .chain([('\u{00A0}', "nbsp")])
        .collect()
});

/// Which entity table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitySet {
    /// The predefined XML entities.
    Xml,
    /// XML entities plus the HTML named set.
    Html,
}

/// Decode the body of an entity reference (`name`, `#123` or `#x7B`).
#[must_use]
pub fn decode_entity(set: EntitySet, body: &str) -> Option<char> {
    if let Some(number) = body.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let table = match set {
        EntitySet::Xml => &*XML_TABLE,
        EntitySet::Html => &*HTML_TABLE,
    };
    table.get(body).copied()
}

/// Named HTML entity for `c`, if the HTML table has one.
#[must_use]
pub fn html_entity_name(c: char) -> Option<&'static str> {
    HTML_REVERSE.get(&c).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_entities() {
        assert_eq!(decode_entity(EntitySet::Xml, "amp"), Some('&'));
        assert_eq!(decode_entity(EntitySet::Xml, "apos"), Some('\''));
        assert_eq!(decode_entity(EntitySet::Xml, "auml"), None);
    }

    #[test]
    fn test_html_entities() {
        assert_eq!(decode_entity(EntitySet::Html, "auml"), Some('ä'));
        assert_eq!(decode_entity(EntitySet::Html, "szlig"), Some('ß'));
        assert_eq!(decode_entity(EntitySet::Html, "lt"), Some('<'));
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_entity(EntitySet::Xml, "#65"), Some('A'));
        assert_eq!(decode_entity(EntitySet::Xml, "#x41"), Some('A'));
        assert_eq!(decode_entity(EntitySet::Xml, "#abc"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(html_entity_name('é'), Some("eacute"));
        assert_eq!(html_entity_name('\u{00A0}'), Some("nbsp"));
        assert_eq!(html_entity_name('e'), None);
    }
}
