//! Style sheet rules and the rule reader.

use sylva_common::warn_once;

use crate::declarations::Declarations;
use crate::selector::{AttributeTest, Combinator, PseudoClass, Selector, SelectorPart};
use crate::tokenizer::{Token, Tokenizer};

/// One rule: `selector, selector { declarations }`, optionally inside
/// `@media`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Media list the rule is restricted to; `None` applies everywhere
    pub media: Option<String>,
    /// Alternative selectors; the rule applies if any of them matches
    pub selectors: Vec<Selector>,
    /// Declared values
    pub declarations: Declarations,
}

impl Rule {
    /// Whether the rule is active for `media`. Each comma-separated entry of
    /// the rule's media list is compared case-insensitively; `all` matches
    /// any media.
    #[must_use]
    pub fn applies_to(&self, media: &str) -> bool {
        let Some(list) = self.media.as_deref() else {
            return true;
        };
        let list = list.trim();
        list.is_empty()
            || list.split(',').map(str::trim).any(|entry| {
                entry.eq_ignore_ascii_case("all") || entry.eq_ignore_ascii_case(media.trim())
            })
    }
}

/// Rules in source order, document style sheets concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// No rules.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Read a style sheet.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::parse_with_media(text, None)
    }

    /// Read a style sheet whose rules default to `media` (the `media`
    /// attribute of a `<style>` or `<link>`). `@media` blocks keep their
    /// own list.
    #[must_use]
    pub fn parse_with_media(text: &str, media: Option<&str>) -> Self {
        let mut reader = RuleReader {
            tokens: Tokenizer::new(text),
            rules: Vec::new(),
        };
        reader.read_rules(media.map(str::to_string), false);
        Self {
            rules: reader.rules,
        }
    }

    /// Append one rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Append all rules of `other`, after the existing ones.
    pub fn extend(&mut self, other: Self) {
        self.rules.extend(other.rules);
    }

    /// The rules in source order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// No rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

struct RuleReader {
    tokens: Tokenizer,
    rules: Vec<Rule>,
}

impl RuleReader {
    /// Read rules until end of input, or until the `}` closing an `@media`
    /// block when `nested`.
    fn read_rules(&mut self, media: Option<String>, nested: bool) {
        while let Some(token) = self.tokens.next_significant() {
            match token {
                Token::Delim('}') if nested => return,
                Token::Delim('}' | ';') => {}
                Token::Delim('@') => self.read_at_rule(media.as_deref()),
                first => {
                    if let Some(rule) = self.read_rule(first, media.clone()) {
                        self.rules.push(rule);
                    }
                }
            }
        }
    }

    fn read_at_rule(&mut self, media: Option<&str>) {
        let name = match self.tokens.next_token() {
            Some(Token::Ident(name)) => name,
            _ => String::new(),
        };
        if name.eq_ignore_ascii_case("media") {
            let list = self.tokens.read_until('{').trim().to_string();
            let list = if list.is_empty() {
                media.map(str::to_string)
            } else {
                Some(list)
            };
            self.read_rules(list, true);
        } else {
            let _ = warn_once("CSS", &format!("unsupported at-rule '@{name}'"));
            self.tokens.skip_statement();
        }
    }

    /// Read a selector group starting with `first` and its declaration block.
    /// Returns `None` when no valid selector remains or input ends early.
    fn read_rule(&mut self, first: Token, media: Option<String>) -> Option<Rule> {
        let mut selectors = Vec::new();
        let mut builder = SelectorBuilder::default();
        let mut pending = Some(first);

        loop {
            let token = pending.take().or_else(|| self.tokens.next_token())?;
            match token {
                Token::Blank => builder.blank(),
                Token::Delim('>') => builder.combinator(Combinator::Child),
                Token::Delim('+') => builder.combinator(Combinator::Sibling),
                Token::Delim(',') => selectors.extend(builder.finish()),
                Token::Delim('{') => {
                    selectors.extend(builder.finish());
                    break;
                }
                Token::Ident(name) => builder.part().tag = Some(name),
                Token::Delim('*') => builder.part().tag = Some("*".to_string()),
                Token::Delim('.') => match self.tokens.next_token() {
                    Some(Token::Ident(class)) => builder.part().classes.push(class),
                    other => pending = builder.reject('.', other),
                },
                Token::Delim('#') => match self.tokens.next_token() {
                    Some(Token::Ident(id)) => builder.part().id = Some(id),
                    other => pending = builder.reject('#', other),
                },
                Token::Delim(':') => {
                    let mut next = self.tokens.next_token();
                    if next == Some(Token::Delim(':')) {
                        next = self.tokens.next_token();
                    }
                    match next {
                        Some(Token::Ident(name)) => {
                            builder.part().pseudo = Some(PseudoClass::from_name(&name));
                        }
                        other => pending = builder.reject(':', other),
                    }
                }
                Token::Delim('[') => {
                    let text = self.tokens.read_until(']');
                    match AttributeTest::parse(&text) {
                        Some(test) => builder.part().attributes.push(test),
                        None => builder.invalidate(&format!("empty attribute test '[{text}]'")),
                    }
                }
                Token::Delim(c) => builder.invalidate(&format!("unexpected '{c}' in selector")),
            }
        }

        let mut declarations = Declarations::new();
        declarations.read(&mut self.tokens);
        if selectors.is_empty() {
            return None;
        }
        Some(Rule {
            media,
            selectors,
            declarations,
        })
    }
}

/// Accumulates the parts of one selector of a group.
#[derive(Default)]
struct SelectorBuilder {
    parts: Vec<SelectorPart>,
    current: SelectorPart,
    combinator: Option<Combinator>,
    invalid: bool,
}

impl SelectorBuilder {
    fn blank(&mut self) {
        if !self.current.is_empty() && self.combinator.is_none() {
            self.combinator = Some(Combinator::Descendant);
        }
    }

    fn combinator(&mut self, combinator: Combinator) {
        if self.current.is_empty() {
            self.invalidate("combinator without a left-hand side");
        }
        self.combinator = Some(combinator);
    }

    /// The part a simple selector is added to. A pending combinator closes
    /// the current part first.
    fn part(&mut self) -> &mut SelectorPart {
        let current_is_empty = self.current.is_empty();
        if let Some(combinator) = self.combinator.take().filter(|_| !current_is_empty) {
            let mut done = std::mem::take(&mut self.current);
            done.combinator = combinator;
            self.parts.push(done);
        }
        &mut self.current
    }

    /// `marker` was not followed by a name; the token is handed back for
    /// reprocessing.
    fn reject(&mut self, marker: char, next: Option<Token>) -> Option<Token> {
        self.invalidate(&format!("expected a name after '{marker}' in selector"));
        next
    }

    fn invalidate(&mut self, message: &str) {
        if !self.invalid {
            let _ = warn_once("CSS", message);
        }
        self.invalid = true;
    }

    /// Close the current selector and reset for the next one in the group.
    fn finish(&mut self) -> Option<Selector> {
        let mut builder = std::mem::take(self);
        if !builder.current.is_empty() {
            builder.parts.push(builder.current);
        }
        (!builder.invalid && !builder.parts.is_empty()).then(|| Selector::new(builder.parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Property, Value};

    fn only_rule(text: &str) -> Rule {
        let rules = Rules::parse(text);
        assert_eq!(rules.len(), 1, "expected one rule in {text:?}");
        rules.rules()[0].clone()
    }

    #[test]
    fn test_selector_group_and_declarations() {
        let rule = only_rule("h1, h2.title { color: red; margin: 0 }");
        assert_eq!(rule.selectors.len(), 2);
        assert_eq!(rule.selectors[1].parts()[0].classes, vec!["title"]);
        assert_eq!(
            rule.declarations.get(Property::Color).map(Value::as_str),
            Some("red")
        );
        assert_eq!(
            rule.declarations.get(Property::MarginLeft).map(Value::as_str),
            Some("0")
        );
    }

    #[test]
    fn test_combinators_stored_on_left_part() {
        let rule = only_rule("div > p + span em { }");
        let parts = rule.selectors[0].parts();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].combinator, Combinator::Child);
        assert_eq!(parts[1].combinator, Combinator::Sibling);
        assert_eq!(parts[2].combinator, Combinator::Descendant);
        assert_eq!(parts[3].tag.as_deref(), Some("em"));
    }

    #[test]
    fn test_compound_versus_descendant() {
        let compound = only_rule(".a.b {}");
        assert_eq!(compound.selectors[0].parts().len(), 1);
        let descendant = only_rule(".a .b {}");
        assert_eq!(descendant.selectors[0].parts().len(), 2);
    }

    #[test]
    fn test_attribute_and_pseudo_parts() {
        let rule = only_rule("a[href][lang|='en']:first-child::before {}");
        let part = &rule.selectors[0].parts()[0];
        assert_eq!(part.attributes.len(), 2);
        assert_eq!(
            part.attributes[1],
            AttributeTest::BeginsWith("lang".to_string(), "en".to_string())
        );
        assert!(matches!(part.pseudo, Some(PseudoClass::Unsupported(_))));
    }

    #[test]
    fn test_media_blocks() {
        let rules = Rules::parse("p { color: red } @media print, screen { p { color: blue } }");
        assert_eq!(rules.len(), 2);
        assert!(rules.rules()[0].applies_to("print"));
        assert_eq!(rules.rules()[1].media.as_deref(), Some("print, screen"));
        assert!(rules.rules()[1].applies_to("SCREEN"));
        assert!(!rules.rules()[1].applies_to("tv"));
    }

    #[test]
    fn test_default_media() {
        let rules = Rules::parse_with_media("p { } @media tv { b { } }", Some("print"));
        assert_eq!(rules.rules()[0].media.as_deref(), Some("print"));
        assert_eq!(rules.rules()[1].media.as_deref(), Some("tv"));
    }

    #[test]
    fn test_unsupported_at_rules_are_skipped() {
        let rules = Rules::parse(
            "@import url(x.css); @font-face { font-family: x; } p { color: red }",
        );
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].selectors[0].parts()[0].tag.as_deref(), Some("p"));
    }

    #[test]
    fn test_invalid_selector_dropped_from_group() {
        let rules = Rules::parse("p, a % b { color: red } em { color: blue }");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rules()[0].selectors.len(), 1);

        let all_invalid = Rules::parse("%x { color: red } em { color: blue }");
        assert_eq!(all_invalid.len(), 1);
    }

    #[test]
    fn test_truncated_rule_is_dropped() {
        assert!(Rules::parse("p.note").is_empty());
        assert_eq!(Rules::parse("p { color: red").len(), 1);
    }
}
