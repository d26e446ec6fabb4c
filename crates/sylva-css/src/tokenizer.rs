//! Character-level scanner for style sheets.
//!
//! The scanner is deliberately small: selectors need identifiers,
//! one-character delimiters and the position of whitespace (so that `.a .b`
//! and `.a.b` can be told apart), while declaration values are read as raw
//! text up to their terminator.

/// A lexical unit of a selector or declaration name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Run of letters, digits, `-`, `_` or non-ASCII characters
    Ident(String),
    /// Any other single character: `, . # > + { } [ ] ( ) : @ = * ;`
    Delim(char),
    /// Whitespace or comments between two tokens
    Blank,
}

/// Scanner over the characters of a style sheet.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    /// Scanner positioned at the start of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    /// Nothing left to read.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Next token, [`Token::Blank`] included.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.skip_blanks() {
            return if self.is_eof() {
                None
            } else {
                Some(Token::Blank)
            };
        }
        let &c = self.chars.get(self.pos)?;
        if is_ident_char(c) {
            let start = self.pos;
            while self.chars.get(self.pos).is_some_and(|&c| is_ident_char(c)) {
                self.pos += 1;
            }
            return Some(Token::Ident(self.chars[start..self.pos].iter().collect()));
        }
        self.pos += 1;
        Some(Token::Delim(c))
    }

    /// Next token that is not [`Token::Blank`].
    pub fn next_significant(&mut self) -> Option<Token> {
        loop {
            match self.next_token()? {
                Token::Blank => {}
                token => return Some(token),
            }
        }
    }

    /// Skip whitespace and `/* */` comments. Returns whether anything was
    /// skipped.
    pub fn skip_blanks(&mut self) -> bool {
        let start = self.pos;
        loop {
            match self.chars.get(self.pos) {
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('/') if self.chars.get(self.pos + 1) == Some(&'*') => self.skip_comment(),
                _ => return self.pos != start,
            }
        }
    }

    fn skip_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.chars.len() {
            if self.chars[self.pos] == '*' && self.chars.get(self.pos + 1) == Some(&'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    /// Read a declaration value up to `;`, `}` or `!`, whichever comes first
    /// outside quotes and brackets. Returns the trimmed text (comments
    /// removed) and the terminator, which is consumed. The terminator is
    /// `None` at end of input.
    pub fn read_value(&mut self) -> (String, Option<char>) {
        let mut out = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(&c) = self.chars.get(self.pos) {
            if let Some(q) = quote {
                out.push(c);
                self.pos += 1;
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '/' if self.chars.get(self.pos + 1) == Some(&'*') => {
                    self.skip_comment();
                    out.push(' ');
                    continue;
                }
                '"' | '\'' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ';' | '}' | '!' if depth == 0 => {
                    self.pos += 1;
                    return (out.trim().to_string(), Some(c));
                }
                _ => {}
            }
            out.push(c);
            self.pos += 1;
        }
        (out.trim().to_string(), None)
    }

    /// Read raw text up to (and consuming) `end`.
    pub fn read_until(&mut self, end: char) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.get(self.pos) {
            self.pos += 1;
            if c == end {
                break;
            }
            out.push(c);
        }
        out
    }

    /// Skip an unsupported statement: either up to the next `;`, or over a
    /// balanced `{ ... }` block.
    pub fn skip_statement(&mut self) {
        let mut depth = 0usize;
        while let Some(&c) = self.chars.get(self.pos) {
            self.pos += 1;
            match c {
                ';' if depth == 0 => return,
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Split a declaration value into its whitespace-separated parts, keeping
/// quoted strings and bracketed groups such as `rgb(1, 2, 3)` together.
#[must_use]
pub fn split_value(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in value.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
