//! Character source for the parser.
//!
//! The reader hands out one `char` at a time with a putback stack and keeps
//! a line/column position for diagnostics. Input bytes are read as Latin-1
//! until UTF-8 mode is switched on, which the parser does when the XML
//! declaration names a UTF-8 encoding.

/// Character stream over an owned byte buffer.
#[derive(Debug, Clone)]
pub struct CharReader {
    bytes: Vec<u8>,
    pos: usize,
    utf8: bool,
    pushed: Vec<char>,
    line: usize,
    column: usize,
}

impl CharReader {
    /// Reader over raw bytes, Latin-1 until [`CharReader::set_utf8_mode`].
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            pos: 0,
            utf8: false,
            pushed: Vec::new(),
            line: 1,
            column: 0,
        }
    }

    /// Reader over already decoded text. Starts in UTF-8 mode.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut reader = Self::from_bytes(text.as_bytes());
        reader.utf8 = true;
        reader
    }

    /// Switch multi-byte decoding on or off for the rest of the stream.
    pub const fn set_utf8_mode(&mut self, utf8: bool) {
        self.utf8 = utf8;
    }

    /// Whether multi-byte sequences are decoded as UTF-8.
    #[must_use]
    pub const fn is_utf8(&self) -> bool {
        self.utf8
    }

    /// Nothing pushed back and no bytes left.
    #[must_use]
    pub fn eof(&self) -> bool {
        self.pushed.is_empty() && self.pos >= self.bytes.len()
    }

    /// Current `(line, column)`, both 1-based for lines and 0-based for columns.
    #[must_use]
    pub const fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Push `c` back; it is returned by the next read.
    pub fn putback(&mut self, c: char) {
        self.pushed.push(c);
    }

    /// Next character including whitespace.
    pub fn next_with_blank(&mut self) -> Option<char> {
        if let Some(c) = self.pushed.pop() {
            return Some(c);
        }
        let c = self.decode()?;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Next character that is not whitespace.
    pub fn next_non_blank(&mut self) -> Option<char> {
        loop {
            let c = self.next_with_blank()?;
            if !c.is_whitespace() {
                return Some(c);
            }
        }
    }

    /// Look at the next character without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        let c = self.next_with_blank()?;
        self.putback(c);
        Some(c)
    }

    /// Skip non-blank characters up to and including the first one found in
    /// `meta`, which is returned. `None` at end of input.
    pub fn find_meta_char(&mut self, meta: &str) -> Option<char> {
        loop {
            let c = self.next_non_blank()?;
            if meta.contains(c) {
                return Some(c);
            }
        }
    }

    /// Read up to (and consume) `delimiter`, returning the text before it.
    pub fn read_until_char(&mut self, delimiter: char) -> String {
        let mut out = String::new();
        while let Some(c) = self.next_with_blank() {
            if c == delimiter {
                break;
            }
            out.push(c);
        }
        out
    }

    /// Read up to (and consume) `terminator`. The flag tells whether the
    /// terminator was found before the end of input.
    pub fn read_until(&mut self, terminator: &str) -> (String, bool) {
        let mut out = String::new();
        while let Some(c) = self.next_with_blank() {
            out.push(c);
            if out.ends_with(terminator) {
                out.truncate(out.len() - terminator.len());
                return (out, true);
            }
        }
        (out, false)
    }

    /// Like [`CharReader::read_until`] but the terminator is matched ignoring
    /// ASCII case.
    pub fn read_until_ignore_case(&mut self, terminator: &str) -> (String, bool) {
        let mut out = String::new();
        let needle = terminator.len();
        while let Some(c) = self.next_with_blank() {
            out.push(c);
            if out.len() >= needle
                && out.is_char_boundary(out.len() - needle)
                && out[out.len() - needle..].eq_ignore_ascii_case(terminator)
            {
                out.truncate(out.len() - needle);
                return (out, true);
            }
        }
        (out, false)
    }

    fn decode(&mut self) -> Option<char> {
        let &lead = self.bytes.get(self.pos)?;
        if lead < 0x80 || !self.utf8 {
            self.pos += 1;
            return Some(char::from(lead));
        }
        let width = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        let end = (self.pos + width).min(self.bytes.len());
        let decoded = std::str::from_utf8(&self.bytes[self.pos..end])
            .ok()
            .and_then(|s| s.chars().next());
        if let Some(c) = decoded {
            self.pos = end;
            Some(c)
        } else {
            self.pos += 1;
            Some(char::REPLACEMENT_CHARACTER)
        }
    }
}
