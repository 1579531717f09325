/// Position-tracking reader over the text of one expression.
///
/// Offsets are bytes into the expression so the lexer can slice lexemes
/// out of it. Lines and columns are 1-based and count characters, which is
/// what an error caret under the offending text needs.
pub struct Cursor<'src> {
    text: &'src str,
    /// Unread tail of `text`.
    rest: &'src str,
    offset: u32,
    line: u32,
    column: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            rest: text,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        match self.rest.as_bytes().first() {
            Some(&b) if b.is_ascii() => Some(char::from(b)),
            Some(_) => self.rest.chars().next(),
            None => None,
        }
    }

    /// The character `n` places ahead; `peek_nth(0)` is `peek()`.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    #[inline]
    pub fn check(&self, pred: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(pred)
    }

    /// Whether the unread text starts with `prefix`, e.g. `@"` or `/*`.
    #[inline]
    pub fn check_str(&self, prefix: &str) -> bool {
        self.rest.starts_with(prefix)
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        let width = ch.len_utf8();
        self.rest = &self.rest[width..];
        self.offset += width as u32;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        let matched = self.peek() == Some(ch);
        if matched {
            self.advance();
        }
        matched
    }

    /// Advance over the run of characters matching `pred` and return it.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&pred) {
            self.advance();
        }
        self.slice_from(start)
    }

    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.text[start as usize..self.offset as usize]
    }
}

/// Identifiers start with a letter, `_` or `$`.
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_parameter_name() {
        let mut cursor = Cursor::new("$rate * 2");
        assert!(cursor.check(is_ident_start));
        assert_eq!(cursor.eat_while(is_ident_continue), "$rate");
        assert_eq!(cursor.offset(), 5);
        assert!(cursor.eat(' '));
        assert!(!cursor.eat('+'));
        assert_eq!(cursor.peek(), Some('*'));
        assert_eq!(cursor.peek_nth(2), Some('2'));
    }

    #[test]
    fn recognises_verbatim_prefix() {
        let cursor = Cursor::new("@\"C:\\dir\"");
        assert!(cursor.check_str("@\""));
        assert!(!cursor.check_str("/*"));
    }

    #[test]
    fn newline_in_comment_moves_to_next_line() {
        let mut cursor = Cursor::new("x // half\n* 2");
        cursor.eat_while(|c| c != '\n');
        assert_eq!((cursor.line(), cursor.column()), (1, 10));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
        assert_eq!(cursor.eat_while(|c| c == '*'), "*");
        assert_eq!(cursor.column(), 2);
    }

    #[test]
    fn columns_count_characters_in_string_literals() {
        let mut cursor = Cursor::new("\"ünï\" + x");
        cursor.advance();
        assert_eq!(cursor.eat_while(|c| c != '"'), "ünï");
        assert_eq!(cursor.offset(), 6);
        assert_eq!(cursor.column(), 5);
        cursor.advance();
        assert_eq!(cursor.slice_from(0), "\"ünï\"");
        assert!(!cursor.is_eof());
    }

    #[test]
    fn identifier_characters() {
        assert!(is_ident_start('$'));
        assert!(is_ident_start('_'));
        assert!(is_ident_start('é'));
        assert!(!is_ident_start('0'));
        assert!(is_ident_continue('0'));
        assert!(!is_ident_continue('-'));
        assert!(!is_ident_continue('.'));
    }
}
