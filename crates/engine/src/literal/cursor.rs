//! Character cursor used by the literal parser.

/// A cursor over literal text that tracks the current byte offset.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'src> {
    source: &'src str,
    position: usize,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self { source, position: 0 }
    }

    /// Current byte offset into the source.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Unconsumed remainder of the source.
    pub(crate) fn rest(&self) -> &'src str {
        &self.source[self.position..]
    }

    pub(crate) fn first(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let character = self.first()?;
        self.position += character.len_utf8();
        Some(character)
    }

    /// Consumes `expected` when it is the next character.
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.first() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `predicate` holds and returns them.
    pub(crate) fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'src str {
        let start = self.position;
        while let Some(character) = self.first() {
            if !predicate(character) {
                break;
            }
            self.position += character.len_utf8();
        }
        &self.source[start..self.position]
    }

    /// Skips whitespace, line breaks, and `#` comments.
    pub(crate) fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            if self.first() == Some('#') {
                self.eat_while(|character| character != '\n');
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_byte_offsets_across_multibyte_characters() {
        let mut cursor = Cursor::new("é1");
        assert_eq!(cursor.bump(), Some('é'));
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.first(), Some('1'));
        assert_eq!(cursor.second(), None);
    }

    #[test]
    fn skips_whitespace_and_comments() {
        let mut cursor = Cursor::new("  # note\n\t 42");
        cursor.skip_trivia();
        assert_eq!(cursor.rest(), "42");
    }
}
