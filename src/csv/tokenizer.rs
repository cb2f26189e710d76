//! Field tokenizer
//!
//! Splits a buffer into raw fields without copying. A field starting with the
//! quote symbol runs to the next quote symbol; doubled quotes are not
//! collapsed, so `"a""b"` yields `a` and leaves `"b"` behind as stray text.

use super::input::{Input, Unit, UnitSet};

/// What ended a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// Column separator, more fields follow on this row
    Separator,
    /// Line break, the row ends here
    LineBreak,
    /// Buffer exhausted
    EndOfInput,
}

impl Terminator {
    /// Whether the row ends after this field
    pub fn ends_row(self) -> bool {
        !matches!(self, Terminator::Separator)
    }
}

/// One raw field
#[derive(Debug)]
pub struct Field<'a, I: ?Sized> {
    /// Field content without quotes or delimiter
    pub raw: &'a I,
    /// Delimiter consumed after the field
    pub terminator: Terminator,
}

/// Cursor over the unread part of a buffer
pub struct FieldTokenizer<'a, I: Input + ?Sized> {
    rest: &'a I,
    separator: I::Unit,
    quote: I::Unit,
    line_breaks: UnitSet<I::Unit>,
    field_ends: UnitSet<I::Unit>,
}

impl<'a, I: Input + ?Sized> FieldTokenizer<'a, I> {
    /// Create a tokenizer with custom separator and quote symbol
    pub fn new(input: &'a I, separator: u8, quote: u8, extended_line_break: bool) -> Self {
        let separator = I::Unit::from_ascii_byte(separator);
        let breaks = if extended_line_break {
            I::EXTENDED_LINE_BREAKS
        } else {
            I::LINE_BREAKS
        };

        Self {
            rest: input,
            separator,
            quote: I::Unit::from_ascii_byte(quote),
            line_breaks: UnitSet::new(breaks, None),
            field_ends: UnitSet::new(breaks, Some(separator)),
        }
    }

    /// Check if the whole buffer was consumed
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.rest.at_end()
    }

    /// Unread part of the buffer
    #[inline]
    pub fn remaining(&self) -> &'a I {
        self.rest
    }

    /// Extract the next field and move past its delimiter
    ///
    /// Returns `None` when the buffer is exhausted.
    pub fn next_field(&mut self) -> Option<Field<'a, I>> {
        let rest = self.rest;
        let first = rest.first_unit()?;

        if first != self.quote {
            let (end, terminator) = self.consume_to_terminator(0);
            return Some(Field {
                raw: rest.range(0, end),
                terminator,
            });
        }

        let open = I::unit_width(first);
        let body = rest.tail(open);
        match body.find_unit(self.quote) {
            Some(close) => {
                // stray text between closing quote and delimiter is dropped
                let after = open + close + I::unit_width(self.quote);
                let (_, terminator) = self.consume_to_terminator(after);
                Some(Field {
                    raw: body.range(0, close),
                    terminator,
                })
            }
            None => {
                self.rest = rest.tail(rest.byte_len());
                Some(Field {
                    raw: body,
                    terminator: Terminator::EndOfInput,
                })
            }
        }
    }

    /// Find the first delimiter at or after `from`, consume through it and
    /// return its offset in the current rest
    fn consume_to_terminator(&mut self, from: usize) -> (usize, Terminator) {
        let rest = self.rest;
        let search = rest.tail(from);
        match search.find_any(&self.field_ends) {
            Some((pos, unit)) => {
                let end = from + pos;
                self.rest = rest.tail(end + I::unit_width(unit));
                let terminator = if unit == self.separator {
                    Terminator::Separator
                } else {
                    Terminator::LineBreak
                };
                (end, terminator)
            }
            None => {
                self.rest = rest.tail(rest.byte_len());
                (rest.byte_len(), Terminator::EndOfInput)
            }
        }
    }

    /// Skip a run of consecutive line breaks
    pub fn skip_line_breaks(&mut self) {
        let rest = self.rest;
        let start = rest.find_not_any(&self.line_breaks).unwrap_or(rest.byte_len());
        self.rest = rest.tail(start);
    }

    /// Discard the header line
    pub fn skip_header(&mut self) {
        self.skip_line();
    }

    /// Discard everything up to the next line break, then skip the line-break run
    ///
    /// Quotes are not honoured; this is used to resynchronise after a bad row.
    pub fn skip_line(&mut self) {
        let rest = self.rest;
        match rest.find_any(&self.line_breaks) {
            Some((pos, _)) => {
                self.rest = rest.tail(pos);
                self.skip_line_breaks();
            }
            None => self.rest = rest.tail(rest.byte_len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str, separator: u8) -> Vec<(String, Terminator)> {
        let mut tokenizer = FieldTokenizer::new(input, separator, b'"', false);
        let mut fields = Vec::new();
        while let Some(field) = tokenizer.next_field() {
            fields.push((field.raw.to_string(), field.terminator));
        }
        fields
    }

    fn raws(input: &str) -> Vec<String> {
        tokenize(input, b',').into_iter().map(|(raw, _)| raw).collect()
    }

    #[test]
    fn test_simple() {
        assert_eq!(
            tokenize("a,b,c", b','),
            vec![
                ("a".to_string(), Terminator::Separator),
                ("b".to_string(), Terminator::Separator),
                ("c".to_string(), Terminator::EndOfInput),
            ]
        );
    }

    #[test]
    fn test_quoted() {
        assert_eq!(raws(r#""a,b",c"#), vec!["a,b", "c"]);
    }

    #[test]
    fn test_doubled_quotes_not_collapsed() {
        // the first inner quote closes the field
        assert_eq!(raws(r#""Say ""Hello""",world"#), vec!["Say ", "world"]);
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(raws("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_trailing_separator() {
        // nothing follows the last separator, so no field is produced for it
        assert_eq!(raws(",,"), vec!["", ""]);
    }

    #[test]
    fn test_quoted_with_newline() {
        assert_eq!(raws("\"Line 1\nLine 2\",normal"), vec!["Line 1\nLine 2", "normal"]);
    }

    #[test]
    fn test_mixed_quoted_unquoted() {
        assert_eq!(raws(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let fields: Vec<_> = tokenize(r#"a;"b;c";d"#, b';')
            .into_iter()
            .map(|(raw, _)| raw)
            .collect();
        assert_eq!(fields, vec!["a", "b;c", "d"]);
    }

    #[test]
    fn test_empty_input() {
        let mut tokenizer = FieldTokenizer::new("", b',', b'"', false);
        assert!(tokenizer.is_exhausted());
        assert!(tokenizer.next_field().is_none());
    }

    #[test]
    fn test_quoted_empty() {
        assert_eq!(raws(r#""","""#), vec!["", ""]);
    }

    #[test]
    fn test_unclosed_quote_runs_to_end() {
        assert_eq!(
            tokenize("\"abc,def\nghi", b','),
            vec![("abc,def\nghi".to_string(), Terminator::EndOfInput)]
        );
    }

    #[test]
    fn test_stray_text_after_quote_dropped() {
        assert_eq!(
            tokenize("\"ab\"cd,e", b','),
            vec![
                ("ab".to_string(), Terminator::Separator),
                ("e".to_string(), Terminator::EndOfInput),
            ]
        );
    }

    #[test]
    fn test_line_break_terminator() {
        let mut tokenizer = FieldTokenizer::new("a\r\n\r\nb", b',', b'"', false);
        let field = tokenizer.next_field().unwrap();
        assert_eq!(field.raw, "a");
        assert_eq!(field.terminator, Terminator::LineBreak);
        assert!(field.terminator.ends_row());
        assert_eq!(tokenizer.remaining(), "\n\r\nb");

        tokenizer.skip_line_breaks();
        assert_eq!(tokenizer.remaining(), "b");
    }

    #[test]
    fn test_skip_line() {
        let mut tokenizer = FieldTokenizer::new("x,y,z\n\nnext".as_bytes(), b',', b'"', false);
        tokenizer.skip_line();
        assert_eq!(tokenizer.remaining(), b"next");

        tokenizer.skip_line();
        assert!(tokenizer.is_exhausted());
    }

    #[test]
    fn test_extended_line_breaks_text() {
        let mut tokenizer = FieldTokenizer::new("a\u{2028}b\u{000C}c", b',', b'"', true);
        let first = tokenizer.next_field().unwrap();
        assert_eq!((first.raw, first.terminator), ("a", Terminator::LineBreak));
        let second = tokenizer.next_field().unwrap();
        assert_eq!((second.raw, second.terminator), ("b", Terminator::LineBreak));
        assert_eq!(tokenizer.remaining(), "c");
    }

    #[test]
    fn test_extended_line_breaks_bytes() {
        let input: &[u8] = b"a\x85b\x0Cc";
        let mut tokenizer = FieldTokenizer::new(input, b',', b'"', true);
        assert_eq!(tokenizer.next_field().unwrap().raw, b"a");
        assert_eq!(tokenizer.next_field().unwrap().raw, b"b");

        let mut plain = FieldTokenizer::new(input, b',', b'"', false);
        assert_eq!(plain.next_field().unwrap().raw, input);
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(raws("héllo,\"wörld\",ünï"), vec!["héllo", "wörld", "ünï"]);
    }
}
