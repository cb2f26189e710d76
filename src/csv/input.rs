//! Buffer kinds accepted by the parser
//!
//! Two kinds of input are supported:
//! - `[u8]` byte buffers, scanned one byte at a time with `memchr`
//! - `str` character buffers, scanned one `char` at a time
//!
//! All offsets are byte offsets into the buffer, so a `str` slice never
//! splits a character.

use memchr::{memchr, memchr2, memchr3};
use std::borrow::Cow;

const SET_CAPACITY: usize = 8;

/// Small fixed set of code units kept on the stack
#[derive(Debug, Clone, Copy)]
pub struct UnitSet<U: Copy> {
    units: [U; SET_CAPACITY],
    len: usize,
    ascii: Option<[u8; SET_CAPACITY]>,
}

impl<U: Unit> UnitSet<U> {
    /// Build a set from line breaks plus optional extra units
    ///
    /// Units beyond the capacity are dropped; the built-in line-break sets
    /// plus one separator always fit.
    pub fn new(base: &[U], extra: Option<U>) -> Self {
        let filler = base.first().copied().or(extra).unwrap_or(U::NEWLINE);
        let mut units = [filler; SET_CAPACITY];
        let mut len = 0;
        for unit in base.iter().copied().chain(extra) {
            if len == SET_CAPACITY {
                break;
            }
            units[len] = unit;
            len += 1;
        }

        let mut ascii = [0u8; SET_CAPACITY];
        let mut all_ascii = true;
        for (slot, unit) in ascii.iter_mut().zip(&units[..len]) {
            match unit.ascii_byte() {
                Some(b) => *slot = b,
                None => all_ascii = false,
            }
        }

        UnitSet {
            units,
            len,
            ascii: all_ascii.then_some(ascii),
        }
    }

    /// Check membership
    #[inline]
    pub fn contains(&self, unit: U) -> bool {
        self.as_slice().contains(&unit)
    }

    /// Units in the set
    #[inline]
    pub fn as_slice(&self) -> &[U] {
        &self.units[..self.len]
    }

    /// ASCII form of the set when every unit is ASCII
    #[inline]
    fn ascii(&self) -> Option<&[u8]> {
        self.ascii.as_ref().map(|a| &a[..self.len])
    }
}

/// Single code unit of a buffer kind
pub trait Unit: Copy + Eq + std::fmt::Debug + 'static {
    /// `\n` in this unit type
    const NEWLINE: Self;

    /// Unit for an ASCII byte
    fn from_ascii_byte(byte: u8) -> Self;

    /// Byte value when the unit is ASCII
    fn ascii_byte(self) -> Option<u8>;
}

impl Unit for u8 {
    const NEWLINE: Self = b'\n';

    #[inline]
    fn from_ascii_byte(byte: u8) -> Self {
        byte
    }

    #[inline]
    fn ascii_byte(self) -> Option<u8> {
        self.is_ascii().then_some(self)
    }
}

impl Unit for char {
    const NEWLINE: Self = '\n';

    #[inline]
    fn from_ascii_byte(byte: u8) -> Self {
        char::from(byte)
    }

    #[inline]
    fn ascii_byte(self) -> Option<u8> {
        self.is_ascii().then_some(self as u8)
    }
}

/// Borrowed raw field handed to converters and string decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawField<'a> {
    /// Field from a byte buffer
    Bytes(&'a [u8]),
    /// Field from a character buffer
    Text(&'a str),
}

impl<'a> RawField<'a> {
    /// Underlying bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            RawField::Bytes(b) => b,
            RawField::Text(s) => s.as_bytes(),
        }
    }

    /// Text, when the field came from a character buffer
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            RawField::Bytes(_) => None,
            RawField::Text(s) => Some(s),
        }
    }

    /// Text view, lossily decoding bytes as UTF-8
    pub fn to_str_lossy(&self) -> Cow<'a, str> {
        match self {
            RawField::Bytes(b) => String::from_utf8_lossy(b),
            RawField::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Check if field is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

mod private {
    pub trait Sealed {}

    impl Sealed for [u8] {}
    impl Sealed for str {}
}

/// Buffer kind the parser can scan
///
/// Implemented for `[u8]` and `str` only.
pub trait Input: private::Sealed {
    /// Code unit type
    type Unit: Unit;

    /// `\n` and `\r`
    const LINE_BREAKS: &'static [Self::Unit];

    /// Line breaks recognised in extended mode
    const EXTENDED_LINE_BREAKS: &'static [Self::Unit];

    /// Length in bytes
    fn byte_len(&self) -> usize;

    /// First code unit
    fn first_unit(&self) -> Option<Self::Unit>;

    /// Width in bytes of a unit
    fn unit_width(unit: Self::Unit) -> usize;

    /// Offset of the first occurrence of `unit`
    fn find_unit(&self, unit: Self::Unit) -> Option<usize>;

    /// Offset and value of the first unit contained in `set`
    fn find_any(&self, set: &UnitSet<Self::Unit>) -> Option<(usize, Self::Unit)>;

    /// Offset of the first unit not contained in `set`
    fn find_not_any(&self, set: &UnitSet<Self::Unit>) -> Option<usize>;

    /// Sub-slice between byte offsets
    fn range(&self, start: usize, end: usize) -> &Self;

    /// Borrowed field view
    fn raw(&self) -> RawField<'_>;

    /// Check if nothing is left to scan
    #[inline]
    fn at_end(&self) -> bool {
        self.byte_len() == 0
    }

    /// Sub-slice from a byte offset to the end
    #[inline]
    fn tail(&self, start: usize) -> &Self {
        self.range(start, self.byte_len())
    }
}

fn find_bytes(haystack: &[u8], set: &[u8]) -> Option<usize> {
    match *set {
        [] => None,
        [a] => memchr(a, haystack),
        [a, b] => memchr2(a, b, haystack),
        [a, b, c] => memchr3(a, b, c, haystack),
        _ => haystack.iter().position(|b| set.contains(b)),
    }
}

impl Input for [u8] {
    type Unit = u8;

    const LINE_BREAKS: &'static [u8] = &[b'\n', b'\r'];
    // next line and form feed only; the wider separators need more than one byte
    const EXTENDED_LINE_BREAKS: &'static [u8] = &[b'\n', b'\r', 0x85, 0x0C];

    #[inline]
    fn byte_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn first_unit(&self) -> Option<u8> {
        self.first().copied()
    }

    #[inline]
    fn unit_width(_unit: u8) -> usize {
        1
    }

    #[inline]
    fn find_unit(&self, unit: u8) -> Option<usize> {
        memchr(unit, self)
    }

    #[inline]
    fn find_any(&self, set: &UnitSet<u8>) -> Option<(usize, u8)> {
        let pos = find_bytes(self, set.as_slice())?;
        Some((pos, self[pos]))
    }

    #[inline]
    fn find_not_any(&self, set: &UnitSet<u8>) -> Option<usize> {
        self.iter().position(|b| !set.contains(*b))
    }

    #[inline]
    fn range(&self, start: usize, end: usize) -> &[u8] {
        &self[start..end]
    }

    #[inline]
    fn raw(&self) -> RawField<'_> {
        RawField::Bytes(self)
    }
}

impl Input for str {
    type Unit = char;

    const LINE_BREAKS: &'static [char] = &['\n', '\r'];
    const EXTENDED_LINE_BREAKS: &'static [char] = &[
        '\n', '\r', '\u{2029}', '\u{2028}', '\u{0085}', '\u{000C}',
    ];

    #[inline]
    fn byte_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn first_unit(&self) -> Option<char> {
        self.chars().next()
    }

    #[inline]
    fn unit_width(unit: char) -> usize {
        unit.len_utf8()
    }

    #[inline]
    fn find_unit(&self, unit: char) -> Option<usize> {
        match unit.ascii_byte() {
            Some(b) => memchr(b, self.as_bytes()),
            None => self.find(unit),
        }
    }

    #[inline]
    fn find_any(&self, set: &UnitSet<char>) -> Option<(usize, char)> {
        // ASCII bytes never occur inside a multi-byte sequence
        if let Some(ascii) = set.ascii() {
            let pos = find_bytes(self.as_bytes(), ascii)?;
            return Some((pos, char::from(self.as_bytes()[pos])));
        }
        self.char_indices().find(|(_, c)| set.contains(*c))
    }

    #[inline]
    fn find_not_any(&self, set: &UnitSet<char>) -> Option<usize> {
        self.char_indices()
            .find(|(_, c)| !set.contains(*c))
            .map(|(i, _)| i)
    }

    #[inline]
    fn range(&self, start: usize, end: usize) -> &str {
        &self[start..end]
    }

    #[inline]
    fn raw(&self) -> RawField<'_> {
        RawField::Text(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_set() {
        let set = UnitSet::new(<[u8] as Input>::LINE_BREAKS, Some(b','));
        assert_eq!(set.as_slice(), b"\n\r,");
        assert!(set.contains(b','));
        assert!(!set.contains(b';'));
    }

    #[test]
    fn test_unit_set_ascii_detection() {
        let set = UnitSet::new(<str as Input>::LINE_BREAKS, Some(','));
        assert_eq!(set.ascii(), Some(&b"\n\r,"[..]));

        let set = UnitSet::new(<str as Input>::EXTENDED_LINE_BREAKS, Some(','));
        assert_eq!(set.ascii(), None);
        assert_eq!(set.as_slice().len(), 7);
    }

    #[test]
    fn test_find_any_bytes() {
        let set = UnitSet::new(<[u8] as Input>::LINE_BREAKS, Some(b';'));
        let buf: &[u8] = b"abc;def\n";
        assert_eq!(buf.find_any(&set), Some((3, b';')));
        assert_eq!(buf.tail(4).find_any(&set), Some((3, b'\n')));
        assert_eq!(b"plain".as_slice().find_any(&set), None);
    }

    #[test]
    fn test_find_any_str_extended() {
        let set = UnitSet::new(<str as Input>::EXTENDED_LINE_BREAKS, Some(','));
        let text = "héllo\u{2028}next";
        let (pos, unit) = text.find_any(&set).unwrap();
        assert_eq!(unit, '\u{2028}');
        assert_eq!(&text[..pos], "héllo");
        assert_eq!(text.tail(pos + <str as Input>::unit_width(unit)), "next");
    }

    #[test]
    fn test_find_not_any() {
        let set = UnitSet::new(<str as Input>::LINE_BREAKS, None);
        assert_eq!("\r\n\nx".find_not_any(&set), Some(3));
        assert_eq!("\r\n".find_not_any(&set), None);
    }

    #[test]
    fn test_raw_field() {
        let raw = "abc".raw();
        assert_eq!(raw.as_text(), Some("abc"));
        assert_eq!(raw.as_bytes(), b"abc");

        let raw = b"ab\xff".as_slice().raw();
        assert_eq!(raw.as_text(), None);
        assert_eq!(raw.to_str_lossy(), "ab\u{FFFD}");
    }
}
