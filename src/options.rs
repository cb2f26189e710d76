//! Per-call parse options

use crate::convert::StringDecoder;
use crate::error::LineError;
use crate::locale::Locale;
use std::fmt;

/// Options for one parse call
///
/// # Examples
///
/// ```
/// use csvbind::{Locale, ParseOptions, StringDecoder};
///
/// let mut errors = Vec::new();
/// let options = ParseOptions::new()
///     .capacity(1_000)
///     .decoder(StringDecoder::latin1())
///     .locale(Locale::invariant().with_decimal_separator(','))
///     .on_error(|err| errors.push(err));
/// # drop(options);
/// # assert!(errors.is_empty());
/// ```
#[derive(Default)]
pub struct ParseOptions<'a> {
    pub(crate) capacity: Option<usize>,
    pub(crate) decoder: Option<StringDecoder>,
    pub(crate) locale: Locale,
    pub(crate) on_error: Option<Box<dyn FnMut(LineError) + 'a>>,
}

impl<'a> ParseOptions<'a> {
    /// Create options with defaults: no capacity hint, UTF-8 decoding,
    /// invariant locale, errors dropped
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the result collection (builder pattern)
    ///
    /// Exceeding the hint is fine; it only avoids reallocation.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set how raw fields become strings (builder pattern)
    pub fn decoder(mut self, decoder: StringDecoder) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Set locale for numbers, dates and durations (builder pattern)
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Receive every line error as it occurs (builder pattern)
    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: FnMut(LineError) + 'a,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

impl fmt::Debug for ParseOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("capacity", &self.capacity)
            .field("decoder", &self.decoder)
            .field("locale", &self.locale)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
