//! Conversion of raw fields into typed values
//!
//! Each bound column carries a [`Conversion`] resolved when the schema is
//! built. At parse time the conversion is applied to the column's raw field
//! together with the string decoder and locale of the current call.

use crate::csv::RawField;
use crate::error::ConvertError;
use crate::locale::Locale;
use crate::types::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Custom field converter bound by column name or by target type
pub type Converter = Arc<dyn Fn(RawField<'_>) -> Result<Value, ConvertError> + Send + Sync>;

/// Turns raw fields into owned strings
///
/// Selects the text encoding of byte buffers. The default decodes UTF-8,
/// replacing invalid sequences with U+FFFD; character buffers are copied as-is
/// by every built-in decoder.
#[derive(Clone)]
pub struct StringDecoder {
    decode: Arc<dyn Fn(RawField<'_>) -> Result<String, ConvertError> + Send + Sync>,
}

impl StringDecoder {
    /// Create a decoder from a function
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(RawField<'_>) -> Result<String, ConvertError> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
        }
    }

    /// UTF-8 with invalid sequences replaced
    pub fn utf8_lossy() -> Self {
        Self::new(|raw| Ok(raw.to_str_lossy().into_owned()))
    }

    /// UTF-8, failing the field on invalid sequences
    pub fn utf8_strict() -> Self {
        Self::new(|raw| match raw {
            RawField::Text(s) => Ok(s.to_owned()),
            RawField::Bytes(b) => Ok(std::str::from_utf8(b)?.to_owned()),
        })
    }

    /// ISO-8859-1, one byte per character
    pub fn latin1() -> Self {
        Self::new(|raw| match raw {
            RawField::Text(s) => Ok(s.to_owned()),
            RawField::Bytes(b) => Ok(b.iter().map(|&byte| char::from(byte)).collect()),
        })
    }

    /// Decode one raw field
    pub fn decode(&self, raw: RawField<'_>) -> Result<String, ConvertError> {
        (self.decode)(raw)
    }
}

impl Default for StringDecoder {
    fn default() -> Self {
        Self::utf8_lossy()
    }
}

impl fmt::Debug for StringDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringDecoder").finish_non_exhaustive()
    }
}

/// Scalar types parsed through the locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scalar {
    Bool,
    Int,
    UInt,
    Float,
    Date,
    Time,
    DateTime,
    Duration,
}

/// Resolved conversion for one bound column
#[derive(Clone)]
pub(crate) enum Conversion {
    /// Custom converter, authoritative for every input including empty fields
    Custom(Converter),
    /// Decoded string
    Text,
    /// Decoded string parsed through the locale
    Scalar(Scalar),
    /// Empty field is null, anything else goes to the inner conversion
    Nullable(Box<Conversion>),
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::Custom(_) => f.write_str("Custom(..)"),
            Conversion::Text => f.write_str("Text"),
            Conversion::Scalar(scalar) => f.debug_tuple("Scalar").field(scalar).finish(),
            Conversion::Nullable(inner) => f.debug_tuple("Nullable").field(inner).finish(),
        }
    }
}

/// Per-call conversion settings
pub(crate) struct Converters<'o> {
    decoder: Option<&'o StringDecoder>,
    locale: &'o Locale,
}

impl<'o> Converters<'o> {
    pub(crate) fn new(decoder: Option<&'o StringDecoder>, locale: &'o Locale) -> Self {
        Self { decoder, locale }
    }

    /// Decode a field, borrowing when the default decoder sees valid UTF-8
    fn text<'r>(&self, raw: RawField<'r>) -> Result<Cow<'r, str>, ConvertError> {
        match self.decoder {
            Some(decoder) => decoder.decode(raw).map(Cow::Owned),
            None => Ok(raw.to_str_lossy()),
        }
    }

    pub(crate) fn convert(
        &self,
        conversion: &Conversion,
        raw: RawField<'_>,
    ) -> Result<Value, ConvertError> {
        match conversion {
            Conversion::Custom(converter) => converter(raw),
            Conversion::Text => self.text(raw).map(|s| Value::String(s.into_owned())),
            Conversion::Nullable(inner) => {
                if raw.is_empty() {
                    Ok(Value::Null)
                } else {
                    self.convert(inner, raw)
                }
            }
            Conversion::Scalar(scalar) => {
                let text = self.text(raw)?;
                self.parse_scalar(*scalar, &text)
            }
        }
    }

    fn parse_scalar(&self, scalar: Scalar, text: &str) -> Result<Value, ConvertError> {
        let locale = self.locale;
        Ok(match scalar {
            Scalar::Bool => Value::Bool(locale.parse_bool(text)?),
            Scalar::Int => Value::Int(locale.parse_int(text)?),
            Scalar::UInt => Value::UInt(locale.parse_uint(text)?),
            Scalar::Float => Value::Float(locale.parse_float(text)?),
            Scalar::Date => Value::Date(locale.parse_date(text)?),
            Scalar::Time => Value::Time(locale.parse_time(text)?),
            Scalar::DateTime => Value::DateTime(locale.parse_datetime(text)?),
            Scalar::Duration => Value::Duration(locale.parse_duration(text)?),
        })
    }
}
