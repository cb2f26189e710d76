//! Type definitions for typed CSV records

use crate::error::ConvertError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use indexmap::IndexSet;
use std::fmt;
use std::sync::Arc;

/// Target type of a bound column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Decoded text
    String,
    /// `true` / `false`
    Bool,
    /// Signed 64-bit integer
    Int,
    /// Unsigned 64-bit integer
    UInt,
    /// 64-bit float
    Float,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Date and time without offset
    DateTime,
    /// Signed time span
    Duration,
    /// Named type that only a custom converter can produce
    Custom(String),
    /// Empty field becomes [`Value::Null`], anything else converts as the inner type
    Nullable(Box<FieldType>),
}

impl FieldType {
    /// Wrap a type so that empty fields become null
    pub fn nullable(inner: FieldType) -> Self {
        FieldType::Nullable(Box::new(inner))
    }

    /// Check if type is a nullable wrapper
    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::Nullable(_))
    }

    /// Whether a missing trailing field is acceptable for this type
    ///
    /// Nullable types read it as null, strings as empty text.
    pub fn is_optional(&self) -> bool {
        matches!(self, FieldType::Nullable(_) | FieldType::String)
    }

    /// Type name used in error messages
    pub fn name(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::UInt => "uint",
            FieldType::Float => "float",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::Duration => "duration",
            FieldType::Custom(name) => name,
            FieldType::Nullable(inner) => inner.name(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Nullable(inner) => write!(f, "{}?", inner),
            other => f.write_str(other.name()),
        }
    }
}

/// A single converted field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty nullable field
    Null,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Unsigned integer value
    UInt(u64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Date value
    Date(NaiveDate),
    /// Time value
    Time(NaiveTime),
    /// DateTime value
    DateTime(NaiveDateTime),
    /// Duration value
    Duration(TimeDelta),
}

impl Value {
    /// Convert value to string
    pub fn as_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Int(i) => itoa::Buffer::new().format(*i).to_string(),
            Value::UInt(u) => itoa::Buffer::new().format(*u).to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Date(d) => d.to_string(),
            Value::Time(t) => t.to_string(),
            Value::DateTime(dt) => dt.to_string(),
            Value::Duration(d) => d.to_string(),
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Duration(_) => "duration",
        }
    }

    /// Try to convert to integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Try to convert to float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow string contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<TimeDelta> for Value {
    fn from(d: TimeDelta) -> Self {
        Value::Duration(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One converted row, holding the values of all bound (non-ignored) columns
///
/// Field names are shared between all records produced by one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    names: Arc<IndexSet<String>>,
    values: Vec<Value>,
}

impl Record {
    /// Create a record from bound field names and their values in column order
    pub fn new(names: Arc<IndexSet<String>>, values: Vec<Value>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Record { names, values }
    }

    /// Get value by field name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .get_index_of(name)
            .and_then(|i| self.values.get(i))
    }

    /// Get value by position among bound fields
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Move a field out of the record as a typed value
    ///
    /// The slot is left as [`Value::Null`].
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T, ConvertError> {
        let slot = self
            .names
            .get_index_of(name)
            .and_then(|i| self.values.get_mut(i))
            .ok_or_else(|| ConvertError::MissingField(name.to_string()))?;
        T::from_value(name, std::mem::replace(slot, Value::Null))
    }

    /// Copy a field out of the record as a typed value
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T, ConvertError> {
        let value = self
            .get(name)
            .ok_or_else(|| ConvertError::MissingField(name.to_string()))?;
        T::from_value(name, value.clone())
    }

    /// Bound field names in column order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Values in column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if record has no bound fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the record, keeping only the values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Build a target record from one fully converted row
///
/// Returning an error abandons the row and reports a parse error for it.
pub trait FromRecord: Sized {
    /// Construct `Self` from the row's values
    fn from_record(record: Record) -> Result<Self, ConvertError>;
}

impl FromRecord for Record {
    fn from_record(record: Record) -> Result<Self, ConvertError> {
        Ok(record)
    }
}

impl FromRecord for Vec<Value> {
    fn from_record(record: Record) -> Result<Self, ConvertError> {
        Ok(record.into_values())
    }
}

/// Extract a typed field from a [`Value`]
pub trait FromValue: Sized {
    /// Convert `value`, naming `field` in any error
    fn from_value(field: &str, value: Value) -> Result<Self, ConvertError>;
}

fn mismatch(field: &str, expected: &'static str, value: &Value) -> ConvertError {
    ConvertError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: value.kind(),
    }
}

macro_rules! impl_from_value {
    ($ty:ty, $name:literal, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(field: &str, value: Value) -> Result<Self, ConvertError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch(field, $name, &other)),
                }
            }
        }
    };
}

impl_from_value!(String, "string", String);
impl_from_value!(bool, "bool", Bool);
impl_from_value!(NaiveDate, "date", Date);
impl_from_value!(NaiveTime, "time", Time);
impl_from_value!(NaiveDateTime, "datetime", DateTime);
impl_from_value!(TimeDelta, "duration", Duration);

impl FromValue for Value {
    fn from_value(_field: &str, value: Value) -> Result<Self, ConvertError> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(field: &str, value: Value) -> Result<Self, ConvertError> {
        value.as_i64().ok_or_else(|| mismatch(field, "int", &value))
    }
}

impl FromValue for i32 {
    fn from_value(field: &str, value: Value) -> Result<Self, ConvertError> {
        let wide = i64::from_value(field, value)?;
        i32::try_from(wide).map_err(|_| ConvertError::invalid("i32", wide.to_string()))
    }
}

impl FromValue for u64 {
    fn from_value(field: &str, value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::UInt(u) => Ok(u),
            Value::Int(i) => u64::try_from(i).map_err(|_| ConvertError::invalid("u64", i.to_string())),
            other => Err(mismatch(field, "uint", &other)),
        }
    }
}

impl FromValue for u32 {
    fn from_value(field: &str, value: Value) -> Result<Self, ConvertError> {
        let wide = u64::from_value(field, value)?;
        u32::try_from(wide).map_err(|_| ConvertError::invalid("u32", wide.to_string()))
    }
}

impl FromValue for f64 {
    fn from_value(field: &str, value: Value) -> Result<Self, ConvertError> {
        value.as_f64().ok_or_else(|| mismatch(field, "float", &value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(field: &str, value: Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(field, other).map(Some),
        }
    }
}
