//! Fixed record shape a parser is bound to
//!
//! A [`Schema`] is an ordered list of column bindings plus the [`Dialect`]
//! (separator, quote, header and line-break policy). It is built once with
//! [`SchemaBuilder`], which rejects every configuration the parser cannot
//! handle, and is immutable afterwards.
//!
//! # Examples
//!
//! ```
//! use csvbind::{FieldType, Schema};
//!
//! let schema = Schema::builder()
//!     .column("Id", FieldType::Int)
//!     .ignore()
//!     .column("Name", FieldType::String)
//!     .column("Timestamp", FieldType::nullable(FieldType::DateTime))
//!     .separator(b';')
//!     .has_header(true)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.len(), 4);
//! assert_eq!(schema.field_names().len(), 3);
//! ```

use crate::convert::{Conversion, Converter, Scalar};
use crate::csv::{Input, RawField};
use crate::error::{ConvertError, Result, SchemaError};
use crate::types::{FieldType, Value};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::sync::Arc;

/// Delimiter and layout settings of a CSV dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dialect {
    /// Field separator, ASCII. Default: `,`
    pub separator: u8,
    /// Quote symbol, ASCII. Default: `"`
    pub quote: u8,
    /// Skip the first line. Default: `false`
    pub has_header: bool,
    /// Also end lines at next-line, form-feed and Unicode line/paragraph separators.
    /// Default: `false`
    pub extended_line_break: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            separator: b',',
            quote: b'"',
            has_header: false,
            extended_line_break: false,
        }
    }
}

impl Dialect {
    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SchemaError::InvalidDialect(msg));
        for (what, symbol) in [("separator", self.separator), ("quote", self.quote)] {
            if !symbol.is_ascii() {
                return invalid(format!("{} must be ASCII, got 0x{:02X}", what, symbol));
            }
            let breaks = if self.extended_line_break {
                <str as Input>::EXTENDED_LINE_BREAKS
            } else {
                <str as Input>::LINE_BREAKS
            };
            if breaks.contains(&char::from(symbol)) {
                return invalid(format!("{} must not be a line break", what));
            }
        }
        if self.separator == self.quote {
            return invalid("separator and quote must differ".to_string());
        }
        Ok(())
    }
}

/// One column of the schema
#[derive(Debug, Clone)]
pub struct ColumnBinding {
    name: Option<String>,
    field_type: Option<FieldType>,
    conversion: Option<Conversion>,
}

impl ColumnBinding {
    /// Bound field name, `None` for ignored columns
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Target type, `None` for ignored columns
    pub fn field_type(&self) -> Option<&FieldType> {
        self.field_type.as_ref()
    }

    /// Check if column is present in the data but not converted
    pub fn is_ignored(&self) -> bool {
        self.name.is_none()
    }

    /// Whether a missing trailing field is read as empty instead of ending the parse
    pub fn is_optional(&self) -> bool {
        self.field_type.as_ref().map_or(true, FieldType::is_optional)
    }

    pub(crate) fn conversion(&self) -> Option<&Conversion> {
        self.conversion.as_ref()
    }
}

/// Validated, immutable record shape
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnBinding>,
    names: Arc<IndexSet<String>>,
    dialect: Dialect,
}

impl Schema {
    /// Start building a schema
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Column bindings in order
    pub fn columns(&self) -> &[ColumnBinding] {
        &self.columns
    }

    /// Number of columns each row must have, ignored ones included
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always `false` for a built schema
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Names of bound (non-ignored) columns in order
    pub fn field_names(&self) -> &Arc<IndexSet<String>> {
        &self.names
    }

    /// Delimiter settings
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }
}

/// Builder that validates column bindings and resolves their converters
///
/// Converters bound to a column name win over converters bound to a type.
/// A nullable column without either uses a converter bound to its inner type
/// for non-empty fields.
#[derive(Default)]
pub struct SchemaBuilder {
    columns: Vec<Option<(String, FieldType)>>,
    column_converters: IndexMap<String, Converter>,
    type_converters: HashMap<FieldType, Converter>,
    dialect: Dialect,
}

impl SchemaBuilder {
    /// Create an empty builder with the default dialect
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bound column (builder pattern)
    pub fn column(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.columns.push(Some((name.into(), field_type)));
        self
    }

    /// Append a column that is read but not converted (builder pattern)
    pub fn ignore(mut self) -> Self {
        self.columns.push(None);
        self
    }

    /// Bind a converter to a column name (builder pattern)
    pub fn converter<F>(mut self, column: impl Into<String>, converter: F) -> Self
    where
        F: Fn(RawField<'_>) -> std::result::Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.column_converters.insert(column.into(), Arc::new(converter));
        self
    }

    /// Bind a converter to every column of a type (builder pattern)
    pub fn type_converter<F>(mut self, field_type: FieldType, converter: F) -> Self
    where
        F: Fn(RawField<'_>) -> std::result::Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.type_converters.insert(field_type, Arc::new(converter));
        self
    }

    /// Set the whole dialect (builder pattern)
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set field separator (builder pattern)
    pub fn separator(mut self, separator: u8) -> Self {
        self.dialect.separator = separator;
        self
    }

    /// Set quote symbol (builder pattern)
    pub fn quote(mut self, quote: u8) -> Self {
        self.dialect.quote = quote;
        self
    }

    /// Skip the first line of every buffer (builder pattern)
    pub fn has_header(mut self, has: bool) -> Self {
        self.dialect.has_header = has;
        self
    }

    /// Recognise the extended line-break set (builder pattern)
    pub fn extended_line_break(mut self, extended: bool) -> Self {
        self.dialect.extended_line_break = extended;
        self
    }

    /// Validate and freeze the schema
    pub fn build(self) -> Result<Schema> {
        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns);
        }
        self.dialect.validate()?;

        let mut names = IndexSet::with_capacity(self.columns.len());
        for (name, _) in self.columns.iter().flatten() {
            if !names.insert(name.clone()) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }
        if let Some(unknown) = self
            .column_converters
            .keys()
            .find(|name| !names.contains(name.as_str()))
        {
            return Err(SchemaError::UnknownColumn(unknown.clone()));
        }

        let columns = self
            .columns
            .iter()
            .map(|column| match column {
                None => Ok(ColumnBinding {
                    name: None,
                    field_type: None,
                    conversion: None,
                }),
                Some((name, field_type)) => Ok(ColumnBinding {
                    name: Some(name.clone()),
                    field_type: Some(field_type.clone()),
                    conversion: Some(self.resolve(name, field_type)?),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Schema {
            columns,
            names: Arc::new(names),
            dialect: self.dialect,
        })
    }

    fn resolve(&self, column: &str, field_type: &FieldType) -> Result<Conversion> {
        match self.column_converters.get(column) {
            Some(converter) => Ok(Conversion::Custom(Arc::clone(converter))),
            None => self.resolve_type(column, field_type),
        }
    }

    fn resolve_type(&self, column: &str, field_type: &FieldType) -> Result<Conversion> {
        if let Some(converter) = self.type_converters.get(field_type) {
            return Ok(Conversion::Custom(Arc::clone(converter)));
        }

        let unsupported = || SchemaError::UnsupportedType {
            column: column.to_string(),
            field_type: field_type.to_string(),
        };
        Ok(match field_type {
            FieldType::String => Conversion::Text,
            FieldType::Bool => Conversion::Scalar(Scalar::Bool),
            FieldType::Int => Conversion::Scalar(Scalar::Int),
            FieldType::UInt => Conversion::Scalar(Scalar::UInt),
            FieldType::Float => Conversion::Scalar(Scalar::Float),
            FieldType::Date => Conversion::Scalar(Scalar::Date),
            FieldType::Time => Conversion::Scalar(Scalar::Time),
            FieldType::DateTime => Conversion::Scalar(Scalar::DateTime),
            FieldType::Duration => Conversion::Scalar(Scalar::Duration),
            FieldType::Custom(_) => return Err(unsupported()),
            FieldType::Nullable(inner) if inner.is_nullable() => return Err(unsupported()),
            FieldType::Nullable(inner) => {
                Conversion::Nullable(Box::new(self.resolve_type(column, inner)?))
            }
        })
    }
}
