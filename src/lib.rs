//! # csvbind
//!
//! Zero-copy CSV parsing into strongly typed records.
//!
//! A [`Schema`] fixes the column layout, the target type of every column and
//! the dialect once. A [`CsvParser`] built from it splits a whole in-memory
//! buffer (`&[u8]` or `&str`) into fields without copying, converts each field
//! and collects the records into any [`Collect`] target. Malformed rows are
//! reported through a callback and skipped.
//!
//! ## Quick Start
//!
//! ```
//! use csvbind::{CsvParser, FieldType, Record, Schema, Value};
//!
//! let schema = Schema::builder()
//!     .column("Id", FieldType::Int)
//!     .column("Name", FieldType::String)
//!     .column("Score", FieldType::nullable(FieldType::Float))
//!     .has_header(true)
//!     .build()
//!     .unwrap();
//!
//! let parser = CsvParser::new(schema);
//! let records: Vec<Record> = parser.parse("Id,Name,Score\n1,Alice,9.5\n2,Bob,\n");
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].get("Name"), Some(&Value::from("Alice")));
//! assert_eq!(records[1].get("Score"), Some(&Value::Null));
//! ```

pub mod collect;
pub mod convert;
pub mod csv;
pub mod error;
pub mod locale;
pub mod options;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod schema;
pub mod types;

pub use collect::Collect;
pub use convert::{Converter, StringDecoder};
pub use csv::{CsvParser, Input, ParseSummary, RawField};
pub use error::{ConvertError, LineError, Result, SchemaError};
pub use locale::Locale;
pub use options::ParseOptions;
pub use schema::{ColumnBinding, Dialect, Schema, SchemaBuilder};
pub use types::{FieldType, FromRecord, FromValue, Record, Value};
