//! Row state machine driving the tokenizer across a schema
//!
//! For every row the parser asks the tokenizer for one field per schema
//! column, converts it and assembles the record. Problems are reported
//! through the `on_error` callback and handled per kind:
//!
//! - `ParseError`, `TooManyColumns`, `NotEnoughColumns`: the row is dropped
//!   and parsing resumes at the next line
//! - `UnexpectedEnd`: parsing stops, records collected so far are returned

use super::input::Input;
use super::tokenizer::{Field, FieldTokenizer, Terminator};
use crate::collect::Collect;
use crate::convert::Converters;
use crate::error::LineError;
use crate::options::ParseOptions;
use crate::schema::Schema;
use crate::types::{FromRecord, Record};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Counters for one parse call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Rows attempted, including dropped ones
    pub rows: usize,
    /// Records handed to the collection
    pub records: usize,
    /// Rows dropped because of an error
    pub abandoned: usize,
    /// Whether parsing stopped early on a truncated row
    pub terminated: bool,
}

/// Parser bound to one schema
///
/// Cheap to clone; the schema is shared. The same parser can be used for any
/// number of buffers, from any number of threads.
///
/// # Examples
///
/// ```
/// use csvbind::{CsvParser, FieldType, LineError, ParseOptions, Record, Schema};
///
/// let schema = Schema::builder()
///     .column("A", FieldType::Int)
///     .column("B", FieldType::String)
///     .build()
///     .unwrap();
/// let parser = CsvParser::new(schema);
///
/// let mut errors = Vec::new();
/// let records: Vec<Record> = parser.parse_with(
///     "1,a\n2\n",
///     ParseOptions::new().on_error(|e| errors.push(e)),
/// );
///
/// assert_eq!(records.len(), 1);
/// assert!(matches!(
///     errors[..],
///     [LineError::NotEnoughColumns { line: 2, column: 2, expected: 2 }]
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct CsvParser {
    schema: Arc<Schema>,
}

impl CsvParser {
    /// Create a parser for a schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// Schema this parser is bound to
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Parse a buffer with default options
    ///
    /// Malformed rows are skipped silently.
    pub fn parse<I, C>(&self, input: &I) -> C
    where
        I: Input + ?Sized,
        C: Collect,
        C::Item: FromRecord,
    {
        self.parse_with(input, ParseOptions::default())
    }

    /// Parse a buffer
    pub fn parse_with<I, C>(&self, input: &I, options: ParseOptions<'_>) -> C
    where
        I: Input + ?Sized,
        C: Collect,
        C::Item: FromRecord,
    {
        self.parse_summarized(input, options).0
    }

    /// Parse a buffer and report row counters
    pub fn parse_summarized<I, C>(&self, input: &I, options: ParseOptions<'_>) -> (C, ParseSummary)
    where
        I: Input + ?Sized,
        C: Collect,
        C::Item: FromRecord,
    {
        let ParseOptions {
            capacity,
            decoder,
            locale,
            mut on_error,
        } = options;
        let converters = Converters::new(decoder.as_ref(), &locale);
        let mut report = |err: LineError| {
            if let Some(callback) = on_error.as_mut() {
                callback(err);
            }
        };

        let schema = &*self.schema;
        let dialect = schema.dialect();
        let columns = schema.columns();
        let expected = columns.len();
        let names = schema.field_names();

        debug!(
            columns = expected,
            bytes = input.byte_len(),
            has_header = dialect.has_header,
            "Parsing CSV buffer"
        );

        let mut out = C::builder(capacity);
        let mut summary = ParseSummary::default();
        let mut tokens = FieldTokenizer::new(
            input,
            dialect.separator,
            dialect.quote,
            dialect.extended_line_break,
        );

        if dialect.has_header {
            tokens.skip_header();
        }

        let mut line = 0;
        'rows: while !tokens.is_exhausted() {
            line += 1;
            summary.rows += 1;
            let mut values = Vec::with_capacity(names.len());

            for (index, column) in columns.iter().enumerate() {
                let last = index + 1 == expected;

                let field = match tokens.next_field() {
                    Some(field) => field,
                    // a trailing optional column may be left out entirely
                    None if last && column.is_optional() => Field {
                        raw: tokens.remaining(),
                        terminator: Terminator::EndOfInput,
                    },
                    None => {
                        warn!(line, column = index + 1, "Input ends inside a row");
                        report(LineError::UnexpectedEnd { line });
                        summary.abandoned += 1;
                        summary.terminated = true;
                        break 'rows;
                    }
                };

                if last {
                    if field.terminator == Terminator::Separator {
                        trace!(line, "Row has too many columns");
                        report(LineError::TooManyColumns { line, expected });
                        tokens.skip_line();
                        summary.abandoned += 1;
                        continue 'rows;
                    }
                    tokens.skip_line_breaks();
                } else if field.terminator.ends_row() {
                    trace!(line, column = index + 1, "Row ends early");
                    report(LineError::NotEnoughColumns {
                        line,
                        column: index + 2,
                        expected,
                    });
                    tokens.skip_line_breaks();
                    summary.abandoned += 1;
                    continue 'rows;
                }

                let Some(conversion) = column.conversion() else {
                    continue;
                };
                let raw = field.raw.raw();
                match converters.convert(conversion, raw) {
                    Ok(value) => values.push(value),
                    Err(cause) => {
                        trace!(line, column = index + 1, error = %cause, "Field conversion failed");
                        report(LineError::ParseError {
                            line,
                            column: index + 1,
                            cause,
                            raw: raw.as_text().map(str::to_owned),
                        });
                        if !last {
                            tokens.skip_line();
                        }
                        summary.abandoned += 1;
                        continue 'rows;
                    }
                }
            }

            match <C::Item as FromRecord>::from_record(Record::new(Arc::clone(names), values)) {
                Ok(item) => {
                    C::push(&mut out, item);
                    summary.records += 1;
                }
                Err(cause) => {
                    trace!(line, error = %cause, "Record construction failed");
                    report(LineError::ParseError {
                        line,
                        column: expected,
                        cause,
                        raw: None,
                    });
                    summary.abandoned += 1;
                }
            }
        }

        debug!(
            rows = summary.rows,
            records = summary.records,
            abandoned = summary.abandoned,
            "Finished parsing CSV buffer"
        );

        (C::freeze(out), summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::types::{FieldType, Value};

    fn parser(columns: &[(&str, FieldType)]) -> CsvParser {
        let mut builder = Schema::builder();
        for (name, field_type) in columns {
            builder = builder.column(*name, field_type.clone());
        }
        CsvParser::new(builder.build().unwrap())
    }

    fn run(parser: &CsvParser, input: &str) -> (Vec<Vec<Value>>, Vec<LineError>, ParseSummary) {
        let mut errors = Vec::new();
        let (rows, summary) =
            parser.parse_summarized(input, ParseOptions::new().on_error(|e| errors.push(e)));
        (rows, errors, summary)
    }

    #[test]
    fn test_parse_rows() {
        let p = parser(&[("A", FieldType::Int), ("B", FieldType::String)]);
        let (rows, errors, summary) = run(&p, "1,a\n2,b\n");
        assert_eq!(
            rows,
            vec![
                vec![Value::Int(1), Value::from("a")],
                vec![Value::Int(2), Value::from("b")],
            ]
        );
        assert!(errors.is_empty());
        assert_eq!(
            summary,
            ParseSummary {
                rows: 2,
                records: 2,
                abandoned: 0,
                terminated: false
            }
        );
    }

    #[test]
    fn test_not_enough_columns() {
        let p = parser(&[("A", FieldType::Int), ("B", FieldType::String)]);
        let (rows, errors, summary) = run(&p, "1,a\n2\n3,c");
        assert_eq!(rows.len(), 2);
        assert!(matches!(
            errors[..],
            [LineError::NotEnoughColumns {
                line: 2,
                column: 2,
                expected: 2
            }]
        ));
        assert_eq!(summary.abandoned, 1);
    }

    #[test]
    fn test_too_many_columns() {
        let p = parser(&[("A", FieldType::Int), ("B", FieldType::Int)]);
        let (rows, errors, _) = run(&p, "1,2\n3,4,5\n6,7");
        assert_eq!(rows, vec![vec![Value::Int(1), Value::Int(2)], vec![Value::Int(6), Value::Int(7)]]);
        assert!(matches!(
            errors[..],
            [LineError::TooManyColumns {
                line: 2,
                expected: 2
            }]
        ));
    }

    #[test]
    fn test_parse_error_resumes_next_line() {
        let p = parser(&[("A", FieldType::Int), ("B", FieldType::Int)]);
        let (rows, errors, _) = run(&p, "x,1\n2,y\n3,4\n");
        assert_eq!(rows, vec![vec![Value::Int(3), Value::Int(4)]]);
        assert_eq!(errors.len(), 2);
        match &errors[0] {
            LineError::ParseError {
                line,
                column,
                cause,
                raw,
            } => {
                assert_eq!((*line, *column), (1, 1));
                assert!(matches!(cause, ConvertError::InvalidValue { target: "int", .. }));
                assert_eq!(raw.as_deref(), Some("x"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(errors[1], LineError::ParseError { line: 2, column: 2, .. }));
    }

    #[test]
    fn test_byte_input_has_no_raw_text() {
        let p = parser(&[("A", FieldType::Int)]);
        let mut errors = Vec::new();
        let rows: Vec<Vec<Value>> =
            p.parse_with(b"nope\n".as_slice(), ParseOptions::new().on_error(|e| errors.push(e)));
        assert!(rows.is_empty());
        assert!(matches!(errors[..], [LineError::ParseError { line: 1, column: 1, raw: None, .. }]));
    }

    #[test]
    fn test_unexpected_end_is_fatal() {
        let p = parser(&[("A", FieldType::Int), ("B", FieldType::Int), ("C", FieldType::Int)]);
        let (rows, errors, summary) = run(&p, "1,2,3\n4,");
        assert_eq!(rows.len(), 1);
        assert!(matches!(errors[..], [LineError::UnexpectedEnd { line: 2 }]));
        assert!(summary.terminated);
    }

    #[test]
    fn test_required_last_column_at_end() {
        let p = parser(&[("A", FieldType::Int), ("B", FieldType::Int)]);
        let (rows, errors, _) = run(&p, "1,");
        assert!(rows.is_empty());
        assert!(matches!(errors[..], [LineError::UnexpectedEnd { line: 1 }]));
    }

    #[test]
    fn test_optional_last_column_at_end() {
        let p = parser(&[("A", FieldType::Int), ("B", FieldType::nullable(FieldType::Int))]);
        let (rows, errors, _) = run(&p, "1,2\n3,");
        assert_eq!(rows, vec![vec![Value::Int(1), Value::Int(2)], vec![Value::Int(3), Value::Null]]);
        assert!(errors.is_empty());

        let p = parser(&[("A", FieldType::Int), ("B", FieldType::String)]);
        let (rows, _, _) = run(&p, "1,");
        assert_eq!(rows, vec![vec![Value::Int(1), Value::from("")]]);
    }

    #[test]
    fn test_header_skipped() {
        let schema = Schema::builder()
            .column("A", FieldType::Int)
            .has_header(true)
            .build()
            .unwrap();
        let p = CsvParser::new(schema);
        let (rows, errors, _) = run(&p, "A\r\n1\r\n2");
        assert_eq!(rows, vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        assert!(errors.is_empty());

        let (rows, errors, summary) = run(&p, "only a header");
        assert!(rows.is_empty());
        assert!(errors.is_empty());
        assert_eq!(summary.rows, 0);
    }

    #[test]
    fn test_ignored_columns() {
        let schema = Schema::builder()
            .ignore()
            .column("B", FieldType::Bool)
            .ignore()
            .build()
            .unwrap();
        let p = CsvParser::new(schema);
        let (rows, errors, _) = run(&p, "junk,true,more\nx,false,");
        assert_eq!(rows, vec![vec![Value::Bool(true)], vec![Value::Bool(false)]]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_blank_lines_between_rows() {
        let p = parser(&[("A", FieldType::Int)]);
        let (rows, _, _) = run(&p, "1\n\n\r\n2\n\n");
        assert_eq!(rows, vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
    }

    #[test]
    fn test_record_rejection_reported() {
        struct Strict;

        impl FromRecord for Strict {
            fn from_record(_record: Record) -> Result<Self, ConvertError> {
                Err(ConvertError::custom("rejected"))
            }
        }

        let p = parser(&[("A", FieldType::Int), ("B", FieldType::Int)]);
        let mut errors = Vec::new();
        let out: Vec<Strict> =
            p.parse_with("1,2\n", ParseOptions::new().on_error(|e| errors.push(e)));
        assert!(out.is_empty());
        assert!(matches!(errors[..], [LineError::ParseError { line: 1, column: 2, raw: None, .. }]));
    }

    #[test]
    fn test_empty_input() {
        let p = parser(&[("A", FieldType::Int)]);
        let (rows, errors, summary) = run(&p, "");
        assert!(rows.is_empty());
        assert!(errors.is_empty());
        assert_eq!(summary, ParseSummary::default());
    }
}
