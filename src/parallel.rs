//! Parsing many independent buffers on the rayon thread pool

use crate::collect::Collect;
use crate::csv::{CsvParser, Input};
use crate::error::LineError;
use crate::options::ParseOptions;
use crate::types::FromRecord;
use rayon::prelude::*;
use tracing::debug;

impl CsvParser {
    /// Parse every buffer with default options, in parallel
    ///
    /// Results keep the order of `inputs`.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvbind::{CsvParser, FieldType, Schema};
    ///
    /// let parser = CsvParser::new(
    ///     Schema::builder().column("N", FieldType::Int).build().unwrap(),
    /// );
    /// let chunks: Vec<Vec<Vec<csvbind::Value>>> = parser.parse_all(&["1\n2\n", "3\n"]);
    /// assert_eq!(chunks[0].len(), 2);
    /// assert_eq!(chunks[1].len(), 1);
    /// ```
    pub fn parse_all<I, C>(&self, inputs: &[&I]) -> Vec<C>
    where
        I: Input + Sync + ?Sized,
        C: Collect + Send,
        C::Item: FromRecord,
    {
        debug!(buffers = inputs.len(), "Parsing CSV buffers in parallel");
        inputs.par_iter().map(|input| self.parse(*input)).collect()
    }

    /// Parse every buffer in parallel, collecting line errors per buffer
    ///
    /// `options` is called once per buffer on the worker thread. Any
    /// `on_error` callback it sets is replaced by the per-buffer error list.
    pub fn parse_all_with<I, C, F>(&self, inputs: &[&I], options: F) -> Vec<(C, Vec<LineError>)>
    where
        I: Input + Sync + ?Sized,
        C: Collect + Send,
        C::Item: FromRecord,
        F: Fn() -> ParseOptions<'static> + Sync,
    {
        debug!(buffers = inputs.len(), "Parsing CSV buffers in parallel");
        inputs
            .par_iter()
            .map(|input| {
                let mut errors = Vec::new();
                let ParseOptions {
                    capacity,
                    decoder,
                    locale,
                    ..
                } = options();
                let options = ParseOptions {
                    capacity,
                    decoder,
                    locale,
                    on_error: None,
                }
                .on_error(|err| errors.push(err));
                let records = self.parse_with(*input, options);
                (records, errors)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{CsvParser, FieldType, LineError, Locale, ParseOptions, Schema, Value};

    fn parser() -> CsvParser {
        CsvParser::new(
            Schema::builder()
                .column("A", FieldType::Int)
                .column("B", FieldType::Float)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_parse_all_keeps_order() {
        let inputs: Vec<String> = (0..32).map(|i| format!("{i},1.5\n{i},2\n")).collect();
        let refs: Vec<&str> = inputs.iter().map(String::as_str).collect();
        let chunks: Vec<Vec<Vec<Value>>> = parser().parse_all(&refs[..]);
        assert_eq!(chunks.len(), 32);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.len(), 2);
            assert_eq!(chunk[0][0], Value::Int(i as i64));
        }
    }

    #[test]
    fn test_parse_all_with_errors_per_buffer() {
        let inputs: [&[u8]; 2] = [b"1;5\n2;x\n", b"3;2,5\n"];
        let out: Vec<(Vec<Vec<Value>>, Vec<LineError>)> = CsvParser::new(
            Schema::builder()
                .column("A", FieldType::Int)
                .column("B", FieldType::Float)
                .separator(b';')
                .build()
                .unwrap(),
        )
        .parse_all_with(&inputs, || {
            ParseOptions::new().locale(Locale::invariant().with_decimal_separator(','))
        });

        assert_eq!(out[0].0, vec![vec![Value::Int(1), Value::Float(5.0)]]);
        assert!(matches!(out[0].1[..], [LineError::ParseError { line: 2, column: 2, .. }]));
        assert_eq!(out[1].0, vec![vec![Value::Int(3), Value::Float(2.5)]]);
        assert!(out[1].1.is_empty());
    }
}
