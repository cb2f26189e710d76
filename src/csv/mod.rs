//! CSV tokenizing and parsing over byte and character buffers

mod input;
mod parser;
mod tokenizer;

pub use input::{Input, RawField, Unit, UnitSet};
pub use parser::{CsvParser, ParseSummary};
pub use tokenizer::{Field, FieldTokenizer, Terminator};
