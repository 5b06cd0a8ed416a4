//! Statement rows and the lexical scanner that finds them in raw text.

mod rows;

pub use rows::{extract_rows, StatementRow, COLUMN_COUNT};
