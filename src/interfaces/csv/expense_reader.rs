use crate::application::import::ExpenseRow;
use crate::error::{Result, SplitError};
use std::io::Read;

/// Reads expense rows from a CSV export of the expense sheet.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<ExpenseRow>`.
/// Cells are trimmed and short records are accepted; missing cells read as empty.
pub struct ExpenseReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ExpenseReader<R> {
    /// Creates a new `ExpenseReader` from any `Read` source (e.g., File, Stdin, `&[u8]`).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes rows.
    ///
    /// A record that cannot be decoded yields an `Err` in its position, so
    /// row numbering downstream stays aligned with the sheet.
    pub fn rows(self) -> impl Iterator<Item = Result<ExpenseRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(SplitError::from))
    }
}
