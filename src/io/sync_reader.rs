//! Synchronous journal reader with iterator interface
//!
//! Provides a streaming iterator over trip commands from a journal CSV file.
//! Delegates format concerns to the csv_format module.
//!
//! ```no_run
//! use trip_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("journal.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("{} on trip {}", command.action.name(), command.trip),
//!         Err(e) => eprintln!("Skipping row: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Opening the file fails fast from `new()`
//! - A malformed row is yielded as an error carrying its line number, and
//!   iteration continues with the next row. Syntax problems are
//!   `ParseError`; invalid values (amounts, currencies) are `InvalidRow`
//!   wrapping the value error, so `kind()` still reports `Validation`

use crate::io::csv_format::{convert_journal_record, JournalRecord};
use crate::types::{LedgerError, TripCommand};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

/// Open `path`, mapping a missing file to `FileNotFound`
pub(crate) fn open_error(path: &Path, error: std::io::Error) -> LedgerError {
    if error.kind() == IoErrorKind::NotFound {
        LedgerError::FileNotFound {
            path: path.display().to_string(),
        }
    } else {
        LedgerError::from(error)
    }
}

/// Synchronous journal reader
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Open a journal file for streaming iteration
    ///
    /// Fields are trimmed and rows may omit trailing optional columns.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` or `IoError` if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            // Line 1 is the header
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<TripCommand, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut rows = self.reader.deserialize::<JournalRecord>();
        let row = rows.next()?;
        self.line_num += 1;

        Some(match row {
            Ok(record) => convert_journal_record(record).map_err(|e| e.at_line(self.line_num)),
            Err(e) => Err(LedgerError::from(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorKind, TripAction};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "op,trip,actor,id,amount,currency,split,parties,description\n";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_missing_file_is_reported() {
        let error = SyncReader::new(Path::new("nonexistent.csv")).unwrap_err();
        assert_eq!(
            error,
            LedgerError::FileNotFound {
                path: "nonexistent.csv".to_string()
            }
        );
        assert_eq!(error.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_reads_commands_in_order() {
        let file = create_temp_csv(&format!(
            "{}create_trip,1,1,,,USD,,,Lisbon\n\
             join,1,2,,,,,,\n \
             expense , 1 , 1 , 1 , 10.00 , , equal , 1;2 , Dinner \n",
            HEADER
        ));

        let commands: Vec<TripCommand> = SyncReader::new(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let ops: Vec<&str> = commands.iter().map(|c| c.action.name()).collect();
        assert_eq!(ops, vec!["create_trip", "join", "expense"]);
        assert_eq!(commands[1].actor, 2);
        assert!(matches!(
            &commands[2].action,
            TripAction::AddExpense(expense) if expense.amount_cents == 1000
        ));
    }

    #[test]
    fn test_short_rows_are_accepted() {
        let file = create_temp_csv(&format!("{}join,1,2\ndelete_trip,1,1\n", HEADER));

        let commands: Vec<_> = SyncReader::new(file.path()).unwrap().collect();
        assert_eq!(commands.len(), 2);
        assert!(commands.iter().all(Result::is_ok));
    }

    #[test]
    fn test_malformed_rows_carry_line_numbers() {
        let file = create_temp_csv(&format!(
            "{}join,1,2,,,,,,\n\
             refund,1,2,,,,,,\n\
             join,x,2,,,,,,\n\
             join,1,3,,,,,,\n\
             expense,1,2,1,abc,,equal,2,Snacks\n\
             settle,1,2,2,1.00,usdollar,,3,\n",
            HEADER
        ));

        let results: Vec<_> = SyncReader::new(file.path()).unwrap().collect();
        assert_eq!(results.len(), 6);
        assert!(results[0].is_ok());

        match &results[1] {
            Err(LedgerError::ParseError { line, message }) => {
                assert_eq!(*line, Some(3));
                assert!(message.contains("Invalid op 'refund'"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        match &results[2] {
            Err(LedgerError::ParseError { line, .. }) => assert_eq!(*line, Some(4)),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert_eq!(results[3].as_ref().unwrap().actor, 3);

        // Bad values keep their own error and kind
        let error = results[4].as_ref().unwrap_err();
        assert_eq!(error, &LedgerError::invalid_amount("abc").at_line(6));
        assert_eq!(error.kind(), ErrorKind::Validation);
        let error = results[5].as_ref().unwrap_err();
        assert_eq!(error, &LedgerError::invalid_currency("usdollar").at_line(7));
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let file = create_temp_csv(HEADER);
        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }
}
