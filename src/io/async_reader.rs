//! Asynchronous journal reader with batch interface
//!
//! ```text
//! journal file → AsyncReader → batches of TripCommands
//!                    ↓
//!             csv_format module
//!   (JournalRecord, convert_journal_record)
//! ```
//!
//! Malformed rows are logged at `warn` with their line number and skipped;
//! they never end a batch early.

use crate::io::csv_format::{convert_journal_record, JournalRecord};
use crate::types::TripCommand;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous journal reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
        }
    }

    /// Read up to `batch_size` commands
    ///
    /// Returns an empty vector once the journal is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<TripCommand> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<JournalRecord>();

        while batch.len() < batch_size {
            let Some(row) = rows.next().await else {
                break;
            };
            self.line_num += 1;

            match row {
                Ok(record) => match convert_journal_record(record) {
                    Ok(command) => batch.push(command),
                    Err(e) => warn!(line = self.line_num, error = %e, "skipping malformed journal row"),
                },
                Err(e) => warn!(line = self.line_num, error = %e, "skipping unreadable journal row"),
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TripAction;
    use futures::io::Cursor;

    const HEADER: &str = "op,trip,actor,id,amount,currency,split,parties,description\n";

    fn reader(rows: &str) -> AsyncReader<Cursor<Vec<u8>>> {
        AsyncReader::new(Cursor::new(format!("{}{}", HEADER, rows).into_bytes()))
    }

    #[tokio::test]
    async fn test_read_batch_splits_journal() {
        let mut reader = reader(
            "create_trip,1,1,,,USD,,,Lisbon\n\
             join,1,2,,,,,,\n\
             settle,1,2,1,0.34,,,1,\n",
        );

        let batch = reader.read_batch(2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].action.name(), "create_trip");
        assert_eq!(batch[1].actor, 2);

        let batch = reader.read_batch(2).await;
        assert_eq!(batch.len(), 1);
        assert!(matches!(
            &batch[0].action,
            TripAction::RecordSettlement(settlement) if settlement.amount_cents == 34 && settlement.to == 1
        ));

        assert!(reader.read_batch(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_journal() {
        let mut reader = reader("");
        assert!(reader.read_batch(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let mut reader = reader(
            "refund,1,1,,,,,,\n\
             expense,1,1,1,abc,,equal,1,Taxi\n\
             join,one,2,,,,,,\n\
             join,1,3,,,,,,\n",
        );

        let batch = reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].actor, 3);
    }

    #[tokio::test]
    async fn test_batch_size_larger_than_journal() {
        let mut reader = reader("join,1,2,,,,,,\n");
        assert_eq!(reader.read_batch(100).await.len(), 1);
    }
}
