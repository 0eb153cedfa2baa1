//! Synchronous processing strategy
//!
//! Single-threaded pipeline:
//! - journal rows streamed by `SyncReader`
//! - commands applied in order by `TripEngine`
//! - report rows written by `csv_format`
//!
//! Memory use is proportional to the trips' rows, not to the journal size.

use crate::core::TripEngine;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, Report, ReportRequest};
use crate::types::{LedgerError, MemberBalance, MemberLedger};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Synchronous processing strategy
///
/// ```no_run
/// use trip_ledger::cli::ReportView;
/// use trip_ledger::strategy::{ProcessingStrategy, ReportRequest, SyncProcessingStrategy};
/// use std::path::Path;
///
/// let request = ReportRequest::new(ReportView::Ledger);
/// SyncProcessingStrategy
///     .process(Path::new("journal.csv"), &request, &mut std::io::stdout())
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

/// Build the requested report from a fully applied engine
pub fn build_report(engine: &TripEngine, request: &ReportRequest) -> Result<Report, LedgerError> {
    let mut report = Report::empty(request.view);

    for trip in request.select_trips(engine.trip_ids()) {
        let members = engine.member_ids(trip)?;
        for user in request.select_members(trip, &members) {
            match &mut report {
                Report::Ledger(rows) => rows.push(MemberLedger {
                    trip,
                    user,
                    ledger: engine.ledger(trip, user)?,
                }),
                Report::Balance(rows) => rows.push(MemberBalance {
                    trip,
                    user,
                    balance: engine.balance(trip, user)?,
                }),
            }
        }
    }

    Ok(report)
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        request: &ReportRequest,
        output: &mut dyn Write,
    ) -> Result<(), LedgerError> {
        let mut engine = TripEngine::new();
        let reader = SyncReader::new(input_path)?;

        let (mut applied, mut rejected, mut malformed) = (0usize, 0usize, 0usize);
        for row in reader {
            match row {
                Ok(command) => match engine.apply(command) {
                    Ok(()) => applied += 1,
                    // Logged by the engine
                    Err(_) => rejected += 1,
                },
                Err(e) => {
                    malformed += 1;
                    warn!(error = %e, "skipping malformed journal row");
                }
            }
        }
        debug!(applied, rejected, malformed, "journal applied");

        build_report(&engine, request)?.write(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReportView;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "op,trip,actor,id,amount,currency,split,parties,description\n";

    fn create_temp_csv(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(format!("{}{}", HEADER, rows).as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(rows: &str, request: &ReportRequest) -> String {
        let file = create_temp_csv(rows);
        let mut output = Vec::new();
        SyncProcessingStrategy
            .process(file.path(), request, &mut output)
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    const TRIP: &str = "create_trip,1,1,,,USD,,,Lisbon\n\
                        join,1,2,,,,,,\n\
                        join,1,3,,,,,,\n\
                        expense,1,1,1,1.00,,equal,2;1;3,Hotel\n\
                        expense,1,2,2,0.60,,equal,2;3,Taxi\n";

    #[test]
    fn test_ledger_report() {
        let output = run(TRIP, &ReportRequest::new(ReportView::Ledger).with_user(Some(2)));
        assert_eq!(
            output,
            "trip,user,counterparty,direction,amount,currency\n\
             1,2,1,owes,0.34,USD\n\
             1,2,3,owed,0.30,USD\n"
        );
    }

    #[test]
    fn test_balance_report_covers_every_member() {
        let output = run(TRIP, &ReportRequest::new(ReportView::Balance));
        assert_eq!(
            output,
            "trip,user,balance,currency\n\
             1,1,-0.67,USD\n\
             1,2,0.04,USD\n\
             1,3,0.63,USD\n"
        );
    }

    #[test]
    fn test_rejected_and_malformed_rows_are_skipped() {
        let rows = format!(
            "{}settle,1,2,1,0.35,,,1,\n\
             bogus,1,2,,,,,,\n\
             settle,1,2,2,0.34,,,1,\n",
            TRIP
        );
        let output = run(&rows, &ReportRequest::new(ReportView::Ledger).with_user(Some(2)));
        assert_eq!(
            output,
            "trip,user,counterparty,direction,amount,currency\n\
             1,2,3,owed,0.30,USD\n"
        );
    }

    #[test]
    fn test_missing_file() {
        let result = SyncProcessingStrategy.process(
            Path::new("nonexistent.csv"),
            &ReportRequest::default(),
            &mut Vec::new(),
        );
        assert_eq!(
            result,
            Err(LedgerError::FileNotFound {
                path: "nonexistent.csv".to_string()
            })
        );
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
