//! Asynchronous batch processing strategy
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batched journal reading)
//!     ├── BatchProcessor (trip partitioning + one task per trip)
//!     └── AsyncTripEngine
//!         └── AsyncTripStore (DashMap of per-trip locks)
//! ```
//!
//! Batches are applied one after another so a trip's commands keep their
//! journal order even when they span batches. Within a batch, different
//! trips run in parallel on the tokio multi-threaded runtime.

use crate::core::r#async::{AsyncTripEngine, AsyncTripStore, BatchProcessor};
use crate::io::async_reader::AsyncReader;
use crate::io::sync_reader::open_error;
use crate::strategy::{ProcessingStrategy, Report, ReportRequest};
use crate::types::{LedgerError, MemberBalance, MemberLedger};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of journal commands per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid worker count, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Build the requested report from a fully applied engine
pub async fn build_report(
    engine: &AsyncTripEngine,
    request: &ReportRequest,
) -> Result<Report, LedgerError> {
    let mut report = Report::empty(request.view);

    for trip in request.select_trips(engine.trip_ids()) {
        let members = engine.member_ids(trip).await?;
        for user in request.select_members(trip, &members) {
            match &mut report {
                Report::Ledger(rows) => rows.push(MemberLedger {
                    trip,
                    user,
                    ledger: engine.ledger(trip, user).await?,
                }),
                Report::Balance(rows) => rows.push(MemberBalance {
                    trip,
                    user,
                    balance: engine.balance(trip, user).await?,
                }),
            }
        }
    }

    Ok(report)
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        request: &ReportRequest,
        output: &mut dyn Write,
    ) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()?;

        let report = runtime.block_on(async {
            let store = Arc::new(AsyncTripStore::new());
            let engine = Arc::new(AsyncTripEngine::new(store));
            let processor = BatchProcessor::new(Arc::clone(&engine));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| open_error(input_path, e))?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let (mut applied, mut rejected) = (0usize, 0usize);
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // Wait for the whole batch so later batches see its effects
                for outcome in processor.process_batch(batch).await {
                    match outcome.result {
                        Ok(()) => applied += 1,
                        Err(_) => rejected += 1,
                    }
                }
            }
            debug!(applied, rejected, "journal applied");

            build_report(&engine, request).await
        })?;

        report.write(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReportView;
    use crate::strategy::SyncProcessingStrategy;
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

    fn run(strategy: &dyn ProcessingStrategy, file: &NamedTempFile, request: &ReportRequest) -> String {
        let mut output = Vec::new();
        strategy.process(file.path(), request, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    const JOURNAL: &str = "create_trip,1,1,,,USD,,,Lisbon\n\
                           create_trip,2,5,,,EUR,,,Berlin\n\
                           join,1,2,,,,,,\n\
                           join,2,6,,,,,,\n\
                           expense,1,1,1,9.00,,equal,1;2,Hotel\n\
                           expense,2,6,1,10.00,EUR,manual,5:7.50;6:2.50,Museum\n\
                           settle,1,2,1,2.00,,,1,\n\
                           settle,2,5,1,7.50,,,6,\n\
                           settle,1,2,2,2.00,,,1,\n\
                           settle,1,2,3,1.00,,,1,\n";

    #[test]
    fn test_small_batches_keep_trip_order() {
        let file = create_temp_csv(JOURNAL);
        let strategy = AsyncProcessingStrategy::new(BatchConfig::new(2, 2));

        let output = run(&strategy, &file, &ReportRequest::new(ReportView::Balance));
        assert_eq!(
            output,
            "trip,user,balance,currency\n\
             1,1,-0.50,USD\n\
             1,2,0.50,USD\n\
             2,5,0.00,EUR\n\
             2,6,0.00,EUR\n"
        );
    }

    #[test]
    fn test_matches_sync_strategy() {
        let file = create_temp_csv(JOURNAL);

        for view in [ReportView::Ledger, ReportView::Balance] {
            let request = ReportRequest::new(view);
            let sync = run(&SyncProcessingStrategy, &file, &request);
            let concurrent = run(
                &AsyncProcessingStrategy::new(BatchConfig::new(3, 4)),
                &file,
                &request,
            );
            assert_eq!(sync, concurrent);
        }
    }

    #[test]
    fn test_trip_filter() {
        let file = create_temp_csv(JOURNAL);
        let request = ReportRequest::new(ReportView::Ledger)
            .with_trip(Some(1))
            .with_user(Some(2));

        let output = run(&AsyncProcessingStrategy::new(BatchConfig::default()), &file, &request);
        assert_eq!(
            output,
            "trip,user,counterparty,direction,amount,currency\n\
             1,2,1,owes,0.50,USD\n"
        );
    }

    #[test]
    fn test_missing_file() {
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default());
        let result = strategy.process(
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
    fn test_zero_config_falls_back_to_defaults() {
        assert_eq!(BatchConfig::new(0, 0), BatchConfig::default());
        assert_eq!(BatchConfig::new(5, 0).batch_size, 5);
    }
}
