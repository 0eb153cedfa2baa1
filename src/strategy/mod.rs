//! Processing strategy module
//!
//! This module defines the Strategy pattern for complete journal pipelines:
//! reading the journal, applying it through a trip engine and writing the
//! requested report. Synchronous and asynchronous pipelines can be selected
//! at runtime and produce identical reports for the same journal.

use crate::cli::StrategyType;
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod report;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use report::{Report, ReportRequest};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete journal pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Apply the journal at `input_path` and write the requested report
    ///
    /// Malformed rows and rejected commands are logged and skipped; they do
    /// not fail the run.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - The runtime cannot be started (async only)
    /// - A ledger computation overflows
    /// - The report cannot be written
    fn process(
        &self,
        input_path: &Path,
        request: &ReportRequest,
        output: &mut dyn Write,
    ) -> Result<(), LedgerError>;
}

/// Create a processing strategy for the given type
///
/// `config` is only used by the async strategy; `None` means defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config.unwrap_or_default())),
    }
}
