use crate::strategy::{BatchConfig, ReportRequest};
use crate::types::{TripId, UserId};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Apply a shared-expense trip journal and report who owes whom
#[derive(Parser, Debug)]
#[command(name = "trip-ledger")]
#[command(about = "Apply a shared-expense trip journal and report who owes whom", long_about = None)]
pub struct CliArgs {
    /// Journal CSV file
    #[arg(value_name = "INPUT", help = "Path to the journal CSV file")]
    pub input_file: PathBuf,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for single-threaded or 'async' for batched parallel processing"
    )]
    pub strategy: StrategyType,

    /// Number of journal commands per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of journal commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    #[arg(long = "trip", value_name = "TRIP", help = "Only report this trip")]
    pub trip: Option<TripId>,

    #[arg(long = "user", value_name = "USER", help = "Only report this member")]
    pub user: Option<UserId>,

    #[arg(
        long = "view",
        value_name = "VIEW",
        default_value = "ledger",
        help = "Report view: 'ledger' for per-counterparty rows or 'balance' for one row per member"
    )]
    pub view: ReportView,

    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log filter for stderr, e.g. 'debug' or 'trip_ledger=trace' (RUST_LOG overrides)"
    )]
    pub log_level: String,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available report views
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportView {
    #[default]
    Ledger,
    Balance,
}

impl CliArgs {
    /// Build a BatchConfig from the arguments, defaulting what is not given
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    pub fn to_report_request(&self) -> ReportRequest {
        ReportRequest::new(self.view)
            .with_trip(self.trip)
            .with_user(self.user)
    }
}
