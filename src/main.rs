//! Trip Ledger CLI
//!
//! Applies a shared-expense trip journal and prints a report to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- journal.csv > ledger.csv
//! cargo run -- --view balance journal.csv > balances.csv
//! cargo run -- --trip 1 --user 2 journal.csv
//! cargo run -- --strategy sync --log-level debug journal.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 journal.csv
//! ```
//!
//! # Processing Strategies
//!
//! - **sync**: single-threaded, one command at a time
//! - **async**: batched, trips processed in parallel (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use std::process;
use trip_ledger::cli;
use trip_ledger::strategy;

fn main() {
    let args = cli::parse_args();
    cli::init_logging(&args.log_level);

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let request = args.to_report_request();
    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &request, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
