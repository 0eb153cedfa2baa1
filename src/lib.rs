//! Trip Ledger Library
//! # Overview
//!
//! Shared-expense ledger for group trips. Members record expenses split
//! among participants and settlements paid to each other; the ledger tells
//! each member, per counterparty, who owes whom after netting.
//!
//! # Architecture
//!
//! - [`types`] - Trips, expenses, settlements, ledgers and errors
//! - [`cli`] - CLI arguments parsing and log setup
//! - [`core`] - Business logic components:
//!   - [`core::allocator`] - Equal and manual expense splitting
//!   - [`core::ledger_engine`] - Pairwise nets, ledger and balance views
//!   - [`core::settlement_validator`] - Payment checks against outstanding debt
//!   - [`core::engine`] / [`core::r#async`] - Sync and concurrent trip engines
//! - [`io`] - Journal reading and report writing
//! - [`strategy`] - Sync and async journal pipelines
//!
//! # Amounts
//!
//! All amounts are integer cents (`i64`) in the trip's currency. Arithmetic
//! is checked; overflow is an error, never a wrap.
//!
//! # Netting
//!
//! For a member `me` and counterparty `c`, what `me` owes `c` is the sum of
//! `me`'s shares in expenses `c` paid, minus what `me` has settled to `c`,
//! floored at zero; the opposite direction is computed the same way. The
//! ledger reports the difference of the two as a single debt or credit.

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    allocate_equal, compute_balance, compute_ledger, validate_manual, validate_settlement,
    AsyncTripEngine, TripEngine,
};
pub use io::{write_balance_csv, write_ledger_csv};
pub use types::{
    Balance, CurrencyCode, Expense, Ledger, LedgerEntry, LedgerError, Settlement, SplitRequest,
    TripCommand, TripId, UserId,
};
