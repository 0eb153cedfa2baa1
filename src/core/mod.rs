//! Core business logic module
//!
//! - `traits` - Read-side projections of trip data
//! - `allocator` - Expense amount to per-participant shares
//! - `ledger_engine` - Pairwise nets, ledger and balance views
//! - `settlement_validator` - Checks a payment against the outstanding debt
//! - `trip_state` - One trip's rows and the rules guarding them
//! - `trip_store` / `engine` - Single-threaded storage and orchestration
//! - `async` - Concurrent storage, orchestration and batch processing

pub mod allocator;
pub mod r#async;
pub mod engine;
pub mod ledger_engine;
pub mod settlement_validator;
pub mod traits;
pub mod trip_state;
pub mod trip_store;

pub use allocator::{allocate, allocate_equal, validate_manual};
pub use engine::TripEngine;
pub use ledger_engine::{balance_of, compute_balance, compute_ledger, counterparty_nets, net_with};
pub use r#async::{AsyncTripEngine, AsyncTripStore, BatchProcessor};
pub use settlement_validator::{outstanding_debt, validate_settlement};
pub use traits::{Membership, TripRecords};
pub use trip_state::TripState;
pub use trip_store::TripStore;
