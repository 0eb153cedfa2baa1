//! Types module
//!
//! Contains core data structures used throughout the application:
//! - `money`: integer cents and currency codes
//! - `trip`: trips, members and roles
//! - `expense`: expenses, shares and split requests
//! - `settlement`: recorded payments between members
//! - `ledger`: ledger and balance views
//! - `command`: trip journal commands
//! - `error`: error types for the trip ledger

pub mod command;
pub mod error;
pub mod expense;
pub mod ledger;
pub mod money;
pub mod settlement;
pub mod trip;

pub use command::{TripAction, TripCommand};
pub use error::{ErrorKind, LedgerError};
pub use expense::{
    Expense, ExpenseId, ExpenseShare, NewExpense, ShareInput, SplitMode, SplitRequest,
};
pub use ledger::{Balance, Ledger, LedgerEntry, MemberBalance, MemberLedger};
pub use money::{format_cents, parse_cents, Cents, CurrencyCode, Money};
pub use settlement::{NewSettlement, Settlement, SettlementId};
pub use trip::{JoinOutcome, Member, Role, Trip, TripId, UserId};
