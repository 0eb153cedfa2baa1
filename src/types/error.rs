//! Error types for the trip ledger
//!
//! Every rejection names the rule that failed so callers can show it to the
//! end user as-is.
//!
//! # Error Categories
//!
//! - **Validation**: malformed amounts, bad participant sets, manual-sum
//!   mismatches, currency problems
//! - **Authorization**: the acting user may not touch the trip or record
//! - **State**: the request conflicts with the current ledger or store
//!   (settling with yourself, over-paying a debt, unknown records)
//! - **Io**: file and CSV problems; propagated unchanged, never retried

use super::expense::ExpenseId;
use super::money::{Cents, CurrencyCode};
use super::settlement::SettlementId;
use super::trip::{TripId, UserId};
use thiserror::Error;

/// Broad category of a `LedgerError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    State,
    Io,
}

/// Main error type for the trip ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Journal row could not be parsed
    ///
    /// Recoverable: the row is skipped and processing continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A journal row was well-formed CSV but one of its values is invalid
    ///
    /// Keeps the underlying error so its kind is preserved.
    #[error("Invalid journal row at line {line}: {source}")]
    InvalidRow {
        line: u64,
        source: Box<LedgerError>,
    },

    /// Amount text is not a non-negative number with at most two decimals
    #[error("Invalid amount '{amount}': expected a non-negative number with at most two decimals")]
    InvalidAmount { amount: String },

    /// Expense and settlement amounts must be strictly positive
    #[error("Amount must be positive, got {cents} cents")]
    NonPositiveAmount { cents: Cents },

    #[error("Currency code '{code}' must be a 3-letter ISO code, e.g. USD")]
    InvalidCurrency { code: String },

    /// Amount currency differs from the trip currency
    #[error("Currency {actual} does not match trip currency {expected}")]
    CurrencyMismatch {
        expected: CurrencyCode,
        actual: CurrencyCode,
    },

    /// A required text field (trip name, expense description) is blank
    #[error("{field} is required")]
    MissingField { field: String },

    #[error("At least one participant is required")]
    EmptyParticipants,

    #[error("Duplicate participant {user}")]
    DuplicateParticipant { user: UserId },

    /// A referenced participant or recipient is not a trip member
    #[error("User {user} is not a trip member")]
    NonMemberParticipant { user: UserId },

    #[error("Share for user {user} must not be negative, got {share_cents} cents")]
    NegativeShare { user: UserId, share_cents: Cents },

    /// Manual shares do not add up to the expense amount
    #[error("Shares sum to {actual} cents but the expense amount is {expected} cents")]
    ShareSumMismatch { expected: Cents, actual: Cents },

    #[error("Expense {id} already exists in trip {trip}")]
    DuplicateExpense { trip: TripId, id: ExpenseId },

    #[error("Settlement {id} already exists in trip {trip}")]
    DuplicateSettlement { trip: TripId, id: SettlementId },

    /// Acting user is not a member of the trip
    #[error("User {user} has no access to trip {trip}")]
    NoAccess { trip: TripId, user: UserId },

    #[error("Only the owner of trip {trip} can {operation}")]
    OwnerOnly { trip: TripId, operation: String },

    /// Acting user neither created the record nor owns the trip
    #[error("Only the payer or the trip owner can delete {record} {id}")]
    NotRecordOwner { record: String, id: u32 },

    #[error("Cannot settle with yourself (user {user})")]
    SelfSettlement { user: UserId },

    #[error("No outstanding debt from user {from} to user {to}")]
    NoOutstandingDebt { from: UserId, to: UserId },

    /// Settlement would over-pay the current debt
    #[error("Amount {requested} cents exceeds outstanding debt of {owed} cents from user {from} to user {to}")]
    ExceedsOutstandingDebt {
        from: UserId,
        to: UserId,
        owed: Cents,
        requested: Cents,
    },

    #[error("Trip {trip} not found")]
    TripNotFound { trip: TripId },

    #[error("Trip {trip} already exists")]
    TripAlreadyExists { trip: TripId },

    #[error("Expense {id} not found in trip {trip}")]
    ExpenseNotFound { trip: TripId, id: ExpenseId },

    #[error("Settlement {id} not found in trip {trip}")]
    SettlementNotFound { trip: TripId, id: SettlementId },

    /// Checked arithmetic failed while summing amounts
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: String },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Category used by callers to tell "bad input" from "no access"
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidRow { source, .. } => source.kind(),

            LedgerError::FileNotFound { .. }
            | LedgerError::IoError { .. }
            | LedgerError::ParseError { .. } => ErrorKind::Io,

            LedgerError::NoAccess { .. }
            | LedgerError::OwnerOnly { .. }
            | LedgerError::NotRecordOwner { .. } => ErrorKind::Authorization,

            LedgerError::SelfSettlement { .. }
            | LedgerError::NoOutstandingDebt { .. }
            | LedgerError::ExceedsOutstandingDebt { .. }
            | LedgerError::TripNotFound { .. }
            | LedgerError::TripAlreadyExists { .. }
            | LedgerError::ExpenseNotFound { .. }
            | LedgerError::SettlementNotFound { .. }
            | LedgerError::ArithmeticOverflow { .. } => ErrorKind::State,

            LedgerError::InvalidAmount { .. }
            | LedgerError::NonPositiveAmount { .. }
            | LedgerError::InvalidCurrency { .. }
            | LedgerError::CurrencyMismatch { .. }
            | LedgerError::MissingField { .. }
            | LedgerError::EmptyParticipants
            | LedgerError::DuplicateParticipant { .. }
            | LedgerError::NonMemberParticipant { .. }
            | LedgerError::NegativeShare { .. }
            | LedgerError::ShareSumMismatch { .. }
            | LedgerError::DuplicateExpense { .. }
            | LedgerError::DuplicateSettlement { .. } => ErrorKind::Validation,
        }
    }

    /// Attach the journal line an error came from
    ///
    /// A parse error without a line gets it filled in; any other error is
    /// wrapped in `InvalidRow`.
    pub fn at_line(self, line: u64) -> Self {
        match self {
            LedgerError::ParseError {
                line: None,
                message,
            } => LedgerError::ParseError {
                line: Some(line),
                message,
            },
            error @ LedgerError::ParseError { .. } => error,
            error => LedgerError::InvalidRow {
                line,
                source: Box::new(error),
            },
        }
    }

    pub fn parse_error(line: Option<u64>, message: impl Into<String>) -> Self {
        LedgerError::ParseError {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_amount(amount: &str) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    pub fn non_positive_amount(cents: Cents) -> Self {
        LedgerError::NonPositiveAmount { cents }
    }

    pub fn invalid_currency(code: &str) -> Self {
        LedgerError::InvalidCurrency {
            code: code.to_string(),
        }
    }

    pub fn currency_mismatch(expected: CurrencyCode, actual: CurrencyCode) -> Self {
        LedgerError::CurrencyMismatch { expected, actual }
    }

    pub fn missing_field(field: &str) -> Self {
        LedgerError::MissingField {
            field: field.to_string(),
        }
    }

    pub fn duplicate_participant(user: UserId) -> Self {
        LedgerError::DuplicateParticipant { user }
    }

    pub fn non_member_participant(user: UserId) -> Self {
        LedgerError::NonMemberParticipant { user }
    }

    pub fn negative_share(user: UserId, share_cents: Cents) -> Self {
        LedgerError::NegativeShare { user, share_cents }
    }

    pub fn share_sum_mismatch(expected: Cents, actual: Cents) -> Self {
        LedgerError::ShareSumMismatch { expected, actual }
    }

    pub fn no_access(trip: TripId, user: UserId) -> Self {
        LedgerError::NoAccess { trip, user }
    }

    pub fn owner_only(trip: TripId, operation: &str) -> Self {
        LedgerError::OwnerOnly {
            trip,
            operation: operation.to_string(),
        }
    }

    pub fn not_record_owner(record: &str, id: u32) -> Self {
        LedgerError::NotRecordOwner {
            record: record.to_string(),
            id,
        }
    }

    pub fn exceeds_outstanding_debt(from: UserId, to: UserId, owed: Cents, requested: Cents) -> Self {
        LedgerError::ExceedsOutstandingDebt {
            from,
            to,
            owed,
            requested,
        }
    }

    pub fn trip_not_found(trip: TripId) -> Self {
        LedgerError::TripNotFound { trip }
    }

    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }
}
