//! Expense and share types
//!
//! An expense owns its shares: they are created together and removed
//! together, so there is no separate share table to keep consistent.

use super::money::{Cents, CurrencyCode};
use super::trip::{TripId, UserId};

/// Expense identifier, unique within a trip
pub type ExpenseId = u32;

/// How an expense amount was divided between participants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    Equal,
    Manual,
}

/// A `{user, share}` pair before it is attached to a stored expense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareInput {
    pub user_id: UserId,
    pub share_cents: Cents,
}

impl ShareInput {
    pub fn new(user_id: UserId, share_cents: Cents) -> Self {
        ShareInput {
            user_id,
            share_cents,
        }
    }
}

/// Split instructions supplied with a new expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitRequest {
    /// Divide evenly between these users; first-seen order breaks remainder ties
    Equal { participant_ids: Vec<UserId> },

    /// Caller-supplied shares that must sum to the expense amount
    Manual { shares: Vec<ShareInput> },
}

impl SplitRequest {
    pub fn mode(&self) -> SplitMode {
        match self {
            SplitRequest::Equal { .. } => SplitMode::Equal,
            SplitRequest::Manual { .. } => SplitMode::Manual,
        }
    }
}

/// One participant's portion of a stored expense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseShare {
    pub expense_id: ExpenseId,
    pub user_id: UserId,
    pub share_cents: Cents,
}

/// A stored expense together with its shares
///
/// Invariant (checked on insert only): the shares sum to `amount_cents`
/// and name each user at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub trip_id: TripId,
    pub paid_by: UserId,
    pub amount_cents: Cents,
    pub currency: CurrencyCode,
    pub split_mode: SplitMode,
    pub description: String,
    pub shares: Vec<ExpenseShare>,
}

/// Request to record a new expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub id: ExpenseId,
    pub amount_cents: Cents,

    /// Defaults to the trip currency when absent
    pub currency: Option<CurrencyCode>,

    pub description: String,
    pub split: SplitRequest,
}
