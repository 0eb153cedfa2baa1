//! Trip journal commands
//!
//! A journal is an ordered list of commands, each issued by an acting user
//! against one trip. The acting user is always explicit; there is no
//! ambient "current user".

use super::expense::{ExpenseId, NewExpense};
use super::money::CurrencyCode;
use super::settlement::{NewSettlement, SettlementId};
use super::trip::{TripId, UserId};

/// What a command does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripAction {
    /// Create the trip with the actor as owner
    CreateTrip { name: String, currency: CurrencyCode },

    /// Add the actor as a member (no-op if already a member)
    Join,

    /// Record an expense paid by the actor
    AddExpense(NewExpense),

    /// Record a payment from the actor to another member
    RecordSettlement(NewSettlement),

    DeleteExpense { id: ExpenseId },

    DeleteSettlement { id: SettlementId },

    /// Remove the trip and everything it owns (owner only)
    DeleteTrip,
}

impl TripAction {
    /// Journal name of the action, used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            TripAction::CreateTrip { .. } => "create_trip",
            TripAction::Join => "join",
            TripAction::AddExpense(_) => "expense",
            TripAction::RecordSettlement(_) => "settle",
            TripAction::DeleteExpense { .. } => "delete_expense",
            TripAction::DeleteSettlement { .. } => "delete_settlement",
            TripAction::DeleteTrip => "delete_trip",
        }
    }
}

/// A single journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripCommand {
    pub trip: TripId,
    pub actor: UserId,
    pub action: TripAction,
}

impl TripCommand {
    pub fn new(trip: TripId, actor: UserId, action: TripAction) -> Self {
        TripCommand {
            trip,
            actor,
            action,
        }
    }
}
