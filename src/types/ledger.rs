//! Ledger output types

use super::money::{Cents, CurrencyCode, Money};
use super::trip::{TripId, UserId};

/// One counterparty line of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub amount_cents: Cents,
}

impl LedgerEntry {
    pub fn new(user_id: UserId, amount_cents: Cents) -> Self {
        LedgerEntry {
            user_id,
            amount_cents,
        }
    }
}

/// Per-counterparty breakdown for one user in one trip
///
/// `debts` are what the user owes, `credits` what is owed to them. Both are
/// sorted by amount descending and never share a counterparty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    pub currency: CurrencyCode,
    pub debts: Vec<LedgerEntry>,
    pub credits: Vec<LedgerEntry>,
}

impl Ledger {
    /// Amount currently owed to `counterparty`, zero if none
    pub fn debt_to(&self, counterparty: UserId) -> Cents {
        self.debts
            .iter()
            .find(|entry| entry.user_id == counterparty)
            .map_or(0, |entry| entry.amount_cents)
    }

    /// Amount `counterparty` currently owes, zero if none
    pub fn credit_from(&self, counterparty: UserId) -> Cents {
        self.credits
            .iter()
            .find(|entry| entry.user_id == counterparty)
            .map_or(0, |entry| entry.amount_cents)
    }
}

/// Signed summary of a ledger: positive means net in debt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub balance_cents: Cents,
    pub currency: CurrencyCode,
}

impl Balance {
    pub fn money(&self) -> Money {
        Money::new(self.balance_cents, self.currency)
    }
}

/// Ledger of one member in one trip, as it appears in a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLedger {
    pub trip: TripId,
    pub user: UserId,
    pub ledger: Ledger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberBalance {
    pub trip: TripId,
    pub user: UserId,
    pub balance: Balance,
}
