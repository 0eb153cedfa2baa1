//! Trip ledger engine
//!
//! This module provides the TripEngine that applies journal commands to the
//! TripStore and answers ledger queries for members.
//!
//! The engine enforces the trip-level rules (trip existence, owner-only
//! deletion) and delegates everything inside a trip to `TripState`:
//! - Membership checks before any read or write
//! - Expense allocation and the exact-sum rule for manual splits
//! - Settlement validation against the current outstanding debt

use crate::core::trip_state::TripState;
use crate::core::trip_store::TripStore;
use crate::types::{
    Balance, CurrencyCode, Expense, ExpenseId, JoinOutcome, Ledger, LedgerError, Member,
    NewExpense, NewSettlement, Settlement, SettlementId, Trip, TripAction, TripCommand, TripId,
    UserId,
};
use tracing::{debug, trace};

/// Single-threaded trip engine
///
/// Every mutation takes `&mut self`, so commands are serialized by
/// ownership and settlement checks always see the latest rows.
#[derive(Debug, Default)]
pub struct TripEngine {
    store: TripStore,
}

impl TripEngine {
    pub fn new() -> Self {
        TripEngine {
            store: TripStore::new(),
        }
    }

    /// Apply a single journal command
    ///
    /// Routes the command to the trip-level handler for creation and
    /// deletion, and to the trip's own state for everything else.
    ///
    /// # Errors
    ///
    /// Returns the rule violation that rejected the command. A rejected
    /// command changes nothing.
    pub fn apply(&mut self, command: TripCommand) -> Result<(), LedgerError> {
        let TripCommand {
            trip,
            actor,
            action,
        } = command;
        let op = action.name();

        let result = match action {
            TripAction::CreateTrip { name, currency } => {
                self.create_trip(trip, actor, &name, currency).map(|_| ())
            }
            TripAction::DeleteTrip => self.delete_trip(trip, actor),
            action => self
                .store
                .get_mut(trip)
                .and_then(|state| state.apply(actor, action)),
        };

        match &result {
            Ok(()) => trace!(trip, actor, op, "applied command"),
            Err(e) => debug!(trip, actor, op, kind = ?e.kind(), error = %e, "rejected command"),
        }

        result
    }

    /// Create a trip owned by `owner`
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for a blank name and `TripAlreadyExists` if the
    /// id is taken.
    pub fn create_trip(
        &mut self,
        trip: TripId,
        owner: UserId,
        name: &str,
        currency: CurrencyCode,
    ) -> Result<Trip, LedgerError> {
        let state = TripState::create(trip, owner, name, currency)?;
        let created = state.trip().clone();
        self.store.insert(state)?;
        Ok(created)
    }

    /// Add `user` to a trip
    pub fn join_trip(&mut self, trip: TripId, user: UserId) -> Result<JoinOutcome, LedgerError> {
        Ok(self.store.get_mut(trip)?.join(user))
    }

    /// Delete a trip with all its expenses, shares and settlements
    ///
    /// # Errors
    ///
    /// Returns `TripNotFound`, `NoAccess`, or `OwnerOnly` when `actor` is a
    /// member but not the owner.
    pub fn delete_trip(&mut self, trip: TripId, actor: UserId) -> Result<(), LedgerError> {
        self.store.get(trip)?.authorize_delete(actor)?;
        self.store.remove(trip)?;
        Ok(())
    }

    pub fn add_expense(
        &mut self,
        trip: TripId,
        payer: UserId,
        request: NewExpense,
    ) -> Result<Expense, LedgerError> {
        self.store.get_mut(trip)?.add_expense(payer, request)
    }

    pub fn delete_expense(
        &mut self,
        trip: TripId,
        actor: UserId,
        id: ExpenseId,
    ) -> Result<Expense, LedgerError> {
        self.store.get_mut(trip)?.delete_expense(actor, id)
    }

    pub fn record_settlement(
        &mut self,
        trip: TripId,
        payer: UserId,
        request: NewSettlement,
    ) -> Result<Settlement, LedgerError> {
        self.store.get_mut(trip)?.record_settlement(payer, request)
    }

    pub fn delete_settlement(
        &mut self,
        trip: TripId,
        actor: UserId,
        id: SettlementId,
    ) -> Result<Settlement, LedgerError> {
        self.store.get_mut(trip)?.delete_settlement(actor, id)
    }

    /// Per-counterparty ledger of `user` in `trip`
    pub fn ledger(&self, trip: TripId, user: UserId) -> Result<Ledger, LedgerError> {
        self.store.get(trip)?.ledger(user)
    }

    pub fn balance(&self, trip: TripId, user: UserId) -> Result<Balance, LedgerError> {
        self.store.get(trip)?.balance(user)
    }

    /// Members of `trip` as seen by `requester`
    pub fn members(&self, trip: TripId, requester: UserId) -> Result<Vec<Member>, LedgerError> {
        self.store.get(trip)?.members_for(requester)
    }

    /// Trips `user` belongs to, newest (highest id) first
    pub fn trips_for(&self, user: UserId) -> Vec<Trip> {
        self.store.trips_for(user)
    }

    pub fn expense(
        &self,
        trip: TripId,
        id: ExpenseId,
        requester: UserId,
    ) -> Result<Expense, LedgerError> {
        self.store.get(trip)?.expense(requester, id).cloned()
    }

    pub fn settlement(
        &self,
        trip: TripId,
        id: SettlementId,
        requester: UserId,
    ) -> Result<Settlement, LedgerError> {
        self.store.get(trip)?.settlement(requester, id).cloned()
    }

    /// Trip details for a member
    pub fn trip(&self, trip: TripId, requester: UserId) -> Result<Trip, LedgerError> {
        self.store.get(trip)?.trip_for(requester).cloned()
    }

    /// All trip ids, ascending
    pub fn trip_ids(&self) -> Vec<TripId> {
        self.store.trip_ids()
    }

    /// Member ids of `trip`, ascending
    pub fn member_ids(&self, trip: TripId) -> Result<Vec<UserId>, LedgerError> {
        Ok(self.store.get(trip)?.member_ids())
    }
}
