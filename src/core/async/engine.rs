//! Trip command orchestration for concurrent processing
//!
//! This module provides the `AsyncTripEngine` struct, the concurrent
//! counterpart of `TripEngine`. It exposes the same operations as async
//! methods on a shared `AsyncTripStore`.
//!
//! # Architecture
//!
//! ```text
//! AsyncTripEngine
//!     └── Arc<AsyncTripStore>
//!             └── DashMap<TripId, Arc<Mutex<Option<TripState>>>>
//! ```
//!
//! # Thread Safety
//!
//! The engine is cheap to clone and can be shared across tasks. Every
//! operation on a trip runs under that trip's lock, so two tasks recording
//! settlements against the same debt can never both pass validation on a
//! stale view.

use std::sync::Arc;

use tracing::{debug, trace};

use super::AsyncTripStore;
use crate::core::trip_state::TripState;
use crate::types::{
    Balance, CurrencyCode, Expense, ExpenseId, JoinOutcome, Ledger, LedgerError, Member,
    NewExpense, NewSettlement, Settlement, SettlementId, Trip, TripAction, TripCommand, TripId,
    UserId,
};

/// Thread-safe trip engine
#[derive(Debug, Clone, Default)]
pub struct AsyncTripEngine {
    store: Arc<AsyncTripStore>,
}

impl AsyncTripEngine {
    /// Create an engine over a shared store
    pub fn new(store: Arc<AsyncTripStore>) -> Self {
        Self { store }
    }

    /// Apply a single journal command
    ///
    /// # Errors
    ///
    /// Returns the rule violation that rejected the command. A rejected
    /// command changes nothing.
    pub async fn apply(&self, command: TripCommand) -> Result<(), LedgerError> {
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
            TripAction::DeleteTrip => self.delete_trip(trip, actor).await,
            action => {
                self.store
                    .with_trip_mut(trip, |state| state.apply(actor, action))
                    .await
            }
        };

        match &result {
            Ok(()) => trace!(trip, actor, op, "applied command"),
            Err(e) => debug!(trip, actor, op, kind = ?e.kind(), error = %e, "rejected command"),
        }

        result
    }

    /// Create a trip owned by `owner`
    pub fn create_trip(
        &self,
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

    pub async fn join_trip(&self, trip: TripId, user: UserId) -> Result<JoinOutcome, LedgerError> {
        self.store
            .with_trip_mut(trip, |state| Ok(state.join(user)))
            .await
    }

    /// Delete a trip with everything it owns (owner only)
    pub async fn delete_trip(&self, trip: TripId, actor: UserId) -> Result<(), LedgerError> {
        self.store
            .remove_if(trip, |state| state.authorize_delete(actor))
            .await
            .map(|_| ())
    }

    pub async fn add_expense(
        &self,
        trip: TripId,
        payer: UserId,
        request: NewExpense,
    ) -> Result<Expense, LedgerError> {
        self.store
            .with_trip_mut(trip, |state| state.add_expense(payer, request))
            .await
    }

    pub async fn delete_expense(
        &self,
        trip: TripId,
        actor: UserId,
        id: ExpenseId,
    ) -> Result<Expense, LedgerError> {
        self.store
            .with_trip_mut(trip, |state| state.delete_expense(actor, id))
            .await
    }

    /// Validate and record a settlement under the trip's lock
    pub async fn record_settlement(
        &self,
        trip: TripId,
        payer: UserId,
        request: NewSettlement,
    ) -> Result<Settlement, LedgerError> {
        self.store
            .with_trip_mut(trip, |state| state.record_settlement(payer, request))
            .await
    }

    pub async fn delete_settlement(
        &self,
        trip: TripId,
        actor: UserId,
        id: SettlementId,
    ) -> Result<Settlement, LedgerError> {
        self.store
            .with_trip_mut(trip, |state| state.delete_settlement(actor, id))
            .await
    }

    pub async fn ledger(&self, trip: TripId, user: UserId) -> Result<Ledger, LedgerError> {
        self.store.with_trip(trip, |state| state.ledger(user)).await
    }

    pub async fn balance(&self, trip: TripId, user: UserId) -> Result<Balance, LedgerError> {
        self.store.with_trip(trip, |state| state.balance(user)).await
    }

    pub async fn members(
        &self,
        trip: TripId,
        requester: UserId,
    ) -> Result<Vec<Member>, LedgerError> {
        self.store
            .with_trip(trip, |state| state.members_for(requester))
            .await
    }

    pub async fn trips_for(&self, user: UserId) -> Vec<Trip> {
        self.store.trips_for(user).await
    }

    pub async fn expense(
        &self,
        trip: TripId,
        id: ExpenseId,
        requester: UserId,
    ) -> Result<Expense, LedgerError> {
        self.store
            .with_trip(trip, |state| state.expense(requester, id).cloned())
            .await
    }

    pub async fn settlement(
        &self,
        trip: TripId,
        id: SettlementId,
        requester: UserId,
    ) -> Result<Settlement, LedgerError> {
        self.store
            .with_trip(trip, |state| state.settlement(requester, id).cloned())
            .await
    }

    /// Trip details for a member
    pub async fn trip(&self, trip: TripId, requester: UserId) -> Result<Trip, LedgerError> {
        self.store
            .with_trip(trip, |state| state.trip_for(requester).cloned())
            .await
    }

    pub fn trip_ids(&self) -> Vec<TripId> {
        self.store.trip_ids()
    }

    pub async fn member_ids(&self, trip: TripId) -> Result<Vec<UserId>, LedgerError> {
        self.store.with_trip(trip, |state| Ok(state.member_ids())).await
    }
}
