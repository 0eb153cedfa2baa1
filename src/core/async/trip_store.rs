//! Thread-safe trip storage for concurrent command processing
//!
//! This module provides the `AsyncTripStore` struct, which keeps every trip
//! behind its own `tokio::sync::Mutex` inside a `DashMap`.
//!
//! # Locking
//!
//! The DashMap shard guard is only held long enough to clone the trip's
//! `Arc`; it is never held across an `.await`. All reads and writes of one
//! trip then go through that trip's mutex, so a settlement's validation and
//! insertion happen under a single lock and concurrent settlements for the
//! same trip are serialized. Different trips proceed in parallel.
//!
//! A deleted trip's slot is emptied under its lock before the map entry is
//! removed, so a task that cloned the handle earlier sees `TripNotFound`
//! instead of writing into a detached state.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::core::trip_state::TripState;
use crate::types::{LedgerError, Trip, TripId, UserId};

type SharedTrip = Arc<Mutex<Option<TripState>>>;

/// Thread-safe trip store
#[derive(Debug, Default)]
pub struct AsyncTripStore {
    trips: DashMap<TripId, SharedTrip>,
}

impl AsyncTripStore {
    pub fn new() -> Self {
        Self {
            trips: DashMap::new(),
        }
    }

    /// Insert a freshly created trip
    ///
    /// # Errors
    ///
    /// Returns `TripAlreadyExists` if the id is taken.
    pub fn insert(&self, state: TripState) -> Result<(), LedgerError> {
        match self.trips.entry(state.id()) {
            Entry::Occupied(entry) => Err(LedgerError::TripAlreadyExists { trip: *entry.key() }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(Some(state))));
                Ok(())
            }
        }
    }

    fn handle(&self, trip: TripId) -> Result<SharedTrip, LedgerError> {
        self.trips
            .get(&trip)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::trip_not_found(trip))
    }

    /// Run `f` against a trip while holding its lock
    pub async fn with_trip<F, R>(&self, trip: TripId, f: F) -> Result<R, LedgerError>
    where
        F: FnOnce(&TripState) -> Result<R, LedgerError>,
    {
        let handle = self.handle(trip)?;
        let guard = handle.lock().await;
        match guard.as_ref() {
            Some(state) => f(state),
            None => Err(LedgerError::trip_not_found(trip)),
        }
    }

    /// Run `f` against a trip mutably while holding its lock
    ///
    /// Any check-then-write sequence inside `f` is atomic with respect to
    /// every other access to the same trip.
    pub async fn with_trip_mut<F, R>(&self, trip: TripId, f: F) -> Result<R, LedgerError>
    where
        F: FnOnce(&mut TripState) -> Result<R, LedgerError>,
    {
        let handle = self.handle(trip)?;
        let mut guard = handle.lock().await;
        match guard.as_mut() {
            Some(state) => f(state),
            None => Err(LedgerError::trip_not_found(trip)),
        }
    }

    /// Remove a trip once `authorize` accepts it, under the trip's lock
    pub async fn remove_if<F>(&self, trip: TripId, authorize: F) -> Result<TripState, LedgerError>
    where
        F: FnOnce(&TripState) -> Result<(), LedgerError>,
    {
        let handle = self.handle(trip)?;
        let mut guard = handle.lock().await;

        match guard.as_ref() {
            Some(state) => authorize(state)?,
            None => return Err(LedgerError::trip_not_found(trip)),
        }

        let removed = guard.take().ok_or_else(|| LedgerError::trip_not_found(trip))?;
        self.trips
            .remove_if(&trip, |_, current| Arc::ptr_eq(current, &handle));
        Ok(removed)
    }

    /// All trip ids in ascending order
    pub fn trip_ids(&self) -> Vec<TripId> {
        let mut ids: Vec<TripId> = self.trips.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Trips `user` belongs to, newest (highest id) first
    pub async fn trips_for(&self, user: UserId) -> Vec<Trip> {
        let handles: Vec<SharedTrip> = self
            .trips
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut trips = Vec::new();
        for handle in handles {
            let guard = handle.lock().await;
            if let Some(state) = guard.as_ref() {
                if state.role(user).is_some() {
                    trips.push(state.trip().clone());
                }
            }
        }
        trips.sort_by(|a, b| b.id.cmp(&a.id));
        trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
