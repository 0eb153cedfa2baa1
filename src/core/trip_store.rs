//! In-memory trip storage
//!
//! This module provides the TripStore component that owns every trip's
//! state, keyed by trip id. Deleting a trip drops its `TripState`, which
//! removes its members, expenses, shares and settlements in one step.

use crate::core::trip_state::TripState;
use crate::types::{LedgerError, Trip, TripId, UserId};
use std::collections::HashMap;

/// Trip store for the single-threaded engine
#[derive(Debug, Default)]
pub struct TripStore {
    /// Map of trip ID to trip state
    trips: HashMap<TripId, TripState>,
}

impl TripStore {
    pub fn new() -> Self {
        TripStore {
            trips: HashMap::new(),
        }
    }

    /// Insert a freshly created trip
    ///
    /// # Errors
    ///
    /// Returns `TripAlreadyExists` if the id is taken; the existing trip is
    /// left untouched.
    pub fn insert(&mut self, state: TripState) -> Result<(), LedgerError> {
        let id = state.id();
        if self.trips.contains_key(&id) {
            return Err(LedgerError::TripAlreadyExists { trip: id });
        }
        self.trips.insert(id, state);
        Ok(())
    }

    pub fn get(&self, trip: TripId) -> Result<&TripState, LedgerError> {
        self.trips
            .get(&trip)
            .ok_or_else(|| LedgerError::trip_not_found(trip))
    }

    pub fn get_mut(&mut self, trip: TripId) -> Result<&mut TripState, LedgerError> {
        self.trips
            .get_mut(&trip)
            .ok_or_else(|| LedgerError::trip_not_found(trip))
    }

    /// Drop a trip and everything it owns
    pub fn remove(&mut self, trip: TripId) -> Result<TripState, LedgerError> {
        self.trips
            .remove(&trip)
            .ok_or_else(|| LedgerError::trip_not_found(trip))
    }

    /// All trip ids in ascending order
    pub fn trip_ids(&self) -> Vec<TripId> {
        let mut ids: Vec<TripId> = self.trips.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Trips `user` belongs to, newest (highest id) first
    pub fn trips_for(&self, user: UserId) -> Vec<Trip> {
        let mut trips: Vec<Trip> = self
            .trips
            .values()
            .filter(|state| state.role(user).is_some())
            .map(|state| state.trip().clone())
            .collect();
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
