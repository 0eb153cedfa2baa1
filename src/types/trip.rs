//! Trip and membership types

use super::money::CurrencyCode;

/// Trip identifier
pub type TripId = u32;

/// User identifier
pub type UserId = u32;

/// A shared-expense group with a single currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: TripId,

    /// Creator of the trip; the only user allowed to delete it
    pub owner_id: UserId,

    pub name: String,

    /// Fixed at creation, every amount in the trip is in this currency
    pub currency: CurrencyCode,
}

/// Role of a user inside a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Member,
}

/// A `(trip, user)` membership row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub trip_id: TripId,
    pub user_id: UserId,
    pub role: Role,
}

/// Outcome of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
}
