//! Read-side traits between the engine and whatever stores trip data
//!
//! The allocator, ledger engine and settlement validator never own trip
//! data. They read it through these projections, so the in-memory stores
//! here and any external store can feed the same computations.

use crate::types::{CurrencyCode, Expense, Role, Settlement, UserId};
use std::collections::{BTreeMap, BTreeSet};

/// Membership lookup used to validate participants, payers and recipients
pub trait Membership {
    fn is_member(&self, user: UserId) -> bool;
}

impl Membership for BTreeSet<UserId> {
    fn is_member(&self, user: UserId) -> bool {
        self.contains(&user)
    }
}

impl Membership for [UserId] {
    fn is_member(&self, user: UserId) -> bool {
        self.contains(&user)
    }
}

impl Membership for BTreeMap<UserId, Role> {
    fn is_member(&self, user: UserId) -> bool {
        self.contains_key(&user)
    }
}

/// Everything the ledger engine needs from one trip
pub trait TripRecords: Membership {
    /// Trip currency; every expense and settlement is in it
    fn currency(&self) -> CurrencyCode;

    /// All expenses of the trip, each with its shares
    fn expenses(&self) -> &[Expense];

    /// All settlements of the trip
    fn settlements(&self) -> &[Settlement];
}
