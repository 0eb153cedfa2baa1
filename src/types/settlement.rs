//! Settlement types

use super::money::{Cents, CurrencyCode};
use super::trip::{TripId, UserId};

/// Settlement identifier, unique within a trip
pub type SettlementId = u32;

/// A recorded payment from `from` to `to`
///
/// Reduces `from`'s debt to `to` on every subsequent ledger read. Removing
/// the row reverts the effect with no compensating entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub id: SettlementId,
    pub trip_id: TripId,
    pub from: UserId,
    pub to: UserId,
    pub amount_cents: Cents,
    pub currency: CurrencyCode,
}

/// Request to record a new settlement; the payer is the acting user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSettlement {
    pub id: SettlementId,
    pub to: UserId,
    pub amount_cents: Cents,

    /// Defaults to the trip currency when absent
    pub currency: Option<CurrencyCode>,
}
