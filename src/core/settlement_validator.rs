//! Settlement validation
//!
//! A settlement is accepted only if it pays down a debt that currently
//! exists, by at most the amount owed. The check is stateless and uses the
//! same net derivation as the ledger view, so the store must serialize the
//! check-then-insert sequence per trip.

use crate::core::ledger_engine::net_with;
use crate::core::traits::TripRecords;
use crate::types::{Cents, LedgerError, TripId, UserId};

/// Amount `from` currently owes `to`, zero if `from` is not in debt to them
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the ledger totals overflow.
pub fn outstanding_debt<R>(records: &R, from: UserId, to: UserId) -> Result<Cents, LedgerError>
where
    R: TripRecords + ?Sized,
{
    Ok((-net_with(records, from, to)?).max(0))
}

/// Check a proposed payment of `amount_cents` from `from` to `to`
///
/// # Errors
///
/// - `NonPositiveAmount` if `amount_cents <= 0`
/// - `SelfSettlement` if `from == to`
/// - `NoAccess` if `from` is not a trip member
/// - `NonMemberParticipant` if `to` is not a trip member
/// - `NoOutstandingDebt` if `from` owes `to` nothing
/// - `ExceedsOutstandingDebt` if `amount_cents` is more than is owed
pub fn validate_settlement<R>(
    records: &R,
    trip: TripId,
    from: UserId,
    to: UserId,
    amount_cents: Cents,
) -> Result<(), LedgerError>
where
    R: TripRecords + ?Sized,
{
    if amount_cents <= 0 {
        return Err(LedgerError::non_positive_amount(amount_cents));
    }

    if from == to {
        return Err(LedgerError::SelfSettlement { user: from });
    }

    if !records.is_member(from) {
        return Err(LedgerError::no_access(trip, from));
    }

    if !records.is_member(to) {
        return Err(LedgerError::non_member_participant(to));
    }

    let owed = outstanding_debt(records, from, to)?;

    if owed <= 0 {
        return Err(LedgerError::NoOutstandingDebt { from, to });
    }

    if amount_cents > owed {
        return Err(LedgerError::exceeds_outstanding_debt(
            from,
            to,
            owed,
            amount_cents,
        ));
    }

    Ok(())
}
