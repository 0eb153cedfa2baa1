//! Expense allocation
//!
//! Turns an expense amount into per-participant integer shares. Runs once,
//! when the expense is recorded; the resulting shares are stored with the
//! expense and never re-validated.
//!
//! - **Equal split**: `amount / n` each, the first `amount % n` unique
//!   participants (in first-seen order) get one extra cent
//! - **Manual split**: the caller's shares, accepted only if they sum to the
//!   amount exactly

use crate::core::traits::Membership;
use crate::types::{Cents, LedgerError, ShareInput, SplitRequest, UserId};
use std::collections::HashSet;

/// Allocate `amount_cents` according to a split request
///
/// # Errors
///
/// Propagates the validation errors of [`allocate_equal`] and
/// [`validate_manual`].
pub fn allocate<M>(
    amount_cents: Cents,
    split: &SplitRequest,
    members: &M,
) -> Result<Vec<ShareInput>, LedgerError>
where
    M: Membership + ?Sized,
{
    match split {
        SplitRequest::Equal { participant_ids } => {
            allocate_equal(amount_cents, participant_ids, members)
        }
        SplitRequest::Manual { shares } => validate_manual(amount_cents, shares, members),
    }
}

/// Split `amount_cents` evenly across the unique participants
///
/// Duplicates are dropped keeping first-seen order, and that order decides
/// who receives the remainder cents. Every share is `base` or `base + 1`
/// and the shares always sum to `amount_cents`.
///
/// # Errors
///
/// - `NonPositiveAmount` if `amount_cents <= 0`
/// - `EmptyParticipants` if no participant is given
/// - `NonMemberParticipant` for the first participant outside the trip
pub fn allocate_equal<M>(
    amount_cents: Cents,
    participant_ids: &[UserId],
    members: &M,
) -> Result<Vec<ShareInput>, LedgerError>
where
    M: Membership + ?Sized,
{
    if amount_cents <= 0 {
        return Err(LedgerError::non_positive_amount(amount_cents));
    }

    let mut seen = HashSet::with_capacity(participant_ids.len());
    let unique: Vec<UserId> = participant_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if unique.is_empty() {
        return Err(LedgerError::EmptyParticipants);
    }

    if let Some(outsider) = unique.iter().find(|id| !members.is_member(**id)) {
        return Err(LedgerError::non_member_participant(*outsider));
    }

    let n = unique.len() as Cents;
    let base = amount_cents / n;
    let remainder = (amount_cents - base * n) as usize;

    Ok(unique
        .into_iter()
        .enumerate()
        .map(|(index, user_id)| {
            let extra = if index < remainder { 1 } else { 0 };
            ShareInput::new(user_id, base + extra)
        })
        .collect())
}

/// Check caller-supplied shares against `amount_cents`
///
/// No tolerance: a sum one cent over or under is rejected.
///
/// # Errors
///
/// - `NonPositiveAmount` if `amount_cents <= 0`
/// - `EmptyParticipants` for an empty list
/// - `NegativeShare`, `DuplicateParticipant`, `NonMemberParticipant` for the
///   first offending entry
/// - `ShareSumMismatch` if the shares do not add up to the amount
pub fn validate_manual<M>(
    amount_cents: Cents,
    shares: &[ShareInput],
    members: &M,
) -> Result<Vec<ShareInput>, LedgerError>
where
    M: Membership + ?Sized,
{
    if amount_cents <= 0 {
        return Err(LedgerError::non_positive_amount(amount_cents));
    }

    if shares.is_empty() {
        return Err(LedgerError::EmptyParticipants);
    }

    let mut seen = HashSet::with_capacity(shares.len());
    let mut sum: Cents = 0;

    for share in shares {
        if share.share_cents < 0 {
            return Err(LedgerError::negative_share(share.user_id, share.share_cents));
        }
        if !seen.insert(share.user_id) {
            return Err(LedgerError::duplicate_participant(share.user_id));
        }
        sum = sum
            .checked_add(share.share_cents)
            .ok_or_else(|| LedgerError::arithmetic_overflow("manual share sum"))?;
    }

    if sum != amount_cents {
        return Err(LedgerError::share_sum_mismatch(amount_cents, sum));
    }

    if let Some(outsider) = shares.iter().find(|s| !members.is_member(s.user_id)) {
        return Err(LedgerError::non_member_participant(outsider.user_id));
    }

    Ok(shares.to_vec())
}
