//! Ledger derivation
//!
//! Computes "who owes whom" for one user of one trip, from scratch, out of
//! the trip's expenses, shares and settlements. Nothing is cached: every
//! call reads the current rows, so deleting an expense or settlement takes
//! effect on the next read.
//!
//! # Algorithm
//!
//! For the subject user `me` and every counterparty `c`:
//!
//! 1. `debts_raw[c]`: `me`'s shares on expenses paid by `c`;
//!    `credits_raw[c]`: `c`'s shares on expenses paid by `me`.
//!    A share where payer and participant are both `me` counts for neither.
//! 2. Settlements are netted per direction and floored at zero:
//!    `debt[c] = max(0, debts_raw[c] - paid(me -> c))`,
//!    `credit[c] = max(0, credits_raw[c] - paid(c -> me))`.
//! 3. `net[c] = credit[c] - debt[c]`. Positive is a credit entry, negative a
//!    debt entry, zero is dropped.
//!
//! Settlements are matched by directed pair only, never traced back to
//! individual expenses.

use crate::core::traits::TripRecords;
use crate::types::{Balance, Cents, Ledger, LedgerEntry, LedgerError, UserId};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Raw per-direction totals for one subject user
#[derive(Debug, Default)]
struct Obligations {
    debts: BTreeMap<UserId, Cents>,
    credits: BTreeMap<UserId, Cents>,
    paid_out: BTreeMap<UserId, Cents>,
    paid_in: BTreeMap<UserId, Cents>,
}

fn accumulate(
    map: &mut BTreeMap<UserId, Cents>,
    user: UserId,
    cents: Cents,
    operation: &str,
) -> Result<(), LedgerError> {
    let slot = map.entry(user).or_insert(0);
    *slot = slot
        .checked_add(cents)
        .ok_or_else(|| LedgerError::arithmetic_overflow(operation))?;
    Ok(())
}

fn collect_obligations<R>(records: &R, me: UserId) -> Result<Obligations, LedgerError>
where
    R: TripRecords + ?Sized,
{
    let mut obligations = Obligations::default();

    for expense in records.expenses() {
        if expense.paid_by == me {
            for share in expense.shares.iter().filter(|s| s.user_id != me) {
                accumulate(
                    &mut obligations.credits,
                    share.user_id,
                    share.share_cents,
                    "credit total",
                )?;
            }
        } else {
            for share in expense.shares.iter().filter(|s| s.user_id == me) {
                accumulate(
                    &mut obligations.debts,
                    expense.paid_by,
                    share.share_cents,
                    "debt total",
                )?;
            }
        }
    }

    for settlement in records.settlements() {
        if settlement.from == me {
            accumulate(
                &mut obligations.paid_out,
                settlement.to,
                settlement.amount_cents,
                "settlement total",
            )?;
        } else if settlement.to == me {
            accumulate(
                &mut obligations.paid_in,
                settlement.from,
                settlement.amount_cents,
                "settlement total",
            )?;
        }
    }

    Ok(obligations)
}

fn floored_remaining(
    raw: &BTreeMap<UserId, Cents>,
    paid: &BTreeMap<UserId, Cents>,
    counterparty: UserId,
) -> Cents {
    let owed = raw.get(&counterparty).copied().unwrap_or(0);
    let settled = paid.get(&counterparty).copied().unwrap_or(0);
    owed.saturating_sub(settled).max(0)
}

/// Signed net per counterparty, after settlements, zero entries removed
///
/// Positive values are owed to `me`, negative values are owed by `me`. Only
/// counterparties with a raw debt or credit are considered.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a per-counterparty total overflows.
pub fn counterparty_nets<R>(records: &R, me: UserId) -> Result<BTreeMap<UserId, Cents>, LedgerError>
where
    R: TripRecords + ?Sized,
{
    let obligations = collect_obligations(records, me)?;

    let counterparties = obligations
        .debts
        .keys()
        .chain(obligations.credits.keys())
        .copied()
        .collect::<std::collections::BTreeSet<_>>();

    let mut nets = BTreeMap::new();
    for counterparty in counterparties {
        let debt = floored_remaining(&obligations.debts, &obligations.paid_out, counterparty);
        let credit = floored_remaining(&obligations.credits, &obligations.paid_in, counterparty);
        let net = credit - debt;
        if net != 0 {
            nets.insert(counterparty, net);
        }
    }

    Ok(nets)
}

/// Net between `me` and one counterparty (positive: they owe `me`)
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a per-counterparty total overflows.
pub fn net_with<R>(records: &R, me: UserId, counterparty: UserId) -> Result<Cents, LedgerError>
where
    R: TripRecords + ?Sized,
{
    Ok(counterparty_nets(records, me)?
        .get(&counterparty)
        .copied()
        .unwrap_or(0))
}

/// Full per-counterparty ledger for `me`
///
/// Debts and credits are each sorted by amount descending, ties broken by
/// ascending user id. A counterparty never appears in both lists.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a per-counterparty total overflows.
pub fn compute_ledger<R>(records: &R, me: UserId) -> Result<Ledger, LedgerError>
where
    R: TripRecords + ?Sized,
{
    let mut debts = Vec::new();
    let mut credits = Vec::new();

    for (counterparty, net) in counterparty_nets(records, me)? {
        if net > 0 {
            credits.push(LedgerEntry::new(counterparty, net));
        } else {
            debts.push(LedgerEntry::new(counterparty, -net));
        }
    }

    // Iteration is by ascending user id and the sort is stable
    debts.sort_by_key(|entry| Reverse(entry.amount_cents));
    credits.sort_by_key(|entry| Reverse(entry.amount_cents));

    Ok(Ledger {
        currency: records.currency(),
        debts,
        credits,
    })
}

/// Signed trip-wide balance for `me`: total debt minus total credit
///
/// Always equal to summing the debts and credits of [`compute_ledger`].
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a total overflows.
pub fn compute_balance<R>(records: &R, me: UserId) -> Result<Balance, LedgerError>
where
    R: TripRecords + ?Sized,
{
    let ledger = compute_ledger(records, me)?;
    balance_of(&ledger)
}

/// Collapse a ledger into its signed balance
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a total overflows.
pub fn balance_of(ledger: &Ledger) -> Result<Balance, LedgerError> {
    let sum = |entries: &[LedgerEntry]| {
        entries.iter().try_fold(0 as Cents, |acc, entry| {
            acc.checked_add(entry.amount_cents)
                .ok_or_else(|| LedgerError::arithmetic_overflow("balance total"))
        })
    };

    let balance_cents = sum(&ledger.debts)?
        .checked_sub(sum(&ledger.credits)?)
        .ok_or_else(|| LedgerError::arithmetic_overflow("balance total"))?;

    Ok(Balance {
        balance_cents,
        currency: ledger.currency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::Membership;
    use crate::types::{CurrencyCode, Expense, ExpenseShare, Settlement, SplitMode};

    const A: UserId = 1;
    const B: UserId = 2;
    const C: UserId = 3;

    /// Minimal record set for exercising the engine without a store
    struct Fixture {
        currency: CurrencyCode,
        expenses: Vec<Expense>,
        settlements: Vec<Settlement>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                currency: CurrencyCode::parse("USD").unwrap(),
                expenses: Vec::new(),
                settlements: Vec::new(),
            }
        }

        fn expense(mut self, paid_by: UserId, shares: &[(UserId, Cents)]) -> Self {
            let id = self.expenses.len() as u32 + 1;
            self.expenses.push(Expense {
                id,
                trip_id: 1,
                paid_by,
                amount_cents: shares.iter().map(|(_, c)| c).sum(),
                currency: self.currency,
                split_mode: SplitMode::Manual,
                description: format!("expense {}", id),
                shares: shares
                    .iter()
                    .map(|&(user_id, share_cents)| ExpenseShare {
                        expense_id: id,
                        user_id,
                        share_cents,
                    })
                    .collect(),
            });
            self
        }

        fn settle(mut self, from: UserId, to: UserId, amount_cents: Cents) -> Self {
            let id = self.settlements.len() as u32 + 1;
            self.settlements.push(Settlement {
                id,
                trip_id: 1,
                from,
                to,
                amount_cents,
                currency: self.currency,
            });
            self
        }
    }

    impl Membership for Fixture {
        fn is_member(&self, user: UserId) -> bool {
            (A..=C).contains(&user)
        }
    }

    impl TripRecords for Fixture {
        fn currency(&self) -> CurrencyCode {
            self.currency
        }

        fn expenses(&self) -> &[Expense] {
            &self.expenses
        }

        fn settlements(&self) -> &[Settlement] {
            &self.settlements
        }
    }

    fn scenario() -> Fixture {
        Fixture::new()
            .expense(A, &[(A, 34), (B, 33), (C, 33)])
            .expense(B, &[(B, 30), (C, 30)])
    }

    fn entries(list: &[LedgerEntry]) -> Vec<(UserId, Cents)> {
        list.iter().map(|e| (e.user_id, e.amount_cents)).collect()
    }

    #[test]
    fn test_empty_trip_has_empty_ledger() {
        let fixture = Fixture::new();
        let ledger = compute_ledger(&fixture, A).unwrap();
        assert!(ledger.debts.is_empty());
        assert!(ledger.credits.is_empty());
        assert_eq!(compute_balance(&fixture, A).unwrap().balance_cents, 0);
    }

    #[test]
    fn test_scenario_before_settlement() {
        let fixture = scenario();

        let ledger_b = compute_ledger(&fixture, B).unwrap();
        assert_eq!(entries(&ledger_b.debts), vec![(A, 33)]);
        assert_eq!(entries(&ledger_b.credits), vec![(C, 30)]);

        let ledger_a = compute_ledger(&fixture, A).unwrap();
        assert!(ledger_a.debts.is_empty());
        assert_eq!(entries(&ledger_a.credits), vec![(B, 33), (C, 33)]);

        let ledger_c = compute_ledger(&fixture, C).unwrap();
        assert_eq!(entries(&ledger_c.debts), vec![(A, 33), (B, 30)]);
        assert!(ledger_c.credits.is_empty());
    }

    #[test]
    fn test_settlement_reduces_only_its_pair() {
        let before = scenario();
        let after = scenario().settle(B, A, 20);

        let ledger_b = compute_ledger(&after, B).unwrap();
        assert_eq!(entries(&ledger_b.debts), vec![(A, 13)]);
        assert_eq!(
            compute_ledger(&after, B).unwrap().credits,
            compute_ledger(&before, B).unwrap().credits
        );
        assert_eq!(
            compute_ledger(&after, C).unwrap(),
            compute_ledger(&before, C).unwrap()
        );
    }

    #[test]
    fn test_full_settlement_removes_pair() {
        let fixture = scenario().settle(B, A, 33);
        let ledger_b = compute_ledger(&fixture, B).unwrap();
        assert!(ledger_b.debts.is_empty());
        assert_eq!(entries(&ledger_b.credits), vec![(C, 30)]);
        assert_eq!(compute_ledger(&fixture, A).unwrap().credit_from(B), 0);
    }

    #[test]
    fn test_mutual_expenses_net_out() {
        // A owes B 40, B owes A 25: only A -> B 15 remains
        let fixture = Fixture::new()
            .expense(B, &[(A, 40), (B, 10)])
            .expense(A, &[(A, 5), (B, 25)]);

        let ledger_a = compute_ledger(&fixture, A).unwrap();
        assert_eq!(entries(&ledger_a.debts), vec![(B, 15)]);
        assert!(ledger_a.credits.is_empty());

        let ledger_b = compute_ledger(&fixture, B).unwrap();
        assert_eq!(entries(&ledger_b.credits), vec![(A, 15)]);
        assert!(ledger_b.debts.is_empty());
    }

    #[test]
    fn test_settlement_floors_each_direction_before_netting() {
        // A owes B 40 and B owes A 25. A overpays B with 50: A's debt floors
        // at zero and B's raw 25 is still owed to A.
        let fixture = Fixture::new()
            .expense(B, &[(A, 40), (B, 10)])
            .expense(A, &[(A, 5), (B, 25)])
            .settle(A, B, 50);

        let ledger_a = compute_ledger(&fixture, A).unwrap();
        assert!(ledger_a.debts.is_empty());
        assert_eq!(entries(&ledger_a.credits), vec![(B, 25)]);
    }

    #[test]
    fn test_settlement_without_obligation_is_ignored() {
        let fixture = Fixture::new().settle(A, B, 10);
        assert!(counterparty_nets(&fixture, A).unwrap().is_empty());
        assert!(counterparty_nets(&fixture, B).unwrap().is_empty());
    }

    #[test]
    fn test_self_share_is_not_an_obligation() {
        let fixture = Fixture::new().expense(A, &[(A, 100)]);
        assert!(counterparty_nets(&fixture, A).unwrap().is_empty());
    }

    #[test]
    fn test_entries_sorted_descending_with_id_tiebreak() {
        let fixture = Fixture::new()
            .expense(A, &[(B, 10), (C, 10)])
            .expense(A, &[(4, 50)]);

        let ledger = compute_ledger(&fixture, A).unwrap();
        assert_eq!(entries(&ledger.credits), vec![(4, 50), (B, 10), (C, 10)]);
    }

    #[test]
    fn test_balance_matches_ledger() {
        let fixture = scenario().settle(C, A, 5);
        for user in [A, B, C] {
            let ledger = compute_ledger(&fixture, user).unwrap();
            let debts: Cents = ledger.debts.iter().map(|e| e.amount_cents).sum();
            let credits: Cents = ledger.credits.iter().map(|e| e.amount_cents).sum();
            assert_eq!(
                compute_balance(&fixture, user).unwrap().balance_cents,
                debts - credits
            );
        }
    }

    #[test]
    fn test_net_with() {
        let fixture = scenario();
        assert_eq!(net_with(&fixture, B, A).unwrap(), -33);
        assert_eq!(net_with(&fixture, B, C).unwrap(), 30);
        assert_eq!(net_with(&fixture, A, A).unwrap(), 0);
    }

    #[test]
    fn test_overflow_is_reported() {
        let fixture = Fixture::new()
            .expense(A, &[(B, Cents::MAX)])
            .expense(A, &[(B, 1)]);
        assert!(matches!(
            compute_ledger(&fixture, A),
            Err(LedgerError::ArithmeticOverflow { .. })
        ));
    }
}
