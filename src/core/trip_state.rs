//! Per-trip state and the write-side rules that protect it
//!
//! `TripState` holds everything one trip owns: its members, its expenses
//! (each with its shares) and its settlements. Every mutation validates
//! fully before touching the vectors, so a rejected command leaves no
//! partial rows behind.
//!
//! Both the single-threaded `TripStore` and the concurrent
//! `AsyncTripStore` keep one `TripState` per trip; the async store wraps it
//! in a per-trip lock so check-then-insert sequences are serialized.

use crate::core::allocator::allocate;
use crate::core::ledger_engine::{compute_balance, compute_ledger};
use crate::core::settlement_validator::validate_settlement;
use crate::core::traits::{Membership, TripRecords};
use crate::types::{
    Balance, CurrencyCode, Expense, ExpenseId, ExpenseShare, JoinOutcome, Ledger, LedgerError,
    Member, NewExpense, NewSettlement, Role, Settlement, SettlementId, Trip, TripAction, TripId,
    UserId,
};
use std::collections::BTreeMap;

/// Everything one trip owns
#[derive(Debug, Clone)]
pub struct TripState {
    trip: Trip,
    members: BTreeMap<UserId, Role>,
    expenses: Vec<Expense>,
    settlements: Vec<Settlement>,
}

impl TripState {
    /// Create a trip with `owner` as its only member
    ///
    /// The name is stored as given; use [`TripState::create`] to validate it.
    pub fn new(id: TripId, owner: UserId, name: &str, currency: CurrencyCode) -> Self {
        let mut members = BTreeMap::new();
        members.insert(owner, Role::Owner);

        TripState {
            trip: Trip {
                id,
                owner_id: owner,
                name: name.to_string(),
                currency,
            },
            members,
            expenses: Vec::new(),
            settlements: Vec::new(),
        }
    }

    /// Create a trip after trimming and validating its name
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the trimmed name is empty.
    pub fn create(
        id: TripId,
        owner: UserId,
        name: &str,
        currency: CurrencyCode,
    ) -> Result<Self, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::missing_field("Trip name"));
        }
        Ok(TripState::new(id, owner, name, currency))
    }

    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    pub fn id(&self) -> TripId {
        self.trip.id
    }

    pub fn role(&self, user: UserId) -> Option<Role> {
        self.members.get(&user).copied()
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.trip.owner_id == user
    }

    /// Member ids in ascending order
    pub fn member_ids(&self) -> Vec<UserId> {
        self.members.keys().copied().collect()
    }

    /// Fail with `NoAccess` unless `user` belongs to the trip
    ///
    /// # Errors
    ///
    /// Returns `NoAccess` for non-members.
    pub fn ensure_member(&self, user: UserId) -> Result<(), LedgerError> {
        if self.members.contains_key(&user) {
            Ok(())
        } else {
            Err(LedgerError::no_access(self.trip.id, user))
        }
    }

    /// Add `user` as a member; joining twice is not an error
    pub fn join(&mut self, user: UserId) -> JoinOutcome {
        if self.members.contains_key(&user) {
            return JoinOutcome::AlreadyMember;
        }
        self.members.insert(user, Role::Member);
        JoinOutcome::Joined
    }

    /// Members visible to `requester`: the requester first, then by id
    ///
    /// # Errors
    ///
    /// Returns `NoAccess` if `requester` is not a member.
    pub fn members_for(&self, requester: UserId) -> Result<Vec<Member>, LedgerError> {
        self.ensure_member(requester)?;

        let mut members: Vec<Member> = self
            .members
            .iter()
            .map(|(&user_id, &role)| Member {
                trip_id: self.trip.id,
                user_id,
                role,
            })
            .collect();
        members.sort_by_key(|member| (member.user_id != requester, member.user_id));
        Ok(members)
    }

    fn resolve_currency(&self, requested: Option<CurrencyCode>) -> Result<CurrencyCode, LedgerError> {
        match requested {
            Some(code) if code != self.trip.currency => {
                Err(LedgerError::currency_mismatch(self.trip.currency, code))
            }
            _ => Ok(self.trip.currency),
        }
    }

    /// Record an expense paid by `payer`, allocating its shares
    ///
    /// The expense and all its shares become visible together or not at all.
    ///
    /// # Errors
    ///
    /// - `NoAccess` if `payer` is not a member
    /// - `MissingField` for a blank description
    /// - `CurrencyMismatch` if the currency differs from the trip's
    /// - `DuplicateExpense` if the id is taken
    /// - any allocation error (amount, participants, manual sum)
    pub fn add_expense(&mut self, payer: UserId, request: NewExpense) -> Result<Expense, LedgerError> {
        self.ensure_member(payer)?;

        let description = request.description.trim();
        if description.is_empty() {
            return Err(LedgerError::missing_field("Description"));
        }

        let currency = self.resolve_currency(request.currency)?;

        if self.expenses.iter().any(|e| e.id == request.id) {
            return Err(LedgerError::DuplicateExpense {
                trip: self.trip.id,
                id: request.id,
            });
        }

        let shares = allocate(request.amount_cents, &request.split, &self.members)?;

        let expense = Expense {
            id: request.id,
            trip_id: self.trip.id,
            paid_by: payer,
            amount_cents: request.amount_cents,
            currency,
            split_mode: request.split.mode(),
            description: description.to_string(),
            shares: shares
                .into_iter()
                .map(|share| ExpenseShare {
                    expense_id: request.id,
                    user_id: share.user_id,
                    share_cents: share.share_cents,
                })
                .collect(),
        };

        self.expenses.push(expense.clone());
        Ok(expense)
    }

    /// Record a payment from `payer` to `request.to`
    ///
    /// # Errors
    ///
    /// - `NoAccess` if `payer` is not a member
    /// - `CurrencyMismatch` if the currency differs from the trip's
    /// - `DuplicateSettlement` if the id is taken
    /// - any settlement validation error (self, no debt, over-payment)
    pub fn record_settlement(
        &mut self,
        payer: UserId,
        request: NewSettlement,
    ) -> Result<Settlement, LedgerError> {
        self.ensure_member(payer)?;

        let currency = self.resolve_currency(request.currency)?;

        if self.settlements.iter().any(|s| s.id == request.id) {
            return Err(LedgerError::DuplicateSettlement {
                trip: self.trip.id,
                id: request.id,
            });
        }

        validate_settlement(self, self.trip.id, payer, request.to, request.amount_cents)?;

        let settlement = Settlement {
            id: request.id,
            trip_id: self.trip.id,
            from: payer,
            to: request.to,
            amount_cents: request.amount_cents,
            currency,
        };

        self.settlements.push(settlement.clone());
        Ok(settlement)
    }

    /// Look up one expense with its shares
    ///
    /// # Errors
    ///
    /// Returns `NoAccess` for non-members and `ExpenseNotFound` for unknown ids.
    pub fn expense(&self, requester: UserId, id: ExpenseId) -> Result<&Expense, LedgerError> {
        self.ensure_member(requester)?;
        self.expenses
            .iter()
            .find(|e| e.id == id)
            .ok_or(LedgerError::ExpenseNotFound {
                trip: self.trip.id,
                id,
            })
    }

    /// Look up one settlement
    ///
    /// # Errors
    ///
    /// Returns `NoAccess` for non-members and `SettlementNotFound` for unknown ids.
    pub fn settlement(&self, requester: UserId, id: SettlementId) -> Result<&Settlement, LedgerError> {
        self.ensure_member(requester)?;
        self.settlements
            .iter()
            .find(|s| s.id == id)
            .ok_or(LedgerError::SettlementNotFound {
                trip: self.trip.id,
                id,
            })
    }

    /// Trip details, visible to members only
    pub fn trip_for(&self, requester: UserId) -> Result<&Trip, LedgerError> {
        self.ensure_member(requester)?;
        Ok(&self.trip)
    }

    /// Remove an expense and its shares
    ///
    /// Allowed for the payer and for the trip owner.
    ///
    /// # Errors
    ///
    /// Returns `NoAccess`, `ExpenseNotFound` or `NotRecordOwner`.
    pub fn delete_expense(&mut self, actor: UserId, id: ExpenseId) -> Result<Expense, LedgerError> {
        self.ensure_member(actor)?;

        let index = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or(LedgerError::ExpenseNotFound {
                trip: self.trip.id,
                id,
            })?;

        if self.expenses[index].paid_by != actor && !self.is_owner(actor) {
            return Err(LedgerError::not_record_owner("expense", id));
        }

        Ok(self.expenses.remove(index))
    }

    /// Remove a settlement; the debt it paid down is owed again
    ///
    /// Allowed for the paying member and for the trip owner.
    ///
    /// # Errors
    ///
    /// Returns `NoAccess`, `SettlementNotFound` or `NotRecordOwner`.
    pub fn delete_settlement(
        &mut self,
        actor: UserId,
        id: SettlementId,
    ) -> Result<Settlement, LedgerError> {
        self.ensure_member(actor)?;

        let index = self
            .settlements
            .iter()
            .position(|s| s.id == id)
            .ok_or(LedgerError::SettlementNotFound {
                trip: self.trip.id,
                id,
            })?;

        if self.settlements[index].from != actor && !self.is_owner(actor) {
            return Err(LedgerError::not_record_owner("settlement", id));
        }

        Ok(self.settlements.remove(index))
    }

    /// Check that `actor` may delete the whole trip
    ///
    /// # Errors
    ///
    /// Returns `NoAccess` for non-members and `OwnerOnly` for other members.
    pub fn authorize_delete(&self, actor: UserId) -> Result<(), LedgerError> {
        self.ensure_member(actor)?;
        if !self.is_owner(actor) {
            return Err(LedgerError::owner_only(self.trip.id, "delete the trip"));
        }
        Ok(())
    }

    /// Apply one journal action issued by `actor` to this trip
    ///
    /// `CreateTrip` on an existing trip fails with `TripAlreadyExists`.
    /// `DeleteTrip` only authorizes here; the store drops the state.
    pub fn apply(&mut self, actor: UserId, action: TripAction) -> Result<(), LedgerError> {
        match action {
            TripAction::CreateTrip { .. } => Err(LedgerError::TripAlreadyExists {
                trip: self.trip.id,
            }),
            TripAction::Join => {
                self.join(actor);
                Ok(())
            }
            TripAction::AddExpense(request) => self.add_expense(actor, request).map(|_| ()),
            TripAction::RecordSettlement(request) => {
                self.record_settlement(actor, request).map(|_| ())
            }
            TripAction::DeleteExpense { id } => self.delete_expense(actor, id).map(|_| ()),
            TripAction::DeleteSettlement { id } => self.delete_settlement(actor, id).map(|_| ()),
            TripAction::DeleteTrip => self.authorize_delete(actor),
        }
    }

    /// Ledger view for a member
    ///
    /// # Errors
    ///
    /// Returns `NoAccess` for non-members, or an overflow error.
    pub fn ledger(&self, user: UserId) -> Result<Ledger, LedgerError> {
        self.ensure_member(user)?;
        compute_ledger(self, user)
    }

    /// Balance view for a member
    ///
    /// # Errors
    ///
    /// Returns `NoAccess` for non-members, or an overflow error.
    pub fn balance(&self, user: UserId) -> Result<Balance, LedgerError> {
        self.ensure_member(user)?;
        compute_balance(self, user)
    }
}

impl Membership for TripState {
    fn is_member(&self, user: UserId) -> bool {
        self.members.contains_key(&user)
    }
}

impl TripRecords for TripState {
    fn currency(&self) -> CurrencyCode {
        self.trip.currency
    }

    fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }
}
