//! CSV format handling for the trip journal and report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - JournalRecord structure for deserialization
//! - Conversion from journal rows to `TripCommand`s
//! - Ledger and balance report serialization
//!
//! All functions are pure (no file access) for easy testing.

use crate::types::{
    parse_cents, CurrencyCode, LedgerError, MemberBalance, MemberLedger, Money,
    NewExpense, NewSettlement, ShareInput, SplitRequest, TripAction, TripCommand, TripId, UserId,
};
use serde::Deserialize;
use std::io::Write;

/// One journal row
///
/// Columns: op, trip, actor, id, amount, currency, split, parties,
/// description. Which optional columns are required depends on `op`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct JournalRecord {
    pub op: String,
    pub trip: TripId,
    pub actor: UserId,
    pub id: Option<u32>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub split: Option<String>,
    pub parties: Option<String>,
    pub description: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, LedgerError> {
    value.ok_or_else(|| LedgerError::missing_field(field))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_user_id(value: &str) -> Result<UserId, LedgerError> {
    value
        .trim()
        .parse::<UserId>()
        .map_err(|_| LedgerError::parse_error(None, format!("Invalid user id '{}'", value.trim())))
}

/// Parse `1;2;3` into participant ids; empty segments are ignored
fn parse_participants(parties: &str) -> Result<Vec<UserId>, LedgerError> {
    parties
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .map(parse_user_id)
        .collect()
}

/// Parse `1:40.00;2:60.00` into manual shares
fn parse_manual_shares(parties: &str) -> Result<Vec<ShareInput>, LedgerError> {
    parties
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (user, amount) = part.split_once(':').ok_or_else(|| {
                LedgerError::parse_error(
                    None,
                    format!("Manual share '{}' must be written as user:amount", part.trim()),
                )
            })?;
            Ok(ShareInput::new(parse_user_id(user)?, parse_cents(amount)?))
        })
        .collect()
}

fn parse_split(split: Option<String>, parties: Option<String>) -> Result<SplitRequest, LedgerError> {
    let mode = required(non_blank(split), "split")?;
    let parties = non_blank(parties).unwrap_or_default();

    match mode.trim().to_lowercase().as_str() {
        "equal" => Ok(SplitRequest::Equal {
            participant_ids: parse_participants(&parties)?,
        }),
        "manual" => Ok(SplitRequest::Manual {
            shares: parse_manual_shares(&parties)?,
        }),
        other => Err(LedgerError::parse_error(
            None,
            format!("Invalid split mode '{}': expected equal or manual", other),
        )),
    }
}

fn parse_optional_currency(currency: Option<String>) -> Result<Option<CurrencyCode>, LedgerError> {
    non_blank(currency)
        .map(|code| CurrencyCode::parse(&code))
        .transpose()
}

/// Convert a journal row into a command
///
/// Only the shape of the row is checked here: required columns, number
/// formats, currency codes and split syntax. Business rules (membership,
/// share sums, outstanding debt) are left to the engine.
pub fn convert_journal_record(record: JournalRecord) -> Result<TripCommand, LedgerError> {
    let JournalRecord {
        op,
        trip,
        actor,
        id,
        amount,
        currency,
        split,
        parties,
        description,
    } = record;

    let action = match op.trim().to_lowercase().as_str() {
        "create_trip" => TripAction::CreateTrip {
            name: description.unwrap_or_default(),
            currency: CurrencyCode::parse(&required(non_blank(currency), "currency")?)?,
        },
        "join" => TripAction::Join,
        "expense" => TripAction::AddExpense(NewExpense {
            id: required(id, "id")?,
            amount_cents: parse_cents(&required(non_blank(amount), "amount")?)?,
            currency: parse_optional_currency(currency)?,
            description: description.unwrap_or_default(),
            split: parse_split(split, parties)?,
        }),
        "settle" => TripAction::RecordSettlement(NewSettlement {
            id: required(id, "id")?,
            to: parse_user_id(&required(non_blank(parties), "parties")?)?,
            amount_cents: parse_cents(&required(non_blank(amount), "amount")?)?,
            currency: parse_optional_currency(currency)?,
        }),
        "delete_expense" => TripAction::DeleteExpense {
            id: required(id, "id")?,
        },
        "delete_settlement" => TripAction::DeleteSettlement {
            id: required(id, "id")?,
        },
        "delete_trip" => TripAction::DeleteTrip,
        _ => {
            return Err(LedgerError::parse_error(
                None,
                format!("Invalid op '{}' for trip {}", op, trip),
            ))
        }
    };

    Ok(TripCommand::new(trip, actor, action))
}

/// Write ledger reports as CSV
///
/// Columns: trip, user, counterparty, direction, amount, currency. Each
/// member's debts (`owes`) come before their credits (`owed`), each list in
/// ledger order. Members are written ordered by trip, then user.
pub fn write_ledger_csv(reports: &[MemberLedger], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record([
        "trip",
        "user",
        "counterparty",
        "direction",
        "amount",
        "currency",
    ])?;

    let mut sorted: Vec<&MemberLedger> = reports.iter().collect();
    sorted.sort_by_key(|report| (report.trip, report.user));

    for report in sorted {
        let currency = report.ledger.currency;
        let rows = report
            .ledger
            .debts
            .iter()
            .map(|entry| (entry, "owes"))
            .chain(report.ledger.credits.iter().map(|entry| (entry, "owed")));

        for (entry, direction) in rows {
            let amount = Money::new(entry.amount_cents, currency);
            writer.write_record(&[
                report.trip.to_string(),
                report.user.to_string(),
                entry.user_id.to_string(),
                direction.to_string(),
                amount.major_units(),
                amount.currency.to_string(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write balance reports as CSV
///
/// Columns: trip, user, balance, currency. Positive means the member owes
/// more than they are owed.
pub fn write_balance_csv(reports: &[MemberBalance], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["trip", "user", "balance", "currency"])?;

    let mut sorted = reports.to_vec();
    sorted.sort_by_key(|report| (report.trip, report.user));

    for report in sorted {
        let balance = report.balance.money();
        writer.write_record(&[
            report.trip.to_string(),
            report.user.to_string(),
            balance.major_units(),
            balance.currency.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
