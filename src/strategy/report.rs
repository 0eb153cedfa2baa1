//! Report selection and assembly shared by both strategies

use crate::cli::ReportView;
use crate::io::csv_format::{write_balance_csv, write_ledger_csv};
use crate::types::{LedgerError, MemberBalance, MemberLedger, TripId, UserId};
use std::io::Write;
use tracing::warn;

/// What to report once the journal has been applied
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportRequest {
    pub view: ReportView,
    /// Only this trip, when set
    pub trip: Option<TripId>,
    /// Only this member, when set
    pub user: Option<UserId>,
}

impl ReportRequest {
    pub fn new(view: ReportView) -> Self {
        Self {
            view,
            ..Default::default()
        }
    }

    pub fn with_trip(mut self, trip: Option<TripId>) -> Self {
        self.trip = trip;
        self
    }

    pub fn with_user(mut self, user: Option<UserId>) -> Self {
        self.user = user;
        self
    }

    /// Trips to report, ascending; an unknown requested trip is skipped
    pub fn select_trips(&self, mut all: Vec<TripId>) -> Vec<TripId> {
        all.sort_unstable();
        match self.trip {
            Some(trip) if all.contains(&trip) => vec![trip],
            Some(trip) => {
                warn!(trip, "requested trip does not exist, nothing to report");
                Vec::new()
            }
            None => all,
        }
    }

    /// Members of `trip` to report, ascending; a requested non-member is
    /// skipped
    pub fn select_members(&self, trip: TripId, members: &[UserId]) -> Vec<UserId> {
        match self.user {
            Some(user) if members.contains(&user) => vec![user],
            Some(user) => {
                warn!(trip, user, "requested user is not a member of the trip, skipping");
                Vec::new()
            }
            None => {
                let mut members = members.to_vec();
                members.sort_unstable();
                members
            }
        }
    }
}

/// Collected report rows, ready to be written
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Report {
    Ledger(Vec<MemberLedger>),
    Balance(Vec<MemberBalance>),
}

impl Report {
    pub fn empty(view: ReportView) -> Self {
        match view {
            ReportView::Ledger => Report::Ledger(Vec::new()),
            ReportView::Balance => Report::Balance(Vec::new()),
        }
    }

    pub fn write(&self, output: &mut dyn Write) -> Result<(), LedgerError> {
        match self {
            Report::Ledger(rows) => write_ledger_csv(rows, output),
            Report::Balance(rows) => write_balance_csv(rows, output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::all(None, vec![3, 1, 2], vec![1, 2, 3])]
    #[case::one(Some(2), vec![3, 1, 2], vec![2])]
    #[case::unknown(Some(9), vec![3, 1, 2], vec![])]
    fn test_select_trips(
        #[case] trip: Option<TripId>,
        #[case] all: Vec<TripId>,
        #[case] expected: Vec<TripId>,
    ) {
        let request = ReportRequest::new(ReportView::Ledger).with_trip(trip);
        assert_eq!(request.select_trips(all), expected);
    }

    #[rstest]
    #[case::all(None, &[4, 2], vec![2, 4])]
    #[case::member(Some(4), &[4, 2], vec![4])]
    #[case::non_member(Some(5), &[4, 2], vec![])]
    fn test_select_members(
        #[case] user: Option<UserId>,
        #[case] members: &[UserId],
        #[case] expected: Vec<UserId>,
    ) {
        let request = ReportRequest::new(ReportView::Balance).with_user(user);
        assert_eq!(request.select_members(1, members), expected);
    }

    #[test]
    fn test_empty_report_writes_header_only() {
        let mut output = Vec::new();
        Report::empty(ReportView::Balance).write(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "trip,user,balance,currency\n");
    }
}
