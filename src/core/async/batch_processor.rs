//! Batch processing with trip-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which splits a batch of
//! journal commands by trip and runs each trip's commands on its own tokio
//! task.
//!
//! # Ordering
//!
//! Trips share no rows, so commands for different trips can run in any
//! order relative to each other. Commands for one trip run sequentially in
//! journal order, which keeps every settlement check seeing the expenses
//! and settlements recorded before it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use super::AsyncTripEngine;
use crate::types::{LedgerError, TripCommand, TripId};

/// Outcome of one command
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub command: TripCommand,
    pub result: Result<(), LedgerError>,
}

/// Batch processor with trip-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: Arc<AsyncTripEngine>,
}

impl BatchProcessor {
    pub fn new(engine: Arc<AsyncTripEngine>) -> Self {
        Self { engine }
    }

    /// Split a batch into per-trip sub-batches, keeping journal order
    /// within each trip
    pub fn partition_by_trip(&self, batch: Vec<TripCommand>) -> HashMap<TripId, Vec<TripCommand>> {
        let mut trip_batches: HashMap<TripId, Vec<TripCommand>> = HashMap::new();

        for command in batch {
            trip_batches.entry(command.trip).or_default().push(command);
        }

        trip_batches
    }

    /// Apply one trip's commands in order
    ///
    /// A rejected command does not stop the ones after it.
    pub async fn process_trip_commands(&self, commands: Vec<TripCommand>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(commands.len());

        for command in commands {
            let result = self.engine.apply(command.clone()).await;
            results.push(ProcessingResult { command, result });
        }

        results
    }

    /// Process a batch: one task per trip, then wait for all of them
    ///
    /// Results of different trips may interleave in any order.
    pub async fn process_batch(&self, batch: Vec<TripCommand>) -> Vec<ProcessingResult> {
        let trip_batches = self.partition_by_trip(batch);

        let mut tasks = Vec::with_capacity(trip_batches.len());
        for (trip, commands) in trip_batches {
            let processor = self.clone();
            let task = tokio::spawn(async move { processor.process_trip_commands(commands).await });
            tasks.push((trip, task));
        }

        let mut results = Vec::new();
        for (trip, task) in tasks {
            match task.await {
                Ok(trip_results) => results.extend(trip_results),
                Err(e) => error!(trip, error = %e, "trip task failed"),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurrencyCode, NewExpense, NewSettlement, SplitRequest, TripAction};

    fn processor() -> (BatchProcessor, Arc<AsyncTripEngine>) {
        let engine = Arc::new(AsyncTripEngine::default());
        (BatchProcessor::new(Arc::clone(&engine)), engine)
    }

    fn create(trip: TripId, owner: u32) -> TripCommand {
        TripCommand::new(
            trip,
            owner,
            TripAction::CreateTrip {
                name: format!("Trip {}", trip),
                currency: CurrencyCode::parse("USD").unwrap(),
            },
        )
    }

    fn expense(trip: TripId, payer: u32, participants: Vec<u32>) -> TripCommand {
        TripCommand::new(
            trip,
            payer,
            TripAction::AddExpense(NewExpense {
                id: 1,
                amount_cents: 100,
                currency: None,
                description: "Groceries".to_string(),
                split: SplitRequest::Equal {
                    participant_ids: participants,
                },
            }),
        )
    }

    fn settle(trip: TripId, from: u32, to: u32, amount_cents: i64) -> TripCommand {
        TripCommand::new(
            trip,
            from,
            TripAction::RecordSettlement(NewSettlement {
                id: 1,
                to,
                amount_cents,
                currency: None,
            }),
        )
    }

    #[test]
    fn test_partition_by_trip_keeps_order() {
        let (processor, _) = processor();

        let batch = vec![
            create(1, 1),
            create(2, 5),
            TripCommand::new(1, 2, TripAction::Join),
            TripCommand::new(2, 6, TripAction::Join),
            TripCommand::new(1, 3, TripAction::Join),
        ];

        let partitioned = processor.partition_by_trip(batch);
        assert_eq!(partitioned.len(), 2);

        let actors: Vec<u32> = partitioned[&1].iter().map(|c| c.actor).collect();
        assert_eq!(actors, vec![1, 2, 3]);
        let actors: Vec<u32> = partitioned[&2].iter().map(|c| c.actor).collect();
        assert_eq!(actors, vec![5, 6]);
    }

    #[test]
    fn test_partition_empty_batch() {
        let (processor, _) = processor();
        assert!(processor.partition_by_trip(vec![]).is_empty());
    }

    #[tokio::test]
    async fn test_process_batch_applies_every_trip() {
        let (processor, engine) = processor();

        let batch = vec![
            create(1, 1),
            create(2, 1),
            TripCommand::new(1, 2, TripAction::Join),
            TripCommand::new(2, 3, TripAction::Join),
            expense(1, 1, vec![1, 2]),
            expense(2, 3, vec![1, 3]),
            settle(1, 2, 1, 50),
            // Trip 2: user 3 is owed, not owing
            settle(2, 3, 1, 10),
        ];

        let results = processor.process_batch(batch).await;
        assert_eq!(results.len(), 8);

        let rejected: Vec<&ProcessingResult> =
            results.iter().filter(|r| r.result.is_err()).collect();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].command.trip, 2);
        assert_eq!(
            rejected[0].result,
            Err(LedgerError::NoOutstandingDebt { from: 3, to: 1 })
        );

        assert!(engine.ledger(1, 2).await.unwrap().debts.is_empty());
        assert_eq!(engine.ledger(2, 1).await.unwrap().debt_to(3), 50);
    }

    #[tokio::test]
    async fn test_sequential_batches_preserve_trip_order() {
        let (processor, engine) = processor();

        processor
            .process_batch(vec![create(1, 1), TripCommand::new(1, 2, TripAction::Join)])
            .await;
        processor.process_batch(vec![expense(1, 1, vec![1, 2])]).await;
        let results = processor.process_batch(vec![settle(1, 2, 1, 50)]).await;

        assert!(results.iter().all(|r| r.result.is_ok()));
        assert_eq!(engine.balance(1, 1).await.unwrap().balance_cents, 0);
    }
}
