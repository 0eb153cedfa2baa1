//! Concurrent implementations of core components
//!
//! This module provides the thread-safe counterparts of `TripStore` and
//! `TripEngine`, used by the async processing strategy.
//!
//! - **AsyncTripStore**: one `tokio::sync::Mutex` per trip inside a `DashMap`
//! - **AsyncTripEngine**: the trip operations as async methods
//! - **BatchProcessor**: per-trip partitioning of journal batches
//!
//! # Thread Safety
//!
//! Operations on different trips proceed in parallel. Operations on the
//! same trip are serialized by the trip's lock; there is no global lock.

pub mod batch_processor;
pub mod engine;
pub mod trip_store;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::AsyncTripEngine;
pub use trip_store::AsyncTripStore;
