//! Entity CRUD integration tests
//!
//! Runs the engine against the in-memory store:
//! - create/load round trips, small and multi-chunk arrays
//! - optimistic concurrency on save
//! - corruption detection on load
//! - transport retries through RetryingStore

#[path = "../common/mod.rs"]
mod common;

mod chunking;
mod corruption;
mod crud;
mod retry;
