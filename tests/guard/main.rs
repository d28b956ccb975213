//! ConcurrencyGuard integration tests.
//!
//! - update: version checks, lock checks, the 1 → 2 → stale → 3 walk-through
//! - delete: lock-only delete semantics
//! - concurrency: racing writers on real threads
//! - failures: store faults inside the locked window never leak the lock

mod concurrency;
mod update;
