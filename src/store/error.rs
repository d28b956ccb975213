/// Error type for member store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// An in-process lock around the storage was poisoned.
    #[error("member store lock poisoned during {0}")]
    Poisoned(&'static str),
    /// The backing store failed (I/O, connection, constraint, ...).
    #[error("member store backend error: {0}")]
    Backend(String),
}
