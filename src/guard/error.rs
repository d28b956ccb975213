use crate::member::MemberId;
use crate::store::StoreError;

/// Why a guarded write was refused or failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// No member with this id.
    #[error("member {0} not found")]
    NotFound(MemberId),

    /// Another write holds the record lock. Retry later.
    #[error("member {id} is locked by another edit in progress")]
    Locked { id: MemberId },

    /// The caller edited an outdated snapshot. Re-fetch and re-apply.
    #[error("member {id} has changed (submitted version {submitted}, current version {current})")]
    StaleVersion {
        id: MemberId,
        submitted: u64,
        current: u64,
    },

    /// The record store failed. The lock, if taken, was released first.
    #[error("member store failure: {0}")]
    Store(#[from] StoreError),
}

impl GuardError {
    /// True for the two conflict kinds.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            GuardError::Locked { .. } | GuardError::StaleVersion { .. }
        )
    }

    /// Server-side version, present only on a stale-version conflict.
    pub fn current_version(&self) -> Option<u64> {
        match self {
            GuardError::StaleVersion { current, .. } => Some(*current),
            _ => None,
        }
    }
}
