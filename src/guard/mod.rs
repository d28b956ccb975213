//! ConcurrencyGuard - optimistic versioning plus a record-level write lock.
//!
//! Every member carries a `version` and an `is_locked` flag. A guarded update
//! goes through three store writes, each of them conditional:
//!
//! 1. **acquire**: `is_locked := true, locked_at := now` where unlocked and at
//!    the submitted version
//! 2. **commit**: new payload, `version + 1`, `is_locked := false` where still
//!    locked since our acquire and at the submitted version
//! 3. **release** (failure paths only): `is_locked := false` where still
//!    locked since our acquire, nothing else
//!
//! Between 1 and 2 the lock is owned by a [`Lease`]. Dropping a lease that
//! was not committed releases the lock, so errors, early returns and panics
//! all leave the record unlocked. A lease only ever writes through its own
//! lock: once [`ConcurrencyGuard::force_unlock`] has cleared it and another
//! writer has taken a new one, the old lease can neither commit nor release.
//!
//! ```text
//! Unlocked(v) --update(v)-------> Locked(v)     acquire
//! Locked(v)   --commit----------> Unlocked(v+1)
//! Locked(v)   --abort-----------> Unlocked(v)
//! Unlocked(v) --update(v' != v)-> Unlocked(v)   StaleVersion
//! Locked(v)   --update(any)-----> Locked(v)     Locked
//! ```
//!
//! There is no lock expiry. A process that dies between acquire and release
//! leaves the flag set; [`ConcurrencyGuard::force_unlock`] is the way out.

mod error;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::member::{Condition, Member, MemberFields, MemberId, Mutation};
use crate::store::{DeleteOutcome, MemberStore, WriteOutcome};

pub use error::GuardError;

/// Mediates every write to a member's version and lock fields.
#[derive(Debug, Clone)]
pub struct ConcurrencyGuard<S> {
    store: S,
}

impl<S: MemberStore> ConcurrencyGuard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace a member's payload if `submitted_version` is still current and
    /// no other write is in flight.
    pub fn guarded_update(
        &self,
        id: MemberId,
        submitted_version: u64,
        fields: MemberFields,
        modified_by: Option<String>,
    ) -> Result<Member, GuardError> {
        let current = self
            .store
            .find_by_id(id)?
            .ok_or(GuardError::NotFound(id))?;
        if current.is_locked {
            debug!(member_id = id, "update refused, member is locked");
            return Err(GuardError::Locked { id });
        }
        if current.version != submitted_version {
            debug!(
                member_id = id,
                submitted = submitted_version,
                current = current.version,
                "update refused, stale version"
            );
            return Err(GuardError::StaleVersion {
                id,
                submitted: submitted_version,
                current: current.version,
            });
        }

        let lease = Lease::acquire(&self.store, id, submitted_version, Utc::now())?;

        // Re-read under the lock in case another writer committed between
        // the first read and the acquire.
        let locked = self
            .store
            .find_by_id(id)?
            .ok_or(GuardError::NotFound(id))?;
        if locked.version != submitted_version {
            return Err(GuardError::StaleVersion {
                id,
                submitted: submitted_version,
                current: locked.version,
            });
        }

        let updated = lease.commit(fields, modified_by)?;
        info!(
            member_id = id,
            version = updated.version,
            modified_by = updated.last_modified_by.as_deref().unwrap_or("-"),
            "member updated"
        );
        Ok(updated)
    }

    /// Delete a member unless a write is in flight.
    ///
    /// Only the lock is checked; the caller's version is not.
    pub fn guarded_delete(&self, id: MemberId) -> Result<Member, GuardError> {
        let current = self
            .store
            .find_by_id(id)?
            .ok_or(GuardError::NotFound(id))?;
        if current.is_locked {
            debug!(member_id = id, "delete refused, member is locked");
            return Err(GuardError::Locked { id });
        }

        match self.store.delete_by_id(id, Condition::unlocked())? {
            DeleteOutcome::Deleted(member) => {
                info!(member_id = id, version = member.version, "member deleted");
                Ok(member)
            }
            DeleteOutcome::ConditionFailed(_) => {
                debug!(member_id = id, "delete refused, member was locked concurrently");
                Err(GuardError::Locked { id })
            }
            DeleteOutcome::NotFound => Err(GuardError::NotFound(id)),
        }
    }

    /// Clear a lock left behind by a writer that never released it.
    ///
    /// Version and payload are untouched. Unlocking an unlocked member is a
    /// no-op that returns it as is.
    pub fn force_unlock(&self, id: MemberId) -> Result<Member, GuardError> {
        let current = self
            .store
            .find_by_id(id)?
            .ok_or(GuardError::NotFound(id))?;
        if !current.is_locked {
            return Ok(current);
        }

        match self.store.update_fields(id, Condition::locked(), &Mutation::Release)? {
            WriteOutcome::Applied(member) => {
                warn!(
                    member_id = id,
                    version = member.version,
                    locked_at = ?current.locked_at,
                    "member lock forcibly released"
                );
                Ok(member)
            }
            WriteOutcome::ConditionFailed(member) => Ok(member),
            WriteOutcome::NotFound => Err(GuardError::NotFound(id)),
        }
    }
}

/// Ownership of an acquired record lock.
///
/// Committing consumes the lease. Any other way of dropping it releases the
/// lock, and a failing release is logged rather than returned so it never
/// replaces the error that caused the abort.
struct Lease<'a, S: MemberStore> {
    store: &'a S,
    id: MemberId,
    version: u64,
    since: DateTime<Utc>,
    held: bool,
}

impl<'a, S: MemberStore> Lease<'a, S> {
    fn acquire(
        store: &'a S,
        id: MemberId,
        version: u64,
        since: DateTime<Utc>,
    ) -> Result<Self, GuardError> {
        let acquire = Mutation::Acquire { at: since };
        match store.update_fields(id, Condition::unlocked_at(version), &acquire)? {
            WriteOutcome::Applied(_) => {
                debug!(member_id = id, version, "member lock acquired");
                Ok(Self {
                    store,
                    id,
                    version,
                    since,
                    held: true,
                })
            }
            WriteOutcome::ConditionFailed(actual) if actual.is_locked => {
                debug!(member_id = id, "lost the race for the member lock");
                Err(GuardError::Locked { id })
            }
            WriteOutcome::ConditionFailed(actual) => Err(GuardError::StaleVersion {
                id,
                submitted: version,
                current: actual.version,
            }),
            WriteOutcome::NotFound => Err(GuardError::NotFound(id)),
        }
    }

    fn commit(
        mut self,
        fields: MemberFields,
        modified_by: Option<String>,
    ) -> Result<Member, GuardError> {
        let commit = Mutation::Commit {
            fields,
            modified_by,
            at: Utc::now(),
        };
        let ours = Condition::held_since(self.since).at_version(self.version);
        match self.store.update_fields(self.id, ours, &commit)? {
            WriteOutcome::Applied(member) => {
                self.held = false;
                Ok(member)
            }
            WriteOutcome::ConditionFailed(actual) => {
                // Our lock was cleared by force_unlock; whatever holds the
                // record now is not ours to release.
                self.held = false;
                warn!(
                    member_id = self.id,
                    version = actual.version,
                    is_locked = actual.is_locked,
                    "member lock lost before commit"
                );
                if actual.version != self.version {
                    Err(GuardError::StaleVersion {
                        id: self.id,
                        submitted: self.version,
                        current: actual.version,
                    })
                } else {
                    Err(GuardError::Locked { id: self.id })
                }
            }
            WriteOutcome::NotFound => {
                self.held = false;
                Err(GuardError::NotFound(self.id))
            }
        }
    }
}

impl<S: MemberStore> Drop for Lease<'_, S> {
    fn drop(&mut self) {
        if !self.held {
            return;
        }
        match self.store.update_fields(
            self.id,
            Condition::held_since(self.since),
            &Mutation::Release,
        ) {
            Ok(WriteOutcome::Applied(_)) => {
                debug!(member_id = self.id, version = self.version, "member lock released")
            }
            Ok(WriteOutcome::ConditionFailed(_)) | Ok(WriteOutcome::NotFound) => {
                warn!(member_id = self.id, "member lock no longer ours at release")
            }
            Err(err) => error!(
                member_id = self.id,
                error = %err,
                "failed to release member lock"
            ),
        }
    }
}
