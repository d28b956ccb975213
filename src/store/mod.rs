//! MemberStore - Abstract record storage for members.
//!
//! The store owns the records. It does not decide *whether* a write is
//! allowed; it evaluates a [`Condition`] and applies a [`Mutation`] in one
//! atomic step, reporting which way it went. That is the "conditional update,
//! check the affected-row count" contract the concurrency guard builds on.
//!
//! Backends other than [`InMemoryMemberStore`] must give `update_fields` and
//! `delete_by_id` the same atomicity, e.g. a single
//! `UPDATE ... WHERE id = $1 AND is_locked = $2 AND version = $3
//! AND locked_at = $4 RETURNING *`, with each predicate present only when the
//! condition sets it.

mod error;
mod in_memory;

use chrono::{DateTime, Utc};

use crate::member::{Condition, Member, MemberFields, MemberId, Mutation};

pub use error::StoreError;
pub use in_memory::InMemoryMemberStore;

/// Result of a conditional field write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The condition held and the mutation was applied. Carries the new state.
    Applied(Member),
    /// The condition did not hold. Carries the unchanged record.
    ConditionFailed(Member),
    /// No record with that id.
    NotFound,
}

/// Result of a conditional delete.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The record was removed. Carries its last state.
    Deleted(Member),
    /// The condition did not hold; the record is still there.
    ConditionFailed(Member),
    /// No record with that id.
    NotFound,
}

/// Abstract record storage for members.
pub trait MemberStore: Send + Sync {
    /// Get a member by id. Returns None if not found.
    fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, StoreError>;

    /// Every stored member, in id order.
    fn list(&self) -> Result<Vec<Member>, StoreError>;

    /// Insert a new member at version 1, unlocked, with a fresh id.
    fn insert(&self, fields: MemberFields, at: DateTime<Utc>) -> Result<Member, StoreError>;

    /// Apply `mutation` if `condition` holds, atomically.
    fn update_fields(
        &self,
        id: MemberId,
        condition: Condition,
        mutation: &Mutation,
    ) -> Result<WriteOutcome, StoreError>;

    /// Remove the member if `condition` holds, atomically.
    fn delete_by_id(&self, id: MemberId, condition: Condition)
        -> Result<DeleteOutcome, StoreError>;

    /// Members matching a predicate, in id order.
    fn find(&self, predicate: &dyn Fn(&Member) -> bool) -> Result<Vec<Member>, StoreError> {
        Ok(self.list()?.into_iter().filter(|m| predicate(m)).collect())
    }
}

impl<S: MemberStore + ?Sized> MemberStore for std::sync::Arc<S> {
    fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        (**self).find_by_id(id)
    }

    fn list(&self) -> Result<Vec<Member>, StoreError> {
        (**self).list()
    }

    fn insert(&self, fields: MemberFields, at: DateTime<Utc>) -> Result<Member, StoreError> {
        (**self).insert(fields, at)
    }

    fn update_fields(
        &self,
        id: MemberId,
        condition: Condition,
        mutation: &Mutation,
    ) -> Result<WriteOutcome, StoreError> {
        (**self).update_fields(id, condition, mutation)
    }

    fn delete_by_id(
        &self,
        id: MemberId,
        condition: Condition,
    ) -> Result<DeleteOutcome, StoreError> {
        (**self).delete_by_id(id, condition)
    }

    fn find(&self, predicate: &dyn Fn(&Member) -> bool) -> Result<Vec<Member>, StoreError> {
        (**self).find(predicate)
    }
}
