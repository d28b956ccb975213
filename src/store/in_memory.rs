//! InMemoryMemberStore - BTreeMap-backed member store for tests and local runs.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::trace;

use super::{DeleteOutcome, MemberStore, StoreError, WriteOutcome};
use crate::member::{Condition, Member, MemberFields, MemberId, Mutation};

#[derive(Default)]
struct Table {
    rows: BTreeMap<MemberId, Member>,
    last_id: MemberId,
}

/// In-memory member store.
///
/// Conditional writes hold the write lock across check-and-apply, so they
/// are atomic with respect to every other call. Clone-friendly via Arc;
/// clones share the same table.
#[derive(Clone, Default)]
pub struct InMemoryMemberStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryMemberStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored members.
    pub fn len(&self) -> Result<usize, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::Poisoned("len"))?;
        Ok(table.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl MemberStore for InMemoryMemberStore {
    fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::Poisoned("find_by_id"))?;
        Ok(table.rows.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Member>, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::Poisoned("list"))?;
        Ok(table.rows.values().cloned().collect())
    }

    fn insert(&self, fields: MemberFields, at: DateTime<Utc>) -> Result<Member, StoreError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Poisoned("insert"))?;

        table.last_id += 1;
        let member = Member::new(table.last_id, fields, at);
        table.rows.insert(member.id, member.clone());
        Ok(member)
    }

    fn update_fields(
        &self,
        id: MemberId,
        condition: Condition,
        mutation: &Mutation,
    ) -> Result<WriteOutcome, StoreError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Poisoned("update_fields"))?;

        let Some(member) = table.rows.get_mut(&id) else {
            return Ok(WriteOutcome::NotFound);
        };
        if !condition.holds(member) {
            trace!(member_id = id, mutation = mutation.name(), "write condition failed");
            return Ok(WriteOutcome::ConditionFailed(member.clone()));
        }

        member.apply(mutation);
        Ok(WriteOutcome::Applied(member.clone()))
    }

    fn delete_by_id(
        &self,
        id: MemberId,
        condition: Condition,
    ) -> Result<DeleteOutcome, StoreError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Poisoned("delete_by_id"))?;

        let Some(member) = table.rows.get(&id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !condition.holds(member) {
            return Ok(DeleteOutcome::ConditionFailed(member.clone()));
        }

        Ok(table
            .rows
            .remove(&id)
            .map_or(DeleteOutcome::NotFound, DeleteOutcome::Deleted))
    }
}
