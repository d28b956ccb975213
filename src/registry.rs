//! MemberRegistry - the operations the request handler drives.
//!
//! Reads go straight to the store; every write that touches an existing
//! member goes through the [`ConcurrencyGuard`].

use chrono::Utc;
use tracing::info;

use crate::guard::{ConcurrencyGuard, GuardError};
use crate::member::{Member, MemberId, MemberInput, UpdateRequest, ValidationError};
use crate::search::{by_last_name, MemberQuery, QueryError, SearchParams};
use crate::store::{MemberStore, StoreError};

/// Error type for registry operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error("member {0} not found")]
    NotFound(MemberId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Member CRUD and search over a store.
pub struct MemberRegistry<S> {
    guard: ConcurrencyGuard<S>,
}

impl<S: MemberStore> MemberRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            guard: ConcurrencyGuard::new(store),
        }
    }

    pub fn store(&self) -> &S {
        self.guard.store()
    }

    pub fn guard(&self) -> &ConcurrencyGuard<S> {
        &self.guard
    }

    /// Validate and insert a new member at version 1.
    pub fn create(&self, input: &MemberInput) -> Result<Member, RegistryError> {
        let fields = input.validate()?;
        let member = self.store().insert(fields, Utc::now())?;
        info!(member_id = member.id, "member created");
        Ok(member)
    }

    pub fn get(&self, id: MemberId) -> Result<Member, RegistryError> {
        self.store()
            .find_by_id(id)?
            .ok_or(RegistryError::NotFound(id))
    }

    /// All members, ordered by last name.
    pub fn list(&self) -> Result<Vec<Member>, RegistryError> {
        let mut members = self.store().list()?;
        members.sort_by(by_last_name);
        Ok(members)
    }

    /// Members matching every given parameter, ordered by last name.
    pub fn search(&self, params: &SearchParams) -> Result<Vec<Member>, RegistryError> {
        let query = MemberQuery::try_from(params)?;
        let mut members = if query.is_empty() {
            self.store().list()?
        } else {
            self.store().find(&|m| query.matches(m))?
        };
        members.sort_by(by_last_name);
        Ok(members)
    }

    /// Apply an edit made against `request.version`.
    pub fn update(&self, id: MemberId, request: &UpdateRequest) -> Result<Member, RegistryError> {
        let (version, fields, modified_by) = request.validate()?;
        Ok(self.guard.guarded_update(id, version, fields, modified_by)?)
    }

    pub fn delete(&self, id: MemberId) -> Result<Member, RegistryError> {
        Ok(self.guard.guarded_delete(id)?)
    }

    /// Administrative release of a stuck record lock.
    pub fn unlock(&self, id: MemberId) -> Result<Member, RegistryError> {
        Ok(self.guard.force_unlock(id)?)
    }
}
