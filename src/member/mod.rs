//! Members - the claimant records the registry protects.
//!
//! A [`Member`] is a versioned record: the payload ([`MemberFields`]) is
//! opaque to the concurrency guard, while `version`, `is_locked` and
//! `locked_at` are bookkeeping fields that only change through a
//! [`Mutation`]. Store backends call [`Member::apply`] so every backend
//! gives the mutations the same meaning.
//!
//! ## Example
//!
//! ```ignore
//! use claimant_registry::{MemberInput, InMemoryMemberStore, MemberStore};
//!
//! let input: MemberInput = serde_json::from_str(r#"{ "firstName": "Ada" }"#)?;
//! let member = store.insert(input.validate()?, chrono::Utc::now())?;
//! assert_eq!(member.version, 1);
//! ```

mod clean;
mod input;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use clean::{clean_date, clean_number, clean_optional_string, clean_required_string};
pub use input::{MemberInput, UpdateRequest, ValidationError};

/// Store-assigned member identifier.
pub type MemberId = i64;

/// The editable payload of a member record.
///
/// Everything except `first_name` is nullable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFields {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub home_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub zip4: Option<String>,
    pub product_name: Option<String>,
    pub date_purchased: Option<NaiveDate>,
    pub paid_amount: Option<f64>,
    pub covered_weeks: Option<i64>,
    pub last_state_worked: Option<String>,
}

impl MemberFields {
    /// Payload with only the required first name set.
    pub fn named(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            ..Self::default()
        }
    }
}

/// A stored member record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    #[serde(flatten)]
    pub fields: MemberFields,
    pub version: u64,
    pub is_locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// A freshly created record: version 1, unlocked.
    pub fn new(id: MemberId, fields: MemberFields, at: DateTime<Utc>) -> Self {
        Self {
            id,
            fields,
            version: 1,
            is_locked: false,
            locked_at: None,
            last_modified_by: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Apply a guard mutation in place.
    ///
    /// Callers are responsible for checking the write [`Condition`] first;
    /// this only encodes what each mutation writes.
    pub fn apply(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::Acquire { at } => {
                self.is_locked = true;
                self.locked_at = Some(*at);
            }
            Mutation::Commit {
                fields,
                modified_by,
                at,
            } => {
                self.fields = fields.clone();
                self.version += 1;
                self.is_locked = false;
                self.locked_at = None;
                self.last_modified_by = modified_by.clone();
                self.updated_at = *at;
            }
            Mutation::Release => {
                self.is_locked = false;
                self.locked_at = None;
            }
        }
    }
}

/// A write predicate over the bookkeeping fields. `None` means "any".
///
/// `locked_at` pins a specific lock: a lock is identified by the moment it
/// was taken, so a writer whose lock was cleared and re-taken by someone
/// else no longer matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Condition {
    pub locked: Option<bool>,
    pub version: Option<u64>,
    pub locked_at: Option<DateTime<Utc>>,
}

impl Condition {
    /// Matches every record.
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches an unlocked record, whatever its version.
    pub fn unlocked() -> Self {
        Self {
            locked: Some(false),
            ..Self::default()
        }
    }

    /// Matches a locked record, whatever its version or holder.
    pub fn locked() -> Self {
        Self {
            locked: Some(true),
            ..Self::default()
        }
    }

    /// Matches an unlocked record at exactly `version`.
    pub fn unlocked_at(version: u64) -> Self {
        Self {
            version: Some(version),
            ..Self::unlocked()
        }
    }

    /// Matches a record still locked by the acquire made at `since`.
    pub fn held_since(since: DateTime<Utc>) -> Self {
        Self {
            locked_at: Some(since),
            ..Self::locked()
        }
    }

    /// Narrow the condition to records at exactly `version`.
    pub fn at_version(self, version: u64) -> Self {
        Self {
            version: Some(version),
            ..self
        }
    }

    pub fn holds(&self, member: &Member) -> bool {
        self.locked.map_or(true, |locked| member.is_locked == locked)
            && self.version.map_or(true, |version| member.version == version)
            && self
                .locked_at
                .map_or(true, |since| member.locked_at == Some(since))
    }
}

/// The writes the concurrency guard is allowed to make.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Take the record-level lock.
    Acquire { at: DateTime<Utc> },
    /// Replace the payload, bump the version and release the lock.
    Commit {
        fields: MemberFields,
        modified_by: Option<String>,
        at: DateTime<Utc>,
    },
    /// Drop the lock, leaving version and payload alone.
    Release,
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Acquire { .. } => "acquire",
            Mutation::Commit { .. } => "commit",
            Mutation::Release => "release",
        }
    }
}
