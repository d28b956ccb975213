mod guard;
mod member;
mod registry;
mod search;
mod store;

#[cfg(feature = "http")]
mod config;
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub mod logging;

pub use guard::{ConcurrencyGuard, GuardError};
pub use member::{
    clean_date, clean_number, clean_optional_string, clean_required_string, Condition, Member,
    MemberFields, MemberId, MemberInput, Mutation, UpdateRequest, ValidationError,
};
pub use registry::{MemberRegistry, RegistryError};
pub use search::{by_last_name, MemberQuery, QueryError, SearchParams};
pub use store::{DeleteOutcome, InMemoryMemberStore, MemberStore, StoreError, WriteOutcome};

#[cfg(feature = "http")]
pub use config::ServerConfig;
