//! SQLite-backed task store, organized into submodules

mod core;
pub(crate) mod mappers;
pub(crate) mod query_builders;
pub(crate) mod validators;

pub use core::{StoreOptions, TaskStore};
pub use mappers::{DATE_FORMAT, TIMESTAMP_FORMAT};
