//! SQLite backend for the habitlog submission store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The single connection also
//! serializes every read-modify-write, which subsumes the per-(student,
//! habit, date) mutual exclusion the upsert requires; each call runs in
//! one IMMEDIATE transaction so the quota check and the ledger + detail
//! writes commit or roll back together.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, StoreOptions};
