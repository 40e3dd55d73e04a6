//! Persistent resource records (SQLite via sqlx).
//!
//! Stores the desired state (source URL, destination, optional pinned digest)
//! and the actual state returned by Create for every managed file. A record
//! whose identity is NULL is known to the host but not currently present.

mod db;
mod records;
mod types;

pub use db::StateDb;
pub use types::{ResourceId, ResourceRecord};
