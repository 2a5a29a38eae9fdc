//! `PostgreSQL` adapters for wallet persistence.

mod models;
mod repository;
pub(crate) mod schema;

pub use repository::{PgPool, PostgresWalletRepository};
pub(crate) use repository::{lock_or_open, post_locked};
