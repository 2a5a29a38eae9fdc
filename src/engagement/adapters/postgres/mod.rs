//! `PostgreSQL` adapters for engagement persistence and settlement.

mod models;
mod repository;
mod schema;
mod settlement;

pub use repository::PostgresEngagementRepository;
