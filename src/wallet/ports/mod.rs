//! Port contracts for wallet persistence.

pub mod repository;

pub use repository::{Posting, WalletRepository, WalletRepositoryError, WalletRepositoryResult};
