//! Repository port for wallets and their ledger.

use crate::identity::UserId;
use crate::wallet::domain::{LedgerEntry, Transaction, Wallet, WalletDomainError, WalletId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for wallet repository operations.
pub type WalletRepositoryResult<T> = Result<T, WalletRepositoryError>;

/// Wallet state after a ledger entry has been posted, with the entry's
/// immutable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Wallet after the balance change.
    pub wallet: Wallet,
    /// Ledger record written for the change.
    pub transaction: Transaction,
}

/// Wallet persistence contract.
///
/// Implementations must perform the balance check and the write of each
/// posting atomically so concurrent postings cannot drive a balance
/// negative.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Finds the wallet owned by a user.
    ///
    /// Returns `None` when the user has never accessed a wallet.
    async fn find_by_user(&self, user_id: UserId) -> WalletRepositoryResult<Option<Wallet>>;

    /// Returns the wallet owned by `candidate.user_id()`, storing
    /// `candidate` first when none exists.
    async fn find_or_open(&self, candidate: &Wallet) -> WalletRepositoryResult<Wallet>;

    /// Posts a ledger entry to the wallet owned by `candidate.user_id()`,
    /// opening `candidate` when none exists.
    ///
    /// # Errors
    ///
    /// Returns [`WalletRepositoryError::Domain`] with
    /// [`WalletDomainError::InsufficientFunds`] when a debit exceeds the
    /// balance. Nothing is written in that case, not even the new wallet.
    async fn post(
        &self,
        candidate: &Wallet,
        entry: &LedgerEntry,
    ) -> WalletRepositoryResult<Posting>;

    /// Returns the ledger of a wallet, newest entry first.
    async fn transactions(&self, wallet_id: WalletId) -> WalletRepositoryResult<Vec<Transaction>>;
}

/// Errors returned by wallet repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WalletRepositoryError {
    /// The posting violates a wallet invariant.
    #[error(transparent)]
    Domain(#[from] WalletDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WalletRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for WalletRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
