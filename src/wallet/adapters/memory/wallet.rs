//! In-memory wallet repository for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::identity::UserId;
use crate::wallet::{
    domain::{LedgerEntry, Transaction, Wallet, WalletId},
    ports::{Posting, WalletRepository, WalletRepositoryError, WalletRepositoryResult},
};

/// Thread-safe in-memory wallet repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWalletRepository {
    state: Arc<RwLock<WalletLedgerState>>,
}

/// Wallets and ledger held behind the repository lock.
#[derive(Debug, Clone, Default)]
pub(crate) struct WalletLedgerState {
    wallets: HashMap<WalletId, Wallet>,
    by_user: HashMap<UserId, WalletId>,
    transactions: Vec<Transaction>,
}

impl WalletLedgerState {
    pub(crate) fn find_by_user(&self, user_id: UserId) -> Option<&Wallet> {
        self.by_user
            .get(&user_id)
            .and_then(|wallet_id| self.wallets.get(wallet_id))
    }

    pub(crate) fn find_or_open(&mut self, candidate: &Wallet) -> Wallet {
        if let Some(existing) = self.find_by_user(candidate.user_id()) {
            return existing.clone();
        }
        self.by_user.insert(candidate.user_id(), candidate.id());
        self.wallets.insert(candidate.id(), candidate.clone());
        candidate.clone()
    }

    /// Posts an entry; leaves the state untouched when the posting fails.
    pub(crate) fn post(
        &mut self,
        candidate: &Wallet,
        entry: &LedgerEntry,
    ) -> WalletRepositoryResult<Posting> {
        let mut wallet = self
            .find_by_user(candidate.user_id())
            .cloned()
            .unwrap_or_else(|| candidate.clone());
        let transaction = wallet.post(entry)?;

        self.by_user.insert(wallet.user_id(), wallet.id());
        self.wallets.insert(wallet.id(), wallet.clone());
        self.transactions.push(transaction.clone());
        Ok(Posting {
            wallet,
            transaction,
        })
    }
}

impl InMemoryWalletRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn write_state(
        &self,
    ) -> WalletRepositoryResult<RwLockWriteGuard<'_, WalletLedgerState>> {
        self.state.write().map_err(|err| {
            WalletRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl WalletRepository for InMemoryWalletRepository {
    async fn find_by_user(&self, user_id: UserId) -> WalletRepositoryResult<Option<Wallet>> {
        let state = self.state.read().map_err(|err| {
            WalletRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.find_by_user(user_id).cloned())
    }

    async fn find_or_open(&self, candidate: &Wallet) -> WalletRepositoryResult<Wallet> {
        let mut state = self.write_state()?;
        Ok(state.find_or_open(candidate))
    }

    async fn post(
        &self,
        candidate: &Wallet,
        entry: &LedgerEntry,
    ) -> WalletRepositoryResult<Posting> {
        let mut state = self.write_state()?;
        state.post(candidate, entry)
    }

    async fn transactions(&self, wallet_id: WalletId) -> WalletRepositoryResult<Vec<Transaction>> {
        let state = self.state.read().map_err(|err| {
            WalletRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut ledger: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|transaction| transaction.wallet_id() == wallet_id)
            .cloned()
            .collect();
        // Insertion order breaks timestamp ties, newest first.
        ledger.reverse();
        ledger.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(ledger)
    }
}
