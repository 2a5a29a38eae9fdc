//! Wallet aggregate.

use super::{
    Direction, LedgerEntry, Money, Transaction, TransactionStatus, WalletDomainError, WalletId,
};
use crate::identity::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Balance held by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    id: WalletId,
    user_id: UserId,
    balance: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedWalletData {
    /// Persisted wallet identifier.
    pub id: WalletId,
    /// Owning user.
    pub user_id: UserId,
    /// Current balance.
    pub balance: Money,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest posting.
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Opens an empty wallet for a user.
    #[must_use]
    pub fn open(user_id: UserId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: WalletId::new(),
            user_id,
            balance: Money::ZERO,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a wallet from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedWalletData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            balance: data.balance,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the wallet identifier.
    #[must_use]
    pub const fn id(&self) -> WalletId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the current balance.
    #[must_use]
    pub const fn balance(&self) -> Money {
        self.balance
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the timestamp of the latest posting.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a ledger entry and returns the resulting transaction record.
    ///
    /// Failed entries are recorded without moving the balance.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::InsufficientFunds`] when a debit exceeds
    /// the balance, or [`WalletDomainError::AmountOverflow`] when a credit
    /// would overflow. The wallet is unchanged on error.
    pub fn post(&mut self, entry: &LedgerEntry) -> Result<Transaction, WalletDomainError> {
        if entry.status() != TransactionStatus::Failed {
            self.balance = match entry.kind().direction() {
                Direction::Credit => self.balance.checked_add(entry.amount())?,
                Direction::Debit => self.balance.checked_sub(entry.amount()).ok_or(
                    WalletDomainError::InsufficientFunds {
                        wallet_id: self.id,
                        required: entry.amount(),
                        available: self.balance,
                    },
                )?,
            };
        }
        self.updated_at = entry.occurred_at();
        Ok(Transaction::posted(self.id, entry))
    }
}
