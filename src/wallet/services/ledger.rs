//! Deposit, withdrawal and summary operations on the caller's wallet.

use crate::error_kind::ErrorKind;
use crate::identity::Caller;
use crate::wallet::{
    domain::{
        LedgerEntry, Money, Transaction, TransactionKind, TransactionStatus, Wallet,
        WalletDomainError,
    },
    ports::{Posting, WalletRepository, WalletRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Description recorded on deposits.
const DEPOSIT_DESCRIPTION: &str = "Deposit via simulated gateway";
/// Description recorded on withdrawal requests.
const WITHDRAWAL_DESCRIPTION: &str = "Withdrawal request";

/// Service-level errors for wallet operations.
#[derive(Debug, Error)]
pub enum WalletServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WalletDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WalletRepositoryError),
}

impl WalletServiceError {
    /// Returns the boundary classification of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) | Self::Repository(WalletRepositoryError::Domain(err)) => {
                domain_kind(err)
            }
            Self::Repository(WalletRepositoryError::Persistence(_)) => ErrorKind::Internal,
        }
    }
}

const fn domain_kind(err: &WalletDomainError) -> ErrorKind {
    match err {
        WalletDomainError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        WalletDomainError::InvalidAmount(_)
        | WalletDomainError::NonPositiveAmount
        | WalletDomainError::AmountOverflow => ErrorKind::BadRequest,
    }
}

/// Result type for wallet service operations.
pub type WalletServiceResult<T> = Result<T, WalletServiceError>;

/// Wallet balance together with its ledger, newest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSummary {
    /// The caller's wallet.
    pub wallet: Wallet,
    /// Ledger entries, newest first.
    pub transactions: Vec<Transaction>,
}

/// Wallet orchestration service.
#[derive(Clone)]
pub struct WalletService<R, C>
where
    R: WalletRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> WalletService<R, C>
where
    R: WalletRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new wallet service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the caller's wallet and ledger, opening the wallet on first
    /// access.
    ///
    /// # Errors
    ///
    /// Returns [`WalletServiceError::Repository`] when persistence fails.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn summary(&self, caller: &Caller) -> WalletServiceResult<WalletSummary> {
        let candidate = Wallet::open(caller.user_id(), &*self.clock);
        let wallet = self.repository.find_or_open(&candidate).await?;
        let transactions = self.repository.transactions(wallet.id()).await?;
        Ok(WalletSummary {
            wallet,
            transactions,
        })
    }

    /// Adds funds to the caller's wallet.
    ///
    /// # Errors
    ///
    /// Returns [`WalletServiceError::Domain`] when the amount is unparsable
    /// or not positive.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn deposit(
        &self,
        caller: &Caller,
        amount_text: &str,
    ) -> WalletServiceResult<Posting> {
        let amount = parse_positive(amount_text)?;
        let entry = LedgerEntry::new(
            TransactionKind::Deposit,
            amount,
            DEPOSIT_DESCRIPTION,
            self.clock.utc(),
        )?;
        let posting = self.post(caller, &entry).await?;
        info!(amount = %amount, balance = %posting.wallet.balance(), "deposit recorded");
        Ok(posting)
    }

    /// Requests a withdrawal from the caller's wallet.
    ///
    /// The balance is debited immediately; the ledger entry stays pending
    /// until the payout is processed outside the platform.
    ///
    /// # Errors
    ///
    /// Returns [`WalletServiceError::Domain`] when the amount is unparsable
    /// or not positive, and a repository error carrying
    /// [`WalletDomainError::InsufficientFunds`] when it exceeds the balance.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn withdraw(
        &self,
        caller: &Caller,
        amount_text: &str,
    ) -> WalletServiceResult<Posting> {
        let amount = parse_positive(amount_text)?;
        let entry = LedgerEntry::new(
            TransactionKind::Withdrawal,
            amount,
            WITHDRAWAL_DESCRIPTION,
            self.clock.utc(),
        )?
        .with_status(TransactionStatus::Pending);
        let posting = self.post(caller, &entry).await?;
        info!(amount = %amount, balance = %posting.wallet.balance(), "withdrawal requested");
        Ok(posting)
    }

    async fn post(&self, caller: &Caller, entry: &LedgerEntry) -> WalletServiceResult<Posting> {
        let candidate = Wallet::open(caller.user_id(), &*self.clock);
        Ok(self.repository.post(&candidate, entry).await?)
    }
}

fn parse_positive(text: &str) -> Result<Money, WalletDomainError> {
    let amount = Money::parse(text)?;
    if amount.is_zero() {
        return Err(WalletDomainError::NonPositiveAmount);
    }
    Ok(amount)
}
