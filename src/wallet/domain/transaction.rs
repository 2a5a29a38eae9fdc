//! Ledger entry types.

use super::{Money, ParseLedgerValueError, TransactionId, WalletDomainError, WalletId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a ledger entry adds to or removes from a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Increases the balance.
    Credit,
    /// Decreases the balance.
    Debit,
}

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Funds added to the wallet, including job payouts.
    Deposit,
    /// Funds paid out of the wallet for a job.
    Payment,
    /// Funds requested out of the platform.
    Withdrawal,
    /// Funds returned to the wallet.
    Refund,
}

impl TransactionKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Payment => "payment",
            Self::Withdrawal => "withdrawal",
            Self::Refund => "refund",
        }
    }

    /// Returns how this kind of entry moves the balance.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Deposit | Self::Refund => Direction::Credit,
            Self::Payment | Self::Withdrawal => Direction::Debit,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = ParseLedgerValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deposit" => Ok(Self::Deposit),
            "payment" => Ok(Self::Payment),
            "withdrawal" => Ok(Self::Withdrawal),
            "refund" => Ok(Self::Refund),
            _ => Err(ParseLedgerValueError(value.to_owned())),
        }
    }
}

/// Settlement status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting external processing; the balance has already moved.
    Pending,
    /// Fully settled.
    Completed,
    /// Rejected; the balance did not move.
    Failed,
}

impl TransactionStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = ParseLedgerValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseLedgerValueError(value.to_owned())),
        }
    }
}

/// A balance change waiting to be posted against a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    kind: TransactionKind,
    amount: Money,
    status: TransactionStatus,
    description: String,
    related_job: Option<Uuid>,
    occurred_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates a completed entry.
    ///
    /// # Errors
    ///
    /// Returns [`WalletDomainError::NonPositiveAmount`] for a zero amount.
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, WalletDomainError> {
        if amount.is_zero() {
            return Err(WalletDomainError::NonPositiveAmount);
        }
        Ok(Self {
            kind,
            amount,
            status: TransactionStatus::Completed,
            description: description.into(),
            related_job: None,
            occurred_at,
        })
    }

    /// Sets the entry status.
    #[must_use]
    pub const fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Links the entry to the job it settles.
    #[must_use]
    pub const fn with_related_job(mut self, job: Uuid) -> Self {
        self.related_job = Some(job);
        self
    }

    /// Returns the entry kind.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Returns the entry amount.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the entry status.
    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Returns the entry description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the related job, if any.
    #[must_use]
    pub const fn related_job(&self) -> Option<Uuid> {
        self.related_job
    }

    /// Returns when the entry was recorded.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Immutable ledger record for a posted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    wallet_id: WalletId,
    kind: TransactionKind,
    amount: Money,
    status: TransactionStatus,
    description: String,
    related_job: Option<Uuid>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTransactionData {
    /// Persisted transaction identifier.
    pub id: TransactionId,
    /// Wallet the entry was posted to.
    pub wallet_id: WalletId,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Entry amount.
    pub amount: Money,
    /// Entry status.
    pub status: TransactionStatus,
    /// Free-text description.
    pub description: String,
    /// Related job, if any.
    pub related_job: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub(super) fn posted(wallet_id: WalletId, entry: &LedgerEntry) -> Self {
        Self {
            id: TransactionId::new(),
            wallet_id,
            kind: entry.kind,
            amount: entry.amount,
            status: entry.status,
            description: entry.description.clone(),
            related_job: entry.related_job,
            created_at: entry.occurred_at,
        }
    }

    /// Reconstructs a transaction from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTransactionData) -> Self {
        Self {
            id: data.id,
            wallet_id: data.wallet_id,
            kind: data.kind,
            amount: data.amount,
            status: data.status,
            description: data.description,
            related_job: data.related_job,
            created_at: data.created_at,
        }
    }

    /// Returns the transaction identifier.
    #[must_use]
    pub const fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the wallet the entry was posted to.
    #[must_use]
    pub const fn wallet_id(&self) -> WalletId {
        self.wallet_id
    }

    /// Returns the entry kind.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Returns the entry amount. Always positive.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the entry status.
    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the related job, if any.
    #[must_use]
    pub const fn related_job(&self) -> Option<Uuid> {
        self.related_job
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
