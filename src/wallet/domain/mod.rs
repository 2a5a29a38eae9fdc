//! Domain model for wallets and ledger entries.

mod error;
mod ids;
mod money;
mod transaction;
mod wallet;

pub use error::{ParseLedgerValueError, WalletDomainError};
pub use ids::{TransactionId, WalletId};
pub use money::Money;
pub use transaction::{
    Direction, LedgerEntry, PersistedTransactionData, Transaction, TransactionKind,
    TransactionStatus,
};
pub use wallet::{PersistedWalletData, Wallet};
