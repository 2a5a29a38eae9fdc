//! Error types for wallet domain validation and parsing.

use super::{Money, WalletId};
use thiserror::Error;

/// Errors returned while constructing or mutating wallet values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletDomainError {
    /// The amount text is not an unsigned decimal with at most two
    /// fractional digits.
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    /// The amount must be strictly positive.
    #[error("amount must be positive")]
    NonPositiveAmount,

    /// The value exceeds the persisted representation.
    #[error("amount overflow")]
    AmountOverflow,

    /// The wallet balance cannot cover the debit.
    #[error("insufficient funds in wallet {wallet_id}: required {required}, available {available}")]
    InsufficientFunds {
        /// Wallet being debited.
        wallet_id: WalletId,
        /// Amount requested.
        required: Money,
        /// Balance at the time of the request.
        available: Money,
    },
}

/// Error returned while parsing ledger enumerations from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ledger value: {0}")]
pub struct ParseLedgerValueError(pub String);
