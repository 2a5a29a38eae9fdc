//! Identifier types for the wallet domain.

uuid_id!(
    /// Unique identifier for a wallet.
    WalletId
);

uuid_id!(
    /// Unique identifier for a ledger transaction.
    TransactionId
);
