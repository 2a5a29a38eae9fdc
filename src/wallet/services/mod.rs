//! Application services for wallet operations.

mod ledger;

pub use ledger::{WalletService, WalletServiceError, WalletServiceResult, WalletSummary};
