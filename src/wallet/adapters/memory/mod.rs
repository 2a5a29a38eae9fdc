//! In-memory wallet adapters.

mod wallet;

pub use wallet::InMemoryWalletRepository;
pub(crate) use wallet::WalletLedgerState;
