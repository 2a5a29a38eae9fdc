//! Per-user wallets and the append-only transaction ledger.
//!
//! Balances only change through ledger postings: deposits, withdrawals and
//! the paired payment/payout entries written when a job is settled. Each
//! posting produces exactly one [`domain::Transaction`] and a balance can
//! never go negative.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
