//! Diesel row models for wallet persistence.

use super::schema::{wallet_transactions, wallets};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for wallets.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WalletRow {
    /// Wallet identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Balance in minor units.
    pub balance_minor: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest posting timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for wallets.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallets)]
pub struct NewWalletRow {
    /// Wallet identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Opening balance in minor units.
    pub balance_minor: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest posting timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row and insert model for ledger entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = wallet_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransactionRow {
    /// Transaction identifier.
    pub id: uuid::Uuid,
    /// Wallet the entry was posted to.
    pub wallet_id: uuid::Uuid,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// Entry kind.
    pub kind: String,
    /// Entry status.
    pub status: String,
    /// Description.
    pub description: String,
    /// Related job.
    pub related_job_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
