//! `PostgreSQL` repository implementation for wallets and their ledger.

use super::{
    models::{NewWalletRow, TransactionRow, WalletRow},
    schema::{wallet_transactions, wallets},
};
use crate::identity::UserId;
use crate::wallet::{
    domain::{
        LedgerEntry, Money, PersistedTransactionData, PersistedWalletData, Transaction,
        TransactionId, TransactionKind, TransactionStatus, Wallet, WalletId,
    },
    ports::{Posting, WalletRepository, WalletRepositoryError, WalletRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type shared by the marketplace adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed wallet repository.
#[derive(Debug, Clone)]
pub struct PostgresWalletRepository {
    pool: PgPool,
}

impl PostgresWalletRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> WalletRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WalletRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(WalletRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(WalletRepositoryError::persistence)?
    }
}

#[async_trait]
impl WalletRepository for PostgresWalletRepository {
    async fn find_by_user(&self, user_id: UserId) -> WalletRepositoryResult<Option<Wallet>> {
        self.run_blocking(move |connection| find_wallet_by_user(connection, user_id, false))
            .await
    }

    async fn find_or_open(&self, candidate: &Wallet) -> WalletRepositoryResult<Wallet> {
        let candidate_row = to_new_wallet_row(candidate);
        let user_id = candidate.user_id();
        self.run_blocking(move |connection| {
            insert_wallet_if_absent(connection, &candidate_row)?;
            find_wallet_by_user(connection, user_id, false)?.ok_or_else(|| {
                WalletRepositoryError::persistence(std::io::Error::other(
                    "wallet vanished after insert",
                ))
            })
        })
        .await
    }

    async fn post(
        &self,
        candidate: &Wallet,
        entry: &LedgerEntry,
    ) -> WalletRepositoryResult<Posting> {
        let owned_candidate = candidate.clone();
        let owned_entry = entry.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, WalletRepositoryError, _>(|tx_conn| {
                post_locked(tx_conn, &owned_candidate, &owned_entry)
            })
        })
        .await
    }

    async fn transactions(&self, wallet_id: WalletId) -> WalletRepositoryResult<Vec<Transaction>> {
        self.run_blocking(move |connection| {
            let rows = wallet_transactions::table
                .filter(wallet_transactions::wallet_id.eq(wallet_id.into_inner()))
                .order(wallet_transactions::created_at.desc())
                .select(TransactionRow::as_select())
                .load::<TransactionRow>(connection)
                .map_err(WalletRepositoryError::persistence)?;
            rows.into_iter().map(row_to_transaction).collect()
        })
        .await
    }
}

/// Loads a user's wallet, optionally taking a row lock for the rest of the
/// surrounding transaction.
fn find_wallet_by_user(
    connection: &mut PgConnection,
    user_id: UserId,
    lock: bool,
) -> WalletRepositoryResult<Option<Wallet>> {
    let query = wallets::table
        .filter(wallets::user_id.eq(user_id.into_inner()))
        .select(WalletRow::as_select());
    let row = if lock {
        query.for_update().first::<WalletRow>(connection).optional()
    } else {
        query.first::<WalletRow>(connection).optional()
    }
    .map_err(WalletRepositoryError::persistence)?;
    row.map(row_to_wallet).transpose()
}

/// Posts a ledger entry inside the caller's transaction.
///
/// The wallet row is created when absent and locked before the balance is
/// checked. Must run inside a transaction.
pub(crate) fn post_locked(
    connection: &mut PgConnection,
    candidate: &Wallet,
    entry: &LedgerEntry,
) -> WalletRepositoryResult<Posting> {
    let mut wallet = lock_or_open(connection, candidate)?;
    let transaction = wallet.post(entry)?;

    diesel::update(wallets::table.filter(wallets::id.eq(wallet.id().into_inner())))
        .set((
            wallets::balance_minor.eq(wallet.balance().to_persisted()),
            wallets::updated_at.eq(wallet.updated_at()),
        ))
        .execute(connection)
        .map_err(WalletRepositoryError::persistence)?;

    diesel::insert_into(wallet_transactions::table)
        .values(&to_transaction_row(&transaction))
        .execute(connection)
        .map_err(WalletRepositoryError::persistence)?;

    Ok(Posting {
        wallet,
        transaction,
    })
}

/// Opens `candidate` when the user has no wallet, then locks the user's
/// wallet row until the surrounding transaction ends.
pub(crate) fn lock_or_open(
    connection: &mut PgConnection,
    candidate: &Wallet,
) -> WalletRepositoryResult<Wallet> {
    insert_wallet_if_absent(connection, &to_new_wallet_row(candidate))?;
    find_wallet_by_user(connection, candidate.user_id(), true)?.ok_or_else(|| {
        WalletRepositoryError::persistence(std::io::Error::other("wallet row missing"))
    })
}

fn insert_wallet_if_absent(
    connection: &mut PgConnection,
    row: &NewWalletRow,
) -> WalletRepositoryResult<()> {
    diesel::insert_into(wallets::table)
        .values(row)
        .on_conflict(wallets::user_id)
        .do_nothing()
        .execute(connection)
        .map_err(WalletRepositoryError::persistence)?;
    Ok(())
}

fn to_new_wallet_row(wallet: &Wallet) -> NewWalletRow {
    NewWalletRow {
        id: wallet.id().into_inner(),
        user_id: wallet.user_id().into_inner(),
        balance_minor: wallet.balance().to_persisted(),
        created_at: wallet.created_at(),
        updated_at: wallet.updated_at(),
    }
}

fn to_transaction_row(transaction: &Transaction) -> TransactionRow {
    TransactionRow {
        id: transaction.id().into_inner(),
        wallet_id: transaction.wallet_id().into_inner(),
        amount_minor: transaction.amount().to_persisted(),
        kind: transaction.kind().as_str().to_owned(),
        status: transaction.status().as_str().to_owned(),
        description: transaction.description().to_owned(),
        related_job_id: transaction.related_job(),
        created_at: transaction.created_at(),
    }
}

fn row_to_wallet(row: WalletRow) -> WalletRepositoryResult<Wallet> {
    let balance = Money::from_persisted(row.balance_minor)?;
    Ok(Wallet::from_persisted(PersistedWalletData {
        id: WalletId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        balance,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_transaction(row: TransactionRow) -> WalletRepositoryResult<Transaction> {
    let TransactionRow {
        id,
        wallet_id,
        amount_minor,
        kind: persisted_kind,
        status: persisted_status,
        description,
        related_job_id,
        created_at,
    } = row;

    let kind = TransactionKind::try_from(persisted_kind.as_str())
        .map_err(WalletRepositoryError::persistence)?;
    let status = TransactionStatus::try_from(persisted_status.as_str())
        .map_err(WalletRepositoryError::persistence)?;

    Ok(Transaction::from_persisted(PersistedTransactionData {
        id: TransactionId::from_uuid(id),
        wallet_id: WalletId::from_uuid(wallet_id),
        kind,
        amount: Money::from_persisted(amount_minor)?,
        status,
        description,
        related_job: related_job_id,
        created_at,
    }))
}
