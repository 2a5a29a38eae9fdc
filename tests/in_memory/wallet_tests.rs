//! Wallet deposits and withdrawals over the in-memory repository.

use super::helpers::{Marketplace, market};
use collabhub::error_kind::ErrorKind;
use collabhub::wallet::domain::{TransactionKind, TransactionStatus};
use eyre::OptionExt;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_access_opens_empty_wallet(market: Marketplace) -> eyre::Result<()> {
    let first = market.wallets.summary(&market.receiver).await?;
    let second = market.wallets.summary(&market.receiver).await?;

    eyre::ensure!(first.wallet.balance().is_zero(), "new wallet is empty");
    eyre::ensure!(first.wallet.id() == second.wallet.id(), "one wallet per user");
    eyre::ensure!(first.transactions.is_empty(), "no ledger entries yet");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn withdrawal_is_pending_and_debits_immediately(market: Marketplace) -> eyre::Result<()> {
    market.fund_creator("80.50").await?;

    let posting = market.wallets.withdraw(&market.creator, "30.25").await?;

    eyre::ensure!(posting.wallet.balance().minor_units() == 5_025, "balance debited");
    eyre::ensure!(posting.transaction.kind() == TransactionKind::Withdrawal, "withdrawal kind");
    eyre::ensure!(posting.transaction.status() == TransactionStatus::Pending, "pending payout");

    let summary = market.wallets.summary(&market.creator).await?;
    let kinds: Vec<TransactionKind> = summary
        .transactions
        .iter()
        .map(|transaction| transaction.kind())
        .collect();
    eyre::ensure!(
        kinds == [TransactionKind::Withdrawal, TransactionKind::Deposit],
        "ledger is newest first, got {kinds:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdraft_is_refused(market: Marketplace) -> eyre::Result<()> {
    market.fund_creator("20").await?;

    let err = market
        .wallets
        .withdraw(&market.creator, "20.01")
        .await
        .err()
        .ok_or_eyre("withdrawal exceeds balance")?;
    eyre::ensure!(err.kind() == ErrorKind::InsufficientFunds, "unexpected error {err}");

    let summary = market.wallets.summary(&market.creator).await?;
    eyre::ensure!(summary.wallet.balance().minor_units() == 2_000, "balance unchanged");
    eyre::ensure!(summary.transactions.len() == 1, "no withdrawal recorded");
    Ok(())
}

#[rstest]
#[case("0")]
#[case("0.00")]
#[case("-5")]
#[case("ten")]
#[case("1.234")]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_amounts_are_bad_requests(
    market: Marketplace,
    #[case] amount: &str,
) -> eyre::Result<()> {
    let err = market
        .wallets
        .deposit(&market.receiver, amount)
        .await
        .err()
        .ok_or_eyre("amount should be rejected")?;
    eyre::ensure!(err.kind() == ErrorKind::BadRequest, "unexpected error {err}");
    Ok(())
}
