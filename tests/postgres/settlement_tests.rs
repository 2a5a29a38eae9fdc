//! Job completion and wallet settlement against `PostgreSQL`.

use crate::postgres::helpers::{PostgresMarket, test_runtime};
use collabhub::engagement::domain::{ApplicationStatus, CampaignStatus, JobStatus};
use collabhub::engagement::ports::EngagementRepository;
use collabhub::error_kind::ErrorKind;
use collabhub::wallet::ports::WalletRepository;
use eyre::OptionExt;
use pg_embedded_setup_unpriv::ClusterHandle;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster_handle;
use rstest::rstest;

#[rstest]
fn completion_moves_price_between_wallets(
    shared_test_cluster_handle: &'static ClusterHandle,
) -> eyre::Result<()> {
    let market = PostgresMarket::new(shared_test_cluster_handle)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        market.fund_creator("150").await?;
        let job = market.engage(Some("100")).await?;

        let receipt = market.jobs.complete_job(&market.creator, job.id()).await?;

        let transfer = receipt.transfer.ok_or_eyre("priced job moves funds")?;
        eyre::ensure!(transfer.payment.wallet.balance().minor_units() == 5_000, "creator debited");
        eyre::ensure!(transfer.payout.wallet.balance().minor_units() == 10_000, "influencer credited");

        let creator = market.wallets.summary(&market.creator).await?;
        let influencer = market.wallets.summary(&market.receiver).await?;
        eyre::ensure!(creator.wallet.balance().minor_units() == 5_000, "creator balance");
        eyre::ensure!(influencer.wallet.balance().minor_units() == 10_000, "influencer balance");
        eyre::ensure!(creator.transactions.len() == 2, "deposit and payment");
        eyre::ensure!(influencer.transactions.len() == 1, "payout only");

        let stored_job = market.jobs.get_job(&market.receiver, job.id()).await?;
        eyre::ensure!(stored_job.status() == JobStatus::Completed, "job completed");
        eyre::ensure!(stored_job.completed_at().is_some(), "completion time recorded");
        let campaign = market.campaigns.get(&market.receiver, job.campaign_id()).await?;
        eyre::ensure!(campaign.status() == CampaignStatus::Completed, "campaign completed");
        let application = market
            .repository
            .find_application_for_pair(job.campaign_id(), job.influencer_id())
            .await?
            .ok_or_eyre("application stored")?;
        eyre::ensure!(application.status() == ApplicationStatus::Completed, "application completed");
        Ok(())
    })
}

#[rstest]
fn insufficient_funds_rolls_back_settlement(
    shared_test_cluster_handle: &'static ClusterHandle,
) -> eyre::Result<()> {
    let market = PostgresMarket::new(shared_test_cluster_handle)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        market.fund_creator("50").await?;
        let job = market.engage(Some("100")).await?;

        let err = market
            .jobs
            .complete_job(&market.creator, job.id())
            .await
            .err()
            .ok_or_eyre("creator cannot cover the price")?;
        eyre::ensure!(err.kind() == ErrorKind::InsufficientFunds, "unexpected error {err}");

        let stored_job = market.jobs.get_job(&market.creator, job.id()).await?;
        eyre::ensure!(stored_job.status() == JobStatus::InProgress, "job still in progress");
        let campaign = market.campaigns.get(&market.creator, job.campaign_id()).await?;
        eyre::ensure!(campaign.status() == CampaignStatus::Open, "campaign still open");
        let application = market
            .repository
            .find_application_for_pair(job.campaign_id(), job.influencer_id())
            .await?
            .ok_or_eyre("application stored")?;
        eyre::ensure!(application.status() == ApplicationStatus::Accepted, "application kept");

        let creator = market.wallets.summary(&market.creator).await?;
        eyre::ensure!(creator.wallet.balance().minor_units() == 5_000, "creator balance kept");
        eyre::ensure!(creator.transactions.len() == 1, "only the deposit");
        let influencer = market
            .wallet_repository
            .find_by_user(market.receiver.user_id())
            .await?;
        eyre::ensure!(influencer.is_none(), "payout wallet opening rolled back");
        Ok(())
    })
}

#[rstest]
fn job_settles_at_most_once(shared_test_cluster_handle: &'static ClusterHandle) -> eyre::Result<()> {
    let market = PostgresMarket::new(shared_test_cluster_handle)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        market.fund_creator("300").await?;
        let job = market.engage(Some("100")).await?;
        market.jobs.complete_job(&market.creator, job.id()).await?;

        let err = market
            .jobs
            .complete_job(&market.creator, job.id())
            .await
            .err()
            .ok_or_eyre("second completion must fail")?;
        eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}");

        let creator = market.wallets.summary(&market.creator).await?;
        eyre::ensure!(creator.wallet.balance().minor_units() == 20_000, "paid once");
        Ok(())
    })
}
