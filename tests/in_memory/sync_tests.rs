//! Job sync sweep for accepted applications left without a job.

use super::helpers::{Marketplace, market};
use collabhub::engagement::{domain::ApplicationStatus, ports::EngagementRepository};
use collabhub::error_kind::ErrorKind;
use collabhub::identity::Caller;
use eyre::OptionExt;
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_provisions_missing_jobs_once(market: Marketplace) -> eyre::Result<()> {
    let campaign = market.publish("Spring launch").await?;
    let mut application = market.apply(&campaign, Some("25")).await?;
    application.decide(ApplicationStatus::Accepted, &DefaultClock)?;
    market
        .repository
        .update_application(&application, ApplicationStatus::Pending)
        .await?;

    let first = market.applications.sync_jobs(&Caller::system()).await?;
    eyre::ensure!(first.synced == 1 && first.failed == 0, "unexpected report {first:?}");

    let jobs = market.jobs.my_jobs(&market.receiver).await?;
    let job = jobs.first().ok_or_eyre("sweep created the job")?;
    eyre::ensure!(job.price().map(|price| price.minor_units()) == Some(2_500), "bid kept");
    market.default_milestone(job).await?;

    let second = market.applications.sync_jobs(&market.admin).await?;
    eyre::ensure!(second.synced == 0 && second.failed == 0, "nothing left to sync");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_requires_admin(market: Marketplace) -> eyre::Result<()> {
    let err = market
        .applications
        .sync_jobs(&market.creator)
        .await
        .err()
        .ok_or_eyre("creator must not run the sweep")?;
    eyre::ensure!(err.kind() == ErrorKind::Forbidden, "unexpected error {err}");
    Ok(())
}
