//! Acceptance and job provisioning against `PostgreSQL`.

use std::sync::Arc;

use crate::postgres::helpers::{PostgresMarket, test_runtime};
use collabhub::engagement::{
    domain::{ApplicationStatus, Job},
    ports::{EngagementRepository, EngagementRepositoryError},
};
use collabhub::error_kind::ErrorKind;
use collabhub::identity::Caller;
use eyre::OptionExt;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::ClusterHandle;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster_handle;
use rstest::rstest;

#[rstest]
fn repeated_acceptance_reuses_existing_job(
    shared_test_cluster_handle: &'static ClusterHandle,
) -> eyre::Result<()> {
    let market = PostgresMarket::new(shared_test_cluster_handle)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let campaign = market.publish("Spring launch").await?;
        let application = market.apply(&campaign, Some("100")).await?;

        let first = market
            .applications
            .accept(&market.creator, application.id())
            .await?
            .job
            .ok_or_eyre("first acceptance provisions")?;
        let second = market
            .applications
            .accept(&market.creator, application.id())
            .await?
            .job
            .ok_or_eyre("second acceptance reports the job")?;

        eyre::ensure!(first.was_created() && !second.was_created(), "one creation");
        eyre::ensure!(first.job().id() == second.job().id(), "same job both times");
        let job = market.jobs.get_job(&market.receiver, first.job().id()).await?;
        eyre::ensure!(job.price().map(|price| price.minor_units()) == Some(10_000), "bid kept");
        let milestones = market.jobs.milestones(&market.creator, job.id()).await?;
        eyre::ensure!(milestones.len() == 1, "milestone must not be duplicated");
        let history = market
            .repository
            .history_for_milestone(milestones.first().ok_or_eyre("milestone")?.id())
            .await?;
        eyre::ensure!(history.len() == 1, "creation recorded once");
        Ok(())
    })
}

#[rstest]
fn concurrent_acceptances_provision_one_job(
    shared_test_cluster_handle: &'static ClusterHandle,
) -> eyre::Result<()> {
    let market = Arc::new(PostgresMarket::new(shared_test_cluster_handle)?);
    let rt = test_runtime()?;

    rt.block_on(async {
        let campaign = market.publish("Spring launch").await?;
        let application_id = market.apply(&campaign, Some("40")).await?.id();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&market);
                tokio::spawn(async move {
                    shared
                        .applications
                        .accept(&shared.creator, application_id)
                        .await
                })
            })
            .collect();

        let mut created = 0_usize;
        let mut job_ids = Vec::new();
        for handle in handles {
            let outcome = handle.await??;
            let provisioned = outcome.job.ok_or_eyre("every acceptance reports a job")?;
            if provisioned.was_created() {
                created += 1;
            }
            job_ids.push(provisioned.job().id());
        }

        eyre::ensure!(created == 1, "expected exactly one creation, got {created}");
        job_ids.dedup();
        eyre::ensure!(job_ids.len() == 1, "all acceptances map to one job");
        let jobs = market.jobs.my_jobs(&market.creator).await?;
        eyre::ensure!(jobs.len() == 1, "one stored job");
        Ok(())
    })
}

#[rstest]
fn stale_writes_cannot_reopen_settled_application(
    shared_test_cluster_handle: &'static ClusterHandle,
) -> eyre::Result<()> {
    let market = PostgresMarket::new(shared_test_cluster_handle)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let job = market.engage(None).await?;
        let stale = market
            .repository
            .find_application_for_pair(job.campaign_id(), job.influencer_id())
            .await?
            .ok_or_eyre("accepted application stored")?;
        market.jobs.complete_job(&market.creator, job.id()).await?;

        let mut rejected = stale.clone();
        rejected.decide(ApplicationStatus::Rejected, &DefaultClock)?;
        let rejection = market
            .repository
            .update_application(&rejected, ApplicationStatus::Accepted)
            .await;
        eyre::ensure!(
            matches!(
                rejection,
                Err(EngagementRepositoryError::ApplicationStatusChanged {
                    actual: ApplicationStatus::Completed,
                    ..
                })
            ),
            "stale rejection must conflict"
        );

        let campaign = market.campaigns.get(&market.creator, job.campaign_id()).await?;
        let provision = Job::provision(&stale, &campaign, &DefaultClock);
        let acceptance = market
            .repository
            .record_acceptance(&stale, ApplicationStatus::Accepted, &provision)
            .await;
        eyre::ensure!(
            matches!(acceptance, Err(EngagementRepositoryError::ApplicationStatusChanged { .. })),
            "stale acceptance must conflict"
        );

        let stored = market
            .repository
            .find_application(stale.id())
            .await?
            .ok_or_eyre("application still stored")?;
        eyre::ensure!(stored.status() == ApplicationStatus::Completed, "settled status kept");
        Ok(())
    })
}

#[rstest]
fn sync_sweep_provisions_missing_jobs(
    shared_test_cluster_handle: &'static ClusterHandle,
) -> eyre::Result<()> {
    let market = PostgresMarket::new(shared_test_cluster_handle)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let campaign = market.publish("Spring launch").await?;
        let mut application = market.apply(&campaign, Some("25")).await?;
        application.decide(ApplicationStatus::Accepted, &DefaultClock)?;
        market
            .repository
            .update_application(&application, ApplicationStatus::Pending)
            .await?;

        let first = market.applications.sync_jobs(&Caller::system()).await?;
        eyre::ensure!(first.synced == 1 && first.failed == 0, "unexpected report {first:?}");
        let second = market.applications.sync_jobs(&market.admin).await?;
        eyre::ensure!(second.synced == 0 && second.failed == 0, "nothing left to sync");

        let jobs = market.jobs.my_jobs(&market.receiver).await?;
        eyre::ensure!(jobs.len() == 1, "one job provisioned");
        Ok(())
    })
}

#[rstest]
fn duplicate_application_conflicts(
    shared_test_cluster_handle: &'static ClusterHandle,
) -> eyre::Result<()> {
    let market = PostgresMarket::new(shared_test_cluster_handle)?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let campaign = market.publish("Spring launch").await?;
        market.apply(&campaign, None).await?;

        let err = market
            .applications
            .apply(&market.receiver, campaign.id(), None, Some("50"))
            .await
            .err()
            .ok_or_eyre("second application should fail")?;
        eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}");
        Ok(())
    })
}
