//! Then steps for engagement BDD scenarios.

use super::world::{MarketplaceWorld, run_async};
use rstest_bdd_macros::then;

#[then(r#"the creator balance is "{amount}""#)]
fn creator_balance_is(world: &MarketplaceWorld, amount: String) -> Result<(), eyre::Report> {
    let balance = world.balance_of(&world.creator)?;
    if balance != amount {
        return Err(eyre::eyre!("expected creator balance {amount}, found {balance}"));
    }
    Ok(())
}

#[then(r#"the influencer balance is "{amount}""#)]
fn influencer_balance_is(world: &MarketplaceWorld, amount: String) -> Result<(), eyre::Report> {
    let balance = world.balance_of(&world.receiver)?;
    if balance != amount {
        return Err(eyre::eyre!("expected influencer balance {amount}, found {balance}"));
    }
    Ok(())
}

#[then(r#"the job status is "{status}""#)]
fn job_status_is(world: &MarketplaceWorld, status: String) -> Result<(), eyre::Report> {
    let job_id = world.job()?.id();
    let job = run_async(world.jobs.get_job(&world.creator, job_id))?;
    if job.status().as_str() != status {
        return Err(eyre::eyre!(
            "expected job status {status}, found {}",
            job.status().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the last action fails with "{kind}""#)]
fn last_action_fails_with(world: &MarketplaceWorld, kind: String) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the last action to fail"))?;
    if err.kind().as_str() != kind {
        return Err(eyre::eyre!(
            "expected {kind}, got {} ({err})",
            err.kind().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the milestone status is "{status}""#)]
fn milestone_status_is(world: &MarketplaceWorld, status: String) -> Result<(), eyre::Report> {
    let (job, milestone_id) = world.milestone_target()?;
    let milestones = run_async(world.jobs.milestones(&world.creator, job.id()))?;
    let milestone = milestones
        .iter()
        .find(|milestone| milestone.id() == milestone_id)
        .ok_or_else(|| eyre::eyre!("milestone missing from job"))?;
    if milestone.status().as_str() != status {
        return Err(eyre::eyre!(
            "expected milestone status {status}, found {}",
            milestone.status().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the milestone history reads "{actions}""#)]
fn milestone_history_reads(world: &MarketplaceWorld, actions: String) -> Result<(), eyre::Report> {
    let (job, milestone_id) = world.milestone_target()?;
    let history = run_async(
        world
            .jobs
            .milestone_history(&world.creator, job.id(), milestone_id),
    )?;
    let recorded: Vec<&str> = history.iter().map(|entry| entry.action().as_str()).collect();
    if recorded.join(",") != actions {
        return Err(eyre::eyre!(
            "expected history {actions}, found {}",
            recorded.join(",")
        ));
    }
    Ok(())
}
