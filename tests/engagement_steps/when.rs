//! When steps for engagement BDD scenarios.

use super::world::{MarketplaceWorld, run_async};
use rstest_bdd_macros::when;

#[when("the creator completes the job")]
fn creator_completes_job(world: &mut MarketplaceWorld) -> Result<(), eyre::Report> {
    complete(world)
}

#[when("the creator completes the job again")]
fn creator_completes_job_again(world: &mut MarketplaceWorld) -> Result<(), eyre::Report> {
    complete(world)
}

#[when(r#"the influencer submits evidence "{url}""#)]
fn influencer_submits_evidence(
    world: &mut MarketplaceWorld,
    url: String,
) -> Result<(), eyre::Report> {
    submit(world, &url)
}

#[when("the influencer submits blank evidence")]
fn influencer_submits_blank_evidence(world: &mut MarketplaceWorld) -> Result<(), eyre::Report> {
    submit(world, "   ")
}

#[when(r#"the creator reviews the milestone as "{decision}""#)]
fn creator_reviews_milestone(
    world: &mut MarketplaceWorld,
    decision: String,
) -> Result<(), eyre::Report> {
    let (job, milestone_id) = world.milestone_target()?;
    let result = run_async(world.jobs.review_milestone(
        &world.creator,
        job.id(),
        milestone_id,
        &decision,
        None,
    ));
    world.last_error = result.err();
    Ok(())
}

fn complete(world: &mut MarketplaceWorld) -> Result<(), eyre::Report> {
    let job_id = world.job()?.id();
    let result = run_async(world.jobs.complete_job(&world.creator, job_id));
    world.last_error = result.err();
    Ok(())
}

fn submit(world: &mut MarketplaceWorld, evidence_url: &str) -> Result<(), eyre::Report> {
    let (job, milestone_id) = world.milestone_target()?;
    let result = run_async(world.jobs.submit_milestone(
        &world.receiver,
        job.id(),
        milestone_id,
        evidence_url,
        None,
    ));
    world.last_error = result.err();
    Ok(())
}
