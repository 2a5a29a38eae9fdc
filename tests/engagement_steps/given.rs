//! Given steps for engagement BDD scenarios.

use super::world::{MarketplaceWorld, run_async};
use collabhub::engagement::domain::CampaignDraft;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a creator wallet funded with "{amount}""#)]
fn creator_wallet_funded(world: &mut MarketplaceWorld, amount: String) -> Result<(), eyre::Report> {
    run_async(world.wallets.deposit(&world.creator, &amount)).wrap_err("fund creator wallet")?;
    Ok(())
}

#[given(r#"an accepted application bidding "{bid}""#)]
fn accepted_application_bidding(
    world: &mut MarketplaceWorld,
    bid: String,
) -> Result<(), eyre::Report> {
    accept_application(world, Some(&bid))
}

#[given("an accepted application without a bid")]
fn accepted_application_without_bid(world: &mut MarketplaceWorld) -> Result<(), eyre::Report> {
    accept_application(world, None)
}

fn accept_application(world: &mut MarketplaceWorld, bid: Option<&str>) -> Result<(), eyre::Report> {
    let campaign = run_async(
        world
            .campaigns
            .publish(&world.creator, CampaignDraft::new("Autumn collection")),
    )
    .wrap_err("publish campaign")?;
    let application = run_async(world.applications.apply(
        &world.receiver,
        campaign.id(),
        Some("Portfolio attached"),
        bid,
    ))
    .wrap_err("apply to campaign")?;
    let outcome = run_async(world.applications.accept(&world.creator, application.id()))
        .wrap_err("accept application")?;
    let job = outcome
        .job
        .ok_or_else(|| eyre::eyre!("acceptance did not provision a job"))?
        .job()
        .clone();

    let milestones = run_async(world.jobs.milestones(&world.creator, job.id()))
        .wrap_err("list milestones")?;
    let milestone = milestones
        .first()
        .ok_or_else(|| eyre::eyre!("job has no default milestone"))?;
    world.milestone_id = Some(milestone.id());
    world.job = Some(job);
    Ok(())
}
