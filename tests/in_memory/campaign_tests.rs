//! Campaign editing and listings over the in-memory repository.

use super::helpers::{Marketplace, market};
use collabhub::engagement::{
    domain::{CampaignDraft, CampaignId, CampaignStatus},
    ports::Page,
};
use collabhub::error_kind::ErrorKind;
use collabhub::identity::{Caller, Role, UserId};
use eyre::OptionExt;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_campaign_stops_applications(market: Marketplace) -> eyre::Result<()> {
    let campaign = market.publish("Spring launch").await?;

    let closed = market
        .campaigns
        .update(
            &market.creator,
            campaign.id(),
            CampaignDraft::new("Spring launch (full)"),
            Some("closed"),
        )
        .await?;
    eyre::ensure!(closed.status() == CampaignStatus::Closed, "campaign closed");
    eyre::ensure!(closed.title() == "Spring launch (full)", "title replaced");

    let err = market
        .applications
        .apply(&market.receiver, campaign.id(), None, None)
        .await
        .err()
        .ok_or_eyre("closed campaign must refuse applications")?;
    eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}");

    let reopened = market
        .campaigns
        .update(&market.admin, campaign.id(), CampaignDraft::new("Spring launch"), Some("open"))
        .await?;
    eyre::ensure!(reopened.status() == CampaignStatus::Open, "admin reopened the campaign");
    market.apply(&campaign, None).await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_status_keeps_current_one(market: Marketplace) -> eyre::Result<()> {
    let campaign = market.publish("Spring launch").await?;

    let updated = market
        .campaigns
        .update(
            &market.creator,
            campaign.id(),
            CampaignDraft::new("Spring launch").with_description("Two reels"),
            None,
        )
        .await?;

    eyre::ensure!(updated.status() == CampaignStatus::Open, "status unchanged");
    let stored = market.campaigns.get(&market.receiver, campaign.id()).await?;
    eyre::ensure!(stored.description() == Some("Two reels"), "edit persisted");
    Ok(())
}

#[rstest]
#[case(Some("completed"), ErrorKind::BadRequest)]
#[case(Some("archived"), ErrorKind::BadRequest)]
#[tokio::test(flavor = "multi_thread")]
async fn unusable_campaign_statuses_are_rejected(
    market: Marketplace,
    #[case] status: Option<&str>,
    #[case] expected: ErrorKind,
) -> eyre::Result<()> {
    let campaign = market.publish("Spring launch").await?;

    let err = market
        .campaigns
        .update(&market.creator, campaign.id(), CampaignDraft::new("Spring launch"), status)
        .await
        .err()
        .ok_or_eyre("status should be rejected")?;

    eyre::ensure!(err.kind() == expected, "unexpected kind for {err}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_owner_or_admin_edits(market: Marketplace) -> eyre::Result<()> {
    let campaign = market.publish("Spring launch").await?;
    let stranger = Caller::new(UserId::new(), Role::Creator);

    let err = market
        .campaigns
        .update(&stranger, campaign.id(), CampaignDraft::new("Hijacked"), Some("bogus"))
        .await
        .err()
        .ok_or_eyre("stranger must not edit")?;
    eyre::ensure!(err.kind() == ErrorKind::Forbidden, "ownership checked before the status");

    let missing = market
        .campaigns
        .update(&market.creator, CampaignId::new(), CampaignDraft::new("Ghost"), None)
        .await
        .err()
        .ok_or_eyre("unknown campaign cannot be edited")?;
    eyre::ensure!(missing.kind() == ErrorKind::NotFound, "unknown campaign is not found");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn settled_campaign_cannot_be_edited(market: Marketplace) -> eyre::Result<()> {
    let job = market.engage(None).await?;
    market.jobs.complete_job(&market.creator, job.id()).await?;

    let err = market
        .campaigns
        .update(&market.creator, job.campaign_id(), CampaignDraft::new("Again"), Some("open"))
        .await
        .err()
        .ok_or_eyre("completed campaign is frozen")?;

    eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}");
    let stored = market.campaigns.get(&market.creator, job.campaign_id()).await?;
    eyre::ensure!(stored.status() == CampaignStatus::Completed, "status kept");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn my_campaigns_counts_applicants(market: Marketplace) -> eyre::Result<()> {
    let popular = market.publish("Popular").await?;
    let quiet = market.publish("Quiet").await?;
    market.apply(&popular, None).await?;
    let other = Caller::new(UserId::new(), Role::Receiver);
    market
        .applications
        .apply(&other, popular.id(), None, Some("30"))
        .await?;

    let overviews = market.campaigns.my_campaigns(&market.creator).await?;

    eyre::ensure!(overviews.len() == 2, "both campaigns listed");
    let first = overviews.first().ok_or_eyre("newest campaign")?;
    eyre::ensure!(first.campaign.id() == quiet.id(), "newest campaign first");
    eyre::ensure!(first.applicant_count == 0, "quiet campaign has no applicants");
    let second = overviews.get(1).ok_or_eyre("older campaign")?;
    eyre::ensure!(second.applicant_count == 2, "popular campaign has two applicants");

    let err = market
        .campaigns
        .my_campaigns(&market.receiver)
        .await
        .err()
        .ok_or_eyre("receivers have no campaigns")?;
    eyre::ensure!(err.kind() == ErrorKind::Forbidden, "creator role required");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn campaign_list_shows_receiver_applications(market: Marketplace) -> eyre::Result<()> {
    let first = market.publish("First").await?;
    let second = market.publish("Second").await?;
    market.publish("Third").await?;
    let application = market.apply(&second, None).await?;

    let listings = market.campaigns.list(&market.receiver, Page::default()).await?;
    let titles: Vec<_> = listings.iter().map(|listing| listing.campaign.title()).collect();
    eyre::ensure!(titles == ["Third", "Second", "First"], "newest first, got {titles:?}");
    let applied: Vec<_> = listings
        .iter()
        .filter_map(|listing| listing.application.as_ref())
        .collect();
    eyre::ensure!(applied.len() == 1, "one application shown");
    eyre::ensure!(
        applied.first().map(|app| app.id()) == Some(application.id()),
        "application attached to its campaign"
    );

    let page = market.campaigns.list(&market.creator, Page::new(1, 2)).await?;
    eyre::ensure!(page.len() == 1, "one campaign on the second page");
    eyre::ensure!(
        page.first().map(|listing| listing.campaign.id()) == Some(first.id()),
        "oldest campaign last"
    );
    eyre::ensure!(
        page.iter().all(|listing| listing.application.is_none()),
        "creators see no applications"
    );
    Ok(())
}
