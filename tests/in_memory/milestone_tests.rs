//! Milestone submission and review over the in-memory repository.

use super::helpers::{Marketplace, market};
use collabhub::engagement::{
    domain::{HistoryAction, MilestoneDraft, MilestoneId, MilestoneStatus},
    services::EngagementServiceError,
};
use collabhub::error_kind::ErrorKind;
use collabhub::identity::{Caller, Role, UserId};
use eyre::OptionExt;
use rstest::rstest;

const EVIDENCE: &str = "https://videos.example/spring-launch";

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reject_resubmit_approve_records_full_history(market: Marketplace) -> eyre::Result<()> {
    let job = market.engage(None).await?;
    let milestone = market.default_milestone(&job).await?;

    let submitted = market
        .jobs
        .submit_milestone(&market.receiver, job.id(), milestone.id(), EVIDENCE, None)
        .await?;
    eyre::ensure!(submitted.status() == MilestoneStatus::Submitted, "first submission");
    eyre::ensure!(submitted.evidence_url() == Some(EVIDENCE), "evidence stored");

    let rejected = market
        .jobs
        .review_milestone(
            &market.creator,
            job.id(),
            milestone.id(),
            "REJECTED",
            Some("Needs captions".to_owned()),
        )
        .await?;
    eyre::ensure!(rejected.status() == MilestoneStatus::Rejected, "rejection");
    eyre::ensure!(rejected.creator_feedback() == Some("Needs captions"), "feedback stored");

    market
        .jobs
        .submit_milestone(
            &market.receiver,
            job.id(),
            milestone.id(),
            "https://videos.example/spring-launch-v2",
            Some("Captions added".to_owned()),
        )
        .await?;
    let approved = market
        .jobs
        .review_milestone(&market.creator, job.id(), milestone.id(), "approved", None)
        .await?;
    eyre::ensure!(approved.status() == MilestoneStatus::Approved, "approval");

    let history = market
        .jobs
        .milestone_history(&market.creator, job.id(), milestone.id())
        .await?;
    let actions: Vec<HistoryAction> = history.iter().map(|entry| entry.action()).collect();
    eyre::ensure!(
        actions
            == [
                HistoryAction::Created,
                HistoryAction::Submitted,
                HistoryAction::Rejected,
                HistoryAction::Submitted,
                HistoryAction::Approved,
            ],
        "unexpected history {actions:?}"
    );
    eyre::ensure!(
        history
            .windows(2)
            .all(|pair| pair.first().map(|entry| entry.created_at())
                <= pair.last().map(|entry| entry.created_at())),
        "history must be in chronological order"
    );
    Ok(())
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test(flavor = "multi_thread")]
async fn blank_evidence_changes_nothing(
    market: Marketplace,
    #[case] evidence: &str,
) -> eyre::Result<()> {
    let job = market.engage(None).await?;
    let milestone = market.default_milestone(&job).await?;

    let err = market
        .jobs
        .submit_milestone(&market.receiver, job.id(), milestone.id(), evidence, None)
        .await
        .err()
        .ok_or_eyre("blank evidence should be rejected")?;
    eyre::ensure!(err.kind() == ErrorKind::BadRequest, "unexpected error {err}");

    let after = market.default_milestone(&job).await?;
    eyre::ensure!(after.status() == MilestoneStatus::Pending, "status unchanged");
    let history = market
        .jobs
        .milestone_history(&market.creator, job.id(), milestone.id())
        .await?;
    eyre::ensure!(history.len() == 1, "no history row for a failed submission");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approved_milestone_cannot_be_resubmitted(market: Marketplace) -> eyre::Result<()> {
    let job = market.engage(None).await?;
    let milestone = market.default_milestone(&job).await?;
    market
        .jobs
        .submit_milestone(&market.receiver, job.id(), milestone.id(), EVIDENCE, None)
        .await?;
    market
        .jobs
        .review_milestone(&market.creator, job.id(), milestone.id(), "approved", None)
        .await?;

    let err = market
        .jobs
        .submit_milestone(&market.receiver, job.id(), milestone.id(), EVIDENCE, None)
        .await
        .err()
        .ok_or_eyre("approved milestone is terminal")?;
    eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_requires_a_submission(market: Marketplace) -> eyre::Result<()> {
    let job = market.engage(None).await?;
    let milestone = market.default_milestone(&job).await?;

    let err = market
        .jobs
        .review_milestone(&market.creator, job.id(), milestone.id(), "approved", None)
        .await
        .err()
        .ok_or_eyre("pending milestone cannot be reviewed")?;
    eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}");

    let invalid = market
        .jobs
        .review_milestone(&market.creator, job.id(), milestone.id(), "maybe", None)
        .await
        .err()
        .ok_or_eyre("unknown decision")?;
    eyre::ensure!(invalid.kind() == ErrorKind::BadRequest, "unexpected error {invalid}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_assigned_parties_act_on_milestones(market: Marketplace) -> eyre::Result<()> {
    let job = market.engage(None).await?;
    let milestone = market.default_milestone(&job).await?;
    let other_receiver = Caller::new(UserId::new(), Role::Receiver);

    let submit_err = market
        .jobs
        .submit_milestone(&other_receiver, job.id(), milestone.id(), EVIDENCE, None)
        .await
        .err()
        .ok_or_eyre("other receiver must not submit")?;
    eyre::ensure!(submit_err.kind() == ErrorKind::Forbidden, "submit: {submit_err}");

    let review_err = market
        .jobs
        .review_milestone(&market.receiver, job.id(), milestone.id(), "approved", None)
        .await
        .err()
        .ok_or_eyre("influencer must not review")?;
    eyre::ensure!(review_err.kind() == ErrorKind::Forbidden, "review: {review_err}");

    let view_err = market
        .jobs
        .milestones(&other_receiver, job.id())
        .await
        .err()
        .ok_or_eyre("outsider must not view milestones")?;
    eyre::ensure!(view_err.kind() == ErrorKind::Forbidden, "view: {view_err}");

    let admin_view = market.jobs.milestones(&market.admin, job.id()).await?;
    eyre::ensure!(admin_view.len() == 1, "admin sees every job");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn milestone_must_belong_to_the_job(market: Marketplace) -> eyre::Result<()> {
    let job = market.engage(None).await?;

    let missing = MilestoneId::new();
    let err = market
        .jobs
        .submit_milestone(&market.receiver, job.id(), missing, EVIDENCE, None)
        .await
        .err()
        .ok_or_eyre("unknown milestone")?;
    eyre::ensure!(
        matches!(err, EngagementServiceError::MilestoneNotFound(id) if id == missing),
        "unexpected error {err}"
    );

    let other_campaign = market.publish("Summer launch").await?;
    let other_application = market.apply(&other_campaign, None).await?;
    let other_job = market
        .applications
        .accept(&market.creator, other_application.id())
        .await?
        .job
        .ok_or_eyre("second job")?
        .job()
        .clone();
    let foreign = market.default_milestone(&other_job).await?;

    let mismatch = market
        .jobs
        .submit_milestone(&market.receiver, job.id(), foreign.id(), EVIDENCE, None)
        .await
        .err()
        .ok_or_eyre("milestone from another job")?;
    eyre::ensure!(
        matches!(mismatch, EngagementServiceError::MilestoneJobMismatch { .. }),
        "unexpected error {mismatch}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_adds_milestones_while_in_progress(market: Marketplace) -> eyre::Result<()> {
    let job = market.engage(None).await?;
    let draft = MilestoneDraft::new("Teaser cut")
        .with_description("15 second teaser")
        .with_deadline_text("2030-01-31T12:00:00Z")?;

    let added = market
        .jobs
        .add_milestone(&market.creator, job.id(), draft)
        .await?;
    eyre::ensure!(added.status() == MilestoneStatus::Pending, "new milestone is pending");

    let milestones = market.jobs.milestones(&market.receiver, job.id()).await?;
    eyre::ensure!(milestones.len() == 2, "default plus added milestone");
    eyre::ensure!(
        milestones.last().map(|milestone| milestone.id()) == Some(added.id()),
        "milestones are listed oldest first"
    );

    market.jobs.cancel_job(&market.creator, job.id()).await?;
    let err = market
        .jobs
        .add_milestone(&market.creator, job.id(), MilestoneDraft::new("Late extra"))
        .await
        .err()
        .ok_or_eyre("cancelled job accepts no milestones")?;
    eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_job_freezes_milestones(market: Marketplace) -> eyre::Result<()> {
    let job = market.engage(None).await?;
    let milestone = market.default_milestone(&job).await?;
    market.jobs.complete_job(&market.creator, job.id()).await?;

    let err = market
        .jobs
        .submit_milestone(&market.receiver, job.id(), milestone.id(), EVIDENCE, None)
        .await
        .err()
        .ok_or_eyre("completed job accepts no submissions")?;
    eyre::ensure!(err.kind() == ErrorKind::Conflict, "unexpected error {err}");
    Ok(())
}
