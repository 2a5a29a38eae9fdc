//! Job, milestone and settlement workflow.

use super::{
    EngagementServiceError, EngagementServiceResult,
    access::{require_job_party, require_user},
};
use crate::engagement::{
    domain::{
        EvidenceSubmission, Job, JobId, JobStatus, Milestone, MilestoneDraft,
        MilestoneHistoryEntry, MilestoneId, ReviewDecision, SettlementPlan,
    },
    ports::{EngagementRepository, JobScope, SettlementPort, SettlementReceipt},
};
use crate::identity::{Caller, Role};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Job orchestration service.
#[derive(Clone)]
pub struct JobService<R, C>
where
    R: EngagementRepository + SettlementPort,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> JobService<R, C>
where
    R: EngagementRepository + SettlementPort,
    C: Clock + Send + Sync,
{
    /// Creates a new job service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns a job visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::JobNotFound`] for an unknown job or
    /// [`EngagementServiceError::Forbidden`] unless the caller is the job's
    /// creator, its influencer or an admin.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), job = %job_id))]
    pub async fn get_job(&self, caller: &Caller, job_id: JobId) -> EngagementServiceResult<Job> {
        let job = self.load_job(job_id).await?;
        require_job_party(caller, &job, "view this job")?;
        Ok(job)
    }

    /// Lists the caller's jobs, newest first.
    ///
    /// Receivers see jobs assigned to them, creators see jobs on their
    /// campaigns and admins see every job.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the listing fails.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn my_jobs(&self, caller: &Caller) -> EngagementServiceResult<Vec<Job>> {
        let scope = match caller.role() {
            Role::Receiver => JobScope::Influencer(caller.user_id()),
            Role::Creator => JobScope::Creator(caller.user_id()),
            Role::Admin => JobScope::All,
        };
        Ok(self.repository.list_jobs(scope).await?)
    }

    /// Lists a job's milestones, oldest first.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_job`].
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), job = %job_id))]
    pub async fn milestones(
        &self,
        caller: &Caller,
        job_id: JobId,
    ) -> EngagementServiceResult<Vec<Milestone>> {
        let job = self.load_job(job_id).await?;
        require_job_party(caller, &job, "view milestones of this job")?;
        Ok(self.repository.milestones_for_job(job_id).await?)
    }

    /// Returns a milestone's history, oldest first.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_job`], plus
    /// [`EngagementServiceError::MilestoneNotFound`] and
    /// [`EngagementServiceError::MilestoneJobMismatch`].
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), job = %job_id, milestone = %milestone_id))]
    pub async fn milestone_history(
        &self,
        caller: &Caller,
        job_id: JobId,
        milestone_id: MilestoneId,
    ) -> EngagementServiceResult<Vec<MilestoneHistoryEntry>> {
        let job = self.load_job(job_id).await?;
        require_job_party(caller, &job, "view milestone history of this job")?;
        self.load_milestone(job_id, milestone_id).await?;
        Ok(self.repository.history_for_milestone(milestone_id).await?)
    }

    /// Adds a milestone to a job in progress.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::Forbidden`] unless the caller
    /// created the job's campaign, and a domain error when the title is
    /// blank or the job is no longer in progress.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), job = %job_id))]
    pub async fn add_milestone(
        &self,
        caller: &Caller,
        job_id: JobId,
        draft: MilestoneDraft,
    ) -> EngagementServiceResult<Milestone> {
        let job = self.load_job(job_id).await?;
        require_user(caller, job.creator_id(), "add milestones to this job")?;
        job.ensure_in_progress()?;
        let (milestone, history) = Milestone::create(job_id, draft, &*self.clock)?;
        self.repository.insert_milestone(&milestone, &history).await?;
        info!(milestone = %milestone.id(), "milestone added");
        Ok(milestone)
    }

    /// Submits evidence for a milestone as the job's influencer.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::Forbidden`] unless the caller is the
    /// assigned influencer, [`EngagementServiceError::MilestoneJobMismatch`]
    /// when the milestone belongs to another job, a domain error when the
    /// evidence URL is blank, the milestone is approved or the job is no
    /// longer in progress, and a repository conflict when the milestone
    /// changed concurrently. Nothing is recorded on error.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), job = %job_id, milestone = %milestone_id))]
    pub async fn submit_milestone(
        &self,
        caller: &Caller,
        job_id: JobId,
        milestone_id: MilestoneId,
        evidence_url: &str,
        description: Option<String>,
    ) -> EngagementServiceResult<Milestone> {
        let job = self.load_job(job_id).await?;
        require_user(caller, job.influencer_id(), "submit milestones of this job")?;
        let mut milestone = self.load_milestone(job_id, milestone_id).await?;
        let submission = EvidenceSubmission::new(evidence_url, description)?;
        job.ensure_in_progress()?;

        let expected = milestone.status();
        let history = milestone.submit(submission, &*self.clock)?;
        self.repository
            .record_milestone_change(&milestone, expected, &history)
            .await?;
        info!("milestone submitted");
        Ok(milestone)
    }

    /// Approves or rejects a submitted milestone as the campaign creator.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::Forbidden`] unless the caller
    /// created the job's campaign, [`EngagementServiceError::InvalidValue`]
    /// when the decision is neither approved nor rejected, and a domain
    /// error when the milestone is not awaiting review.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), job = %job_id, milestone = %milestone_id))]
    pub async fn review_milestone(
        &self,
        caller: &Caller,
        job_id: JobId,
        milestone_id: MilestoneId,
        decision_text: &str,
        feedback: Option<String>,
    ) -> EngagementServiceResult<Milestone> {
        let job = self.load_job(job_id).await?;
        require_user(caller, job.creator_id(), "review milestones of this job")?;
        let decision = ReviewDecision::try_from(decision_text)?;
        let mut milestone = self.load_milestone(job_id, milestone_id).await?;
        job.ensure_in_progress()?;

        let expected = milestone.status();
        let history = milestone.review(decision, feedback, &*self.clock)?;
        self.repository
            .record_milestone_change(&milestone, expected, &history)
            .await?;
        info!(status = milestone.status().as_str(), "milestone reviewed");
        Ok(milestone)
    }

    /// Completes a job and pays the influencer.
    ///
    /// Moves the job price from the creator's wallet to the influencer's and
    /// marks the job, campaign and matching application completed, all in
    /// one atomic step. Jobs without a positive price settle without moving
    /// funds.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::Forbidden`] unless the caller
    /// created the job's campaign, a conflict when the job is no longer in
    /// progress, and a repository error carrying insufficient funds when the
    /// creator cannot cover the price. Nothing changes on error.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), job = %job_id))]
    pub async fn complete_job(
        &self,
        caller: &Caller,
        job_id: JobId,
    ) -> EngagementServiceResult<SettlementReceipt> {
        let job = self.load_job(job_id).await?;
        require_user(caller, job.creator_id(), "complete this job")?;
        let campaign = self
            .repository
            .find_campaign(job.campaign_id())
            .await?
            .ok_or(EngagementServiceError::CampaignNotFound(job.campaign_id()))?;
        let application = self
            .repository
            .find_application_for_pair(job.campaign_id(), job.influencer_id())
            .await?;

        let plan = SettlementPlan::prepare(job, campaign, application, &*self.clock)?;
        let receipt = self.repository.settle(&plan).await?;
        match receipt.transfer.as_ref() {
            Some(transfer) => info!(
                amount = %transfer.payment.transaction.amount(),
                creator_balance = %transfer.payment.wallet.balance(),
                "job settled"
            ),
            None => info!("job completed without payment"),
        }
        Ok(receipt)
    }

    /// Cancels a job in progress without moving funds.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::Forbidden`] unless the caller
    /// created the job's campaign, or a conflict when the job is no longer
    /// in progress.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), job = %job_id))]
    pub async fn cancel_job(&self, caller: &Caller, job_id: JobId) -> EngagementServiceResult<Job> {
        let mut job = self.load_job(job_id).await?;
        require_user(caller, job.creator_id(), "cancel this job")?;
        job.cancel()?;
        self.repository
            .update_job(&job, JobStatus::InProgress)
            .await?;
        info!("job cancelled");
        Ok(job)
    }

    async fn load_job(&self, id: JobId) -> EngagementServiceResult<Job> {
        self.repository
            .find_job(id)
            .await?
            .ok_or(EngagementServiceError::JobNotFound(id))
    }

    async fn load_milestone(
        &self,
        job_id: JobId,
        milestone_id: MilestoneId,
    ) -> EngagementServiceResult<Milestone> {
        let milestone = self
            .repository
            .find_milestone(milestone_id)
            .await?
            .ok_or(EngagementServiceError::MilestoneNotFound(milestone_id))?;
        if milestone.job_id() != job_id {
            return Err(EngagementServiceError::MilestoneJobMismatch {
                milestone_id,
                job_id,
            });
        }
        Ok(milestone)
    }
}
