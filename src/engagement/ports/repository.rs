//! Repository port for campaigns, applications, jobs and milestones.

use crate::engagement::domain::{
    Application, ApplicationId, ApplicationStatus, Campaign, CampaignId, CampaignStatus, Job,
    JobId, JobProvision, JobStatus, Milestone, MilestoneHistoryEntry, MilestoneId,
    MilestoneStatus,
};
use crate::identity::UserId;
use crate::wallet::ports::WalletRepositoryError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for engagement repository operations.
pub type EngagementRepositoryResult<T> = Result<T, EngagementRepositoryError>;

/// Zero-based page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Page index, starting at zero.
    pub number: u32,
    /// Maximum number of items per page.
    pub size: u32,
}

impl Page {
    /// Default number of items per page.
    pub const DEFAULT_SIZE: u32 = 10;

    /// Creates a page selector.
    #[must_use]
    pub const fn new(number: u32, size: u32) -> Self {
        Self { number, size }
    }

    /// Returns how many items precede this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// Filter for a receiver's own applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplicationQuery {
    /// Only return applications in this status.
    pub status: Option<ApplicationStatus>,
    /// Page to return; results are ordered newest first.
    pub page: Page,
}

/// A creator's campaign with the number of applications it has received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignOverview {
    /// The campaign.
    pub campaign: Campaign,
    /// Applications currently stored for it.
    pub applicant_count: u64,
}

/// Which jobs a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobScope {
    /// Jobs assigned to this influencer.
    Influencer(UserId),
    /// Jobs on campaigns owned by this creator.
    Creator(UserId),
    /// Every job.
    All,
}

/// Result of persisting an acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobProvisionOutcome {
    /// The supplied provision was stored.
    Created(Job),
    /// A job already existed for the (campaign, influencer) pair; the
    /// provision was discarded.
    AlreadyExists(Job),
}

impl JobProvisionOutcome {
    /// Returns the job that now exists for the pair.
    #[must_use]
    pub const fn job(&self) -> &Job {
        match self {
            Self::Created(job) | Self::AlreadyExists(job) => job,
        }
    }

    /// Returns whether this call created the job.
    #[must_use]
    pub const fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Engagement persistence contract.
///
/// Every mutating method is atomic: either all of its writes become visible
/// or none do.
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Stores a new campaign.
    async fn store_campaign(&self, campaign: &Campaign) -> EngagementRepositoryResult<()>;

    /// Finds a campaign by identifier.
    async fn find_campaign(&self, id: CampaignId) -> EngagementRepositoryResult<Option<Campaign>>;

    /// Persists an edited campaign whose status was `expected` when loaded.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementRepositoryError::CampaignNotFound`] when the
    /// campaign does not exist, or
    /// [`EngagementRepositoryError::CampaignStatusChanged`] when the stored
    /// status is neither `expected` nor the status being written.
    async fn update_campaign(
        &self,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> EngagementRepositoryResult<()>;

    /// Returns a creator's campaigns with applicant counts, newest first.
    async fn campaigns_for_creator(
        &self,
        creator_id: UserId,
    ) -> EngagementRepositoryResult<Vec<CampaignOverview>>;

    /// Returns one page of all campaigns, newest first.
    async fn list_campaigns(&self, page: Page) -> EngagementRepositoryResult<Vec<Campaign>>;

    /// Stores a new application.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementRepositoryError::DuplicateApplication`] when the
    /// receiver has already applied to the campaign.
    async fn store_application(&self, application: &Application)
    -> EngagementRepositoryResult<()>;

    /// Persists an application status change made from `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementRepositoryError::ApplicationNotFound`] when the
    /// application does not exist, or
    /// [`EngagementRepositoryError::ApplicationStatusChanged`] when the stored
    /// status is neither `expected` nor the status being written.
    async fn update_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> EngagementRepositoryResult<()>;

    /// Deletes an application that is still pending.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementRepositoryError::ApplicationNotPending`] when the
    /// creator decided on it concurrently.
    async fn delete_pending_application(
        &self,
        id: ApplicationId,
    ) -> EngagementRepositoryResult<()>;

    /// Finds an application by identifier.
    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> EngagementRepositoryResult<Option<Application>>;

    /// Finds the application a receiver made to a campaign.
    async fn find_application_for_pair(
        &self,
        campaign_id: CampaignId,
        receiver_id: UserId,
    ) -> EngagementRepositoryResult<Option<Application>>;

    /// Returns all applications to a campaign, newest first.
    async fn applications_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> EngagementRepositoryResult<Vec<Application>>;

    /// Returns one page of a receiver's applications, newest first.
    async fn applications_for_receiver(
        &self,
        receiver_id: UserId,
        query: ApplicationQuery,
    ) -> EngagementRepositoryResult<Vec<Application>>;

    /// Returns accepted applications that have no job yet.
    async fn accepted_applications_without_job(
        &self,
    ) -> EngagementRepositoryResult<Vec<Application>>;

    /// Persists an accepted application and provisions its job exactly once.
    ///
    /// The existence check and the job insert run in one transaction with
    /// the application locked, so concurrent acceptances of the same
    /// application, or of two applications for the same pair, yield one
    /// job.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementRepositoryError::ApplicationStatusChanged`] when
    /// the stored status is neither `expected` nor accepted. Nothing is
    /// written in that case.
    async fn record_acceptance(
        &self,
        application: &Application,
        expected: ApplicationStatus,
        provision: &JobProvision,
    ) -> EngagementRepositoryResult<JobProvisionOutcome>;

    /// Finds a job by identifier.
    async fn find_job(&self, id: JobId) -> EngagementRepositoryResult<Option<Job>>;

    /// Returns jobs in scope, newest first.
    async fn list_jobs(&self, scope: JobScope) -> EngagementRepositoryResult<Vec<Job>>;

    /// Persists a job status change made from `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementRepositoryError::JobStatusChanged`] when the
    /// stored status is no longer `expected`.
    async fn update_job(&self, job: &Job, expected: JobStatus) -> EngagementRepositoryResult<()>;

    /// Finds a milestone by identifier.
    async fn find_milestone(
        &self,
        id: MilestoneId,
    ) -> EngagementRepositoryResult<Option<Milestone>>;

    /// Returns the milestones of a job, oldest first.
    async fn milestones_for_job(&self, job_id: JobId)
    -> EngagementRepositoryResult<Vec<Milestone>>;

    /// Stores a new milestone with its creation history entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementRepositoryError::JobStatusChanged`] when the job
    /// is no longer in progress.
    async fn insert_milestone(
        &self,
        milestone: &Milestone,
        history: &MilestoneHistoryEntry,
    ) -> EngagementRepositoryResult<()>;

    /// Persists a milestone change and appends its history entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementRepositoryError::MilestoneStatusChanged`] when the
    /// stored status is no longer `expected`, or
    /// [`EngagementRepositoryError::JobStatusChanged`] when the job is no
    /// longer in progress. Nothing is written in either case.
    async fn record_milestone_change(
        &self,
        milestone: &Milestone,
        expected: MilestoneStatus,
        history: &MilestoneHistoryEntry,
    ) -> EngagementRepositoryResult<()>;

    /// Returns the history of a milestone, oldest first.
    async fn history_for_milestone(
        &self,
        milestone_id: MilestoneId,
    ) -> EngagementRepositoryResult<Vec<MilestoneHistoryEntry>>;
}

/// Errors returned by engagement repository implementations.
#[derive(Debug, Clone, Error)]
pub enum EngagementRepositoryError {
    /// The receiver has already applied to the campaign.
    #[error("receiver {receiver_id} has already applied to campaign {campaign_id}")]
    DuplicateApplication {
        /// Campaign applied to.
        campaign_id: CampaignId,
        /// Applying receiver.
        receiver_id: UserId,
    },

    /// The campaign was not found.
    #[error("campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    /// The application was not found.
    #[error("application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    /// The job was not found.
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// The milestone was not found.
    #[error("milestone not found: {0}")]
    MilestoneNotFound(MilestoneId),

    /// The application left the pending state concurrently.
    #[error("application {0} is no longer pending")]
    ApplicationNotPending(ApplicationId),

    /// The stored campaign status differs from the one the edit was based
    /// on.
    #[error("campaign {campaign_id} is {}, expected {}", actual.as_str(), expected.as_str())]
    CampaignStatusChanged {
        /// Campaign concerned.
        campaign_id: CampaignId,
        /// Status the edit was based on.
        expected: CampaignStatus,
        /// Status found in storage.
        actual: CampaignStatus,
    },

    /// The stored application status differs from the one the change was
    /// based on.
    #[error("application {application_id} is {}, expected {}", actual.as_str(), expected.as_str())]
    ApplicationStatusChanged {
        /// Application concerned.
        application_id: ApplicationId,
        /// Status the change was based on.
        expected: ApplicationStatus,
        /// Status found in storage.
        actual: ApplicationStatus,
    },

    /// The stored job status differs from the one the change was based on.
    #[error("job {job_id} is {}, expected {}", actual.as_str(), expected.as_str())]
    JobStatusChanged {
        /// Job concerned.
        job_id: JobId,
        /// Status the change was based on.
        expected: JobStatus,
        /// Status found in storage.
        actual: JobStatus,
    },

    /// The stored milestone status differs from the one the change was
    /// based on.
    #[error("milestone {milestone_id} is {}, expected {}", actual.as_str(), expected.as_str())]
    MilestoneStatusChanged {
        /// Milestone concerned.
        milestone_id: MilestoneId,
        /// Status the change was based on.
        expected: MilestoneStatus,
        /// Status found in storage.
        actual: MilestoneStatus,
    },

    /// A wallet posting made during settlement failed.
    #[error(transparent)]
    Wallet(#[from] WalletRepositoryError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl EngagementRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Checks that an application write based on `expected` may overwrite the
/// stored status `actual`.
///
/// Rewriting the status already stored is allowed, so repeated identical
/// decisions stay idempotent.
///
/// # Errors
///
/// Returns [`EngagementRepositoryError::ApplicationStatusChanged`] otherwise.
pub fn guard_application_write(
    application: &Application,
    expected: ApplicationStatus,
    actual: ApplicationStatus,
) -> EngagementRepositoryResult<()> {
    if actual == expected || actual == application.status() {
        return Ok(());
    }
    Err(EngagementRepositoryError::ApplicationStatusChanged {
        application_id: application.id(),
        expected,
        actual,
    })
}

/// Checks that a campaign edit based on `expected` may overwrite the stored
/// status `actual`.
///
/// # Errors
///
/// Returns [`EngagementRepositoryError::CampaignStatusChanged`] otherwise.
pub fn guard_campaign_write(
    campaign: &Campaign,
    expected: CampaignStatus,
    actual: CampaignStatus,
) -> EngagementRepositoryResult<()> {
    if actual == expected || actual == campaign.status() {
        return Ok(());
    }
    Err(EngagementRepositoryError::CampaignStatusChanged {
        campaign_id: campaign.id(),
        expected,
        actual,
    })
}

impl From<diesel::result::Error> for EngagementRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
