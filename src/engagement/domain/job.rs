//! Job aggregate and acceptance provisioning.

use super::{
    Application, Campaign, CampaignId, EngagementDomainError, JobId, Milestone,
    MilestoneHistoryEntry, ParseEngagementValueError,
};
use crate::identity::UserId;
use crate::wallet::domain::Money;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Work is under way.
    InProgress,
    /// Settled; funds have moved. Terminal.
    Completed,
    /// Abandoned by the creator without payment. Terminal.
    Cancelled,
}

impl JobStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for JobStatus {
    type Error = ParseEngagementValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseEngagementValueError::new("job status", value)),
        }
    }
}

/// Active engagement between a campaign creator and one influencer.
///
/// The creator is copied from the campaign when the job is provisioned so
/// ownership checks need no campaign lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    campaign_id: CampaignId,
    creator_id: UserId,
    influencer_id: UserId,
    description: Option<String>,
    price: Option<Money>,
    status: JobStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedJobData {
    /// Persisted job identifier.
    pub id: JobId,
    /// Parent campaign.
    pub campaign_id: CampaignId,
    /// Campaign creator.
    pub creator_id: UserId,
    /// Assigned influencer.
    pub influencer_id: UserId,
    /// Job brief.
    pub description: Option<String>,
    /// Agreed price.
    pub price: Option<Money>,
    /// Lifecycle status.
    pub status: JobStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Settlement timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Records created together when an application is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProvision {
    /// The new job.
    pub job: Job,
    /// Its default milestone.
    pub milestone: Milestone,
    /// The milestone's creation history entry.
    pub history: MilestoneHistoryEntry,
}

impl Job {
    /// Builds the job, default milestone and creation history for an
    /// accepted application.
    ///
    /// The job takes the campaign brief as its description and the bid as
    /// its price.
    #[must_use]
    pub fn provision(
        application: &Application,
        campaign: &Campaign,
        clock: &impl Clock,
    ) -> JobProvision {
        let job = Self {
            id: JobId::new(),
            campaign_id: campaign.id(),
            creator_id: campaign.creator_id(),
            influencer_id: application.receiver_id(),
            description: campaign.description().map(str::to_owned),
            price: application.bid_amount(),
            status: JobStatus::InProgress,
            created_at: clock.utc(),
            completed_at: None,
        };
        let (milestone, history) = Milestone::default_for(&job, campaign.deadline(), clock);
        JobProvision {
            job,
            milestone,
            history,
        }
    }

    /// Reconstructs a job from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedJobData) -> Self {
        Self {
            id: data.id,
            campaign_id: data.campaign_id,
            creator_id: data.creator_id,
            influencer_id: data.influencer_id,
            description: data.description,
            price: data.price,
            status: data.status,
            created_at: data.created_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the parent campaign.
    #[must_use]
    pub const fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    /// Returns the campaign creator.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the assigned influencer.
    #[must_use]
    pub const fn influencer_id(&self) -> UserId {
        self.influencer_id
    }

    /// Returns the job brief.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the agreed price.
    #[must_use]
    pub const fn price(&self) -> Option<Money> {
        self.price
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the settlement timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the amount settlement must transfer, if any.
    #[must_use]
    pub fn payable_amount(&self) -> Option<Money> {
        self.price.filter(|price| !price.is_zero())
    }

    /// Checks that the job still accepts work.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::JobNotInProgress`] otherwise.
    pub const fn ensure_in_progress(&self) -> Result<(), EngagementDomainError> {
        match self.status {
            JobStatus::InProgress => Ok(()),
            status => Err(EngagementDomainError::JobNotInProgress {
                job_id: self.id,
                status,
            }),
        }
    }

    /// Marks the job as settled.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::JobNotInProgress`] when the job has
    /// already been completed or cancelled.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), EngagementDomainError> {
        self.ensure_in_progress()?;
        self.status = JobStatus::Completed;
        self.completed_at = Some(clock.utc());
        Ok(())
    }

    /// Cancels the job without payment.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::JobNotInProgress`] when the job has
    /// already been completed or cancelled.
    pub fn cancel(&mut self) -> Result<(), EngagementDomainError> {
        self.ensure_in_progress()?;
        self.status = JobStatus::Cancelled;
        Ok(())
    }
}
