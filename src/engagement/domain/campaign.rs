//! Campaign aggregate.

use super::{CampaignId, EngagementDomainError, ParseEngagementValueError};
use crate::identity::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Accepting applications.
    Open,
    /// Withdrawn by the creator.
    Closed,
    /// A job under the campaign has been settled.
    Completed,
}

impl CampaignStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for CampaignStatus {
    type Error = ParseEngagementValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEngagementValueError::new("campaign status", value)),
        }
    }
}

/// Creator-supplied fields for a new campaign.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignDraft {
    /// Campaign title; must not be blank.
    pub title: String,
    /// Optional brief.
    pub description: Option<String>,
    /// Last day on which applications are accepted.
    pub deadline: Option<NaiveDate>,
}

impl CampaignDraft {
    /// Creates a draft with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the campaign brief.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the application deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// A paid content engagement posted by a creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    id: CampaignId,
    creator_id: UserId,
    title: String,
    description: Option<String>,
    deadline: Option<NaiveDate>,
    status: CampaignStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCampaignData {
    /// Persisted campaign identifier.
    pub id: CampaignId,
    /// Owning creator.
    pub creator_id: UserId,
    /// Campaign title.
    pub title: String,
    /// Optional brief.
    pub description: Option<String>,
    /// Application deadline.
    pub deadline: Option<NaiveDate>,
    /// Lifecycle status.
    pub status: CampaignStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Publishes a new open campaign.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::EmptyTitle`] when the title is blank.
    pub fn publish(
        creator_id: UserId,
        draft: CampaignDraft,
        clock: &impl Clock,
    ) -> Result<Self, EngagementDomainError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(EngagementDomainError::EmptyTitle);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: CampaignId::new(),
            creator_id,
            title: title.to_owned(),
            description: draft.description,
            deadline: draft.deadline,
            status: CampaignStatus::Open,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a campaign from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCampaignData) -> Self {
        Self {
            id: data.id,
            creator_id: data.creator_id,
            title: data.title,
            description: data.description,
            deadline: data.deadline,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the campaign identifier.
    #[must_use]
    pub const fn id(&self) -> CampaignId {
        self.id
    }

    /// Returns the owning creator.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the campaign title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the campaign brief.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the application deadline.
    #[must_use]
    pub const fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> CampaignStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Checks that the campaign still takes applications on `today`.
    ///
    /// The deadline day itself is still open.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::CampaignNotOpen`] or
    /// [`EngagementDomainError::CampaignExpired`].
    pub fn ensure_accepting_applications(
        &self,
        today: NaiveDate,
    ) -> Result<(), EngagementDomainError> {
        if self.status != CampaignStatus::Open {
            return Err(EngagementDomainError::CampaignNotOpen {
                campaign_id: self.id,
                status: self.status,
            });
        }
        match self.deadline {
            Some(deadline) if deadline < today => {
                Err(EngagementDomainError::CampaignExpired(self.id))
            }
            _ => Ok(()),
        }
    }

    /// Replaces the editable fields and sets the status to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::ReservedCampaignStatus`] when
    /// `status` is completed, [`EngagementDomainError::CampaignFinalised`]
    /// when the campaign has been settled, or
    /// [`EngagementDomainError::EmptyTitle`] when the title is blank.
    pub fn revise(
        &mut self,
        draft: CampaignDraft,
        status: CampaignStatus,
        clock: &impl Clock,
    ) -> Result<(), EngagementDomainError> {
        if status == CampaignStatus::Completed {
            return Err(EngagementDomainError::ReservedCampaignStatus);
        }
        if self.status == CampaignStatus::Completed {
            return Err(EngagementDomainError::CampaignFinalised(self.id));
        }
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(EngagementDomainError::EmptyTitle);
        }
        self.title = title.to_owned();
        self.description = draft.description;
        self.deadline = draft.deadline;
        self.status = status;
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Marks the campaign as completed by a job settlement.
    pub fn mark_completed(&mut self, clock: &impl Clock) {
        self.status = CampaignStatus::Completed;
        self.updated_at = clock.utc();
    }
}
