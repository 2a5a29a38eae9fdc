//! Application aggregate.

use super::{
    ApplicationId, Campaign, CampaignId, EngagementDomainError, ParseEngagementValueError,
};
use crate::identity::UserId;
use crate::wallet::domain::Money;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const DEFAULT_MESSAGE: &str = "No message provided";

/// Review status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting the creator's decision.
    Pending,
    /// Accepted; a job exists or is about to be provisioned.
    Accepted,
    /// Declined by the creator.
    Rejected,
    /// The resulting job has been settled. Terminal.
    Completed,
}

impl ApplicationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for ApplicationStatus {
    type Error = ParseEngagementValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEngagementValueError::new("application status", value)),
        }
    }
}

/// A receiver's bid to work on a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    campaign_id: CampaignId,
    receiver_id: UserId,
    message: String,
    bid_amount: Option<Money>,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedApplicationData {
    /// Persisted application identifier.
    pub id: ApplicationId,
    /// Campaign applied to.
    pub campaign_id: CampaignId,
    /// Applying receiver.
    pub receiver_id: UserId,
    /// Cover message.
    pub message: String,
    /// Proposed price.
    pub bid_amount: Option<Money>,
    /// Review status.
    pub status: ApplicationStatus,
    /// Submission timestamp.
    pub applied_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Submits a pending application to a campaign.
    ///
    /// A blank message is replaced with a placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error when the campaign is not open or its deadline has
    /// passed.
    pub fn submit(
        campaign: &Campaign,
        receiver_id: UserId,
        message: Option<&str>,
        bid_amount: Option<Money>,
        clock: &impl Clock,
    ) -> Result<Self, EngagementDomainError> {
        let timestamp = clock.utc();
        campaign.ensure_accepting_applications(timestamp.date_naive())?;
        let text = message
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(DEFAULT_MESSAGE);
        Ok(Self {
            id: ApplicationId::new(),
            campaign_id: campaign.id(),
            receiver_id,
            message: text.to_owned(),
            bid_amount,
            status: ApplicationStatus::Pending,
            applied_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an application from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedApplicationData) -> Self {
        Self {
            id: data.id,
            campaign_id: data.campaign_id,
            receiver_id: data.receiver_id,
            message: data.message,
            bid_amount: data.bid_amount,
            status: data.status,
            applied_at: data.applied_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the campaign applied to.
    #[must_use]
    pub const fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    /// Returns the applying receiver.
    #[must_use]
    pub const fn receiver_id(&self) -> UserId {
        self.receiver_id
    }

    /// Returns the cover message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the proposed price.
    #[must_use]
    pub const fn bid_amount(&self) -> Option<Money> {
        self.bid_amount
    }

    /// Returns the review status.
    #[must_use]
    pub const fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a creator decision.
    ///
    /// Pending, accepted and rejected may be set in any order. Setting the
    /// current status again is allowed and only refreshes the timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::ReservedApplicationStatus`] when
    /// `status` is completed, or
    /// [`EngagementDomainError::ApplicationFinalised`] when the application
    /// has already been settled.
    pub fn decide(
        &mut self,
        status: ApplicationStatus,
        clock: &impl Clock,
    ) -> Result<(), EngagementDomainError> {
        if status == ApplicationStatus::Completed {
            return Err(EngagementDomainError::ReservedApplicationStatus);
        }
        if self.status == ApplicationStatus::Completed {
            return Err(EngagementDomainError::ApplicationFinalised(self.id));
        }
        self.status = status;
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Checks that the receiver may still withdraw the application.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::ApplicationNotPending`] once the
    /// creator has made a decision.
    pub const fn ensure_withdrawable(&self) -> Result<(), EngagementDomainError> {
        match self.status {
            ApplicationStatus::Pending => Ok(()),
            status => Err(EngagementDomainError::ApplicationNotPending {
                application_id: self.id,
                status,
            }),
        }
    }

    /// Marks the application as settled.
    pub fn mark_completed(&mut self, clock: &impl Clock) {
        self.status = ApplicationStatus::Completed;
        self.updated_at = clock.utc();
    }
}
