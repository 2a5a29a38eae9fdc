//! Error types for engagement domain validation and transitions.

use super::{
    ApplicationId, ApplicationStatus, CampaignId, CampaignStatus, JobId, JobStatus, MilestoneId,
    MilestoneStatus,
};
use crate::wallet::domain::WalletDomainError;
use thiserror::Error;

/// Errors returned while constructing or transitioning engagement values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngagementDomainError {
    /// A campaign or milestone title is empty after trimming.
    #[error("title must not be empty")]
    EmptyTitle,

    /// A milestone submission carries no evidence URL.
    #[error("evidence URL is required")]
    EmptyEvidenceUrl,

    /// A milestone deadline could not be parsed as RFC 3339.
    #[error("invalid deadline '{0}', expected an RFC 3339 timestamp")]
    InvalidDeadline(String),

    /// `completed` can only be reached through job settlement.
    #[error("application status '{}' is reserved for job settlement", ApplicationStatus::Completed.as_str())]
    ReservedApplicationStatus,

    /// The application has been settled and can no longer change.
    #[error("application {0} is already completed")]
    ApplicationFinalised(ApplicationId),

    /// Only pending applications can be withdrawn by the receiver.
    #[error("application {application_id} is {status} and can no longer be withdrawn", status = status.as_str())]
    ApplicationNotPending {
        /// Application concerned.
        application_id: ApplicationId,
        /// Its current status.
        status: ApplicationStatus,
    },

    /// The campaign no longer accepts applications.
    #[error("campaign {campaign_id} is {status} and does not accept applications", status = status.as_str())]
    CampaignNotOpen {
        /// Campaign concerned.
        campaign_id: CampaignId,
        /// Its current status.
        status: CampaignStatus,
    },

    /// `completed` can only be reached through job settlement.
    #[error("campaign status '{}' is reserved for job settlement", CampaignStatus::Completed.as_str())]
    ReservedCampaignStatus,

    /// The campaign has been settled and can no longer be edited.
    #[error("campaign {0} is already completed")]
    CampaignFinalised(CampaignId),

    /// The campaign deadline has passed.
    #[error("campaign {0} has passed its deadline")]
    CampaignExpired(CampaignId),

    /// The job is no longer in progress.
    #[error("job {job_id} is {status}, expected in_progress", status = status.as_str())]
    JobNotInProgress {
        /// Job concerned.
        job_id: JobId,
        /// Its current status.
        status: JobStatus,
    },

    /// The milestone state machine forbids this change.
    #[error(
        "invalid milestone transition for {milestone_id}: {from} -> {to}",
        from = from.as_str(),
        to = to.as_str()
    )]
    InvalidMilestoneTransition {
        /// Milestone concerned.
        milestone_id: MilestoneId,
        /// Current status.
        from: MilestoneStatus,
        /// Requested status.
        to: MilestoneStatus,
    },

    /// A settlement ledger entry was rejected.
    #[error(transparent)]
    Ledger(#[from] WalletDomainError),
}

/// Error returned while parsing engagement enumerations from input or
/// persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {field} value: {value}")]
pub struct ParseEngagementValueError {
    /// Which enumeration was being parsed.
    pub field: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEngagementValueError {
    pub(crate) fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}
