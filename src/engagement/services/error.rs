//! Service-level errors shared by the engagement services.

use crate::engagement::{
    domain::{
        ApplicationId, CampaignId, EngagementDomainError, JobId, MilestoneId,
        ParseEngagementValueError,
    },
    ports::EngagementRepositoryError,
};
use crate::error_kind::ErrorKind;
use crate::identity::{Role, UserId};
use crate::wallet::{domain::WalletDomainError, ports::WalletRepositoryError};
use thiserror::Error;

/// Result type for engagement service operations.
pub type EngagementServiceResult<T> = Result<T, EngagementServiceError>;

/// Errors returned by campaign, application and job services.
#[derive(Debug, Error)]
pub enum EngagementServiceError {
    /// The operation is reserved for another role.
    #[error("{} role required to {action}", role.as_str())]
    RoleRequired {
        /// Role the operation needs.
        role: Role,
        /// What the caller attempted.
        action: &'static str,
    },

    /// The caller does not own the resource.
    #[error("user {user_id} is not allowed to {action}")]
    Forbidden {
        /// Calling user.
        user_id: UserId,
        /// What the caller attempted.
        action: &'static str,
    },

    /// The campaign does not exist.
    #[error("campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    /// The application does not exist.
    #[error("application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    /// The job does not exist.
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// The milestone does not exist.
    #[error("milestone not found: {0}")]
    MilestoneNotFound(MilestoneId),

    /// The milestone belongs to a different job.
    #[error("milestone {milestone_id} does not belong to job {job_id}")]
    MilestoneJobMismatch {
        /// Milestone addressed.
        milestone_id: MilestoneId,
        /// Job addressed.
        job_id: JobId,
    },

    /// An enumerated input value was not recognised.
    #[error(transparent)]
    InvalidValue(#[from] ParseEngagementValueError),

    /// Domain validation or a state transition failed.
    #[error(transparent)]
    Domain(#[from] EngagementDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] EngagementRepositoryError),
}

impl EngagementServiceError {
    /// Returns the boundary classification of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RoleRequired { .. } | Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::CampaignNotFound(_)
            | Self::ApplicationNotFound(_)
            | Self::JobNotFound(_)
            | Self::MilestoneNotFound(_) => ErrorKind::NotFound,
            Self::MilestoneJobMismatch { .. } | Self::InvalidValue(_) => ErrorKind::BadRequest,
            Self::Domain(err) => domain_kind(err),
            Self::Repository(err) => repository_kind(err),
        }
    }
}

const fn domain_kind(err: &EngagementDomainError) -> ErrorKind {
    match err {
        EngagementDomainError::EmptyTitle
        | EngagementDomainError::EmptyEvidenceUrl
        | EngagementDomainError::InvalidDeadline(_)
        | EngagementDomainError::ReservedApplicationStatus
        | EngagementDomainError::ReservedCampaignStatus => ErrorKind::BadRequest,
        EngagementDomainError::ApplicationFinalised(_)
        | EngagementDomainError::CampaignFinalised(_)
        | EngagementDomainError::ApplicationNotPending { .. }
        | EngagementDomainError::CampaignNotOpen { .. }
        | EngagementDomainError::CampaignExpired(_)
        | EngagementDomainError::JobNotInProgress { .. }
        | EngagementDomainError::InvalidMilestoneTransition { .. } => ErrorKind::Conflict,
        EngagementDomainError::Ledger(ledger) => ledger_kind(ledger),
    }
}

const fn repository_kind(err: &EngagementRepositoryError) -> ErrorKind {
    match err {
        EngagementRepositoryError::DuplicateApplication { .. }
        | EngagementRepositoryError::ApplicationNotPending(_)
        | EngagementRepositoryError::ApplicationStatusChanged { .. }
        | EngagementRepositoryError::CampaignStatusChanged { .. }
        | EngagementRepositoryError::JobStatusChanged { .. }
        | EngagementRepositoryError::MilestoneStatusChanged { .. } => ErrorKind::Conflict,
        EngagementRepositoryError::CampaignNotFound(_)
        | EngagementRepositoryError::ApplicationNotFound(_)
        | EngagementRepositoryError::JobNotFound(_)
        | EngagementRepositoryError::MilestoneNotFound(_) => ErrorKind::NotFound,
        EngagementRepositoryError::Wallet(WalletRepositoryError::Domain(ledger)) => {
            ledger_kind(ledger)
        }
        EngagementRepositoryError::Wallet(WalletRepositoryError::Persistence(_))
        | EngagementRepositoryError::Persistence(_) => ErrorKind::Internal,
    }
}

const fn ledger_kind(err: &WalletDomainError) -> ErrorKind {
    match err {
        WalletDomainError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        WalletDomainError::InvalidAmount(_)
        | WalletDomainError::NonPositiveAmount
        | WalletDomainError::AmountOverflow => ErrorKind::BadRequest,
    }
}
