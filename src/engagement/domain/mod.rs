//! Domain model for campaign engagements.
//!
//! An accepted application provisions exactly one job for its
//! (campaign, receiver) pair. Milestones track deliverables within the job
//! and every milestone action is mirrored by an immutable history entry.
//! Completing a job yields a [`SettlementPlan`] that moves the agreed price
//! between wallets and closes out the job, campaign and application.

mod application;
mod campaign;
mod error;
mod history;
mod ids;
mod job;
mod milestone;
mod settlement;

pub use application::{Application, ApplicationStatus, PersistedApplicationData};
pub use campaign::{Campaign, CampaignDraft, CampaignStatus, PersistedCampaignData};
pub use error::{EngagementDomainError, ParseEngagementValueError};
pub use history::{HistoryAction, MilestoneHistoryEntry, PersistedHistoryData};
pub use ids::{ApplicationId, CampaignId, HistoryEntryId, JobId, MilestoneId};
pub use job::{Job, JobProvision, JobStatus, PersistedJobData};
pub use milestone::{
    EvidenceSubmission, Milestone, MilestoneDraft, MilestoneStatus, PersistedMilestoneData,
    ReviewDecision,
};
pub use settlement::{SettlementPlan, TransferPlan};
