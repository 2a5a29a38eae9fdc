//! Port contracts for engagement persistence and settlement.

mod repository;
mod settlement;

pub use repository::{
    ApplicationQuery, CampaignOverview, EngagementRepository, EngagementRepositoryError,
    EngagementRepositoryResult, JobProvisionOutcome, JobScope, Page, guard_application_write,
    guard_campaign_write,
};
pub use settlement::{SettledTransfer, SettlementPort, SettlementReceipt};
