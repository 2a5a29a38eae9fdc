//! Port for atomic job settlement.

use super::EngagementRepositoryResult;
use crate::engagement::domain::{Application, Campaign, Job, SettlementPlan};
use crate::wallet::ports::Posting;
use async_trait::async_trait;

/// Ledger postings made by a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledTransfer {
    /// Debit on the creator's wallet.
    pub payment: Posting,
    /// Credit on the influencer's wallet.
    pub payout: Posting,
}

/// Persisted outcome of a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    /// The completed job.
    pub job: Job,
    /// The completed campaign.
    pub campaign: Campaign,
    /// The completed application, if one matched the job.
    pub application: Option<Application>,
    /// Postings, absent when the job carried no positive price.
    pub transfer: Option<SettledTransfer>,
}

/// Applies a [`SettlementPlan`] across engagement and wallet storage.
#[async_trait]
pub trait SettlementPort: Send + Sync {
    /// Persists every change in the plan in one transaction.
    ///
    /// Both wallets are opened when absent. The creator's wallet is debited
    /// before the influencer's is credited.
    ///
    /// # Errors
    ///
    /// Returns [`super::EngagementRepositoryError::JobStatusChanged`] when
    /// the job is no longer in progress, or a wallet error carrying
    /// insufficient funds when the creator cannot cover the price. Nothing
    /// is written on any error.
    async fn settle(&self, plan: &SettlementPlan) -> EngagementRepositoryResult<SettlementReceipt>;
}
