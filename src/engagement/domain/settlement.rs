//! Job completion planning.

use super::{Application, Campaign, EngagementDomainError, Job};
use crate::wallet::domain::{LedgerEntry, Money, TransactionKind, Wallet};
use mockable::Clock;

/// Paired ledger entries moving a job's price from creator to influencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Amount moved.
    pub amount: Money,
    /// Debit posted to the creator's wallet.
    pub payment: LedgerEntry,
    /// Credit posted to the influencer's wallet.
    pub payout: LedgerEntry,
}

/// Every change a job settlement must persist atomically.
///
/// The wallets are candidates: adapters open them only when the user has no
/// wallet yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    /// The job, already marked completed.
    pub job: Job,
    /// The parent campaign, already marked completed.
    pub campaign: Campaign,
    /// The matching application, already marked completed, if one exists.
    pub application: Option<Application>,
    /// Wallet opened for the creator when absent.
    pub creator_wallet: Wallet,
    /// Wallet opened for the influencer when absent.
    pub influencer_wallet: Wallet,
    /// Funds to move; `None` when the job has no positive price.
    pub transfer: Option<TransferPlan>,
}

impl SettlementPlan {
    /// Applies the completion transitions and derives the ledger entries.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::JobNotInProgress`] when the job has
    /// already been completed or cancelled.
    pub fn prepare(
        mut job: Job,
        mut campaign: Campaign,
        mut application: Option<Application>,
        clock: &impl Clock,
    ) -> Result<Self, EngagementDomainError> {
        job.complete(clock)?;
        campaign.mark_completed(clock);
        if let Some(found) = application.as_mut() {
            found.mark_completed(clock);
        }
        let transfer = job
            .payable_amount()
            .map(|amount| Self::transfer(&job, &campaign, amount, clock))
            .transpose()?;
        Ok(Self {
            creator_wallet: Wallet::open(job.creator_id(), clock),
            influencer_wallet: Wallet::open(job.influencer_id(), clock),
            job,
            campaign,
            application,
            transfer,
        })
    }

    fn transfer(
        job: &Job,
        campaign: &Campaign,
        amount: Money,
        clock: &impl Clock,
    ) -> Result<TransferPlan, EngagementDomainError> {
        let timestamp = clock.utc();
        let payment = LedgerEntry::new(
            TransactionKind::Payment,
            amount,
            format!("Payment for job {}: {}", job.id(), campaign.title()),
            timestamp,
        )?
        .with_related_job(job.id().into_inner());
        let payout = LedgerEntry::new(
            TransactionKind::Deposit,
            amount,
            format!("Payment received for job {}", job.id()),
            timestamp,
        )?
        .with_related_job(job.id().into_inner());
        Ok(TransferPlan {
            amount,
            payment,
            payout,
        })
    }
}
