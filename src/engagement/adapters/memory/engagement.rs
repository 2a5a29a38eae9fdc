//! In-memory engagement repository sharing a wallet ledger for settlement.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::engagement::{
    domain::{
        Application, ApplicationId, ApplicationStatus, Campaign, CampaignId, CampaignStatus, Job,
        JobId, JobProvision, JobStatus, Milestone, MilestoneHistoryEntry, MilestoneId,
        MilestoneStatus, SettlementPlan,
    },
    ports::{
        ApplicationQuery, CampaignOverview, EngagementRepository, EngagementRepositoryError,
        EngagementRepositoryResult, JobProvisionOutcome, JobScope, Page, SettledTransfer,
        SettlementPort, SettlementReceipt, guard_application_write, guard_campaign_write,
    },
};
use crate::identity::UserId;
use crate::wallet::adapters::memory::{InMemoryWalletRepository, WalletLedgerState};
use crate::wallet::ports::WalletRepositoryResult;

/// Thread-safe in-memory engagement repository.
///
/// Settlement posts to the wrapped wallet repository while holding the
/// engagement lock, so wallet services built on [`Self::wallets`] observe
/// settlements atomically.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEngagementRepository {
    state: Arc<RwLock<EngagementState>>,
    wallets: InMemoryWalletRepository,
}

/// Records kept in insertion order.
#[derive(Debug, Default)]
struct EngagementState {
    campaigns: Vec<Campaign>,
    applications: Vec<Application>,
    jobs: Vec<Job>,
    job_pairs: HashMap<(CampaignId, UserId), JobId>,
    milestones: Vec<Milestone>,
    history: Vec<MilestoneHistoryEntry>,
}

impl EngagementState {
    fn campaign(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.iter().find(|campaign| campaign.id() == id)
    }

    fn campaign_mut(&mut self, id: CampaignId) -> Option<&mut Campaign> {
        self.campaigns.iter_mut().find(|campaign| campaign.id() == id)
    }

    fn application(&self, id: ApplicationId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| application.id() == id)
    }

    fn application_mut(&mut self, id: ApplicationId) -> Option<&mut Application> {
        self.applications
            .iter_mut()
            .find(|application| application.id() == id)
    }

    fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id() == id)
    }

    fn job_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| job.id() == id)
    }

    fn job_for_pair(&self, campaign_id: CampaignId, influencer_id: UserId) -> Option<&Job> {
        self.job_pairs
            .get(&(campaign_id, influencer_id))
            .and_then(|job_id| self.job(*job_id))
    }

    fn milestone_mut(&mut self, id: MilestoneId) -> Option<&mut Milestone> {
        self.milestones
            .iter_mut()
            .find(|milestone| milestone.id() == id)
    }

    fn ensure_job_in_progress(&self, job_id: JobId) -> EngagementRepositoryResult<()> {
        let job = self
            .job(job_id)
            .ok_or(EngagementRepositoryError::JobNotFound(job_id))?;
        match job.status() {
            JobStatus::InProgress => Ok(()),
            actual => Err(EngagementRepositoryError::JobStatusChanged {
                job_id,
                expected: JobStatus::InProgress,
                actual,
            }),
        }
    }

    fn provision(&mut self, provision: &JobProvision) {
        let job = &provision.job;
        self.job_pairs
            .insert((job.campaign_id(), job.influencer_id()), job.id());
        self.jobs.push(job.clone());
        self.milestones.push(provision.milestone.clone());
        self.history.push(provision.history.clone());
    }

    fn apply_settlement(&mut self, plan: &SettlementPlan) {
        if let Some(job) = self.job_mut(plan.job.id()) {
            *job = plan.job.clone();
        }
        if let Some(campaign) = self.campaign_mut(plan.campaign.id()) {
            *campaign = plan.campaign.clone();
        }
        if let Some(completed) = plan.application.as_ref()
            && let Some(stored) = self.application_mut(completed.id())
        {
            *stored = completed.clone();
        }
    }
}

impl InMemoryEngagementRepository {
    /// Creates an empty repository with its own wallet ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository settling against `wallets`.
    #[must_use]
    pub fn with_wallets(wallets: InMemoryWalletRepository) -> Self {
        Self {
            state: Arc::default(),
            wallets,
        }
    }

    /// Returns the wallet repository settlements post to.
    #[must_use]
    pub const fn wallets(&self) -> &InMemoryWalletRepository {
        &self.wallets
    }

    fn read_state(&self) -> EngagementRepositoryResult<RwLockReadGuard<'_, EngagementState>> {
        self.state.read().map_err(|err| {
            EngagementRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> EngagementRepositoryResult<RwLockWriteGuard<'_, EngagementState>> {
        self.state.write().map_err(|err| {
            EngagementRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Opens both wallets and posts the transfer, if any.
fn post_settlement(
    ledger: &mut WalletLedgerState,
    plan: &SettlementPlan,
) -> WalletRepositoryResult<Option<SettledTransfer>> {
    ledger.find_or_open(&plan.creator_wallet);
    ledger.find_or_open(&plan.influencer_wallet);
    let Some(transfer) = plan.transfer.as_ref() else {
        return Ok(None);
    };
    let payment = ledger.post(&plan.creator_wallet, &transfer.payment)?;
    let payout = ledger.post(&plan.influencer_wallet, &transfer.payout)?;
    Ok(Some(SettledTransfer { payment, payout }))
}

fn newest_first<T>(items: impl DoubleEndedIterator<Item = T>) -> Vec<T> {
    items.rev().collect()
}

#[async_trait]
impl EngagementRepository for InMemoryEngagementRepository {
    async fn store_campaign(&self, campaign: &Campaign) -> EngagementRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.campaigns.push(campaign.clone());
        Ok(())
    }

    async fn find_campaign(&self, id: CampaignId) -> EngagementRepositoryResult<Option<Campaign>> {
        let state = self.read_state()?;
        Ok(state.campaign(id).cloned())
    }

    async fn update_campaign(
        &self,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> EngagementRepositoryResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .campaign_mut(campaign.id())
            .ok_or(EngagementRepositoryError::CampaignNotFound(campaign.id()))?;
        guard_campaign_write(campaign, expected, stored.status())?;
        *stored = campaign.clone();
        Ok(())
    }

    async fn campaigns_for_creator(
        &self,
        creator_id: UserId,
    ) -> EngagementRepositoryResult<Vec<CampaignOverview>> {
        let state = self.read_state()?;
        let mut counts: HashMap<CampaignId, u64> = HashMap::new();
        for application in &state.applications {
            *counts.entry(application.campaign_id()).or_default() += 1;
        }
        Ok(newest_first(
            state
                .campaigns
                .iter()
                .filter(|campaign| campaign.creator_id() == creator_id)
                .map(|campaign| CampaignOverview {
                    campaign: campaign.clone(),
                    applicant_count: counts.get(&campaign.id()).copied().unwrap_or_default(),
                }),
        ))
    }

    async fn list_campaigns(&self, page: Page) -> EngagementRepositoryResult<Vec<Campaign>> {
        let state = self.read_state()?;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.size).unwrap_or(usize::MAX);
        Ok(state
            .campaigns
            .iter()
            .rev()
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn store_application(
        &self,
        application: &Application,
    ) -> EngagementRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.campaign(application.campaign_id()).is_none() {
            return Err(EngagementRepositoryError::CampaignNotFound(
                application.campaign_id(),
            ));
        }
        let duplicate = state.applications.iter().any(|existing| {
            existing.campaign_id() == application.campaign_id()
                && existing.receiver_id() == application.receiver_id()
        });
        if duplicate {
            return Err(EngagementRepositoryError::DuplicateApplication {
                campaign_id: application.campaign_id(),
                receiver_id: application.receiver_id(),
            });
        }
        state.applications.push(application.clone());
        Ok(())
    }

    async fn update_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> EngagementRepositoryResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .application_mut(application.id())
            .ok_or(EngagementRepositoryError::ApplicationNotFound(application.id()))?;
        guard_application_write(application, expected, stored.status())?;
        *stored = application.clone();
        Ok(())
    }

    async fn delete_pending_application(
        &self,
        id: ApplicationId,
    ) -> EngagementRepositoryResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .application(id)
            .ok_or(EngagementRepositoryError::ApplicationNotFound(id))?;
        if stored.status() != ApplicationStatus::Pending {
            return Err(EngagementRepositoryError::ApplicationNotPending(id));
        }
        state.applications.retain(|application| application.id() != id);
        Ok(())
    }

    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> EngagementRepositoryResult<Option<Application>> {
        let state = self.read_state()?;
        Ok(state.application(id).cloned())
    }

    async fn find_application_for_pair(
        &self,
        campaign_id: CampaignId,
        receiver_id: UserId,
    ) -> EngagementRepositoryResult<Option<Application>> {
        let state = self.read_state()?;
        Ok(state
            .applications
            .iter()
            .find(|application| {
                application.campaign_id() == campaign_id
                    && application.receiver_id() == receiver_id
            })
            .cloned())
    }

    async fn applications_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> EngagementRepositoryResult<Vec<Application>> {
        let state = self.read_state()?;
        Ok(newest_first(
            state
                .applications
                .iter()
                .filter(|application| application.campaign_id() == campaign_id)
                .cloned(),
        ))
    }

    async fn applications_for_receiver(
        &self,
        receiver_id: UserId,
        query: ApplicationQuery,
    ) -> EngagementRepositoryResult<Vec<Application>> {
        let state = self.read_state()?;
        let skip = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(query.page.size).unwrap_or(usize::MAX);
        Ok(state
            .applications
            .iter()
            .rev()
            .filter(|application| application.receiver_id() == receiver_id)
            .filter(|application| {
                query
                    .status
                    .is_none_or(|status| application.status() == status)
            })
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn accepted_applications_without_job(
        &self,
    ) -> EngagementRepositoryResult<Vec<Application>> {
        let state = self.read_state()?;
        Ok(state
            .applications
            .iter()
            .filter(|application| application.status() == ApplicationStatus::Accepted)
            .filter(|application| {
                state
                    .job_for_pair(application.campaign_id(), application.receiver_id())
                    .is_none()
            })
            .cloned()
            .collect())
    }

    async fn record_acceptance(
        &self,
        application: &Application,
        expected: ApplicationStatus,
        provision: &JobProvision,
    ) -> EngagementRepositoryResult<JobProvisionOutcome> {
        let mut state = self.write_state()?;
        let stored = state
            .application_mut(application.id())
            .ok_or(EngagementRepositoryError::ApplicationNotFound(application.id()))?;
        guard_application_write(application, expected, stored.status())?;
        *stored = application.clone();

        if let Some(existing) =
            state.job_for_pair(application.campaign_id(), application.receiver_id())
        {
            return Ok(JobProvisionOutcome::AlreadyExists(existing.clone()));
        }
        state.provision(provision);
        Ok(JobProvisionOutcome::Created(provision.job.clone()))
    }

    async fn find_job(&self, id: JobId) -> EngagementRepositoryResult<Option<Job>> {
        let state = self.read_state()?;
        Ok(state.job(id).cloned())
    }

    async fn list_jobs(&self, scope: JobScope) -> EngagementRepositoryResult<Vec<Job>> {
        let state = self.read_state()?;
        Ok(newest_first(
            state
                .jobs
                .iter()
                .filter(|job| match scope {
                    JobScope::Influencer(user_id) => job.influencer_id() == user_id,
                    JobScope::Creator(user_id) => job.creator_id() == user_id,
                    JobScope::All => true,
                })
                .cloned(),
        ))
    }

    async fn update_job(&self, job: &Job, expected: JobStatus) -> EngagementRepositoryResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .job_mut(job.id())
            .ok_or(EngagementRepositoryError::JobNotFound(job.id()))?;
        if stored.status() != expected {
            return Err(EngagementRepositoryError::JobStatusChanged {
                job_id: job.id(),
                expected,
                actual: stored.status(),
            });
        }
        *stored = job.clone();
        Ok(())
    }

    async fn find_milestone(
        &self,
        id: MilestoneId,
    ) -> EngagementRepositoryResult<Option<Milestone>> {
        let state = self.read_state()?;
        Ok(state
            .milestones
            .iter()
            .find(|milestone| milestone.id() == id)
            .cloned())
    }

    async fn milestones_for_job(
        &self,
        job_id: JobId,
    ) -> EngagementRepositoryResult<Vec<Milestone>> {
        let state = self.read_state()?;
        Ok(state
            .milestones
            .iter()
            .filter(|milestone| milestone.job_id() == job_id)
            .cloned()
            .collect())
    }

    async fn insert_milestone(
        &self,
        milestone: &Milestone,
        history: &MilestoneHistoryEntry,
    ) -> EngagementRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.ensure_job_in_progress(milestone.job_id())?;
        state.milestones.push(milestone.clone());
        state.history.push(history.clone());
        Ok(())
    }

    async fn record_milestone_change(
        &self,
        milestone: &Milestone,
        expected: MilestoneStatus,
        history: &MilestoneHistoryEntry,
    ) -> EngagementRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.ensure_job_in_progress(milestone.job_id())?;
        let stored = state
            .milestone_mut(milestone.id())
            .ok_or(EngagementRepositoryError::MilestoneNotFound(milestone.id()))?;
        if stored.status() != expected {
            return Err(EngagementRepositoryError::MilestoneStatusChanged {
                milestone_id: milestone.id(),
                expected,
                actual: stored.status(),
            });
        }
        *stored = milestone.clone();
        state.history.push(history.clone());
        Ok(())
    }

    async fn history_for_milestone(
        &self,
        milestone_id: MilestoneId,
    ) -> EngagementRepositoryResult<Vec<MilestoneHistoryEntry>> {
        let state = self.read_state()?;
        Ok(state
            .history
            .iter()
            .filter(|entry| entry.milestone_id() == milestone_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SettlementPort for InMemoryEngagementRepository {
    async fn settle(&self, plan: &SettlementPlan) -> EngagementRepositoryResult<SettlementReceipt> {
        let mut state = self.write_state()?;
        state.ensure_job_in_progress(plan.job.id())?;

        let mut ledger = self.wallets.write_state()?;
        let snapshot = ledger.clone();
        let transfer = match post_settlement(&mut ledger, plan) {
            Ok(transfer) => transfer,
            Err(err) => {
                *ledger = snapshot;
                return Err(err.into());
            }
        };
        drop(ledger);

        state.apply_settlement(plan);
        Ok(SettlementReceipt {
            job: plan.job.clone(),
            campaign: plan.campaign.clone(),
            application: plan.application.clone(),
            transfer,
        })
    }
}
