//! Shared marketplace fixture for in-memory integration tests.

use std::sync::Arc;

use collabhub::engagement::{
    adapters::memory::InMemoryEngagementRepository,
    domain::{Application, Campaign, CampaignDraft, Job, Milestone},
    services::{ApplicationService, CampaignService, JobService},
};
use collabhub::identity::{Caller, Role, UserId};
use collabhub::wallet::{adapters::memory::InMemoryWalletRepository, services::WalletService};
use eyre::{OptionExt, WrapErr};
use mockable::DefaultClock;
use rstest::fixture;

/// Services wired to one in-memory repository, plus the three actors.
pub struct Marketplace {
    pub repository: Arc<InMemoryEngagementRepository>,
    pub campaigns: CampaignService<InMemoryEngagementRepository, DefaultClock>,
    pub applications: ApplicationService<InMemoryEngagementRepository, DefaultClock>,
    pub jobs: JobService<InMemoryEngagementRepository, DefaultClock>,
    pub wallets: WalletService<InMemoryWalletRepository, DefaultClock>,
    pub creator: Caller,
    pub receiver: Caller,
    pub admin: Caller,
}

impl Marketplace {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryEngagementRepository::new());
        let clock = Arc::new(DefaultClock);
        let wallet_repository = Arc::new(repository.wallets().clone());
        Self {
            campaigns: CampaignService::new(Arc::clone(&repository), Arc::clone(&clock)),
            applications: ApplicationService::new(Arc::clone(&repository), Arc::clone(&clock)),
            jobs: JobService::new(Arc::clone(&repository), Arc::clone(&clock)),
            wallets: WalletService::new(wallet_repository, clock),
            repository,
            creator: Caller::new(UserId::new(), Role::Creator),
            receiver: Caller::new(UserId::new(), Role::Receiver),
            admin: Caller::new(UserId::new(), Role::Admin),
        }
    }

    /// Publishes an open campaign owned by the creator.
    pub async fn publish(&self, title: &str) -> eyre::Result<Campaign> {
        self.campaigns
            .publish(
                &self.creator,
                CampaignDraft::new(title).with_description("Short-form video series"),
            )
            .await
            .wrap_err("publish campaign")
    }

    /// Applies to `campaign` as the receiver with an optional bid.
    pub async fn apply(&self, campaign: &Campaign, bid: Option<&str>) -> eyre::Result<Application> {
        self.applications
            .apply(&self.receiver, campaign.id(), Some("Keen to help"), bid)
            .await
            .wrap_err("apply to campaign")
    }

    /// Publishes, applies and accepts, returning the provisioned job.
    pub async fn engage(&self, bid: Option<&str>) -> eyre::Result<Job> {
        let campaign = self.publish("Spring launch").await?;
        let application = self.apply(&campaign, bid).await?;
        let outcome = self
            .applications
            .accept(&self.creator, application.id())
            .await
            .wrap_err("accept application")?;
        let provisioned = outcome.job.ok_or_eyre("acceptance should provision a job")?;
        Ok(provisioned.job().clone())
    }

    /// Returns the single default milestone of `job`.
    pub async fn default_milestone(&self, job: &Job) -> eyre::Result<Milestone> {
        let milestones = self
            .jobs
            .milestones(&self.creator, job.id())
            .await
            .wrap_err("list milestones")?;
        eyre::ensure!(milestones.len() == 1, "expected one default milestone");
        milestones.into_iter().next().ok_or_eyre("missing milestone")
    }

    /// Funds the creator's wallet.
    pub async fn fund_creator(&self, amount: &str) -> eyre::Result<()> {
        self.wallets
            .deposit(&self.creator, amount)
            .await
            .wrap_err("fund creator wallet")?;
        Ok(())
    }
}

impl Default for Marketplace {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides a fresh marketplace for each test.
#[fixture]
pub fn market() -> Marketplace {
    Marketplace::new()
}
