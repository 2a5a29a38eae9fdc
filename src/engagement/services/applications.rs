//! Application workflow: apply, decide, withdraw, list and job sync.

use super::{
    EngagementServiceError, EngagementServiceResult,
    access::{require_owner_or_admin, require_role, require_user},
};
use crate::engagement::{
    domain::{
        Application, ApplicationId, ApplicationStatus, Campaign, CampaignId,
        EngagementDomainError, Job,
    },
    ports::{
        ApplicationQuery, EngagementRepository, EngagementRepositoryError, JobProvisionOutcome,
    },
};
use crate::identity::{Caller, Role};
use crate::wallet::domain::Money;
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Application state after a creator decision, with the job it maps to when
/// the application was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceOutcome {
    /// The updated application.
    pub application: Application,
    /// Present only for accepted applications.
    pub job: Option<JobProvisionOutcome>,
}

/// Counts reported by the job sync sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Jobs provisioned by this sweep.
    pub synced: usize,
    /// Applications that could not be provisioned.
    pub failed: usize,
}

/// Application orchestration service.
#[derive(Clone)]
pub struct ApplicationService<R, C>
where
    R: EngagementRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ApplicationService<R, C>
where
    R: EngagementRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new application service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Applies to a campaign on behalf of a receiver.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::RoleRequired`] unless the caller is
    /// a receiver, [`EngagementServiceError::CampaignNotFound`] for an
    /// unknown campaign, a domain error when the bid is malformed or the
    /// campaign is closed or expired, and a repository error when the
    /// receiver has already applied.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), campaign = %campaign_id))]
    pub async fn apply(
        &self,
        caller: &Caller,
        campaign_id: CampaignId,
        message: Option<&str>,
        bid_text: Option<&str>,
    ) -> EngagementServiceResult<Application> {
        require_role(caller, Role::Receiver, "apply to campaigns")?;
        let bid = bid_text
            .map(Money::parse)
            .transpose()
            .map_err(EngagementDomainError::from)?;
        let campaign = self.load_campaign(campaign_id).await?;
        let application =
            Application::submit(&campaign, caller.user_id(), message, bid, &*self.clock)?;
        self.repository.store_application(&application).await?;
        info!(application = %application.id(), "application submitted");
        Ok(application)
    }

    /// Records the campaign creator's decision on an application.
    ///
    /// Accepting provisions the job and its default milestone unless a job
    /// already exists for the (campaign, receiver) pair, so repeated
    /// acceptances are harmless.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::ApplicationNotFound`] for an unknown
    /// application, [`EngagementServiceError::Forbidden`] unless the caller
    /// created the campaign, [`EngagementServiceError::InvalidValue`] for an
    /// unknown status, a domain error for the reserved completed status or a
    /// settled application, and a repository conflict when the application
    /// was settled or re-decided concurrently.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), application = %application_id))]
    pub async fn update_status(
        &self,
        caller: &Caller,
        application_id: ApplicationId,
        status_text: &str,
    ) -> EngagementServiceResult<AcceptanceOutcome> {
        let mut application = self.load_application(application_id).await?;
        let campaign = self.load_campaign(application.campaign_id()).await?;
        require_user(caller, campaign.creator_id(), "review applications to this campaign")?;
        let status = ApplicationStatus::try_from(status_text)?;

        let previous = application.status();
        application.decide(status, &*self.clock)?;
        if status != ApplicationStatus::Accepted {
            self.repository
                .update_application(&application, previous)
                .await?;
            info!(status = status.as_str(), "application status updated");
            return Ok(AcceptanceOutcome {
                application,
                job: None,
            });
        }

        let outcome = self.provision(&application, previous, &campaign).await?;
        Ok(AcceptanceOutcome {
            application,
            job: Some(outcome),
        })
    }

    /// Accepts an application. Shorthand for [`Self::update_status`].
    ///
    /// # Errors
    ///
    /// See [`Self::update_status`].
    pub async fn accept(
        &self,
        caller: &Caller,
        application_id: ApplicationId,
    ) -> EngagementServiceResult<AcceptanceOutcome> {
        self.update_status(caller, application_id, ApplicationStatus::Accepted.as_str())
            .await
    }

    /// Withdraws the caller's own pending application.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::Forbidden`] unless the caller made
    /// the application, or a conflict once the creator has decided on it.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), application = %application_id))]
    pub async fn withdraw(
        &self,
        caller: &Caller,
        application_id: ApplicationId,
    ) -> EngagementServiceResult<()> {
        let application = self.load_application(application_id).await?;
        require_user(caller, application.receiver_id(), "withdraw this application")?;
        application.ensure_withdrawable()?;
        self.repository
            .delete_pending_application(application_id)
            .await?;
        info!("application withdrawn");
        Ok(())
    }

    /// Lists applications to a campaign, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::Forbidden`] unless the caller
    /// created the campaign or is an admin.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), campaign = %campaign_id))]
    pub async fn campaign_applications(
        &self,
        caller: &Caller,
        campaign_id: CampaignId,
    ) -> EngagementServiceResult<Vec<Application>> {
        let campaign = self.load_campaign(campaign_id).await?;
        require_owner_or_admin(
            caller,
            campaign.creator_id(),
            "list applications to this campaign",
        )?;
        Ok(self
            .repository
            .applications_for_campaign(campaign_id)
            .await?)
    }

    /// Lists the caller's own applications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::RoleRequired`] unless the caller is
    /// a receiver.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn my_applications(
        &self,
        caller: &Caller,
        query: ApplicationQuery,
    ) -> EngagementServiceResult<Vec<Application>> {
        require_role(caller, Role::Receiver, "list own applications")?;
        Ok(self
            .repository
            .applications_for_receiver(caller.user_id(), query)
            .await?)
    }

    /// Provisions jobs for accepted applications that have none.
    ///
    /// Best effort: failures are logged and counted, never returned.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::RoleRequired`] unless the caller is
    /// an admin, or a repository error when the candidates cannot be listed.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn sync_jobs(&self, caller: &Caller) -> EngagementServiceResult<SyncReport> {
        require_role(caller, Role::Admin, "synchronise jobs")?;
        let pending = self
            .repository
            .accepted_applications_without_job()
            .await?;

        let mut report = SyncReport::default();
        for application in pending {
            match self.sync_one(&application).await {
                Ok(true) => report.synced += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(application = %application.id(), error = %err, "job sync failed");
                    report.failed += 1;
                }
            }
        }
        info!(synced = report.synced, failed = report.failed, "job sync finished");
        Ok(report)
    }

    /// Provisions the job for one swept application.
    ///
    /// Applications rejected, reopened or settled since the sweep listed them
    /// are skipped.
    async fn sync_one(&self, listed: &Application) -> EngagementServiceResult<bool> {
        let application = self.load_application(listed.id()).await?;
        if application.status() != ApplicationStatus::Accepted {
            debug!(application = %application.id(), "application no longer accepted");
            return Ok(false);
        }
        let campaign = self.load_campaign(application.campaign_id()).await?;
        match self
            .provision(&application, ApplicationStatus::Accepted, &campaign)
            .await
        {
            Ok(outcome) => Ok(outcome.was_created()),
            Err(EngagementServiceError::Repository(
                EngagementRepositoryError::ApplicationStatusChanged { actual, .. },
            )) => {
                debug!(
                    application = %application.id(),
                    status = actual.as_str(),
                    "application changed during sync"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn provision(
        &self,
        application: &Application,
        expected: ApplicationStatus,
        campaign: &Campaign,
    ) -> EngagementServiceResult<JobProvisionOutcome> {
        let provision = Job::provision(application, campaign, &*self.clock);
        let outcome = self
            .repository
            .record_acceptance(application, expected, &provision)
            .await?;
        if outcome.was_created() {
            info!(job = %outcome.job().id(), "job provisioned");
        } else {
            debug!(job = %outcome.job().id(), "job already provisioned");
        }
        Ok(outcome)
    }

    async fn load_campaign(&self, id: CampaignId) -> EngagementServiceResult<Campaign> {
        self.repository
            .find_campaign(id)
            .await?
            .ok_or(EngagementServiceError::CampaignNotFound(id))
    }

    async fn load_application(&self, id: ApplicationId) -> EngagementServiceResult<Application> {
        self.repository
            .find_application(id)
            .await?
            .ok_or(EngagementServiceError::ApplicationNotFound(id))
    }
}
