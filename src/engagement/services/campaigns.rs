//! Campaign publication, editing and listings.

use super::{
    EngagementServiceError, EngagementServiceResult,
    access::{require_owner_or_admin, require_role},
};
use crate::engagement::{
    domain::{Application, Campaign, CampaignDraft, CampaignId, CampaignStatus},
    ports::{CampaignOverview, EngagementRepository, Page},
};
use crate::identity::{Caller, Role};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// A campaign as listed to a caller, with the caller's own application to
/// it when the caller is a receiver who has applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignListing {
    /// The campaign.
    pub campaign: Campaign,
    /// The caller's application, if any.
    pub application: Option<Application>,
}

/// Campaign orchestration service.
#[derive(Clone)]
pub struct CampaignService<R, C>
where
    R: EngagementRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> CampaignService<R, C>
where
    R: EngagementRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new campaign service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Publishes an open campaign owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::RoleRequired`] unless the caller is
    /// a creator, or a domain error when the title is blank.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn publish(
        &self,
        caller: &Caller,
        draft: CampaignDraft,
    ) -> EngagementServiceResult<Campaign> {
        require_role(caller, Role::Creator, "publish campaigns")?;
        let campaign = Campaign::publish(caller.user_id(), draft, &*self.clock)?;
        self.repository.store_campaign(&campaign).await?;
        info!(campaign = %campaign.id(), "campaign published");
        Ok(campaign)
    }

    /// Looks up a campaign.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::CampaignNotFound`] when the campaign
    /// does not exist.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), campaign = %id))]
    pub async fn get(&self, caller: &Caller, id: CampaignId) -> EngagementServiceResult<Campaign> {
        self.load_campaign(id).await
    }

    /// Replaces a campaign's title, brief and deadline, and optionally opens
    /// or closes it. A missing `status_text` keeps the current status.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::CampaignNotFound`] for an unknown
    /// campaign, [`EngagementServiceError::Forbidden`] unless the caller owns
    /// the campaign or is an admin, [`EngagementServiceError::InvalidValue`]
    /// for an unknown status, a domain error for a blank title, the reserved
    /// completed status or a settled campaign, and a repository conflict when
    /// the campaign was settled concurrently.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id(), campaign = %id))]
    pub async fn update(
        &self,
        caller: &Caller,
        id: CampaignId,
        draft: CampaignDraft,
        status_text: Option<&str>,
    ) -> EngagementServiceResult<Campaign> {
        let mut campaign = self.load_campaign(id).await?;
        require_owner_or_admin(caller, campaign.creator_id(), "edit this campaign")?;
        let previous = campaign.status();
        let status = status_text
            .map(CampaignStatus::try_from)
            .transpose()?
            .unwrap_or(previous);

        campaign.revise(draft, status, &*self.clock)?;
        self.repository.update_campaign(&campaign, previous).await?;
        info!(status = status.as_str(), "campaign updated");
        Ok(campaign)
    }

    /// Lists the caller's own campaigns with applicant counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementServiceError::RoleRequired`] unless the caller is
    /// a creator.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn my_campaigns(
        &self,
        caller: &Caller,
    ) -> EngagementServiceResult<Vec<CampaignOverview>> {
        require_role(caller, Role::Creator, "list own campaigns")?;
        Ok(self
            .repository
            .campaigns_for_creator(caller.user_id())
            .await?)
    }

    /// Lists one page of all campaigns, newest first.
    ///
    /// Receivers also see their own application to each listed campaign.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the campaigns cannot be read.
    #[tracing::instrument(skip_all, fields(user = %caller.user_id()))]
    pub async fn list(
        &self,
        caller: &Caller,
        page: Page,
    ) -> EngagementServiceResult<Vec<CampaignListing>> {
        let campaigns = self.repository.list_campaigns(page).await?;
        let mut listings = Vec::with_capacity(campaigns.len());
        for campaign in campaigns {
            let application = if caller.role() == Role::Receiver {
                self.repository
                    .find_application_for_pair(campaign.id(), caller.user_id())
                    .await?
            } else {
                None
            };
            listings.push(CampaignListing {
                campaign,
                application,
            });
        }
        Ok(listings)
    }

    async fn load_campaign(&self, id: CampaignId) -> EngagementServiceResult<Campaign> {
        self.repository
            .find_campaign(id)
            .await?
            .ok_or(EngagementServiceError::CampaignNotFound(id))
    }
}
