//! Application services orchestrating engagement workflows.

mod access;
mod applications;
mod campaigns;
mod error;
mod jobs;

pub use applications::{AcceptanceOutcome, ApplicationService, SyncReport};
pub use campaigns::{CampaignListing, CampaignService};
pub use error::{EngagementServiceError, EngagementServiceResult};
pub use jobs::JobService;
