//! Diesel row models for engagement persistence.

use super::schema::{applications, campaigns, jobs, milestone_history, milestones};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Row model for campaigns.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = campaigns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CampaignRow {
    /// Campaign identifier.
    pub id: uuid::Uuid,
    /// Owning creator.
    pub creator_id: uuid::Uuid,
    /// Campaign title.
    pub title: String,
    /// Campaign brief.
    pub description: Option<String>,
    /// Application deadline.
    pub deadline: Option<NaiveDate>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for applications.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    /// Application identifier.
    pub id: uuid::Uuid,
    /// Campaign applied to.
    pub campaign_id: uuid::Uuid,
    /// Applying receiver.
    pub receiver_id: uuid::Uuid,
    /// Cover message.
    pub message: String,
    /// Proposed price in minor units.
    pub bid_amount_minor: Option<i64>,
    /// Review status.
    pub status: String,
    /// Submission timestamp.
    pub applied_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for jobs.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRow {
    /// Job identifier.
    pub id: uuid::Uuid,
    /// Parent campaign.
    pub campaign_id: uuid::Uuid,
    /// Campaign creator.
    pub creator_id: uuid::Uuid,
    /// Assigned influencer.
    pub influencer_id: uuid::Uuid,
    /// Job brief.
    pub description: Option<String>,
    /// Agreed price in minor units.
    pub price_minor: Option<i64>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Settlement timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Row model for milestones.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = milestones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MilestoneRow {
    /// Milestone identifier.
    pub id: uuid::Uuid,
    /// Owning job.
    pub job_id: uuid::Uuid,
    /// Milestone title.
    pub title: String,
    /// Instructions.
    pub description: Option<String>,
    /// Due date.
    pub deadline: DateTime<Utc>,
    /// Review status.
    pub status: String,
    /// Latest submitted evidence.
    pub evidence_url: Option<String>,
    /// Latest submission description.
    pub submission_description: Option<String>,
    /// Latest creator feedback.
    pub creator_feedback: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for milestone history entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = milestone_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Milestone the entry belongs to.
    pub milestone_id: uuid::Uuid,
    /// Recorded action.
    pub action: String,
    /// Description or feedback captured with the action.
    pub description: Option<String>,
    /// Evidence captured with the action.
    pub evidence_url: Option<String>,
    /// When the action happened.
    pub created_at: DateTime<Utc>,
}
