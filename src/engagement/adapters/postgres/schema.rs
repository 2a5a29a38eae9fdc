//! Diesel schema for campaigns and their engagements.

diesel::table! {
    /// Campaigns posted by creators.
    campaigns (id) {
        /// Campaign identifier.
        id -> Uuid,
        /// Owning creator.
        creator_id -> Uuid,
        /// Campaign title.
        #[max_length = 255]
        title -> Varchar,
        /// Campaign brief.
        description -> Nullable<Text>,
        /// Last day applications are accepted.
        deadline -> Nullable<Date>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Receiver applications, unique per (campaign, receiver).
    applications (id) {
        /// Application identifier.
        id -> Uuid,
        /// Campaign applied to.
        campaign_id -> Uuid,
        /// Applying receiver.
        receiver_id -> Uuid,
        /// Cover message.
        message -> Text,
        /// Proposed price in minor units.
        bid_amount_minor -> Nullable<Int8>,
        /// Review status.
        #[max_length = 20]
        status -> Varchar,
        /// Submission timestamp.
        applied_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Jobs, unique per (campaign, influencer).
    jobs (id) {
        /// Job identifier.
        id -> Uuid,
        /// Parent campaign.
        campaign_id -> Uuid,
        /// Campaign creator.
        creator_id -> Uuid,
        /// Assigned influencer.
        influencer_id -> Uuid,
        /// Job brief.
        description -> Nullable<Text>,
        /// Agreed price in minor units.
        price_minor -> Nullable<Int8>,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Settlement timestamp.
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Milestones, deleted with their job.
    milestones (id) {
        /// Milestone identifier.
        id -> Uuid,
        /// Owning job.
        job_id -> Uuid,
        /// Milestone title.
        #[max_length = 255]
        title -> Varchar,
        /// Instructions.
        description -> Nullable<Text>,
        /// Due date.
        deadline -> Timestamptz,
        /// Review status.
        #[max_length = 20]
        status -> Varchar,
        /// Latest submitted evidence.
        evidence_url -> Nullable<Text>,
        /// Latest submission description.
        submission_description -> Nullable<Text>,
        /// Latest creator feedback.
        creator_feedback -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only milestone audit trail.
    milestone_history (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Milestone the entry belongs to.
        milestone_id -> Uuid,
        /// Recorded action.
        #[max_length = 20]
        action -> Varchar,
        /// Description or feedback captured with the action.
        description -> Nullable<Text>,
        /// Evidence captured with the action.
        evidence_url -> Nullable<Text>,
        /// When the action happened.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(applications -> campaigns (campaign_id));
diesel::joinable!(jobs -> campaigns (campaign_id));
diesel::joinable!(milestones -> jobs (job_id));
diesel::joinable!(milestone_history -> milestones (milestone_id));

diesel::allow_tables_to_appear_in_same_query!(
    campaigns,
    applications,
    jobs,
    milestones,
    milestone_history,
);
