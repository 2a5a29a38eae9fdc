//! Identifier types for the engagement domain.

uuid_id!(
    /// Unique identifier for a campaign.
    CampaignId
);

uuid_id!(
    /// Unique identifier for an application to a campaign.
    ApplicationId
);

uuid_id!(
    /// Unique identifier for a job.
    JobId
);

uuid_id!(
    /// Unique identifier for a milestone within a job.
    MilestoneId
);

uuid_id!(
    /// Unique identifier for a milestone history entry.
    HistoryEntryId
);
