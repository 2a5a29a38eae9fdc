//! Milestone aggregate and its review state machine.

use super::{
    EngagementDomainError, HistoryAction, Job, JobId, MilestoneHistoryEntry, MilestoneId,
    ParseEngagementValueError,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const DEFAULT_TITLE: &str = "Final Deliverable";
const DEFAULT_DESCRIPTION: &str = "Submit your work evidence here.";
const DEFAULT_DEADLINE_DAYS: i64 = 7;

/// Review status of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    /// Awaiting a first submission.
    Pending,
    /// Evidence submitted; awaiting review.
    Submitted,
    /// Accepted by the creator. Terminal.
    Approved,
    /// Sent back by the creator for resubmission.
    Rejected,
}

impl MilestoneStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns whether the state machine allows moving to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending | Self::Submitted | Self::Rejected, Self::Submitted)
                | (Self::Submitted, Self::Approved | Self::Rejected)
        )
    }
}

impl TryFrom<&str> for MilestoneStatus {
    type Error = ParseEngagementValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseEngagementValueError::new("milestone status", value)),
        }
    }
}

/// Creator decision on a submitted milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Accept the submission.
    Approved,
    /// Send the submission back.
    Rejected,
}

impl ReviewDecision {
    const fn target(self) -> MilestoneStatus {
        match self {
            Self::Approved => MilestoneStatus::Approved,
            Self::Rejected => MilestoneStatus::Rejected,
        }
    }

    const fn action(self) -> HistoryAction {
        match self {
            Self::Approved => HistoryAction::Approved,
            Self::Rejected => HistoryAction::Rejected,
        }
    }
}

impl TryFrom<&str> for ReviewDecision {
    type Error = ParseEngagementValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseEngagementValueError::new("review decision", value)),
        }
    }
}

/// Evidence supplied by the influencer for a milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceSubmission {
    evidence_url: String,
    description: Option<String>,
}

impl EvidenceSubmission {
    /// Validates a submission.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::EmptyEvidenceUrl`] when the URL is
    /// blank.
    pub fn new(
        evidence_url: &str,
        description: Option<String>,
    ) -> Result<Self, EngagementDomainError> {
        let url = evidence_url.trim();
        if url.is_empty() {
            return Err(EngagementDomainError::EmptyEvidenceUrl);
        }
        Ok(Self {
            evidence_url: url.to_owned(),
            description,
        })
    }

    /// Returns the evidence URL.
    #[must_use]
    pub fn evidence_url(&self) -> &str {
        &self.evidence_url
    }

    /// Returns the accompanying description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Creator-supplied fields for an additional milestone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MilestoneDraft {
    /// Milestone title; must not be blank.
    pub title: String,
    /// Optional instructions.
    pub description: Option<String>,
    /// Due date; defaults to seven days from creation.
    pub deadline: Option<DateTime<Utc>>,
}

impl MilestoneDraft {
    /// Creates a draft with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the instructions.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date from an RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::InvalidDeadline`] when the text does
    /// not parse.
    pub fn with_deadline_text(mut self, deadline: &str) -> Result<Self, EngagementDomainError> {
        let parsed = DateTime::parse_from_rfc3339(deadline.trim())
            .map_err(|_| EngagementDomainError::InvalidDeadline(deadline.to_owned()))?;
        self.deadline = Some(parsed.with_timezone(&Utc));
        Ok(self)
    }
}

/// A deliverable checkpoint within a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    id: MilestoneId,
    job_id: JobId,
    title: String,
    description: Option<String>,
    deadline: DateTime<Utc>,
    status: MilestoneStatus,
    evidence_url: Option<String>,
    submission_description: Option<String>,
    creator_feedback: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMilestoneData {
    /// Persisted milestone identifier.
    pub id: MilestoneId,
    /// Owning job.
    pub job_id: JobId,
    /// Milestone title.
    pub title: String,
    /// Instructions.
    pub description: Option<String>,
    /// Due date.
    pub deadline: DateTime<Utc>,
    /// Review status.
    pub status: MilestoneStatus,
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

impl Milestone {
    /// Creates a pending milestone and its creation history entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::EmptyTitle`] when the title is blank.
    pub fn create(
        job_id: JobId,
        draft: MilestoneDraft,
        clock: &impl Clock,
    ) -> Result<(Self, MilestoneHistoryEntry), EngagementDomainError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(EngagementDomainError::EmptyTitle);
        }
        let timestamp = clock.utc();
        let deadline = draft
            .deadline
            .unwrap_or_else(|| timestamp + Duration::days(DEFAULT_DEADLINE_DAYS));
        Ok(Self::pending(
            job_id,
            title.to_owned(),
            draft.description,
            deadline,
            timestamp,
        ))
    }

    /// Builds the default milestone every new job starts with.
    ///
    /// The deadline is the start of the campaign deadline day (UTC) or seven
    /// days from now.
    #[must_use]
    pub fn default_for(
        job: &Job,
        campaign_deadline: Option<NaiveDate>,
        clock: &impl Clock,
    ) -> (Self, MilestoneHistoryEntry) {
        let timestamp = clock.utc();
        let deadline = campaign_deadline.map_or_else(
            || timestamp + Duration::days(DEFAULT_DEADLINE_DAYS),
            |date| date.and_time(NaiveTime::MIN).and_utc(),
        );
        Self::pending(
            job.id(),
            DEFAULT_TITLE.to_owned(),
            Some(DEFAULT_DESCRIPTION.to_owned()),
            deadline,
            timestamp,
        )
    }

    fn pending(
        job_id: JobId,
        title: String,
        description: Option<String>,
        deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    ) -> (Self, MilestoneHistoryEntry) {
        let milestone = Self {
            id: MilestoneId::new(),
            job_id,
            title,
            description,
            deadline,
            status: MilestoneStatus::Pending,
            evidence_url: None,
            submission_description: None,
            creator_feedback: None,
            created_at: timestamp,
            updated_at: timestamp,
        };
        let history = MilestoneHistoryEntry::record(
            milestone.id,
            HistoryAction::Created,
            Some(format!("Milestone '{}' created", milestone.title)),
            None,
            timestamp,
        );
        (milestone, history)
    }

    /// Reconstructs a milestone from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMilestoneData) -> Self {
        Self {
            id: data.id,
            job_id: data.job_id,
            title: data.title,
            description: data.description,
            deadline: data.deadline,
            status: data.status,
            evidence_url: data.evidence_url,
            submission_description: data.submission_description,
            creator_feedback: data.creator_feedback,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the milestone identifier.
    #[must_use]
    pub const fn id(&self) -> MilestoneId {
        self.id
    }

    /// Returns the owning job.
    #[must_use]
    pub const fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns the milestone title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the instructions.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the review status.
    #[must_use]
    pub const fn status(&self) -> MilestoneStatus {
        self.status
    }

    /// Returns the latest submitted evidence.
    #[must_use]
    pub fn evidence_url(&self) -> Option<&str> {
        self.evidence_url.as_deref()
    }

    /// Returns the latest submission description.
    #[must_use]
    pub fn submission_description(&self) -> Option<&str> {
        self.submission_description.as_deref()
    }

    /// Returns the latest creator feedback.
    #[must_use]
    pub fn creator_feedback(&self) -> Option<&str> {
        self.creator_feedback.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records an evidence submission.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::InvalidMilestoneTransition`] when the
    /// milestone has already been approved. The milestone is unchanged on
    /// error.
    pub fn submit(
        &mut self,
        submission: EvidenceSubmission,
        clock: &impl Clock,
    ) -> Result<MilestoneHistoryEntry, EngagementDomainError> {
        self.ensure_transition(MilestoneStatus::Submitted)?;
        let timestamp = clock.utc();
        let history = MilestoneHistoryEntry::record(
            self.id,
            HistoryAction::Submitted,
            submission.description.clone(),
            Some(submission.evidence_url.clone()),
            timestamp,
        );
        self.status = MilestoneStatus::Submitted;
        self.evidence_url = Some(submission.evidence_url);
        self.submission_description = submission.description;
        self.updated_at = timestamp;
        Ok(history)
    }

    /// Records the creator's decision on a submission.
    ///
    /// # Errors
    ///
    /// Returns [`EngagementDomainError::InvalidMilestoneTransition`] unless
    /// the milestone is awaiting review. The milestone is unchanged on error.
    pub fn review(
        &mut self,
        decision: ReviewDecision,
        feedback: Option<String>,
        clock: &impl Clock,
    ) -> Result<MilestoneHistoryEntry, EngagementDomainError> {
        self.ensure_transition(decision.target())?;
        let timestamp = clock.utc();
        let history = MilestoneHistoryEntry::record(
            self.id,
            decision.action(),
            feedback.clone(),
            None,
            timestamp,
        );
        self.status = decision.target();
        self.creator_feedback = feedback;
        self.updated_at = timestamp;
        Ok(history)
    }

    const fn ensure_transition(&self, target: MilestoneStatus) -> Result<(), EngagementDomainError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(EngagementDomainError::InvalidMilestoneTransition {
                milestone_id: self.id,
                from: self.status,
                to: target,
            })
        }
    }
}
