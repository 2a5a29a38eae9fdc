//! Append-only milestone audit trail.

use super::{HistoryEntryId, MilestoneId, ParseEngagementValueError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action recorded in a milestone history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// The milestone was created.
    Created,
    /// The influencer submitted evidence.
    Submitted,
    /// The creator approved the submission.
    Approved,
    /// The creator rejected the submission.
    Rejected,
}

impl HistoryAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for HistoryAction {
    type Error = ParseEngagementValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseEngagementValueError::new("history action", value)),
        }
    }
}

/// Immutable snapshot of one milestone action.
///
/// Entries copy the evidence and description at the time of the action so
/// later milestone edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneHistoryEntry {
    id: HistoryEntryId,
    milestone_id: MilestoneId,
    action: HistoryAction,
    description: Option<String>,
    evidence_url: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHistoryData {
    /// Persisted entry identifier.
    pub id: HistoryEntryId,
    /// Milestone the entry belongs to.
    pub milestone_id: MilestoneId,
    /// Recorded action.
    pub action: HistoryAction,
    /// Description or feedback captured with the action.
    pub description: Option<String>,
    /// Evidence captured with the action.
    pub evidence_url: Option<String>,
    /// When the action happened.
    pub created_at: DateTime<Utc>,
}

impl MilestoneHistoryEntry {
    pub(super) fn record(
        milestone_id: MilestoneId,
        action: HistoryAction,
        description: Option<String>,
        evidence_url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: HistoryEntryId::new(),
            milestone_id,
            action,
            description,
            evidence_url,
            created_at,
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHistoryData) -> Self {
        Self {
            id: data.id,
            milestone_id: data.milestone_id,
            action: data.action,
            description: data.description,
            evidence_url: data.evidence_url,
            created_at: data.created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryEntryId {
        self.id
    }

    /// Returns the milestone the entry belongs to.
    #[must_use]
    pub const fn milestone_id(&self) -> MilestoneId {
        self.milestone_id
    }

    /// Returns the recorded action.
    #[must_use]
    pub const fn action(&self) -> HistoryAction {
        self.action
    }

    /// Returns the captured description or feedback.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the captured evidence URL.
    #[must_use]
    pub fn evidence_url(&self) -> Option<&str> {
        self.evidence_url.as_deref()
    }

    /// Returns when the action happened.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
