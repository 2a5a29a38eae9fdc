//! Role and ownership checks.

use super::EngagementServiceError;
use crate::engagement::domain::Job;
use crate::identity::{Caller, Role, UserId};

pub(super) fn require_role(
    caller: &Caller,
    role: Role,
    action: &'static str,
) -> Result<(), EngagementServiceError> {
    if caller.role() == role {
        Ok(())
    } else {
        Err(EngagementServiceError::RoleRequired { role, action })
    }
}

pub(super) fn require_user(
    caller: &Caller,
    owner: UserId,
    action: &'static str,
) -> Result<(), EngagementServiceError> {
    if caller.is(owner) {
        Ok(())
    } else {
        Err(forbidden(caller, action))
    }
}

pub(super) fn require_owner_or_admin(
    caller: &Caller,
    owner: UserId,
    action: &'static str,
) -> Result<(), EngagementServiceError> {
    if caller.is_admin() || caller.is(owner) {
        Ok(())
    } else {
        Err(forbidden(caller, action))
    }
}

/// Jobs are visible to their creator, their influencer and admins.
pub(super) fn require_job_party(
    caller: &Caller,
    job: &Job,
    action: &'static str,
) -> Result<(), EngagementServiceError> {
    if caller.is_admin() || caller.is(job.creator_id()) || caller.is(job.influencer_id()) {
        Ok(())
    } else {
        Err(forbidden(caller, action))
    }
}

pub(super) const fn forbidden(caller: &Caller, action: &'static str) -> EngagementServiceError {
    EngagementServiceError::Forbidden {
        user_id: caller.user_id(),
        action,
    }
}
