//! Caller identity passed explicitly into every marketplace operation.
//!
//! Session handling lives outside this crate. The boundary resolves the
//! authenticated principal and hands a [`Caller`] to the services, which
//! only ever compare identifiers and roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::error_kind::ErrorKind;

/// Unique identifier for a marketplace user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Marketplace role held by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator with read access to every engagement.
    Admin,
    /// Campaign owner who pays for deliverables.
    Creator,
    /// Influencer who applies to campaigns and delivers content.
    Receiver,
}

impl Role {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Creator => "creator",
            Self::Receiver => "receiver",
        }
    }
}

/// The authenticated user on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    user_id: UserId,
    role: Role,
}

impl Caller {
    /// Creates a caller identity.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Identity used by unattended maintenance jobs such as the job sync
    /// sweep.
    #[must_use]
    pub const fn system() -> Self {
        Self::new(UserId::from_uuid(Uuid::nil()), Role::Admin)
    }

    /// Returns the caller's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the caller's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` when the caller is the given user.
    #[must_use]
    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Returns `true` when the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Raised when an operation is attempted without an authenticated session.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("authentication required")]
pub struct Unauthenticated;

impl Unauthenticated {
    /// Returns the boundary classification of this failure.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        ErrorKind::Unauthorized
    }
}

/// Converts the principal resolved by the session layer into a [`Caller`].
///
/// # Errors
///
/// Returns [`Unauthenticated`] when no principal is present.
pub fn authenticate(principal: Option<Caller>) -> Result<Caller, Unauthenticated> {
    principal.ok_or(Unauthenticated)
}
