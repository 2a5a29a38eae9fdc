//! Boundary classification shared by every service error.

use serde::{Deserialize, Serialize};

/// Coarse failure category an outer transport maps onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No authenticated session.
    Unauthorized,
    /// Authenticated, but lacking the role or ownership required.
    Forbidden,
    /// Referenced entity does not exist.
    NotFound,
    /// Malformed input or a value outside the accepted set.
    BadRequest,
    /// Business rule violation or a concurrent change.
    Conflict,
    /// Wallet balance cannot cover the requested debit.
    InsufficientFunds,
    /// Infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Conflict => "conflict",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Internal => "internal",
        }
    }
}
