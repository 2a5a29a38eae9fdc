//! Campaign engagements: applications, jobs, milestones and settlement.
//!
//! A receiver applies to an open campaign. When the campaign creator
//! accepts, exactly one job is provisioned for the (campaign, receiver)
//! pair together with a default milestone. The influencer submits evidence
//! against milestones and the creator reviews it; every milestone action
//! appends an immutable history entry. Completing the job settles the
//! agreed price between the two wallets in one atomic step.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
