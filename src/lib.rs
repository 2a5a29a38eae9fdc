//! Collabhub: campaign marketplace core.
//!
//! Creators publish campaigns, receivers apply to them, and an accepted
//! application becomes a job tracked through milestones. Completing a job
//! settles its price between the creator's and the influencer's wallets.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Orchestration taking an explicit [`identity::Caller`]
//!
//! # Modules
//!
//! - [`engagement`]: Campaigns, applications, jobs, milestones and settlement
//! - [`wallet`]: Per-user wallets and the transaction ledger
//! - [`identity`]: Caller identity and roles
//! - [`error_kind`]: Boundary classification of service errors
//! - [`config`]: Database configuration
//! - [`telemetry`]: Tracing subscriber setup

#[macro_use]
mod id_macro;

pub mod config;
pub mod engagement;
pub mod error_kind;
pub mod identity;
pub mod telemetry;
pub mod wallet;
