//! Provisions missing jobs for accepted applications.
//!
//! Usage:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/collabhub sync_jobs
//! ```
//!
//! Every accepted application without a job gets one, together with its
//! default milestone. Failures are logged per application and the sweep
//! carries on; the exit status is non-zero only when the sweep cannot run.

use collabhub::config::{ConfigError, DatabaseConfig};
use collabhub::engagement::{
    adapters::postgres::PostgresEngagementRepository,
    services::{ApplicationService, EngagementServiceError},
};
use collabhub::identity::Caller;
use collabhub::telemetry;
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::util::TryInitError;

/// Errors that stop the sweep before or while it runs.
#[derive(Debug, Error)]
enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TryInitError),
    #[error(transparent)]
    Sweep(#[from] EngagementServiceError),
}

#[tokio::main]
async fn main() -> Result<(), SyncError> {
    let config = DatabaseConfig::from_env()?;
    telemetry::init()?;

    let pool = config.build_pool()?;
    let service = ApplicationService::new(
        Arc::new(PostgresEngagementRepository::new(pool)),
        Arc::new(DefaultClock),
    );
    let report = service.sync_jobs(&Caller::system()).await?;
    info!(
        synced = report.synced,
        failed = report.failed,
        "sync_jobs complete"
    );
    Ok(())
}
