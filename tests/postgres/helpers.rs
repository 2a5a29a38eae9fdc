//! Shared fixtures for `PostgreSQL` integration tests.
//!
//! Each test runs against its own database cloned from a migrated template
//! on the shared embedded cluster.

use std::sync::Arc;
use std::time::Duration;

use collabhub::config::DatabaseConfig;
use collabhub::engagement::{
    adapters::postgres::PostgresEngagementRepository,
    domain::{Application, Campaign, CampaignDraft, Job},
    services::{ApplicationService, CampaignService, JobService},
};
use collabhub::identity::{Caller, Role, UserId};
use collabhub::wallet::{adapters::postgres::PostgresWalletRepository, services::WalletService};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use eyre::{OptionExt, WrapErr};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::ClusterHandle;
use tokio::runtime::Runtime;

/// Schema applied to the template database.
pub const MIGRATION_SQL: &str =
    include_str!("../../migrations/2026-10-16-000000_create_marketplace_tables/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "collabhub_test_template";

/// Builds a multi-threaded runtime so racing tasks really run in parallel.
pub fn test_runtime() -> eyre::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .wrap_err("build test runtime")
}

/// Ensures the template database exists with the schema applied.
pub fn ensure_template(cluster: &ClusterHandle) -> eyre::Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            // The trigger function body contains semicolons, so the file is
            // sent as one batch.
            conn.batch_execute(MIGRATION_SQL)
                .map_err(|e| eyre::eyre!("{e}"))?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("template setup failed: {e}"))
}

/// Database cloned from the template, dropped with the guard.
pub struct TestDatabase {
    cluster: &'static ClusterHandle,
    name: String,
    url: String,
}

impl TestDatabase {
    /// Creates a fresh database from the migrated template.
    pub fn create(cluster: &'static ClusterHandle) -> eyre::Result<Self> {
        ensure_template(cluster)?;
        let name = format!("collabhub_{}", uuid::Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|e| eyre::eyre!("create {name}: {e}"))?;
        let url = cluster.connection().database_url(&name);
        Ok(Self { cluster, name, url })
    }

    /// Returns the connection string for this database.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Opens a direct connection for raw SQL checks.
    pub fn connect(&self) -> eyre::Result<PgConnection> {
        PgConnection::establish(&self.url).wrap_err("connect to test database")
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(self.name.as_str()));
    }
}

/// Services wired to `PostgreSQL` repositories, plus the three actors.
///
/// `database` is declared last so every pooled connection is closed before
/// the database is dropped.
pub struct PostgresMarket {
    pub repository: Arc<PostgresEngagementRepository>,
    pub wallet_repository: Arc<PostgresWalletRepository>,
    pub campaigns: CampaignService<PostgresEngagementRepository, DefaultClock>,
    pub applications: ApplicationService<PostgresEngagementRepository, DefaultClock>,
    pub jobs: JobService<PostgresEngagementRepository, DefaultClock>,
    pub wallets: WalletService<PostgresWalletRepository, DefaultClock>,
    pub creator: Caller,
    pub receiver: Caller,
    pub admin: Caller,
    pub database: TestDatabase,
}

impl PostgresMarket {
    /// Creates a database and wires the services to it.
    pub fn new(cluster: &'static ClusterHandle) -> eyre::Result<Self> {
        let database = TestDatabase::create(cluster)?;
        let config = DatabaseConfig {
            url: database.url().to_owned(),
            pool_size: 4,
            connect_timeout: Duration::from_secs(10),
        };
        let pool = config.build_pool()?;
        let repository = Arc::new(PostgresEngagementRepository::new(pool.clone()));
        let wallet_repository = Arc::new(PostgresWalletRepository::new(pool));
        let clock = Arc::new(DefaultClock);
        Ok(Self {
            campaigns: CampaignService::new(Arc::clone(&repository), Arc::clone(&clock)),
            applications: ApplicationService::new(Arc::clone(&repository), Arc::clone(&clock)),
            jobs: JobService::new(Arc::clone(&repository), Arc::clone(&clock)),
            wallets: WalletService::new(Arc::clone(&wallet_repository), clock),
            repository,
            wallet_repository,
            creator: Caller::new(UserId::new(), Role::Creator),
            receiver: Caller::new(UserId::new(), Role::Receiver),
            admin: Caller::new(UserId::new(), Role::Admin),
            database,
        })
    }

    /// Publishes an open campaign owned by the creator.
    pub async fn publish(&self, title: &str) -> eyre::Result<Campaign> {
        self.campaigns
            .publish(
                &self.creator,
                CampaignDraft::new(title).with_description("Short-form video series"),
            )
            .await
            .wrap_err("publish campaign")
    }

    /// Applies to `campaign` as the receiver with an optional bid.
    pub async fn apply(&self, campaign: &Campaign, bid: Option<&str>) -> eyre::Result<Application> {
        self.applications
            .apply(&self.receiver, campaign.id(), Some("Keen to help"), bid)
            .await
            .wrap_err("apply to campaign")
    }

    /// Publishes, applies and accepts, returning the provisioned job.
    pub async fn engage(&self, bid: Option<&str>) -> eyre::Result<Job> {
        let campaign = self.publish("Spring launch").await?;
        let application = self.apply(&campaign, bid).await?;
        let outcome = self
            .applications
            .accept(&self.creator, application.id())
            .await
            .wrap_err("accept application")?;
        let provisioned = outcome.job.ok_or_eyre("acceptance should provision a job")?;
        Ok(provisioned.job().clone())
    }

    /// Funds the creator's wallet.
    pub async fn fund_creator(&self, amount: &str) -> eyre::Result<()> {
        self.wallets
            .deposit(&self.creator, amount)
            .await
            .wrap_err("fund creator wallet")?;
        Ok(())
    }
}
