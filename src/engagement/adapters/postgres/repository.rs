//! `PostgreSQL` repository implementation for engagement storage.

use super::{
    models::{ApplicationRow, CampaignRow, HistoryRow, JobRow, MilestoneRow},
    schema::{applications, campaigns, jobs, milestone_history, milestones},
};
use crate::engagement::{
    domain::{
        Application, ApplicationId, ApplicationStatus, Campaign, CampaignId, CampaignStatus,
        HistoryAction, HistoryEntryId, Job, JobId, JobProvision, JobStatus, Milestone,
        MilestoneHistoryEntry, MilestoneId, MilestoneStatus, PersistedApplicationData,
        PersistedCampaignData, PersistedHistoryData, PersistedJobData, PersistedMilestoneData,
    },
    ports::{
        ApplicationQuery, CampaignOverview, EngagementRepository, EngagementRepositoryError,
        EngagementRepositoryResult, JobProvisionOutcome, JobScope, Page, guard_application_write,
        guard_campaign_write,
    },
};
use crate::identity::UserId;
use crate::wallet::adapters::postgres::PgPool;
use crate::wallet::domain::Money;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;

/// `PostgreSQL`-backed engagement repository.
///
/// Also implements [`crate::engagement::ports::SettlementPort`], posting to
/// the wallet tables in the same database transaction.
#[derive(Debug, Clone)]
pub struct PostgresEngagementRepository {
    pool: PgPool,
}

impl PostgresEngagementRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(super) async fn run_blocking<F, T>(&self, f: F) -> EngagementRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> EngagementRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(EngagementRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(EngagementRepositoryError::persistence)?
    }
}

/// Rows written together when an acceptance provisions a job.
struct ProvisionRows {
    job: JobRow,
    milestone: MilestoneRow,
    history: HistoryRow,
}

impl ProvisionRows {
    fn new(provision: &JobProvision) -> Self {
        Self {
            job: to_job_row(&provision.job),
            milestone: to_milestone_row(&provision.milestone),
            history: to_history_row(&provision.history),
        }
    }

    fn insert(&self, connection: &mut PgConnection) -> QueryResult<()> {
        diesel::insert_into(jobs::table)
            .values(&self.job)
            .execute(connection)?;
        diesel::insert_into(milestones::table)
            .values(&self.milestone)
            .execute(connection)?;
        diesel::insert_into(milestone_history::table)
            .values(&self.history)
            .execute(connection)?;
        Ok(())
    }
}

#[async_trait]
impl EngagementRepository for PostgresEngagementRepository {
    async fn store_campaign(&self, campaign: &Campaign) -> EngagementRepositoryResult<()> {
        let row = to_campaign_row(campaign);
        self.run_blocking(move |connection| {
            diesel::insert_into(campaigns::table)
                .values(&row)
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn find_campaign(&self, id: CampaignId) -> EngagementRepositoryResult<Option<Campaign>> {
        self.run_blocking(move |connection| {
            let row = campaigns::table
                .find(id.into_inner())
                .select(CampaignRow::as_select())
                .first::<CampaignRow>(connection)
                .optional()?;
            row.map(row_to_campaign).transpose()
        })
        .await
    }

    async fn update_campaign(
        &self,
        campaign: &Campaign,
        expected: CampaignStatus,
    ) -> EngagementRepositoryResult<()> {
        let campaign = campaign.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, EngagementRepositoryError, _>(|tx_conn| {
                let campaign_id = campaign.id();
                let stored = campaigns::table
                    .find(campaign_id.into_inner())
                    .select(campaigns::status)
                    .for_update()
                    .first::<String>(tx_conn)
                    .optional()?
                    .ok_or(EngagementRepositoryError::CampaignNotFound(campaign_id))?;
                let actual = CampaignStatus::try_from(stored.as_str())
                    .map_err(EngagementRepositoryError::persistence)?;
                guard_campaign_write(&campaign, expected, actual)?;

                let row = to_campaign_row(&campaign);
                diesel::update(campaigns::table.find(row.id))
                    .set((
                        campaigns::title.eq(&row.title),
                        campaigns::description.eq(&row.description),
                        campaigns::deadline.eq(row.deadline),
                        campaigns::status.eq(&row.status),
                        campaigns::updated_at.eq(row.updated_at),
                    ))
                    .execute(tx_conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn campaigns_for_creator(
        &self,
        creator_id: UserId,
    ) -> EngagementRepositoryResult<Vec<CampaignOverview>> {
        self.run_blocking(move |connection| {
            let rows = campaigns::table
                .filter(campaigns::creator_id.eq(creator_id.into_inner()))
                .order(campaigns::created_at.desc())
                .select(CampaignRow::as_select())
                .load::<CampaignRow>(connection)?;
            let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
            let counts: HashMap<uuid::Uuid, i64> = applications::table
                .filter(applications::campaign_id.eq_any(ids))
                .group_by(applications::campaign_id)
                .select((applications::campaign_id, diesel::dsl::count_star()))
                .load::<(uuid::Uuid, i64)>(connection)?
                .into_iter()
                .collect();
            rows.into_iter()
                .map(|row| {
                    let applicant_count = counts
                        .get(&row.id)
                        .map_or(0, |count| u64::try_from(*count).unwrap_or_default());
                    Ok(CampaignOverview {
                        campaign: row_to_campaign(row)?,
                        applicant_count,
                    })
                })
                .collect()
        })
        .await
    }

    async fn list_campaigns(&self, page: Page) -> EngagementRepositoryResult<Vec<Campaign>> {
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let limit = i64::from(page.size);
        self.run_blocking(move |connection| {
            let rows = campaigns::table
                .order(campaigns::created_at.desc())
                .offset(offset)
                .limit(limit)
                .select(CampaignRow::as_select())
                .load::<CampaignRow>(connection)?;
            rows.into_iter().map(row_to_campaign).collect()
        })
        .await
    }

    async fn store_application(
        &self,
        application: &Application,
    ) -> EngagementRepositoryResult<()> {
        let row = to_application_row(application);
        let campaign_id = application.campaign_id();
        let receiver_id = application.receiver_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(applications::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        EngagementRepositoryError::DuplicateApplication {
                            campaign_id,
                            receiver_id,
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        EngagementRepositoryError::CampaignNotFound(campaign_id)
                    }
                    _ => EngagementRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> EngagementRepositoryResult<()> {
        let application = application.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, EngagementRepositoryError, _>(|tx_conn| {
                lock_application_for_write(tx_conn, &application, expected)?;
                write_application_status(tx_conn, &application)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_pending_application(
        &self,
        id: ApplicationId,
    ) -> EngagementRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                applications::table
                    .filter(applications::id.eq(id.into_inner()))
                    .filter(applications::status.eq(ApplicationStatus::Pending.as_str())),
            )
            .execute(connection)?;
            if deleted > 0 {
                return Ok(());
            }
            let exists = diesel::select(diesel::dsl::exists(
                applications::table.filter(applications::id.eq(id.into_inner())),
            ))
            .get_result::<bool>(connection)?;
            if exists {
                Err(EngagementRepositoryError::ApplicationNotPending(id))
            } else {
                Err(EngagementRepositoryError::ApplicationNotFound(id))
            }
        })
        .await
    }

    async fn find_application(
        &self,
        id: ApplicationId,
    ) -> EngagementRepositoryResult<Option<Application>> {
        self.run_blocking(move |connection| {
            let row = applications::table
                .find(id.into_inner())
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn find_application_for_pair(
        &self,
        campaign_id: CampaignId,
        receiver_id: UserId,
    ) -> EngagementRepositoryResult<Option<Application>> {
        self.run_blocking(move |connection| {
            let row = applications::table
                .filter(applications::campaign_id.eq(campaign_id.into_inner()))
                .filter(applications::receiver_id.eq(receiver_id.into_inner()))
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn applications_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> EngagementRepositoryResult<Vec<Application>> {
        self.run_blocking(move |connection| {
            let rows = applications::table
                .filter(applications::campaign_id.eq(campaign_id.into_inner()))
                .order(applications::applied_at.desc())
                .select(ApplicationRow::as_select())
                .load::<ApplicationRow>(connection)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn applications_for_receiver(
        &self,
        receiver_id: UserId,
        query: ApplicationQuery,
    ) -> EngagementRepositoryResult<Vec<Application>> {
        let offset = i64::try_from(query.page.offset()).unwrap_or(i64::MAX);
        let limit = i64::from(query.page.size);
        self.run_blocking(move |connection| {
            let mut statement = applications::table
                .filter(applications::receiver_id.eq(receiver_id.into_inner()))
                .select(ApplicationRow::as_select())
                .into_boxed();
            if let Some(status) = query.status {
                statement = statement.filter(applications::status.eq(status.as_str()));
            }
            let rows = statement
                .order(applications::applied_at.desc())
                .offset(offset)
                .limit(limit)
                .load::<ApplicationRow>(connection)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn accepted_applications_without_job(
        &self,
    ) -> EngagementRepositoryResult<Vec<Application>> {
        self.run_blocking(move |connection| {
            let rows = applications::table
                .left_join(
                    jobs::table.on(jobs::campaign_id
                        .eq(applications::campaign_id)
                        .and(jobs::influencer_id.eq(applications::receiver_id))),
                )
                .filter(applications::status.eq(ApplicationStatus::Accepted.as_str()))
                .filter(jobs::id.is_null())
                .order(applications::applied_at.asc())
                .select(ApplicationRow::as_select())
                .load::<ApplicationRow>(connection)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn record_acceptance(
        &self,
        application: &Application,
        expected: ApplicationStatus,
        provision: &JobProvision,
    ) -> EngagementRepositoryResult<JobProvisionOutcome> {
        let application = application.clone();
        let campaign_id = application.campaign_id();
        let receiver_id = application.receiver_id();
        let rows = ProvisionRows::new(provision);
        let job = provision.job.clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, EngagementRepositoryError, _>(|tx_conn| {
                lock_application_for_write(tx_conn, &application, expected)?;
                write_application_status(tx_conn, &application)?;

                if let Some(existing) = find_job_for_pair(tx_conn, campaign_id, receiver_id)? {
                    return Ok(JobProvisionOutcome::AlreadyExists(existing));
                }

                // A concurrent acceptance for another application of the same
                // pair can still win the unique index; the savepoint keeps the
                // outer transaction usable.
                match tx_conn.transaction::<_, DieselError, _>(|savepoint| rows.insert(savepoint)) {
                    Ok(()) => Ok(JobProvisionOutcome::Created(job)),
                    Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                        find_job_for_pair(tx_conn, campaign_id, receiver_id)?
                            .map(JobProvisionOutcome::AlreadyExists)
                            .ok_or_else(|| {
                                EngagementRepositoryError::persistence(std::io::Error::other(
                                    "conflicting job is not visible",
                                ))
                            })
                    }
                    Err(err) => Err(err.into()),
                }
            })
        })
        .await
    }

    async fn find_job(&self, id: JobId) -> EngagementRepositoryResult<Option<Job>> {
        self.run_blocking(move |connection| {
            let row = jobs::table
                .find(id.into_inner())
                .select(JobRow::as_select())
                .first::<JobRow>(connection)
                .optional()?;
            row.map(row_to_job).transpose()
        })
        .await
    }

    async fn list_jobs(&self, scope: JobScope) -> EngagementRepositoryResult<Vec<Job>> {
        self.run_blocking(move |connection| {
            let mut statement = jobs::table.select(JobRow::as_select()).into_boxed();
            statement = match scope {
                JobScope::Influencer(user_id) => {
                    statement.filter(jobs::influencer_id.eq(user_id.into_inner()))
                }
                JobScope::Creator(user_id) => {
                    statement.filter(jobs::creator_id.eq(user_id.into_inner()))
                }
                JobScope::All => statement,
            };
            let rows = statement
                .order(jobs::created_at.desc())
                .load::<JobRow>(connection)?;
            rows.into_iter().map(row_to_job).collect()
        })
        .await
    }

    async fn update_job(&self, job: &Job, expected: JobStatus) -> EngagementRepositoryResult<()> {
        let job_id = job.id();
        let status = job.status();
        let completed_at = job.completed_at();
        self.run_blocking(move |connection| {
            connection.transaction::<_, EngagementRepositoryError, _>(|tx_conn| {
                let actual = lock_job_status(tx_conn, job_id, true)?;
                if actual != expected {
                    return Err(EngagementRepositoryError::JobStatusChanged {
                        job_id,
                        expected,
                        actual,
                    });
                }
                diesel::update(jobs::table.find(job_id.into_inner()))
                    .set((
                        jobs::status.eq(status.as_str()),
                        jobs::completed_at.eq(completed_at),
                    ))
                    .execute(tx_conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_milestone(
        &self,
        id: MilestoneId,
    ) -> EngagementRepositoryResult<Option<Milestone>> {
        self.run_blocking(move |connection| {
            let row = milestones::table
                .find(id.into_inner())
                .select(MilestoneRow::as_select())
                .first::<MilestoneRow>(connection)
                .optional()?;
            row.map(row_to_milestone).transpose()
        })
        .await
    }

    async fn milestones_for_job(
        &self,
        job_id: JobId,
    ) -> EngagementRepositoryResult<Vec<Milestone>> {
        self.run_blocking(move |connection| {
            let rows = milestones::table
                .filter(milestones::job_id.eq(job_id.into_inner()))
                .order(milestones::created_at.asc())
                .select(MilestoneRow::as_select())
                .load::<MilestoneRow>(connection)?;
            rows.into_iter().map(row_to_milestone).collect()
        })
        .await
    }

    async fn insert_milestone(
        &self,
        milestone: &Milestone,
        history: &MilestoneHistoryEntry,
    ) -> EngagementRepositoryResult<()> {
        let job_id = milestone.job_id();
        let milestone_row = to_milestone_row(milestone);
        let history_row = to_history_row(history);
        self.run_blocking(move |connection| {
            connection.transaction::<_, EngagementRepositoryError, _>(|tx_conn| {
                ensure_job_in_progress(tx_conn, job_id)?;
                diesel::insert_into(milestones::table)
                    .values(&milestone_row)
                    .execute(tx_conn)?;
                diesel::insert_into(milestone_history::table)
                    .values(&history_row)
                    .execute(tx_conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn record_milestone_change(
        &self,
        milestone: &Milestone,
        expected: MilestoneStatus,
        history: &MilestoneHistoryEntry,
    ) -> EngagementRepositoryResult<()> {
        let milestone_id = milestone.id();
        let job_id = milestone.job_id();
        let row = to_milestone_row(milestone);
        let history_row = to_history_row(history);
        self.run_blocking(move |connection| {
            connection.transaction::<_, EngagementRepositoryError, _>(|tx_conn| {
                ensure_job_in_progress(tx_conn, job_id)?;
                let stored_status = milestones::table
                    .find(milestone_id.into_inner())
                    .select(milestones::status)
                    .for_update()
                    .first::<String>(tx_conn)
                    .optional()?
                    .ok_or(EngagementRepositoryError::MilestoneNotFound(milestone_id))?;
                let actual = MilestoneStatus::try_from(stored_status.as_str())
                    .map_err(EngagementRepositoryError::persistence)?;
                if actual != expected {
                    return Err(EngagementRepositoryError::MilestoneStatusChanged {
                        milestone_id,
                        expected,
                        actual,
                    });
                }
                diesel::update(milestones::table.find(milestone_id.into_inner()))
                    .set((
                        milestones::status.eq(&row.status),
                        milestones::evidence_url.eq(&row.evidence_url),
                        milestones::submission_description.eq(&row.submission_description),
                        milestones::creator_feedback.eq(&row.creator_feedback),
                        milestones::updated_at.eq(row.updated_at),
                    ))
                    .execute(tx_conn)?;
                diesel::insert_into(milestone_history::table)
                    .values(&history_row)
                    .execute(tx_conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn history_for_milestone(
        &self,
        milestone_id: MilestoneId,
    ) -> EngagementRepositoryResult<Vec<MilestoneHistoryEntry>> {
        self.run_blocking(move |connection| {
            let rows = milestone_history::table
                .filter(milestone_history::milestone_id.eq(milestone_id.into_inner()))
                .order(milestone_history::created_at.asc())
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)?;
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }
}

/// Locks an application row and checks that a write based on `expected`
/// may replace the stored status.
fn lock_application_for_write(
    connection: &mut PgConnection,
    application: &Application,
    expected: ApplicationStatus,
) -> EngagementRepositoryResult<()> {
    let application_id = application.id();
    let stored = applications::table
        .find(application_id.into_inner())
        .select(applications::status)
        .for_update()
        .first::<String>(connection)
        .optional()?
        .ok_or(EngagementRepositoryError::ApplicationNotFound(application_id))?;
    let actual = ApplicationStatus::try_from(stored.as_str())
        .map_err(EngagementRepositoryError::persistence)?;
    guard_application_write(application, expected, actual)
}

fn write_application_status(
    connection: &mut PgConnection,
    application: &Application,
) -> QueryResult<usize> {
    diesel::update(applications::table.find(application.id().into_inner()))
        .set((
            applications::status.eq(application.status().as_str()),
            applications::updated_at.eq(application.updated_at()),
        ))
        .execute(connection)
}

fn find_job_for_pair(
    connection: &mut PgConnection,
    campaign_id: CampaignId,
    influencer_id: UserId,
) -> EngagementRepositoryResult<Option<Job>> {
    let row = jobs::table
        .filter(jobs::campaign_id.eq(campaign_id.into_inner()))
        .filter(jobs::influencer_id.eq(influencer_id.into_inner()))
        .select(JobRow::as_select())
        .first::<JobRow>(connection)
        .optional()?;
    row.map(row_to_job).transpose()
}

/// Reads a job's status, holding an exclusive or shared row lock until the
/// surrounding transaction ends.
pub(super) fn lock_job_status(
    connection: &mut PgConnection,
    job_id: JobId,
    exclusive: bool,
) -> EngagementRepositoryResult<JobStatus> {
    let query = jobs::table.find(job_id.into_inner()).select(jobs::status);
    let stored = if exclusive {
        query.for_update().first::<String>(connection).optional()
    } else {
        query.for_share().first::<String>(connection).optional()
    }?
    .ok_or(EngagementRepositoryError::JobNotFound(job_id))?;
    JobStatus::try_from(stored.as_str()).map_err(EngagementRepositoryError::persistence)
}

fn ensure_job_in_progress(
    connection: &mut PgConnection,
    job_id: JobId,
) -> EngagementRepositoryResult<()> {
    match lock_job_status(connection, job_id, false)? {
        JobStatus::InProgress => Ok(()),
        actual => Err(EngagementRepositoryError::JobStatusChanged {
            job_id,
            expected: JobStatus::InProgress,
            actual,
        }),
    }
}

fn persisted_money(value: Option<i64>) -> EngagementRepositoryResult<Option<Money>> {
    value
        .map(Money::from_persisted)
        .transpose()
        .map_err(EngagementRepositoryError::persistence)
}

fn to_campaign_row(campaign: &Campaign) -> CampaignRow {
    CampaignRow {
        id: campaign.id().into_inner(),
        creator_id: campaign.creator_id().into_inner(),
        title: campaign.title().to_owned(),
        description: campaign.description().map(str::to_owned),
        deadline: campaign.deadline(),
        status: campaign.status().as_str().to_owned(),
        created_at: campaign.created_at(),
        updated_at: campaign.updated_at(),
    }
}

fn to_application_row(application: &Application) -> ApplicationRow {
    ApplicationRow {
        id: application.id().into_inner(),
        campaign_id: application.campaign_id().into_inner(),
        receiver_id: application.receiver_id().into_inner(),
        message: application.message().to_owned(),
        bid_amount_minor: application.bid_amount().map(Money::to_persisted),
        status: application.status().as_str().to_owned(),
        applied_at: application.applied_at(),
        updated_at: application.updated_at(),
    }
}

fn to_job_row(job: &Job) -> JobRow {
    JobRow {
        id: job.id().into_inner(),
        campaign_id: job.campaign_id().into_inner(),
        creator_id: job.creator_id().into_inner(),
        influencer_id: job.influencer_id().into_inner(),
        description: job.description().map(str::to_owned),
        price_minor: job.price().map(Money::to_persisted),
        status: job.status().as_str().to_owned(),
        created_at: job.created_at(),
        completed_at: job.completed_at(),
    }
}

fn to_milestone_row(milestone: &Milestone) -> MilestoneRow {
    MilestoneRow {
        id: milestone.id().into_inner(),
        job_id: milestone.job_id().into_inner(),
        title: milestone.title().to_owned(),
        description: milestone.description().map(str::to_owned),
        deadline: milestone.deadline(),
        status: milestone.status().as_str().to_owned(),
        evidence_url: milestone.evidence_url().map(str::to_owned),
        submission_description: milestone.submission_description().map(str::to_owned),
        creator_feedback: milestone.creator_feedback().map(str::to_owned),
        created_at: milestone.created_at(),
        updated_at: milestone.updated_at(),
    }
}

fn to_history_row(entry: &MilestoneHistoryEntry) -> HistoryRow {
    HistoryRow {
        id: entry.id().into_inner(),
        milestone_id: entry.milestone_id().into_inner(),
        action: entry.action().as_str().to_owned(),
        description: entry.description().map(str::to_owned),
        evidence_url: entry.evidence_url().map(str::to_owned),
        created_at: entry.created_at(),
    }
}

fn row_to_campaign(row: CampaignRow) -> EngagementRepositoryResult<Campaign> {
    let CampaignRow {
        id,
        creator_id,
        title,
        description,
        deadline,
        status: persisted_status,
        created_at,
        updated_at,
    } = row;
    let status = CampaignStatus::try_from(persisted_status.as_str())
        .map_err(EngagementRepositoryError::persistence)?;
    Ok(Campaign::from_persisted(PersistedCampaignData {
        id: CampaignId::from_uuid(id),
        creator_id: UserId::from_uuid(creator_id),
        title,
        description,
        deadline,
        status,
        created_at,
        updated_at,
    }))
}

fn row_to_application(row: ApplicationRow) -> EngagementRepositoryResult<Application> {
    let ApplicationRow {
        id,
        campaign_id,
        receiver_id,
        message,
        bid_amount_minor,
        status: persisted_status,
        applied_at,
        updated_at,
    } = row;
    let status = ApplicationStatus::try_from(persisted_status.as_str())
        .map_err(EngagementRepositoryError::persistence)?;
    Ok(Application::from_persisted(PersistedApplicationData {
        id: ApplicationId::from_uuid(id),
        campaign_id: CampaignId::from_uuid(campaign_id),
        receiver_id: UserId::from_uuid(receiver_id),
        message,
        bid_amount: persisted_money(bid_amount_minor)?,
        status,
        applied_at,
        updated_at,
    }))
}

fn row_to_job(row: JobRow) -> EngagementRepositoryResult<Job> {
    let JobRow {
        id,
        campaign_id,
        creator_id,
        influencer_id,
        description,
        price_minor,
        status: persisted_status,
        created_at,
        completed_at,
    } = row;
    let status = JobStatus::try_from(persisted_status.as_str())
        .map_err(EngagementRepositoryError::persistence)?;
    Ok(Job::from_persisted(PersistedJobData {
        id: JobId::from_uuid(id),
        campaign_id: CampaignId::from_uuid(campaign_id),
        creator_id: UserId::from_uuid(creator_id),
        influencer_id: UserId::from_uuid(influencer_id),
        description,
        price: persisted_money(price_minor)?,
        status,
        created_at,
        completed_at,
    }))
}

fn row_to_milestone(row: MilestoneRow) -> EngagementRepositoryResult<Milestone> {
    let MilestoneRow {
        id,
        job_id,
        title,
        description,
        deadline,
        status: persisted_status,
        evidence_url,
        submission_description,
        creator_feedback,
        created_at,
        updated_at,
    } = row;
    let status = MilestoneStatus::try_from(persisted_status.as_str())
        .map_err(EngagementRepositoryError::persistence)?;
    Ok(Milestone::from_persisted(PersistedMilestoneData {
        id: MilestoneId::from_uuid(id),
        job_id: JobId::from_uuid(job_id),
        title,
        description,
        deadline,
        status,
        evidence_url,
        submission_description,
        creator_feedback,
        created_at,
        updated_at,
    }))
}

fn row_to_history(row: HistoryRow) -> EngagementRepositoryResult<MilestoneHistoryEntry> {
    let HistoryRow {
        id,
        milestone_id,
        action: persisted_action,
        description,
        evidence_url,
        created_at,
    } = row;
    let action = HistoryAction::try_from(persisted_action.as_str())
        .map_err(EngagementRepositoryError::persistence)?;
    Ok(MilestoneHistoryEntry::from_persisted(PersistedHistoryData {
        id: HistoryEntryId::from_uuid(id),
        milestone_id: MilestoneId::from_uuid(milestone_id),
        action,
        description,
        evidence_url,
        created_at,
    }))
}
