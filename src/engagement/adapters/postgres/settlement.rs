//! Atomic job settlement across engagement and wallet tables.

use super::{
    repository::{PostgresEngagementRepository, lock_job_status},
    schema::{applications, campaigns, jobs},
};
use crate::engagement::{
    domain::{JobStatus, SettlementPlan},
    ports::{
        EngagementRepositoryError, EngagementRepositoryResult, SettledTransfer, SettlementPort,
        SettlementReceipt,
    },
};
use crate::wallet::adapters::postgres::{lock_or_open, post_locked};
use crate::wallet::ports::WalletRepositoryResult;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

#[async_trait]
impl SettlementPort for PostgresEngagementRepository {
    async fn settle(&self, plan: &SettlementPlan) -> EngagementRepositoryResult<SettlementReceipt> {
        let owned_plan = plan.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, EngagementRepositoryError, _>(|tx_conn| {
                settle_locked(tx_conn, &owned_plan)
            })
        })
        .await
    }
}

fn settle_locked(
    connection: &mut PgConnection,
    plan: &SettlementPlan,
) -> EngagementRepositoryResult<SettlementReceipt> {
    let job_id = plan.job.id();
    let actual = lock_job_status(connection, job_id, true)?;
    if actual != JobStatus::InProgress {
        return Err(EngagementRepositoryError::JobStatusChanged {
            job_id,
            expected: JobStatus::InProgress,
            actual,
        });
    }

    let transfer = post_transfer(connection, plan)?;

    diesel::update(jobs::table.find(job_id.into_inner()))
        .set((
            jobs::status.eq(plan.job.status().as_str()),
            jobs::completed_at.eq(plan.job.completed_at()),
        ))
        .execute(connection)?;
    diesel::update(campaigns::table.find(plan.campaign.id().into_inner()))
        .set((
            campaigns::status.eq(plan.campaign.status().as_str()),
            campaigns::updated_at.eq(plan.campaign.updated_at()),
        ))
        .execute(connection)?;
    if let Some(application) = plan.application.as_ref() {
        diesel::update(applications::table.find(application.id().into_inner()))
            .set((
                applications::status.eq(application.status().as_str()),
                applications::updated_at.eq(application.updated_at()),
            ))
            .execute(connection)?;
    }

    Ok(SettlementReceipt {
        job: plan.job.clone(),
        campaign: plan.campaign.clone(),
        application: plan.application.clone(),
        transfer,
    })
}

/// Opens and locks both wallets in user-id order, then debits the creator
/// and credits the influencer.
fn post_transfer(
    connection: &mut PgConnection,
    plan: &SettlementPlan,
) -> WalletRepositoryResult<Option<SettledTransfer>> {
    let mut candidates = [&plan.creator_wallet, &plan.influencer_wallet];
    candidates.sort_by_key(|wallet| wallet.user_id());
    for candidate in candidates {
        lock_or_open(connection, candidate)?;
    }

    let Some(transfer) = plan.transfer.as_ref() else {
        return Ok(None);
    };
    let payment = post_locked(connection, &plan.creator_wallet, &transfer.payment)?;
    let payout = post_locked(connection, &plan.influencer_wallet, &transfer.payout)?;
    Ok(Some(SettledTransfer { payment, payout }))
}
