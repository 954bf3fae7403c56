// src/db/withdrawal_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::wallet::{WithdrawalRequest, WithdrawalStatus, WithdrawalTotals},
};

#[derive(Clone)]
pub struct WithdrawalRepository {
    pool: PgPool,
}

impl WithdrawalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        partner_id: Uuid,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<WithdrawalRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            INSERT INTO withdrawal_requests (partner_id, amount, note)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(partner_id)
            .bind(amount)
            .bind(note)
            .fetch_one(executor)
            .await?;

        Ok(request)
    }

    pub async fn list(
        &self,
        partner_id: Option<Uuid>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRequest>, AppError> {
        let requests = sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            SELECT * FROM withdrawal_requests
            WHERE ($1::uuid IS NULL OR partner_id = $1)
              AND ($2::withdrawal_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
            .bind(partner_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<WithdrawalRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, WithdrawalRequest>(
            "SELECT * FROM withdrawal_requests WHERE id = $1 FOR UPDATE",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Withdrawal request".into()))
    }

    pub async fn set_review<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: WithdrawalStatus,
        reviewer_id: Uuid,
        note: Option<&str>,
    ) -> Result<WithdrawalRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            UPDATE withdrawal_requests SET
                status = $2,
                reviewed_by = $3,
                reviewed_at = NOW(),
                note = COALESCE($4, note)
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(status)
            .bind(reviewer_id)
            .bind(note)
            .fetch_one(executor)
            .await?;

        Ok(request)
    }

    pub async fn totals<'e, E>(&self, executor: E, partner_id: Uuid) -> Result<WithdrawalTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, WithdrawalTotals>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE status = 'APPROVED'), 0) AS approved,
                COALESCE(SUM(amount) FILTER (WHERE status = 'PENDING'), 0) AS pending
            FROM withdrawal_requests
            WHERE partner_id = $1
            "#,
        )
            .bind(partner_id)
            .fetch_one(executor)
            .await?;

        Ok(totals)
    }
}
