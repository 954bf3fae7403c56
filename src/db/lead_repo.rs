// src/db/lead_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadStatus},
};

pub struct NewLead<'a> {
    pub customer_id: Option<Uuid>,
    pub partner_id: Uuid,
    pub property_id: Uuid,
    pub customer_name: &'a str,
    pub customer_phone: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: NewLead<'_>) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                customer_id, partner_id, property_id, customer_name, customer_phone, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(input.customer_id)
            .bind(input.partner_id)
            .bind(input.property_id)
            .bind(input.customer_name)
            .bind(input.customer_phone)
            .bind(input.notes)
            .fetch_one(&self.pool)
            .await?;

        Ok(lead)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    pub async fn list(
        &self,
        partner_id: Option<Uuid>,
        status: Option<LeadStatus>,
    ) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE ($1::uuid IS NULL OR partner_id = $1)
              AND ($2::lead_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
            .bind(partner_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(leads)
    }

    /// Leads com status de fechamento (DEAL_CLOSED, COMPLETED), mais recentes primeiro.
    pub async fn list_closed(&self, partner_id: Option<Uuid>) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE status IN ('DEAL_CLOSED', 'COMPLETED')
              AND ($1::uuid IS NULL OR partner_id = $1)
            ORDER BY COALESCE(closed_at, updated_at) DESC
            "#,
        )
            .bind(partner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(leads)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: LeadStatus,
        closing_amount: Option<Decimal>,
        closed_at: Option<DateTime<Utc>>,
    ) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                status = $2,
                closing_amount = $3,
                closed_at = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(status)
            .bind(closing_amount)
            .bind(closed_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lead".into()))
    }
}
