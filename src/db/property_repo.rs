// src/db/property_repo.rs

use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        earning::EarningRuleTable,
        property::{Property, PropertyStatus},
    },
};

pub struct NewProperty<'a> {
    pub seller_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub location: &'a str,
    pub property_type: &'a str,
    pub listing_price: Decimal,
    pub total_sq_ft: Option<Decimal>,
    pub earning_rules: Option<&'a EarningRuleTable>,
}

// Campos ausentes (None) não são alterados
#[derive(Default)]
pub struct PropertyChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub property_type: Option<&'a str>,
    pub listing_price: Option<Decimal>,
    pub total_sq_ft: Option<Decimal>,
    pub status: Option<PropertyStatus>,
}

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: NewProperty<'_>) -> Result<Property, AppError> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (
                seller_id, title, description, location, property_type,
                listing_price, total_sq_ft, earning_rules
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
            .bind(input.seller_id)
            .bind(input.title)
            .bind(input.description)
            .bind(input.location)
            .bind(input.property_type)
            .bind(input.listing_price)
            .bind(input.total_sq_ft)
            .bind(input.earning_rules.map(Json))
            .fetch_one(&self.pool)
            .await?;

        Ok(property)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Property>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let properties = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    pub async fn list(
        &self,
        status: Option<PropertyStatus>,
        seller_id: Option<Uuid>,
    ) -> Result<Vec<Property>, AppError> {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT * FROM properties
            WHERE ($1::property_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR seller_id = $2)
            ORDER BY created_at DESC
            "#,
        )
            .bind(status)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    pub async fn update(&self, id: Uuid, changes: PropertyChanges<'_>) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                property_type = COALESCE($5, property_type),
                listing_price = COALESCE($6, listing_price),
                total_sq_ft = COALESCE($7, total_sq_ft),
                status = COALESCE($8, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.location)
            .bind(changes.property_type)
            .bind(changes.listing_price)
            .bind(changes.total_sq_ft)
            .bind(changes.status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Property".into()))
    }

    pub async fn update_earning_rules(
        &self,
        id: Uuid,
        rules: Option<&EarningRuleTable>,
    ) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            "UPDATE properties SET earning_rules = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
            .bind(id)
            .bind(rules.map(Json))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Property".into()))
    }
}
