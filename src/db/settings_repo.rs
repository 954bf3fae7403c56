// src/db/settings_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};

use crate::{
    common::error::AppError,
    models::{
        earning::EarningRuleTable,
        settings::{DefaultEarningRules, DEFAULT_EARNING_RULES_KEY},
    },
};

#[derive(FromRow)]
struct EarningRulesRow {
    value: Json<EarningRuleTable>,
    updated_at: DateTime<Utc>,
}

impl From<EarningRulesRow> for DefaultEarningRules {
    fn from(row: EarningRulesRow) -> Self {
        Self {
            rules: row.value.0,
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_default_earning_rules(&self) -> Result<DefaultEarningRules, AppError> {
        let row = sqlx::query_as::<_, EarningRulesRow>(
            "SELECT value, updated_at FROM app_settings WHERE key = $1",
        )
            .bind(DEFAULT_EARNING_RULES_KEY)
            .fetch_optional(&self.pool)
            .await?;

        // Linha ausente equivale a "nenhuma regra padrão"
        Ok(row.map(Into::into).unwrap_or(DefaultEarningRules {
            rules: EarningRuleTable::new(),
            updated_at: None,
        }))
    }

    pub async fn upsert_default_earning_rules(
        &self,
        rules: &EarningRuleTable,
    ) -> Result<DefaultEarningRules, AppError> {
        // UPSERT (Insert or Update)
        let row = sqlx::query_as::<_, EarningRulesRow>(
            r#"
            INSERT INTO app_settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING value, updated_at
            "#,
        )
            .bind(DEFAULT_EARNING_RULES_KEY)
            .bind(Json(rules))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }
}
