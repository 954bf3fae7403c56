// src/db/payment_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::payment::{PaymentTransaction, TransactionStatus},
};

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registra a transação antes de chamar o gateway.
    /// Retorna `false` se o `merchant_transaction_id` já existia.
    pub async fn record_initiated(
        &self,
        merchant_transaction_id: &str,
        merchant_user_id: &str,
        amount: Decimal,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payment_transactions (merchant_transaction_id, merchant_user_id, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (merchant_transaction_id) DO NOTHING
            "#,
        )
            .bind(merchant_transaction_id)
            .bind(merchant_user_id)
            .bind(amount)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        merchant_transaction_id: &str,
    ) -> Result<Option<PaymentTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT * FROM payment_transactions WHERE merchant_transaction_id = $1 FOR UPDATE",
        )
            .bind(merchant_transaction_id)
            .fetch_optional(executor)
            .await?;

        Ok(transaction)
    }

    pub async fn mark<'e, E>(
        &self,
        executor: E,
        merchant_transaction_id: &str,
        status: TransactionStatus,
        provider_reference_id: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE payment_transactions SET
                status = $2,
                provider_reference_id = COALESCE($3, provider_reference_id),
                updated_at = NOW()
            WHERE merchant_transaction_id = $1
            "#,
        )
            .bind(merchant_transaction_id)
            .bind(status)
            .bind(provider_reference_id)
            .execute(executor)
            .await?;

        Ok(())
    }
}
