// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use utoipa::ToSchema;

/// Código que o gateway manda no callback quando o pagamento foi concluído.
pub const PAYMENT_SUCCESS_CODE: &str = "PAYMENT_SUCCESS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Initiated,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    pub merchant_transaction_id: String,
    pub merchant_user_id: String,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub provider_reference_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// POST /api/payment/initiate
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    // Em rúpias; o gateway recebe em paise
    #[schema(value_type = f64, example = 999)]
    pub amount: Decimal,

    #[validate(length(min = 1, max = 38, message = "invalid_transaction_id"))]
    #[schema(example = "MT7850590068188104")]
    pub merchant_transaction_id: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub merchant_user_id: String,

    #[validate(url(message = "invalid_url"))]
    #[schema(example = "https://app.imobi.in/payment/status")]
    pub redirect_url: String,
}

// Form-encoded, enviado pelo gateway no redirect/callback
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallbackForm {
    #[schema(example = "PAYMENT_SUCCESS")]
    pub code: String,
    pub merchant_id: Option<String>,
    pub transaction_id: String,
    pub provider_reference_id: Option<String>,
}

impl PaymentCallbackForm {
    pub fn is_success(&self) -> bool {
        self.code == PAYMENT_SUCCESS_CODE
    }
}
