// src/models/wallet.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};

use crate::models::{
    auth::UserSummary,
    earning::EarningRule,
    lead::LeadStatus,
    property::PropertySummary,
};

// --- EXTRATO (derivado, nunca persistido) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayableEntry {
    pub lead_id: Uuid,
    pub deal_date: DateTime<Utc>,
    pub property: PropertySummary,
    pub partner: UserSummary,

    #[schema(example = "11800000.00")]
    pub deal_value: Decimal,

    pub earning_rule: EarningRule,

    #[schema(example = "236000.00")]
    pub earning_amount: Decimal,

    pub status: LeadStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayableLedger {
    pub entries: Vec<PayableEntry>,
    pub total_earning: Decimal,
}

impl PayableLedger {
    pub fn new(entries: Vec<PayableEntry>) -> Self {
        let total_earning = entries.iter().map(|e| e.earning_amount).sum();
        Self { entries, total_earning }
    }
}

// --- CARTEIRA ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub partner_id: Uuid,
    pub total_earned: Decimal,
    pub reward_points: Decimal,
    pub withdrawn: Decimal,
    pub pending_withdrawals: Decimal,
    pub available_balance: Decimal,
}

// --- SAQUES ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "withdrawal_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: Uuid,
    pub partner_id: Uuid,

    #[schema(example = "50000.00")]
    pub amount: Decimal,

    pub status: WithdrawalStatus,
    pub note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Somatórios de saque de um parceiro
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct WithdrawalTotals {
    pub approved: Decimal,
    pub pending: Decimal,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalPayload {
    #[schema(value_type = f64, example = 50000)]
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithdrawalPayload {
    pub approve: bool,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalListQuery {
    pub partner_id: Option<Uuid>,
    pub status: Option<WithdrawalStatus>,
}

// Filtro do extrato (só o admin usa partnerId)
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PayablesQuery {
    pub partner_id: Option<Uuid>,
}
