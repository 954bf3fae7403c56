// src/models/lead.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// Status único do lead. Os antigos "DealStatus" e "LeadStatus" foram
// unificados aqui.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Contacted,
    SiteVisit,
    Negotiation,
    DealClosed,
    Completed,
    Lost,
}

impl LeadStatus {
    /// Status que geram comissão.
    pub const CLOSING: [LeadStatus; 2] = [LeadStatus::DealClosed, LeadStatus::Completed];

    pub fn is_closing(self) -> bool {
        Self::CLOSING.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::Completed | LeadStatus::Lost)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub partner_id: Uuid,
    pub property_id: Uuid,

    #[schema(example = "Anita Desai")]
    pub customer_name: String,
    pub customer_phone: Option<String>,

    pub status: LeadStatus,

    // Valor efetivo do fechamento; sem ele vale o preço anunciado
    #[schema(example = "11800000.00")]
    pub closing_amount: Option<Decimal>,
    pub closed_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn deal_date(&self) -> DateTime<Utc> {
        self.closed_at.unwrap_or(self.updated_at)
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    pub property_id: Uuid,

    // Cliente já cadastrado na plataforma, se houver
    pub customer_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Anita Desai")]
    pub customer_name: String,

    #[schema(example = "+91 91234 56789")]
    pub customer_phone: Option<String>,

    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadStatusPayload {
    pub status: LeadStatus,

    #[schema(value_type = Option<f64>, example = 11800000)]
    pub closing_amount: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LeadListQuery {
    pub status: Option<LeadStatus>,
}
