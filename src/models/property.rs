// src/models/property.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::earning::EarningRuleTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Available,
    Reserved,
    Sold,
    Inactive,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub seller_id: Uuid,

    #[schema(example = "3BHK Sea View, Bandra West")]
    pub title: String,
    pub description: Option<String>,

    #[schema(example = "Mumbai, MH")]
    pub location: String,

    #[schema(example = "apartment")]
    pub property_type: String,

    #[schema(example = "12500000.00")]
    pub listing_price: Decimal,

    // Área total; usada pelas regras per_sq_ft que não trazem a própria área
    #[schema(example = "1450")]
    pub total_sq_ft: Option<Decimal>,

    pub status: PropertyStatus,

    // Override das regras padrão, por papel de parceiro
    #[schema(value_type = Option<Object>)]
    pub earning_rules: Option<Json<EarningRuleTable>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn earning_rules(&self) -> Option<&EarningRuleTable> {
        self.earning_rules.as_ref().map(|rules| &rules.0)
    }
}

// Resumo usado no extrato de comissões
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub listing_price: Decimal,
}

impl From<&Property> for PropertySummary {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            title: property.title.clone(),
            location: property.location.clone(),
            listing_price: property.listing_price,
        }
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyPayload {
    // Só o admin escolhe o vendedor; para o vendedor é sempre ele mesmo
    pub seller_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "3BHK Sea View, Bandra West")]
    pub title: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Mumbai, MH")]
    pub location: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "apartment")]
    pub property_type: String,

    #[schema(value_type = f64, example = 12500000)]
    pub listing_price: Decimal,

    #[schema(value_type = Option<f64>, example = 1450)]
    pub total_sq_ft: Option<Decimal>,

    #[schema(value_type = Option<Object>)]
    pub earning_rules: Option<EarningRuleTable>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub location: Option<String>,
    pub property_type: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub listing_price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub total_sq_ft: Option<Decimal>,
    pub status: Option<PropertyStatus>,
}

// PUT /api/properties/{id}/earning-rules (null remove o override)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetEarningRulesPayload {
    #[schema(value_type = Option<Object>)]
    pub rules: Option<EarningRuleTable>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListQuery {
    pub status: Option<PropertyStatus>,
    pub seller_id: Option<Uuid>,
}
