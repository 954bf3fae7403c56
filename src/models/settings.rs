// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::models::earning::EarningRuleTable;

/// Chave da linha de `app_settings` com as regras padrão.
pub const DEFAULT_EARNING_RULES_KEY: &str = "default_earning_rules";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefaultEarningRules {
    #[schema(value_type = Object, example = json!({
        "affiliate": { "type": "commission_percentage", "value": 2 },
        "franchisee": { "type": "reward_points", "value": 500 }
    }))]
    pub rules: EarningRuleTable,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEarningRulesRequest {
    #[schema(value_type = Object)]
    pub rules: EarningRuleTable,
}
