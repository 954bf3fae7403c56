// src/models/earning.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- ENUMS ---

// Papéis de parceiro que recebem comissão. É a chave dos mapas de regras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PartnerRole {
    Affiliate,
    SuperAffiliate,
    Associate,
    Channel,
    Franchisee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EarningRuleType {
    RewardPoints,         // Pontos, não entra no extrato em dinheiro
    CommissionPercentage, // % sobre o valor do negócio
    FlatAmount,           // Valor fixo
    PerSqFt,              // Valor por pé quadrado
}

// --- REGRA ---

/// Como a comissão (ou os pontos) de um papel é calculada num negócio fechado.
///
/// Formato JSON: `{ "type": "per_sq_ft", "value": 120, "totalSqFt": 1450 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarningRule {
    #[serde(rename = "type")]
    #[schema(example = "commission_percentage")]
    pub rule_type: EarningRuleType,

    #[schema(value_type = f64, example = 2.5)]
    pub value: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>, example = 1450)]
    pub total_sq_ft: Option<Decimal>,
}

impl EarningRule {
    pub fn new(rule_type: EarningRuleType, value: Decimal) -> Self {
        Self { rule_type, value, total_sq_ft: None }
    }

    pub fn with_total_sq_ft(mut self, total_sq_ft: Decimal) -> Self {
        self.total_sq_ft = Some(total_sq_ft);
        self
    }

    pub fn is_monetary(&self) -> bool {
        self.rule_type != EarningRuleType::RewardPoints
    }
}

/// Tabela papel -> regra. Usada tanto no imóvel (override) quanto no padrão global.
pub type EarningRuleTable = BTreeMap<PartnerRole, EarningRule>;
