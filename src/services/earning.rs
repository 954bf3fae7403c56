// src/services/earning.rs
//
// Núcleo do cálculo de comissões: resolução da regra efetiva e cálculo do valor.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    common::error::AppError,
    models::earning::{EarningRule, EarningRuleTable, EarningRuleType, PartnerRole},
};

/// Casas decimais do dinheiro (rúpias com paise).
pub const MONEY_SCALE: u32 = 2;

/// Teto de `value` para regras fixas, por pé quadrado e de pontos.
pub const MAX_RULE_VALUE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Teto de `totalSqFt`.
pub const MAX_SQ_FT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

// =============================================================================
//  RESOLUÇÃO
// =============================================================================

/// Escolhe a regra efetiva de um papel: o override do imóvel vence o padrão global.
///
/// As regras padrão são injetadas na construção; o resolver nunca vai ao banco.
#[derive(Debug, Clone, Default)]
pub struct EarningRuleResolver {
    defaults: EarningRuleTable,
}

impl EarningRuleResolver {
    pub fn new(defaults: EarningRuleTable) -> Self {
        Self { defaults }
    }

    /// `Ok(None)`: nenhuma regra para o papel (sem entrada no extrato).
    /// `Err(InvalidEarningRule)`: a regra existe mas não pode ser aplicada.
    ///
    /// Um override inválido é rejeitado, não cai para o padrão.
    pub fn resolve(
        &self,
        role: PartnerRole,
        property_rules: Option<&EarningRuleTable>,
        property_area: Option<Decimal>,
    ) -> Result<Option<EarningRule>, AppError> {
        let candidate = property_rules
            .and_then(|rules| rules.get(&role))
            .or_else(|| self.defaults.get(&role));

        candidate
            .map(|rule| effective_rule(rule, property_area))
            .transpose()
    }
}

/// Valida a regra e completa a área das regras `per_sq_ft` com a área do imóvel.
pub fn effective_rule(rule: &EarningRule, property_area: Option<Decimal>) -> Result<EarningRule, AppError> {
    check_rule_shape(rule)?;

    let mut effective = rule.clone();
    if rule.rule_type == EarningRuleType::PerSqFt {
        match rule.total_sq_ft.or(property_area) {
            Some(area) if area > Decimal::ZERO => effective.total_sq_ft = Some(area),
            _ => {
                return Err(AppError::InvalidEarningRule(
                    "per_sq_ft requires totalSqFt > 0".into(),
                ))
            }
        }
    }

    Ok(effective)
}

/// Checagens que não dependem do imóvel.
pub fn check_rule_shape(rule: &EarningRule) -> Result<(), AppError> {
    if rule.value.is_sign_negative() {
        return Err(AppError::InvalidEarningRule("value must not be negative".into()));
    }

    let max_value = match rule.rule_type {
        EarningRuleType::CommissionPercentage => Decimal::ONE_HUNDRED,
        _ => MAX_RULE_VALUE,
    };
    if rule.value > max_value {
        return Err(AppError::InvalidEarningRule(format!("value must not exceed {}", max_value)));
    }

    if let Some(area) = rule.total_sq_ft {
        if area <= Decimal::ZERO {
            return Err(AppError::InvalidEarningRule("totalSqFt must be greater than zero".into()));
        }
        if area > MAX_SQ_FT {
            return Err(AppError::InvalidEarningRule(format!("totalSqFt must not exceed {}", MAX_SQ_FT)));
        }
    }
    Ok(())
}

/// Valida a tabela padrão global. Regras `per_sq_ft` sem área são aceitas
/// porque a área vem do imóvel na hora da resolução.
pub fn validate_default_table(rules: &EarningRuleTable) -> Result<(), AppError> {
    rules.values().try_for_each(check_rule_shape)
}

/// Valida o override de um imóvel contra a área dele.
pub fn validate_property_table(
    rules: &EarningRuleTable,
    property_area: Option<Decimal>,
) -> Result<(), AppError> {
    rules
        .values()
        .try_for_each(|rule| effective_rule(rule, property_area).map(|_| ()))
}

// =============================================================================
//  CÁLCULO
// =============================================================================

/// Valor monetário da comissão. Regras de pontos rendem zero.
///
/// Arredondamento: 2 casas, meio para longe do zero.
/// Estouro do `Decimal` vira `InvalidEarningRule` em vez de pânico.
pub fn calculate_earning(deal_value: Decimal, rule: &EarningRule) -> Result<Decimal, AppError> {
    let amount = match rule.rule_type {
        EarningRuleType::CommissionPercentage => deal_value
            .checked_mul(rule.value)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED)),
        EarningRuleType::FlatAmount => Some(rule.value),
        // Ignora o valor do negócio
        EarningRuleType::PerSqFt => rule.value.checked_mul(rule.total_sq_ft.unwrap_or(Decimal::ZERO)),
        EarningRuleType::RewardPoints => Some(Decimal::ZERO),
    };

    amount
        .map(|v| v.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| AppError::InvalidEarningRule("earning amount overflows".into()))
}

/// Pontos concedidos por uma regra de pontos.
pub fn reward_points(rule: &EarningRule) -> Decimal {
    match rule.rule_type {
        EarningRuleType::RewardPoints => rule.value,
        _ => Decimal::ZERO,
    }
}
