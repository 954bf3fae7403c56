// src/services/settings_service.rs

use std::sync::{Arc, RwLock};

use crate::{
    common::error::AppError,
    db::SettingsRepository,
    models::{earning::EarningRuleTable, settings::DefaultEarningRules},
    services::earning::validate_default_table,
};

/// Dono da tabela padrão de regras de comissão.
///
/// A tabela fica em memória; quem calcula recebe uma cópia via `default_rules()`.
#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
    defaults: Arc<RwLock<EarningRuleTable>>,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository) -> Self {
        Self {
            repo,
            defaults: Arc::new(RwLock::new(EarningRuleTable::new())),
        }
    }

    /// Relê a tabela do banco (usado na inicialização).
    pub async fn reload(&self) -> Result<(), AppError> {
        let current = self.repo.get_default_earning_rules().await?;
        tracing::info!("Regras padrão carregadas: {} papéis", current.rules.len());
        self.swap(current.rules);
        Ok(())
    }

    pub fn default_rules(&self) -> EarningRuleTable {
        // Um lock envenenado ainda guarda a última tabela válida
        match self.defaults.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub async fn get(&self) -> Result<DefaultEarningRules, AppError> {
        self.repo.get_default_earning_rules().await
    }

    pub async fn update(&self, rules: EarningRuleTable) -> Result<DefaultEarningRules, AppError> {
        validate_default_table(&rules)?;

        let saved = self.repo.upsert_default_earning_rules(&rules).await?;
        self.swap(saved.rules.clone());

        tracing::info!("⚙️ Regras padrão de comissão atualizadas");

        Ok(saved)
    }

    fn swap(&self, rules: EarningRuleTable) {
        match self.defaults.write() {
            Ok(mut guard) => *guard = rules,
            Err(poisoned) => *poisoned.into_inner() = rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::models::earning::{EarningRule, EarningRuleType, PartnerRole};

    fn service() -> SettingsService {
        // Pool preguiçoso: nenhum teste aqui chega a abrir conexão
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("url válida");
        SettingsService::new(SettingsRepository::new(pool))
    }

    #[tokio::test]
    async fn starts_with_an_empty_table() {
        assert!(service().default_rules().is_empty());
    }

    #[tokio::test]
    async fn readers_get_a_snapshot_of_the_swapped_table() {
        let settings = service();
        let snapshot = settings.default_rules();

        let mut rules = EarningRuleTable::new();
        rules.insert(
            PartnerRole::Affiliate,
            EarningRule::new(EarningRuleType::CommissionPercentage, Decimal::from(2)),
        );
        settings.swap(rules);

        assert!(snapshot.is_empty());
        assert!(settings.default_rules().contains_key(&PartnerRole::Affiliate));
        // Clones compartilham a mesma tabela
        assert_eq!(settings.clone().default_rules().len(), 1);
    }

    #[tokio::test]
    async fn invalid_table_is_refused_before_touching_the_database() {
        let mut rules = EarningRuleTable::new();
        rules.insert(
            PartnerRole::Channel,
            EarningRule::new(EarningRuleType::FlatAmount, Decimal::from(-5)),
        );

        let err = service().update(rules).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidEarningRule(_)));
    }
}
