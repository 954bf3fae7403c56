// src/services/wallet_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{UserRepository, WithdrawalRepository},
    models::{
        auth::{User, UserStatus},
        earning::EarningRuleTable,
        wallet::{PayableLedger, WalletSummary, WithdrawalRequest, WithdrawalStatus, WithdrawalTotals},
    },
    services::{
        earning::{EarningRuleResolver, MONEY_SCALE},
        payable_service::{aggregate_payables, total_reward_points, ClosedDeals, PayableService},
    },
};

/// Saldo disponível = ganho - sacado - saques pendentes.
pub fn compute_wallet(
    partner_id: Uuid,
    total_earned: Decimal,
    reward_points: Decimal,
    totals: WithdrawalTotals,
) -> WalletSummary {
    WalletSummary {
        partner_id,
        total_earned,
        reward_points,
        withdrawn: totals.approved,
        pending_withdrawals: totals.pending,
        available_balance: total_earned - totals.approved - totals.pending,
    }
}

/// Extrato e carteira do parceiro a partir do mesmo conjunto de negócios.
pub fn build_statement(
    partner_id: Uuid,
    deals: &ClosedDeals,
    resolver: &EarningRuleResolver,
    totals: WithdrawalTotals,
) -> (PayableLedger, WalletSummary) {
    let ledger = PayableLedger::new(aggregate_payables(&deals.leads, &deals.partners, &deals.properties, resolver));
    let points = total_reward_points(&deals.leads, &deals.partners, &deals.properties, resolver);
    let wallet = compute_wallet(partner_id, ledger.total_earning, points, totals);
    (ledger, wallet)
}

/// Confere se o pedido de saque é um valor em paise e cabe no saldo.
pub fn check_withdrawal(amount: Decimal, wallet: &WalletSummary) -> Result<(), AppError> {
    // Frações de paise não cabem na coluna NUMERIC(_, 2)
    if amount <= Decimal::ZERO || amount.normalize().scale() > MONEY_SCALE {
        return Err(AppError::invalid_field("amount", "invalid_amount"));
    }
    if amount > wallet.available_balance {
        return Err(AppError::InsufficientBalance {
            available: wallet.available_balance.max(Decimal::ZERO),
        });
    }
    Ok(())
}

/// Só pedidos pendentes podem ser revistos.
pub fn review_target(current: WithdrawalStatus, approve: bool) -> Result<WithdrawalStatus, AppError> {
    if current != WithdrawalStatus::Pending {
        return Err(AppError::InvalidStatusTransition {
            from: format!("{:?}", current).to_uppercase(),
            to: if approve { "APPROVED".into() } else { "REJECTED".into() },
        });
    }
    Ok(if approve { WithdrawalStatus::Approved } else { WithdrawalStatus::Rejected })
}

#[derive(Clone)]
pub struct WalletService {
    payable_service: PayableService,
    withdrawal_repo: WithdrawalRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl WalletService {
    pub fn new(
        payable_service: PayableService,
        withdrawal_repo: WithdrawalRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { payable_service, withdrawal_repo, user_repo, pool }
    }

    pub async fn summary(&self, defaults: EarningRuleTable, partner_id: Uuid) -> Result<WalletSummary, AppError> {
        let totals = self.withdrawal_repo.totals(&self.pool, partner_id).await?;
        self.summary_with_totals(defaults, partner_id, totals).await
    }

    async fn summary_with_totals(
        &self,
        defaults: EarningRuleTable,
        partner_id: Uuid,
        totals: WithdrawalTotals,
    ) -> Result<WalletSummary, AppError> {
        let deals = self.payable_service.load_closed_deals(Some(partner_id)).await?;
        let (_, wallet) = build_statement(partner_id, &deals, &EarningRuleResolver::new(defaults), totals);
        Ok(wallet)
    }

    /// Extrato + carteira de uma só leitura dos negócios fechados.
    pub async fn statement(
        &self,
        defaults: EarningRuleTable,
        partner_id: Uuid,
    ) -> Result<(PayableLedger, WalletSummary), AppError> {
        let totals = self.withdrawal_repo.totals(&self.pool, partner_id).await?;
        let deals = self.payable_service.load_closed_deals(Some(partner_id)).await?;
        Ok(build_statement(partner_id, &deals, &EarningRuleResolver::new(defaults), totals))
    }

    pub async fn request_withdrawal(
        &self,
        defaults: EarningRuleTable,
        partner: &User,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<WithdrawalRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava o parceiro: dois pedidos simultâneos não podem gastar o mesmo saldo
        let locked = self.user_repo.lock_for_update(&mut *tx, partner.id).await?;
        if locked.status != UserStatus::Active {
            return Err(AppError::AccountNotActive);
        }

        let totals = self.withdrawal_repo.totals(&mut *tx, partner.id).await?;
        let wallet = self.summary_with_totals(defaults, partner.id, totals).await?;
        check_withdrawal(amount, &wallet)?;

        let request = self.withdrawal_repo.create(&mut *tx, partner.id, amount, note).await?;

        tx.commit().await?;

        tracing::info!("💸 Saque {} de {} solicitado por {}", request.id, amount, partner.id);

        Ok(request)
    }

    pub async fn review_withdrawal(
        &self,
        id: Uuid,
        approve: bool,
        reviewer: &User,
        note: Option<&str>,
    ) -> Result<WithdrawalRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.withdrawal_repo.find_for_update(&mut *tx, id).await?;
        let target = review_target(current.status, approve)?;

        let updated = self
            .withdrawal_repo
            .set_review(&mut *tx, id, target, reviewer.id, note)
            .await?;

        tx.commit().await?;

        tracing::info!("Saque {} marcado como {:?} por {}", id, target, reviewer.id);

        Ok(updated)
    }

    pub async fn list_withdrawals(
        &self,
        partner_id: Option<Uuid>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRequest>, AppError> {
        self.withdrawal_repo.list(partner_id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(earned: i64, approved: i64, pending: i64) -> WalletSummary {
        compute_wallet(
            Uuid::new_v4(),
            Decimal::from(earned),
            Decimal::ZERO,
            WithdrawalTotals {
                approved: Decimal::from(approved),
                pending: Decimal::from(pending),
            },
        )
    }

    #[test]
    fn available_balance_discounts_approved_and_pending_withdrawals() {
        let w = wallet(100_000, 30_000, 20_000);
        assert_eq!(w.withdrawn, Decimal::from(30_000));
        assert_eq!(w.pending_withdrawals, Decimal::from(20_000));
        assert_eq!(w.available_balance, Decimal::from(50_000));
    }

    #[test]
    fn withdrawal_up_to_the_available_balance_is_accepted() {
        let w = wallet(100_000, 30_000, 20_000);
        assert!(check_withdrawal(Decimal::from(50_000), &w).is_ok());
    }

    #[test]
    fn withdrawal_above_balance_is_refused() {
        let w = wallet(100_000, 30_000, 20_000);

        let err = check_withdrawal(Decimal::from(50_001), &w).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { available } if available == Decimal::from(50_000)));
    }

    #[test]
    fn non_positive_or_sub_paise_amounts_are_invalid() {
        let w = wallet(100_000, 30_000, 20_000);

        for amount in [Decimal::ZERO, Decimal::from(-10), Decimal::new(4, 3), Decimal::new(10_005, 3)] {
            let err = check_withdrawal(amount, &w).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "{} deveria ser inválido", amount);
        }

        // Zeros à direita não contam como fração de paise
        assert!(check_withdrawal(Decimal::new(1_000_500, 4), &w).is_ok());
        assert!(check_withdrawal(Decimal::new(1_050, 2), &w).is_ok());
    }

    #[test]
    fn statement_ledger_and_wallet_agree_on_the_total() {
        use crate::{
            models::{auth::UserRole, lead::LeadStatus},
            services::payable_service::tests::{defaults, index, lead, partner, property},
        };

        let affiliate = partner(UserRole::Affiliate);
        let a = property(1_000_000, None);
        let b = property(3_000_000, None);
        let leads = vec![
            lead(&affiliate, &a, LeadStatus::DealClosed, None),
            lead(&affiliate, &b, LeadStatus::Completed, Some(2_500_000)),
            lead(&affiliate, &b, LeadStatus::Negotiation, None),
        ];
        let partner_id = affiliate.id;
        let deals = ClosedDeals {
            leads,
            partners: index(vec![affiliate], |u| u.id),
            properties: index(vec![a, b], |p| p.id),
        };
        let totals = WithdrawalTotals { approved: Decimal::from(10_000), pending: Decimal::from(5_000) };

        let (ledger, wallet) = build_statement(partner_id, &deals, &defaults(), totals);

        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.total_earning, Decimal::from(70_000));
        assert_eq!(wallet.total_earned, ledger.total_earning);
        assert_eq!(wallet.available_balance, Decimal::from(55_000));
    }

    #[test]
    fn only_pending_requests_can_be_reviewed() {
        assert_eq!(review_target(WithdrawalStatus::Pending, true).unwrap(), WithdrawalStatus::Approved);
        assert_eq!(review_target(WithdrawalStatus::Pending, false).unwrap(), WithdrawalStatus::Rejected);

        let err = review_target(WithdrawalStatus::Approved, false).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidStatusTransition { ref from, ref to } if from == "APPROVED" && to == "REJECTED"
        ));
    }
}
