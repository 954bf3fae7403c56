// src/services/payable_service.rs

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, PropertyRepository, UserRepository},
    models::{
        auth::{User, UserSummary},
        earning::{EarningRule, EarningRuleTable},
        lead::Lead,
        property::{Property, PropertySummary},
        wallet::{PayableEntry, PayableLedger},
    },
    services::earning::{calculate_earning, reward_points, EarningRuleResolver},
};

// Um lead fechado já ligado ao parceiro, ao imóvel e à regra efetiva
struct EvaluatedDeal<'a> {
    lead: &'a Lead,
    partner: &'a User,
    property: &'a Property,
    rule: EarningRule,
}

impl EvaluatedDeal<'_> {
    fn deal_value(&self) -> Decimal {
        self.lead.closing_amount.unwrap_or(self.property.listing_price)
    }
}

/// Liga cada lead ao parceiro e ao imóvel e resolve a regra.
/// Leads com referência quebrada ou sem regra aplicável ficam de fora.
fn evaluate_deals<'a>(
    leads: &'a [Lead],
    partners: &'a HashMap<Uuid, User>,
    properties: &'a HashMap<Uuid, Property>,
    resolver: &EarningRuleResolver,
) -> Vec<EvaluatedDeal<'a>> {
    leads
        .iter()
        .filter(|lead| lead.status.is_closing())
        .filter_map(|lead| {
            let Some(partner) = partners.get(&lead.partner_id) else {
                tracing::warn!("Lead {} aponta para parceiro inexistente {}", lead.id, lead.partner_id);
                return None;
            };
            let Some(property) = properties.get(&lead.property_id) else {
                tracing::warn!("Lead {} aponta para imóvel inexistente {}", lead.id, lead.property_id);
                return None;
            };
            let role = partner.role.partner_role()?;

            match resolver.resolve(role, property.earning_rules(), property.total_sq_ft) {
                Ok(Some(rule)) => Some(EvaluatedDeal { lead, partner, property, rule }),
                Ok(None) => None,
                Err(e) => {
                    tracing::warn!("Regra rejeitada no lead {}: {}", lead.id, e);
                    None
                }
            }
        })
        .collect()
}

/// Monta o extrato de comissões (somente regras monetárias), na ordem dos leads.
/// Um negócio cujo cálculo estoura fica de fora, com aviso no log.
pub fn aggregate_payables(
    leads: &[Lead],
    partners: &HashMap<Uuid, User>,
    properties: &HashMap<Uuid, Property>,
    resolver: &EarningRuleResolver,
) -> Vec<PayableEntry> {
    evaluate_deals(leads, partners, properties, resolver)
        .into_iter()
        .filter(|deal| deal.rule.is_monetary())
        .filter_map(|deal| {
            let deal_value = deal.deal_value();
            let earning_amount = match calculate_earning(deal_value, &deal.rule) {
                Ok(amount) => amount,
                Err(e) => {
                    tracing::warn!("Comissão do lead {} não calculada: {}", deal.lead.id, e);
                    return None;
                }
            };
            Some(PayableEntry {
                lead_id: deal.lead.id,
                deal_date: deal.lead.deal_date(),
                property: PropertySummary::from(deal.property),
                partner: UserSummary::from(deal.partner),
                deal_value,
                earning_amount,
                earning_rule: deal.rule,
                status: deal.lead.status,
            })
        })
        .collect()
}

/// Soma dos pontos das regras `reward_points`.
pub fn total_reward_points(
    leads: &[Lead],
    partners: &HashMap<Uuid, User>,
    properties: &HashMap<Uuid, Property>,
    resolver: &EarningRuleResolver,
) -> Decimal {
    evaluate_deals(leads, partners, properties, resolver)
        .iter()
        .map(|deal| reward_points(&deal.rule))
        .sum()
}

// Leads fechados + parceiros e imóveis referenciados, indexados por id
pub struct ClosedDeals {
    pub leads: Vec<Lead>,
    pub partners: HashMap<Uuid, User>,
    pub properties: HashMap<Uuid, Property>,
}

#[derive(Clone)]
pub struct PayableService {
    lead_repo: LeadRepository,
    user_repo: UserRepository,
    property_repo: PropertyRepository,
}

impl PayableService {
    pub fn new(lead_repo: LeadRepository, user_repo: UserRepository, property_repo: PropertyRepository) -> Self {
        Self { lead_repo, user_repo, property_repo }
    }

    /// Busca os leads fechados e faz o "join" com usuários e imóveis.
    pub async fn load_closed_deals(&self, partner_id: Option<Uuid>) -> Result<ClosedDeals, AppError> {
        let leads = self.lead_repo.list_closed(partner_id).await?;

        let partner_ids: Vec<Uuid> = leads
            .iter()
            .map(|l| l.partner_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let property_ids: Vec<Uuid> = leads
            .iter()
            .map(|l| l.property_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let partners = self
            .user_repo
            .find_by_ids(&partner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let properties = self
            .property_repo
            .find_by_ids(&property_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(ClosedDeals { leads, partners, properties })
    }

    /// Extrato de comissões a pagar. As regras padrão chegam por parâmetro.
    pub async fn ledger(
        &self,
        defaults: EarningRuleTable,
        partner_id: Option<Uuid>,
    ) -> Result<PayableLedger, AppError> {
        let deals = self.load_closed_deals(partner_id).await?;
        let resolver = EarningRuleResolver::new(defaults);

        let entries = aggregate_payables(&deals.leads, &deals.partners, &deals.properties, &resolver);

        tracing::debug!("📒 Extrato montado: {} de {} leads fechados", entries.len(), deals.leads.len());

        Ok(PayableLedger::new(entries))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;

    use crate::models::{
        auth::{PaymentStatus, UserRole, UserStatus},
        earning::{EarningRuleType, PartnerRole},
        lead::LeadStatus,
        property::PropertyStatus,
    };

    pub(crate) fn partner(role: UserRole) -> User {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        User {
            id: Uuid::new_v4(),
            email: format!("{}@imobi.in", Uuid::new_v4()),
            password_hash: String::new(),
            full_name: "Ravi Kumar".into(),
            phone: None,
            role,
            status: UserStatus::Active,
            payment_status: PaymentStatus::Paid,
            upi_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn property(listing_price: i64, rules: Option<EarningRuleTable>) -> Property {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        Property {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            title: "2BHK Powai".into(),
            description: None,
            location: "Mumbai".into(),
            property_type: "apartment".into(),
            listing_price: Decimal::from(listing_price),
            total_sq_ft: Some(Decimal::from(1000)),
            status: PropertyStatus::Sold,
            earning_rules: rules.map(Json),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn lead(partner: &User, property: &Property, status: LeadStatus, closing: Option<i64>) -> Lead {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        Lead {
            id: Uuid::new_v4(),
            customer_id: None,
            partner_id: partner.id,
            property_id: property.id,
            customer_name: "Anita Desai".into(),
            customer_phone: None,
            status,
            closing_amount: closing.map(Decimal::from),
            closed_at: Some(now),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn index<T, F: Fn(&T) -> Uuid>(items: Vec<T>, id: F) -> HashMap<Uuid, T> {
        items.into_iter().map(|item| (id(&item), item)).collect()
    }

    pub(crate) fn defaults() -> EarningRuleResolver {
        EarningRuleResolver::new(
            [
                (
                    PartnerRole::Affiliate,
                    EarningRule::new(EarningRuleType::CommissionPercentage, Decimal::from(2)),
                ),
                (
                    PartnerRole::Franchisee,
                    EarningRule::new(EarningRuleType::RewardPoints, Decimal::from(500)),
                ),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn property_override_drives_the_amount() {
        let affiliate = partner(UserRole::Affiliate);
        let overrides: EarningRuleTable = [(
            PartnerRole::Affiliate,
            EarningRule::new(EarningRuleType::FlatAmount, Decimal::from(5000)),
        )]
        .into_iter()
        .collect();
        let flat = property(1_000_000, Some(overrides));
        let leads = vec![lead(&affiliate, &flat, LeadStatus::DealClosed, None)];

        let entries = aggregate_payables(
            &leads,
            &index(vec![affiliate], |u| u.id),
            &index(vec![flat], |p| p.id),
            &defaults(),
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].deal_value, Decimal::from(1_000_000));
        assert_eq!(entries[0].earning_amount, Decimal::from(5000));
    }

    #[test]
    fn closing_amount_wins_over_listing_price() {
        let affiliate = partner(UserRole::Affiliate);
        let home = property(1_000_000, None);
        let leads = vec![lead(&affiliate, &home, LeadStatus::Completed, Some(900_000))];

        let entries = aggregate_payables(
            &leads,
            &index(vec![affiliate], |u| u.id),
            &index(vec![home], |p| p.id),
            &defaults(),
        );

        assert_eq!(entries[0].deal_value, Decimal::from(900_000));
        assert_eq!(entries[0].earning_amount, Decimal::from(18_000));
        assert_eq!(entries[0].status, LeadStatus::Completed);
    }

    #[test]
    fn broken_references_are_skipped() {
        let affiliate = partner(UserRole::Affiliate);
        let ghost_partner = partner(UserRole::Affiliate);
        let home = property(1_000_000, None);
        let deleted = property(2_000_000, None);

        let leads = vec![
            lead(&ghost_partner, &home, LeadStatus::DealClosed, None),
            lead(&affiliate, &deleted, LeadStatus::DealClosed, None),
            lead(&affiliate, &home, LeadStatus::DealClosed, None),
        ];
        let kept = leads[2].id;

        let entries = aggregate_payables(
            &leads,
            &index(vec![affiliate], |u| u.id),
            &index(vec![home], |p| p.id),
            &defaults(),
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lead_id, kept);
    }

    #[test]
    fn points_rules_and_open_leads_stay_out_of_the_ledger() {
        let franchisee = partner(UserRole::Franchisee);
        let affiliate = partner(UserRole::Affiliate);
        let home = property(1_000_000, None);

        let leads = vec![
            lead(&franchisee, &home, LeadStatus::DealClosed, None),
            lead(&affiliate, &home, LeadStatus::Negotiation, None),
        ];
        let partners = index(vec![franchisee, affiliate], |u| u.id);
        let properties = index(vec![home], |p| p.id);

        assert!(aggregate_payables(&leads, &partners, &properties, &defaults()).is_empty());
        assert_eq!(
            total_reward_points(&leads, &partners, &properties, &defaults()),
            Decimal::from(500)
        );
    }

    #[test]
    fn roles_without_rules_or_non_partners_produce_nothing() {
        let channel = partner(UserRole::Channel);
        let seller = partner(UserRole::Seller);
        let home = property(1_000_000, None);

        let leads = vec![
            lead(&channel, &home, LeadStatus::DealClosed, None),
            lead(&seller, &home, LeadStatus::DealClosed, None),
        ];

        let entries = aggregate_payables(
            &leads,
            &index(vec![channel, seller], |u| u.id),
            &index(vec![home], |p| p.id),
            &defaults(),
        );

        assert!(entries.is_empty());
    }

    #[test]
    fn rejected_per_sq_ft_rule_is_skipped_not_zeroed() {
        let associate = partner(UserRole::Associate);
        let mut plot = property(500_000, None);
        plot.total_sq_ft = None;

        let resolver = EarningRuleResolver::new(
            [(PartnerRole::Associate, EarningRule::new(EarningRuleType::PerSqFt, Decimal::from(40)))]
                .into_iter()
                .collect(),
        );
        let leads = vec![lead(&associate, &plot, LeadStatus::DealClosed, None)];

        let entries = aggregate_payables(
            &leads,
            &index(vec![associate], |u| u.id),
            &index(vec![plot], |p| p.id),
            &resolver,
        );

        assert!(entries.is_empty());
    }

    #[test]
    fn overflowing_deal_is_skipped_and_the_rest_still_count() {
        let affiliate = partner(UserRole::Affiliate);
        let home = property(1_000_000, None);
        let mut tower = property(1_000_000, None);
        tower.listing_price = Decimal::MAX;

        let leads = vec![
            lead(&affiliate, &tower, LeadStatus::DealClosed, None),
            lead(&affiliate, &home, LeadStatus::DealClosed, None),
        ];
        let kept = leads[1].id;

        let entries = aggregate_payables(
            &leads,
            &index(vec![affiliate], |u| u.id),
            &index(vec![home, tower], |p| p.id),
            &defaults(),
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lead_id, kept);
        assert_eq!(entries[0].earning_amount, Decimal::from(20_000));
    }

    #[test]
    fn ledger_total_sums_entries() {
        let affiliate = partner(UserRole::Affiliate);
        let a = property(1_000_000, None);
        let b = property(3_000_000, None);
        let leads = vec![
            lead(&affiliate, &a, LeadStatus::DealClosed, None),
            lead(&affiliate, &b, LeadStatus::Completed, None),
        ];

        let ledger = PayableLedger::new(aggregate_payables(
            &leads,
            &index(vec![affiliate], |u| u.id),
            &index(vec![a, b], |p| p.id),
            &defaults(),
        ));

        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.total_earning, Decimal::from(80_000));
    }
}
