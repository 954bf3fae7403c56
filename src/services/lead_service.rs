// src/services/lead_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, NewLead, PropertyRepository},
    models::{
        auth::{User, UserRole, UserStatus},
        lead::{CreateLeadPayload, Lead, LeadListQuery, LeadStatus, UpdateLeadStatusPayload},
    },
};

/// Resultado de uma mudança de status já validada.
#[derive(Debug, PartialEq)]
pub struct StatusChange {
    pub status: LeadStatus,
    pub closing_amount: Option<Decimal>,
    pub closed_at: Option<DateTime<Utc>>,
}

fn status_name(status: LeadStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_else(|| format!("{:?}", status))
}

/// Valida a transição e calcula os campos de fechamento.
///
/// Entrar num status de fechamento carimba `closed_at` (mantém o carimbo
/// se o lead já estava fechado); sair dele limpa o carimbo.
pub fn plan_status_change(
    lead: &Lead,
    target: LeadStatus,
    closing_amount: Option<Decimal>,
    now: DateTime<Utc>,
) -> Result<StatusChange, AppError> {
    if lead.status.is_terminal() {
        return Err(AppError::InvalidStatusTransition {
            from: status_name(lead.status),
            to: status_name(target),
        });
    }

    if closing_amount.is_some_and(|amount| amount <= Decimal::ZERO) {
        return Err(AppError::invalid_field("closingAmount", "invalid_amount"));
    }

    let closed_at = match (target.is_closing(), lead.status.is_closing()) {
        (true, true) => lead.closed_at.or(Some(now)),
        (true, false) => Some(now),
        (false, _) => None,
    };

    Ok(StatusChange {
        status: target,
        closing_amount: closing_amount.or(lead.closing_amount),
        closed_at,
    })
}

#[derive(Clone)]
pub struct LeadService {
    repo: LeadRepository,
    property_repo: PropertyRepository,
}

impl LeadService {
    pub fn new(repo: LeadRepository, property_repo: PropertyRepository) -> Self {
        Self { repo, property_repo }
    }

    pub async fn create(&self, partner: &User, payload: &CreateLeadPayload) -> Result<Lead, AppError> {
        if !partner.role.is_partner() {
            return Err(AppError::Forbidden);
        }
        if partner.status != UserStatus::Active {
            return Err(AppError::AccountNotActive);
        }

        if self.property_repo.find_by_id(payload.property_id).await?.is_none() {
            return Err(AppError::ResourceNotFound("Property".into()));
        }

        let lead = self
            .repo
            .create(NewLead {
                customer_id: payload.customer_id,
                partner_id: partner.id,
                property_id: payload.property_id,
                customer_name: &payload.customer_name,
                customer_phone: payload.customer_phone.as_deref(),
                notes: payload.notes.as_deref(),
            })
            .await?;

        tracing::info!("📇 Lead {} criado por {}", lead.id, partner.id);

        Ok(lead)
    }

    /// Parceiro vê os próprios leads; admin vê todos.
    pub async fn list(&self, actor: &User, query: &LeadListQuery) -> Result<Vec<Lead>, AppError> {
        let partner_filter = match actor.role {
            UserRole::Admin => None,
            role if role.is_partner() => Some(actor.id),
            _ => return Err(AppError::Forbidden),
        };

        self.repo.list(partner_filter, query.status).await
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<Lead, AppError> {
        let lead = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lead".into()))?;

        if actor.role != UserRole::Admin && lead.partner_id != actor.id {
            return Err(AppError::Forbidden);
        }

        Ok(lead)
    }

    pub async fn update_status(&self, id: Uuid, payload: &UpdateLeadStatusPayload) -> Result<Lead, AppError> {
        let lead = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lead".into()))?;

        let change = plan_status_change(&lead, payload.status, payload.closing_amount, Utc::now())?;

        let updated = self
            .repo
            .update_status(id, change.status, change.closing_amount, change.closed_at)
            .await?;

        tracing::info!("Lead {}: {:?} -> {:?}", id, lead.status, updated.status);

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn lead(status: LeadStatus) -> Lead {
        let created = Utc::now() - Duration::days(3);
        Lead {
            id: Uuid::new_v4(),
            customer_id: None,
            partner_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            customer_name: "Anita".into(),
            customer_phone: None,
            status,
            closing_amount: None,
            closed_at: None,
            notes: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn closing_stamps_closed_at_and_keeps_amount() {
        let now = Utc::now();
        let change = plan_status_change(
            &lead(LeadStatus::Negotiation),
            LeadStatus::DealClosed,
            Some(Decimal::from(4_500_000)),
            now,
        )
        .unwrap();

        assert_eq!(change.closed_at, Some(now));
        assert_eq!(change.closing_amount, Some(Decimal::from(4_500_000)));
    }

    #[test]
    fn completing_a_closed_deal_keeps_the_original_stamp() {
        let stamped = Utc::now() - Duration::days(1);
        let mut closed = lead(LeadStatus::DealClosed);
        closed.closed_at = Some(stamped);
        closed.closing_amount = Some(Decimal::from(100));

        let change = plan_status_change(&closed, LeadStatus::Completed, None, Utc::now()).unwrap();
        assert_eq!(change.closed_at, Some(stamped));
        assert_eq!(change.closing_amount, Some(Decimal::from(100)));
    }

    #[test]
    fn reopening_clears_the_stamp() {
        let mut closed = lead(LeadStatus::DealClosed);
        closed.closed_at = Some(Utc::now());

        let change = plan_status_change(&closed, LeadStatus::Negotiation, None, Utc::now()).unwrap();
        assert_eq!(change.closed_at, None);
    }

    #[test]
    fn terminal_statuses_cannot_change() {
        let err = plan_status_change(&lead(LeadStatus::Lost), LeadStatus::New, None, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidStatusTransition { ref from, ref to } if from == "LOST" && to == "NEW"
        ));

        assert!(plan_status_change(&lead(LeadStatus::Completed), LeadStatus::DealClosed, None, Utc::now()).is_err());
    }

    #[test]
    fn non_positive_closing_amount_is_invalid() {
        let err = plan_status_change(&lead(LeadStatus::New), LeadStatus::DealClosed, Some(Decimal::ZERO), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
