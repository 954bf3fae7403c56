// src/services/property_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NewProperty, PropertyChanges, PropertyRepository},
    models::{
        auth::{User, UserRole},
        earning::EarningRuleTable,
        property::{CreatePropertyPayload, Property, PropertyListQuery, UpdatePropertyPayload},
    },
    services::earning::validate_property_table,
};

/// Admin mexe em tudo; vendedor só nos próprios anúncios.
pub fn can_manage(user: &User, property: &Property) -> bool {
    user.role == UserRole::Admin || (user.role == UserRole::Seller && property.seller_id == user.id)
}

fn check_amounts(listing_price: Option<Decimal>, total_sq_ft: Option<Decimal>) -> Result<(), AppError> {
    if listing_price.is_some_and(|price| price < Decimal::ZERO) {
        return Err(AppError::invalid_field("listingPrice", "invalid_amount"));
    }
    if total_sq_ft.is_some_and(|area| area <= Decimal::ZERO) {
        return Err(AppError::invalid_field("totalSqFt", "invalid_amount"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PropertyService {
    repo: PropertyRepository,
}

impl PropertyService {
    pub fn new(repo: PropertyRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, actor: &User, payload: &CreatePropertyPayload) -> Result<Property, AppError> {
        check_amounts(Some(payload.listing_price), payload.total_sq_ft)?;

        // Vendedor sempre anuncia em nome próprio
        let seller_id = match actor.role {
            UserRole::Admin => payload.seller_id.unwrap_or(actor.id),
            _ => actor.id,
        };

        // Override só pelo admin
        let earning_rules = match (&payload.earning_rules, actor.role) {
            (Some(_), role) if role != UserRole::Admin => return Err(AppError::Forbidden),
            (Some(rules), _) => {
                validate_property_table(rules, payload.total_sq_ft)?;
                Some(rules)
            }
            (None, _) => None,
        };

        let property = self
            .repo
            .create(NewProperty {
                seller_id,
                title: &payload.title,
                description: payload.description.as_deref(),
                location: &payload.location,
                property_type: &payload.property_type,
                listing_price: payload.listing_price,
                total_sq_ft: payload.total_sq_ft,
                earning_rules,
            })
            .await?;

        tracing::info!("🏠 Imóvel {} criado por {}", property.id, actor.id);

        Ok(property)
    }

    pub async fn list(&self, query: &PropertyListQuery) -> Result<Vec<Property>, AppError> {
        self.repo.list(query.status, query.seller_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Property, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Property".into()))
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: &UpdatePropertyPayload,
    ) -> Result<Property, AppError> {
        check_amounts(payload.listing_price, payload.total_sq_ft)?;

        let current = self.get(id).await?;
        if !can_manage(actor, &current) {
            return Err(AppError::Forbidden);
        }

        // Trocar a área não pode deixar um override per_sq_ft sem área
        if let (Some(rules), Some(area)) = (current.earning_rules(), payload.total_sq_ft) {
            validate_property_table(rules, Some(area))?;
        }

        self.repo
            .update(
                id,
                PropertyChanges {
                    title: payload.title.as_deref(),
                    description: payload.description.as_deref(),
                    location: payload.location.as_deref(),
                    property_type: payload.property_type.as_deref(),
                    listing_price: payload.listing_price,
                    total_sq_ft: payload.total_sq_ft,
                    status: payload.status,
                },
            )
            .await
    }

    /// Substitui o override de regras (`None` volta para o padrão global).
    pub async fn set_earning_rules(
        &self,
        id: Uuid,
        rules: Option<&EarningRuleTable>,
    ) -> Result<Property, AppError> {
        let current = self.get(id).await?;

        if let Some(rules) = rules {
            validate_property_table(rules, current.total_sq_ft)?;
        }

        let updated = self.repo.update_earning_rules(id, rules).await?;

        tracing::info!("Regras de comissão do imóvel {} atualizadas", id);

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{
        auth::{PaymentStatus, UserStatus},
        property::PropertyStatus,
    };

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "x@example.in".into(),
            password_hash: String::new(),
            full_name: "X".into(),
            phone: None,
            role,
            status: UserStatus::Active,
            payment_status: PaymentStatus::Unpaid,
            upi_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn property(seller_id: Uuid) -> Property {
        Property {
            id: Uuid::new_v4(),
            seller_id,
            title: "Plot 12".into(),
            description: None,
            location: "Pune".into(),
            property_type: "plot".into(),
            listing_price: Decimal::from(2_000_000),
            total_sq_ft: None,
            status: PropertyStatus::Available,
            earning_rules: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn sellers_manage_only_their_own_listings() {
        let seller = user(UserRole::Seller);
        let other = user(UserRole::Seller);
        let own = property(seller.id);

        assert!(can_manage(&seller, &own));
        assert!(!can_manage(&other, &own));
        assert!(can_manage(&user(UserRole::Admin), &own));
        assert!(!can_manage(&user(UserRole::Affiliate), &property(Uuid::new_v4())));
    }

    #[test]
    fn negative_price_and_empty_area_are_rejected() {
        assert!(check_amounts(Some(Decimal::from(-1)), None).is_err());
        assert!(check_amounts(None, Some(Decimal::ZERO)).is_err());
        assert!(check_amounts(Some(Decimal::ZERO), Some(Decimal::from(900))).is_ok());
    }
}
