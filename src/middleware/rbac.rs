// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{AppError, ApiError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{User, UserRole},
};

/// O trait que define quais papéis uma rota aceita
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
}

/// O extractor (guardião). Entrega o usuário já autorizado.
pub struct RequireRole<T> {
    pub user: User,
    _role: PhantomData<T>,
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        // Infallible
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|authenticated| authenticated.0.clone())
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !T::allows(user.role) {
            tracing::warn!("Acesso negado a {} ({:?})", user.id, user.role);
            return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole { user, _role: PhantomData })
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allows(role: UserRole) -> bool {
        role == UserRole::Admin
    }
}

pub struct PartnerOnly;
impl RoleDef for PartnerOnly {
    fn allows(role: UserRole) -> bool {
        role.is_partner()
    }
}

// Quem pode anunciar imóveis
pub struct ListingManager;
impl RoleDef for ListingManager {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Admin | UserRole::Seller)
    }
}

// Quem enxerga extrato e carteira
pub struct PartnerOrAdmin;
impl RoleDef for PartnerOrAdmin {
    fn allows(role: UserRole) -> bool {
        role == UserRole::Admin || role.is_partner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_sets() {
        assert!(AdminOnly::allows(UserRole::Admin));
        assert!(!AdminOnly::allows(UserRole::Seller));

        assert!(PartnerOnly::allows(UserRole::SuperAffiliate));
        assert!(!PartnerOnly::allows(UserRole::Admin));

        assert!(ListingManager::allows(UserRole::Seller));
        assert!(!ListingManager::allows(UserRole::Customer));

        assert!(PartnerOrAdmin::allows(UserRole::Franchisee));
        assert!(!PartnerOrAdmin::allows(UserRole::Customer));
    }
}
