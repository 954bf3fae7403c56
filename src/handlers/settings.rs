// src/handlers/settings.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::settings::{DefaultEarningRules, UpdateEarningRulesRequest},
};

// GET /api/settings/earning-rules
#[utoipa::path(
    get,
    path = "/api/settings/earning-rules",
    tag = "Settings",
    responses(
        (status = 200, description = "Regras padrão de comissão", body = DefaultEarningRules)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_earning_rules(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireRole<AdminOnly>,
) -> Result<Json<DefaultEarningRules>, ApiError> {
    let rules = app_state
        .settings_service
        .get()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rules))
}

// PUT /api/settings/earning-rules
#[utoipa::path(
    put,
    path = "/api/settings/earning-rules",
    tag = "Settings",
    request_body = UpdateEarningRulesRequest,
    responses(
        (status = 200, description = "Regras padrão substituídas", body = DefaultEarningRules),
        (status = 422, description = "Regra de comissão inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_earning_rules(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireRole<AdminOnly>,
    Json(payload): Json<UpdateEarningRulesRequest>,
) -> Result<Json<DefaultEarningRules>, ApiError> {
    let updated = app_state
        .settings_service
        .update(payload.rules)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}
