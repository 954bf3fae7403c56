// src/handlers/properties.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, ListingManager, RequireRole},
    },
    models::property::{
        CreatePropertyPayload, Property, PropertyListQuery, SetEarningRulesPayload,
        UpdatePropertyPayload,
    },
};

// POST /api/properties
#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = CreatePropertyPayload,
    responses(
        (status = 201, description = "Imóvel anunciado", body = Property),
        (status = 422, description = "Regra de comissão inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    locale: Locale,
    manager: RequireRole<ListingManager>,
    Json(payload): Json<CreatePropertyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let property = app_state
        .property_service
        .create(&manager.user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(property)))
}

// GET /api/properties
#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    params(PropertyListQuery),
    responses(
        (status = 200, description = "Lista de imóveis", body = Vec<Property>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_properties(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<PropertyListQuery>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let properties = app_state
        .property_service
        .list(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(properties))
}

// GET /api/properties/{id}
#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(
        ("id" = Uuid, Path, description = "ID do imóvel")
    ),
    responses(
        (status = 200, description = "Imóvel", body = Property),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_property(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Property>, ApiError> {
    let property = app_state
        .property_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(property))
}

// PUT /api/properties/{id}
#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    request_body = UpdatePropertyPayload,
    params(
        ("id" = Uuid, Path, description = "ID do imóvel")
    ),
    responses(
        (status = 200, description = "Imóvel atualizado", body = Property),
        (status = 403, description = "Não é o dono do anúncio")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_property(
    State(app_state): State<AppState>,
    locale: Locale,
    manager: RequireRole<ListingManager>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyPayload>,
) -> Result<Json<Property>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let property = app_state
        .property_service
        .update(&manager.user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(property))
}

// PUT /api/properties/{id}/earning-rules
#[utoipa::path(
    put,
    path = "/api/properties/{id}/earning-rules",
    tag = "Properties",
    request_body = SetEarningRulesPayload,
    params(
        ("id" = Uuid, Path, description = "ID do imóvel")
    ),
    responses(
        (status = 200, description = "Override de comissão salvo", body = Property),
        (status = 422, description = "Regra de comissão inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_earning_rules(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetEarningRulesPayload>,
) -> Result<Json<Property>, ApiError> {
    let property = app_state
        .property_service
        .set_earning_rules(id, payload.rules.as_ref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(property))
}
