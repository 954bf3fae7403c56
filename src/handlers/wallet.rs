// src/handlers/wallet.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, PartnerOnly, PartnerOrAdmin, RequireRole},
    },
    models::{
        auth::{User, UserRole},
        wallet::{
            CreateWithdrawalPayload, PayableLedger, PayablesQuery, ReviewWithdrawalPayload,
            WalletSummary, WithdrawalListQuery, WithdrawalRequest,
        },
    },
};

// GET /api/wallet/payables
#[utoipa::path(
    get,
    path = "/api/wallet/payables",
    tag = "Wallet",
    params(PayablesQuery),
    responses(
        (status = 200, description = "Comissões a pagar (parceiro: só as próprias)", body = PayableLedger)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payables(
    State(app_state): State<AppState>,
    locale: Locale,
    viewer: RequireRole<PartnerOrAdmin>,
    Query(query): Query<PayablesQuery>,
) -> Result<Json<PayableLedger>, ApiError> {
    let partner_id = match viewer.user.role {
        UserRole::Admin => query.partner_id,
        _ => Some(viewer.user.id),
    };

    let ledger = app_state
        .payable_service
        .ledger(app_state.settings_service.default_rules(), partner_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ledger))
}

// GET /api/wallet
#[utoipa::path(
    get,
    path = "/api/wallet",
    tag = "Wallet",
    responses(
        (status = 200, description = "Carteira do parceiro autenticado", body = WalletSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_wallet(
    State(app_state): State<AppState>,
    locale: Locale,
    partner: RequireRole<PartnerOnly>,
) -> Result<Json<WalletSummary>, ApiError> {
    let wallet = app_state
        .wallet_service
        .summary(app_state.settings_service.default_rules(), partner.user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(wallet))
}

// GET /api/wallet/partners/{id}
#[utoipa::path(
    get,
    path = "/api/wallet/partners/{id}",
    tag = "Wallet",
    params(
        ("id" = Uuid, Path, description = "ID do parceiro")
    ),
    responses(
        (status = 200, description = "Carteira de um parceiro", body = WalletSummary),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_partner_wallet(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireRole<AdminOnly>,
    Path(partner_id): Path<Uuid>,
) -> Result<Json<WalletSummary>, ApiError> {
    let wallet = partner_wallet(&app_state, partner_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(wallet))
}

async fn partner_wallet(app_state: &AppState, partner_id: Uuid) -> Result<WalletSummary, AppError> {
    app_state
        .user_repo
        .find_by_id(partner_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    app_state
        .wallet_service
        .summary(app_state.settings_service.default_rules(), partner_id)
        .await
}

// GET /api/wallet/statement
#[utoipa::path(
    get,
    path = "/api/wallet/statement",
    tag = "Wallet",
    responses(
        (status = 200, description = "Extrato em PDF (application/pdf)")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_statement(
    State(app_state): State<AppState>,
    locale: Locale,
    partner: RequireRole<PartnerOnly>,
) -> Result<Response, ApiError> {
    let pdf_bytes = statement_pdf(&app_state, &partner.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"statement_{}.pdf\"", partner.user.id),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}

async fn statement_pdf(app_state: &AppState, partner: &User) -> Result<Vec<u8>, AppError> {
    let (ledger, wallet) = app_state
        .wallet_service
        .statement(app_state.settings_service.default_rules(), partner.id)
        .await?;

    // genpdf é síncrono: renderiza fora do executor
    let document_service = app_state.document_service.clone();
    let partner = partner.clone();
    tokio::task::spawn_blocking(move || document_service.earning_statement_pdf(&partner, &ledger, &wallet))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task do PDF: {}", e))?
}

// POST /api/wallet/withdrawals
#[utoipa::path(
    post,
    path = "/api/wallet/withdrawals",
    tag = "Wallet",
    request_body = CreateWithdrawalPayload,
    responses(
        (status = 201, description = "Saque solicitado", body = WithdrawalRequest),
        (status = 422, description = "Saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn request_withdrawal(
    State(app_state): State<AppState>,
    locale: Locale,
    partner: RequireRole<PartnerOnly>,
    Json(payload): Json<CreateWithdrawalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .wallet_service
        .request_withdrawal(
            app_state.settings_service.default_rules(),
            &partner.user,
            payload.amount,
            payload.note.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/wallet/withdrawals
#[utoipa::path(
    get,
    path = "/api/wallet/withdrawals",
    tag = "Wallet",
    params(WithdrawalListQuery),
    responses(
        (status = 200, description = "Pedidos de saque", body = Vec<WithdrawalRequest>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_withdrawals(
    State(app_state): State<AppState>,
    locale: Locale,
    viewer: RequireRole<PartnerOrAdmin>,
    Query(query): Query<WithdrawalListQuery>,
) -> Result<Json<Vec<WithdrawalRequest>>, ApiError> {
    let partner_id = match viewer.user.role {
        UserRole::Admin => query.partner_id,
        _ => Some(viewer.user.id),
    };

    let requests = app_state
        .wallet_service
        .list_withdrawals(partner_id, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requests))
}

// POST /api/wallet/withdrawals/{id}/review
#[utoipa::path(
    post,
    path = "/api/wallet/withdrawals/{id}/review",
    tag = "Wallet",
    request_body = ReviewWithdrawalPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pedido de saque")
    ),
    responses(
        (status = 200, description = "Saque aprovado ou rejeitado", body = WithdrawalRequest),
        (status = 409, description = "Pedido já revisado")
    ),
    security(("api_jwt" = []))
)]
pub async fn review_withdrawal(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewWithdrawalPayload>,
) -> Result<Json<WithdrawalRequest>, ApiError> {
    let reviewed = app_state
        .wallet_service
        .review_withdrawal(id, payload.approve, &admin.user, payload.note.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reviewed))
}
