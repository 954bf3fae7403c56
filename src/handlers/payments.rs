// src/handlers/payments.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::i18n::Locale,
    models::payment::{InitiatePaymentRequest, PaymentCallbackForm},
};

// POST /api/payment/initiate
#[utoipa::path(
    post,
    path = "/api/payment/initiate",
    tag = "Payments",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "Resposta do gateway, repassada como veio"),
        (status = 400, description = "Dados inválidos"),
        (status = 500, description = "{ success: false, message }")
    )
)]
pub async fn initiate_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<InitiatePaymentRequest>,
) -> Result<Json<Value>, Response> {
    payload.validate().map_err(|e| {
        AppError::ValidationError(e)
            .to_api_error(&locale, &app_state.i18n_store)
            .into_response()
    })?;

    match app_state.payment_service.initiate(&payload).await {
        Ok(gateway_response) => Ok(Json(gateway_response)),
        Err(AppError::ValidationError(e)) => Err(AppError::ValidationError(e)
            .to_api_error(&locale, &app_state.i18n_store)
            .into_response()),
        Err(e) => {
            let message = match &e {
                AppError::GatewayError(message) => message.clone(),
                _ => app_state
                    .i18n_store
                    .translate(&locale.0, "payment.initiation_failed"),
            };
            tracing::error!("Falha ao iniciar pagamento {}: {:?}", payload.merchant_transaction_id, e);

            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response())
        }
    }
}

/// Página do front-end para onde o callback manda o cliente.
pub fn result_page(frontend_url: &str, success: bool, transaction_id: &str) -> String {
    let path = if success { "payment/success" } else { "payment/failure" };
    let base = format!("{}/{}", frontend_url.trim_end_matches('/'), path);

    reqwest::Url::parse_with_params(&base, &[("transactionId", transaction_id)])
        .map(String::from)
        .unwrap_or(base)
}

// POST /api/payment/callback
#[utoipa::path(
    post,
    path = "/api/payment/callback",
    tag = "Payments",
    request_body(content = PaymentCallbackForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redireciona para a página de sucesso ou falha")
    )
)]
pub async fn payment_callback(
    State(app_state): State<AppState>,
    Form(form): Form<PaymentCallbackForm>,
) -> Redirect {
    // Falha ao gravar não muda o resultado do gateway; fica no log para conciliação
    let success = match app_state.payment_service.handle_callback(&form).await {
        Ok(success) => success,
        Err(e) => {
            tracing::error!("Erro ao processar callback {}: {:?}", form.transaction_id, e);
            form.is_success()
        }
    };

    Redirect::to(&result_page(&app_state.config.frontend_url, success, &form.transaction_id))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::{AppConfig, PhonePeConfig},
        services::payment_service::PaymentGateway,
    };

    struct RejectingGateway;

    #[async_trait]
    impl PaymentGateway for RejectingGateway {
        async fn initiate(&self, _request: &InitiatePaymentRequest) -> Result<Value, AppError> {
            Err(AppError::GatewayError("Merchant not configured".into()))
        }
    }

    fn test_state() -> AppState {
        let config = AppConfig {
            database_url: "postgres://127.0.0.1:1/unused".into(),
            jwt_secret: "segredo-de-teste".into(),
            bind_addr: "127.0.0.1:0".into(),
            frontend_url: "https://app.example.in".into(),
            public_base_url: "https://api.example.in".into(),
            admin_email: None,
            admin_password: None,
            phonepe: PhonePeConfig {
                base_url: "http://127.0.0.1:1".into(),
                merchant_id: "M1".into(),
                salt_key: "salt".into(),
                salt_index: "1".into(),
            },
            statement_font_dir: "./fonts".into(),
        };

        // Banco inexistente: falha rápido quando alguém tenta usar
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("url válida");

        AppState::build(config, pool, Arc::new(RejectingGateway)).expect("estado de teste")
    }

    #[test]
    fn result_page_carries_the_transaction_id() {
        assert_eq!(
            result_page("https://app.example.in/", true, "MT1"),
            "https://app.example.in/payment/success?transactionId=MT1"
        );
        assert_eq!(
            result_page("https://app.example.in", false, "MT 2"),
            "https://app.example.in/payment/failure?transactionId=MT+2"
        );
    }

    #[tokio::test]
    async fn failed_callback_redirects_to_failure_page() {
        let app = crate::build_router(test_state());

        let response = app
            .oneshot(
                Request::post("/api/payment/callback")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("code=PAYMENT_ERROR&merchantId=M1&transactionId=MT42"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "https://app.example.in/payment/failure?transactionId=MT42"
        );
    }

    #[tokio::test]
    async fn successful_callback_redirects_to_success_page() {
        let app = crate::build_router(test_state());

        let response = app
            .oneshot(
                Request::post("/api/payment/callback")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("code=PAYMENT_SUCCESS&merchantId=M1&transactionId=MT7&providerReferenceId=T1"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "https://app.example.in/payment/success?transactionId=MT7"
        );
    }

    #[tokio::test]
    async fn invalid_initiate_payload_is_a_bad_request() {
        let app = crate::build_router(test_state());

        let response = app
            .oneshot(
                Request::post("/api/payment/initiate")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"amount":10,"merchantTransactionId":"","merchantUserId":"u1","redirectUrl":"not a url"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["details"]["merchant_transaction_id"].is_array());
        assert!(json["details"]["redirect_url"].is_array());
    }

    #[tokio::test]
    async fn protected_routes_require_a_bearer_token() {
        let app = crate::build_router(test_state());

        let response = app
            .clone()
            .oneshot(Request::get("/api/wallet").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::get("/api/leads")
                    .header("authorization", "Bearer invalido")
                    .header("accept-language", "pt-BR")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        let pt = crate::common::i18n::I18nStore::load().unwrap().translate("pt", "error.invalid_token");
        assert_eq!(json["error"], pt.as_str());
    }
}
