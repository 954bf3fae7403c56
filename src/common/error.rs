// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::{I18nStore, FALLBACK_STORE},
    middleware::i18n::Locale,
};

// Erro interno da aplicação. Vira `ApiError` (traduzido) na borda HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Conta não está ativa")]
    AccountNotActive,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Regra de ganho inválida: {0}")]
    InvalidEarningRule(String),

    #[error("Saldo insuficiente (disponível: {available})")]
    InsufficientBalance { available: Decimal },

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Erro no gateway de pagamento: {0}")]
    GatewayError(String),

    #[error("Erro ao gerar documento: {0}")]
    DocumentError(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que efetivamente sai na resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Erro de validação de um único campo, para checagens feitas fora do `Validate`.
    pub fn invalid_field(field: &'static str, code: &'static str) -> Self {
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, validator::ValidationError::new(code));
        AppError::ValidationError(errors)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::AccountNotActive => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidEarningRule(_) | AppError::InsufficientBalance { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            AppError::GatewayError(_) => StatusCode::BAD_GATEWAY,
            AppError::DocumentError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte no erro público, com a mensagem no idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();

        let (error, details) = match &self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let code = e.message.as_deref().unwrap_or(e.code.as_ref());
                            store.translate(lang, &format!("validation.{}", code))
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (store.translate(lang, "error.validation"), Some(json!(details)))
            }
            AppError::EmailAlreadyExists => (store.translate(lang, "error.email_exists"), None),
            AppError::InvalidCredentials => (store.translate(lang, "error.invalid_credentials"), None),
            AppError::InvalidToken => (store.translate(lang, "error.invalid_token"), None),
            AppError::Forbidden => (store.translate(lang, "error.forbidden"), None),
            AppError::AccountNotActive => (store.translate(lang, "error.account_not_active"), None),
            AppError::UserNotFound => (store.translate(lang, "error.user_not_found"), None),
            AppError::ResourceNotFound(resource) => (
                store.translate_with(lang, "error.not_found", &[("resource", resource.clone())]),
                None,
            ),
            AppError::InvalidEarningRule(reason) => (
                store.translate(lang, "error.invalid_earning_rule"),
                Some(json!({ "reason": reason })),
            ),
            AppError::InsufficientBalance { available } => (
                store.translate_with(
                    lang,
                    "error.insufficient_balance",
                    &[("available", format!("{:.2}", available))],
                ),
                None,
            ),
            AppError::InvalidStatusTransition { from, to } => (
                store.translate_with(
                    lang,
                    "error.invalid_transition",
                    &[("from", from.clone()), ("to", to.clone())],
                ),
                None,
            ),
            AppError::GatewayError(message) => {
                tracing::warn!("Falha no gateway de pagamento: {}", message);
                (store.translate(lang, "error.gateway"), None)
            }
            // Todos os outros erros viram 500 com mensagem genérica.
            // O `tracing` registra o detalhe que o `thiserror` montou.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (store.translate(lang, "error.internal"), None)
            }
        };

        ApiError { status, error, details }
    }
}

// Usado pelos middlewares, que não têm o idioma à mão
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &FALLBACK_STORE).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(email(message = "invalid_email"))]
        email: String,
    }

    fn store() -> I18nStore {
        I18nStore::load().expect("catálogos embutidos")
    }

    #[test]
    fn maps_domain_errors_to_http_status() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::ResourceNotFound("Lead".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InsufficientBalance { available: Decimal::ZERO }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidStatusTransition { from: "LOST".into(), to: "NEW".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_carry_translated_details() {
        let errors = Payload { email: "not-an-email".into() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&Locale("pt".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("detalhes");
        let email_messages = details["email"].as_array().expect("lista");
        assert_eq!(email_messages.len(), 1);
        assert_eq!(email_messages[0], "O e-mail informado é inválido.");
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco vazou"))
            .to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("senha"));
    }

    #[test]
    fn insufficient_balance_message_shows_available_amount() {
        let api = AppError::InsufficientBalance { available: Decimal::new(150050, 2) }
            .to_api_error(&Locale("en".into()), &store());

        assert!(api.error.contains("1500.50"), "mensagem: {}", api.error);
    }
}
