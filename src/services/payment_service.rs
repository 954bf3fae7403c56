// src/services/payment_service.rs

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::PhonePeConfig,
    db::{PaymentRepository, UserRepository},
    models::{
        auth::PaymentStatus,
        payment::{InitiatePaymentRequest, PaymentCallbackForm, PaymentTransaction, TransactionStatus},
    },
};

const PAY_ENDPOINT: &str = "/pg/v1/pay";
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
//  GATEWAY
// =============================================================================

/// Ponto de troca do provedor de pagamento (nos testes entra um mock).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Devolve o JSON do provedor como veio.
    async fn initiate(&self, request: &InitiatePaymentRequest) -> Result<Value, AppError>;
}

pub struct PhonePeGateway {
    client: reqwest::Client,
    config: PhonePeConfig,
    callback_url: String,
}

/// Corpo assinado de uma chamada `/pg/v1/pay`.
#[derive(Debug, PartialEq)]
pub struct SignedPayRequest {
    pub base64_payload: String,
    pub x_verify: String,
}

impl PhonePeGateway {
    pub fn new(config: PhonePeConfig, callback_url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .context("Falha ao criar o cliente HTTP do gateway")?;

        Ok(Self { client, config, callback_url })
    }
}

/// Rúpias -> paise (inteiro).
pub fn amount_in_paise(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Monta o payload base64 e o cabeçalho X-VERIFY.
///
/// `X-VERIFY = sha256(base64 + "/pg/v1/pay" + saltKey) + "###" + saltIndex`
pub fn build_pay_request(
    config: &PhonePeConfig,
    callback_url: &str,
    request: &InitiatePaymentRequest,
) -> Result<SignedPayRequest, AppError> {
    let amount = amount_in_paise(request.amount)
        .filter(|paise| *paise > 0)
        .ok_or_else(|| AppError::invalid_field("amount", "invalid_amount"))?;

    let payload = json!({
        "merchantId": config.merchant_id,
        "merchantTransactionId": request.merchant_transaction_id,
        "merchantUserId": request.merchant_user_id,
        "amount": amount,
        "redirectUrl": request.redirect_url,
        "redirectMode": "POST",
        "callbackUrl": callback_url,
        "paymentInstrument": { "type": "PAY_PAGE" },
    });

    let base64_payload = BASE64.encode(payload.to_string());

    let mut hasher = Sha256::new();
    hasher.update(base64_payload.as_bytes());
    hasher.update(PAY_ENDPOINT.as_bytes());
    hasher.update(config.salt_key.as_bytes());
    let x_verify = format!("{}###{}", hex::encode(hasher.finalize()), config.salt_index);

    Ok(SignedPayRequest { base64_payload, x_verify })
}

#[async_trait]
impl PaymentGateway for PhonePeGateway {
    async fn initiate(&self, request: &InitiatePaymentRequest) -> Result<Value, AppError> {
        let signed = build_pay_request(&self.config, &self.callback_url, request)?;
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), PAY_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .header("X-VERIFY", &signed.x_verify)
            .json(&json!({ "request": signed.base64_payload }))
            .send()
            .await
            .context("Falha ao chamar o gateway de pagamento")?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .context("Resposta do gateway não é JSON")?;

        if !status.is_success() || body.get("success") == Some(&Value::Bool(false)) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Payment gateway rejected the request")
                .to_string();
            tracing::warn!("Gateway recusou {}: {} ({})", request.merchant_transaction_id, message, status);
            return Err(AppError::GatewayError(message));
        }

        Ok(body)
    }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    repo: PaymentRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

// =============================================================================
//  CALLBACK
// =============================================================================

/// O que fazer com um callback do gateway, decidido antes de tocar no banco.
#[derive(Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Transação desconhecida: nada a gravar, o redirect segue o código.
    Unknown,
    /// Já concluída: um callback repetido não rebaixa o status.
    AlreadySettled,
    /// Grava o status; `paid_user` é o usuário a marcar como pago.
    Mark {
        status: TransactionStatus,
        paid_user: Option<Uuid>,
    },
}

impl CallbackAction {
    /// Se o cliente vai para a página de sucesso.
    pub fn succeeded(&self, success: bool) -> bool {
        match self {
            CallbackAction::AlreadySettled => true,
            CallbackAction::Unknown => success,
            CallbackAction::Mark { status, .. } => *status == TransactionStatus::Success,
        }
    }
}

pub fn plan_callback(existing: Option<&PaymentTransaction>, success: bool) -> CallbackAction {
    let Some(transaction) = existing else {
        return CallbackAction::Unknown;
    };

    if transaction.status == TransactionStatus::Success {
        return CallbackAction::AlreadySettled;
    }

    if !success {
        return CallbackAction::Mark { status: TransactionStatus::Failed, paid_user: None };
    }

    let paid_user = match Uuid::parse_str(&transaction.merchant_user_id) {
        Ok(user_id) => Some(user_id),
        Err(_) => {
            tracing::warn!("merchantUserId '{}' não é um id de usuário", transaction.merchant_user_id);
            None
        }
    };

    CallbackAction::Mark { status: TransactionStatus::Success, paid_user }
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        repo: PaymentRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { gateway, repo, user_repo, pool }
    }

    pub async fn initiate(&self, request: &InitiatePaymentRequest) -> Result<Value, AppError> {
        if request.amount <= Decimal::ZERO {
            return Err(AppError::invalid_field("amount", "invalid_amount"));
        }

        let is_new = self
            .repo
            .record_initiated(&request.merchant_transaction_id, &request.merchant_user_id, request.amount)
            .await?;
        if !is_new {
            tracing::warn!("Transação {} reenviada ao gateway", request.merchant_transaction_id);
        }

        let response = self.gateway.initiate(request).await?;

        tracing::info!("💳 Pagamento {} iniciado ({})", request.merchant_transaction_id, request.amount);

        Ok(response)
    }

    /// Aplica o retorno do gateway. Devolve `true` quando o pagamento foi concluído.
    pub async fn handle_callback(&self, form: &PaymentCallbackForm) -> Result<bool, AppError> {
        let success = form.is_success();

        let mut tx = self.pool.begin().await?;

        let existing = self.repo.find_for_update(&mut *tx, &form.transaction_id).await?;
        let action = plan_callback(existing.as_ref(), success);

        match &action {
            CallbackAction::Unknown => {
                tracing::warn!("Callback para transação desconhecida: {}", form.transaction_id);
            }
            CallbackAction::AlreadySettled => {}
            CallbackAction::Mark { status, paid_user } => {
                self.repo
                    .mark(&mut *tx, &form.transaction_id, *status, form.provider_reference_id.as_deref())
                    .await?;

                if let Some(user_id) = paid_user {
                    if self
                        .user_repo
                        .update_payment_status(&mut *tx, *user_id, PaymentStatus::Paid)
                        .await?
                        .is_none()
                    {
                        tracing::warn!("Pagamento {} de usuário inexistente {}", form.transaction_id, user_id);
                    }
                }

                tx.commit().await?;

                tracing::info!("Callback {}: {}", form.transaction_id, form.code);
            }
        }

        Ok(action.succeeded(success))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PhonePeConfig {
        PhonePeConfig {
            base_url: "https://api-preprod.phonepe.com/apis/pg-sandbox".into(),
            merchant_id: "PGTESTPAYUAT".into(),
            salt_key: "099eb0cd-02cf-4e2a-8aca-3e6c6aff0399".into(),
            salt_index: "1".into(),
        }
    }

    fn request(amount: Decimal) -> InitiatePaymentRequest {
        InitiatePaymentRequest {
            amount,
            merchant_transaction_id: "MT7850590068188104".into(),
            merchant_user_id: "MUID123".into(),
            redirect_url: "https://app.example.in/payment/status".into(),
        }
    }

    #[test]
    fn rupees_become_whole_paise() {
        assert_eq!(amount_in_paise(Decimal::from(999)), Some(99_900));
        assert_eq!(amount_in_paise(Decimal::new(1005, 2)), Some(1005));
        assert_eq!(amount_in_paise(Decimal::new(10005, 3)), Some(1001));
    }

    #[test]
    fn payload_is_base64_json_with_amount_in_paise() {
        let signed = build_pay_request(&config(), "https://api.example.in/api/payment/callback", &request(Decimal::from(10)))
            .unwrap();

        let decoded = BASE64.decode(&signed.base64_payload).unwrap();
        let payload: Value = serde_json::from_slice(&decoded).unwrap();

        assert_eq!(payload["merchantId"], "PGTESTPAYUAT");
        assert_eq!(payload["merchantTransactionId"], "MT7850590068188104");
        assert_eq!(payload["amount"], 1000);
        assert_eq!(payload["redirectMode"], "POST");
        assert_eq!(payload["callbackUrl"], "https://api.example.in/api/payment/callback");
        assert_eq!(payload["paymentInstrument"]["type"], "PAY_PAGE");
    }

    #[test]
    fn checksum_is_sha256_of_payload_endpoint_and_salt_plus_index() {
        let cfg = config();
        let signed = build_pay_request(&cfg, "https://cb", &request(Decimal::from(1))).unwrap();

        let expected = hex::encode(Sha256::digest(
            format!("{}{}{}", signed.base64_payload, PAY_ENDPOINT, cfg.salt_key).as_bytes(),
        ));

        let (digest, index) = signed.x_verify.split_once("###").unwrap();
        assert_eq!(digest, expected);
        assert_eq!(digest.len(), 64);
        assert_eq!(index, "1");
    }

    fn transaction(status: TransactionStatus, merchant_user_id: &str) -> PaymentTransaction {
        PaymentTransaction {
            merchant_transaction_id: "MT7".into(),
            merchant_user_id: merchant_user_id.into(),
            amount: Decimal::from(999),
            status,
            provider_reference_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn successful_callback_marks_transaction_and_user_paid() {
        let user_id = Uuid::new_v4();
        let initiated = transaction(TransactionStatus::Initiated, &user_id.to_string());

        let action = plan_callback(Some(&initiated), true);
        assert_eq!(
            action,
            CallbackAction::Mark { status: TransactionStatus::Success, paid_user: Some(user_id) }
        );
        assert!(action.succeeded(true));
    }

    #[test]
    fn failed_callback_marks_failed_and_leaves_the_user_alone() {
        let initiated = transaction(TransactionStatus::Initiated, &Uuid::new_v4().to_string());

        let action = plan_callback(Some(&initiated), false);
        assert_eq!(action, CallbackAction::Mark { status: TransactionStatus::Failed, paid_user: None });
        assert!(!action.succeeded(false));
    }

    #[test]
    fn settled_transaction_is_never_downgraded() {
        let settled = transaction(TransactionStatus::Success, &Uuid::new_v4().to_string());

        for success in [true, false] {
            let action = plan_callback(Some(&settled), success);
            assert_eq!(action, CallbackAction::AlreadySettled);
            assert!(action.succeeded(success));
        }
    }

    #[test]
    fn unknown_transaction_follows_the_gateway_code() {
        assert_eq!(plan_callback(None, true), CallbackAction::Unknown);
        assert!(CallbackAction::Unknown.succeeded(true));
        assert!(!CallbackAction::Unknown.succeeded(false));
    }

    #[test]
    fn merchant_user_id_that_is_not_a_uuid_only_marks_the_transaction() {
        let initiated = transaction(TransactionStatus::Initiated, "MUID123");

        let action = plan_callback(Some(&initiated), true);
        assert_eq!(action, CallbackAction::Mark { status: TransactionStatus::Success, paid_user: None });
        assert!(action.succeeded(true));
    }

    #[test]
    fn failed_transaction_can_still_succeed_on_a_later_callback() {
        let user_id = Uuid::new_v4();
        let failed = transaction(TransactionStatus::Failed, &user_id.to_string());

        assert_eq!(
            plan_callback(Some(&failed), true),
            CallbackAction::Mark { status: TransactionStatus::Success, paid_user: Some(user_id) }
        );
    }

    #[test]
    fn non_positive_amount_is_a_validation_error() {
        let err = build_pay_request(&config(), "https://cb", &request(Decimal::ZERO)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
