// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::users::get_me,
        handlers::users::list_users,
        handlers::users::update_user_status,

        // --- Properties ---
        handlers::properties::create_property,
        handlers::properties::list_properties,
        handlers::properties::get_property,
        handlers::properties::update_property,
        handlers::properties::set_earning_rules,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::update_lead_status,

        // --- Settings ---
        handlers::settings::get_earning_rules,
        handlers::settings::update_earning_rules,

        // --- Wallet ---
        handlers::wallet::get_payables,
        handlers::wallet::get_my_wallet,
        handlers::wallet::get_partner_wallet,
        handlers::wallet::download_statement,
        handlers::wallet::request_withdrawal,
        handlers::wallet::list_withdrawals,
        handlers::wallet::review_withdrawal,

        // --- Payments ---
        handlers::payments::initiate_payment,
        handlers::payments::payment_callback,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::UserStatus,
            models::auth::PaymentStatus,
            models::auth::User,
            models::auth::UserSummary,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::UpdateUserStatusPayload,

            // --- Earning ---
            models::earning::PartnerRole,
            models::earning::EarningRuleType,
            models::earning::EarningRule,

            // --- Properties ---
            models::property::PropertyStatus,
            models::property::Property,
            models::property::PropertySummary,
            models::property::CreatePropertyPayload,
            models::property::UpdatePropertyPayload,
            models::property::SetEarningRulesPayload,

            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::Lead,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadStatusPayload,

            // --- Settings ---
            models::settings::DefaultEarningRules,
            models::settings::UpdateEarningRulesRequest,

            // --- Wallet ---
            models::wallet::PayableEntry,
            models::wallet::PayableLedger,
            models::wallet::WalletSummary,
            models::wallet::WithdrawalStatus,
            models::wallet::WithdrawalRequest,
            models::wallet::CreateWithdrawalPayload,
            models::wallet::ReviewWithdrawalPayload,

            // --- Payments ---
            models::payment::TransactionStatus,
            models::payment::PaymentTransaction,
            models::payment::InitiatePaymentRequest,
            models::payment::PaymentCallbackForm,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Perfil e aprovação de parceiros"),
        (name = "Properties", description = "Imóveis e regras de comissão por imóvel"),
        (name = "Leads", description = "Indicações dos parceiros e fechamento de negócios"),
        (name = "Settings", description = "Regras padrão de comissão"),
        (name = "Wallet", description = "Comissões a pagar, carteira e saques"),
        (name = "Payments", description = "Gateway de pagamento (PhonePe)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
