// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use utoipa::{IntoParams, ToSchema};

use crate::models::earning::PartnerRole;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Seller,
    Customer,
    Affiliate,
    SuperAffiliate,
    Associate,
    Channel,
    Franchisee,
}

impl UserRole {
    /// Papel de parceiro equivalente, se o usuário ganha comissão.
    pub fn partner_role(self) -> Option<PartnerRole> {
        match self {
            UserRole::Affiliate => Some(PartnerRole::Affiliate),
            UserRole::SuperAffiliate => Some(PartnerRole::SuperAffiliate),
            UserRole::Associate => Some(PartnerRole::Associate),
            UserRole::Channel => Some(PartnerRole::Channel),
            UserRole::Franchisee => Some(PartnerRole::Franchisee),
            UserRole::Admin | UserRole::Seller | UserRole::Customer => None,
        }
    }

    pub fn is_partner(self) -> bool {
        self.partner_role().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Pending,   // Parceiro aguardando aprovação
    Active,
    Rejected,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
}

// --- USUÁRIO ---

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "parceiro@imobi.in")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "Ravi Kumar")]
    pub full_name: String,

    #[schema(example = "+91 98765 43210")]
    pub phone: Option<String>,

    pub role: UserRole,
    pub status: UserStatus,
    pub payment_status: PaymentStatus,

    // Chave UPI para pagamento de comissões
    #[schema(example = "ravi@okaxis")]
    pub upi_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Resumo usado nos extratos (não expõe e-mail/telefone)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

// --- PAYLOADS ---

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "parceiro@imobi.in")]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    #[schema(example = "segredo123")]
    pub password: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ravi Kumar")]
    pub full_name: String,

    pub phone: Option<String>,

    pub role: UserRole,

    pub upi_id: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "parceiro@imobi.in")]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// --- ADMINISTRAÇÃO DE USUÁRIOS ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatusPayload {
    pub status: UserStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}
