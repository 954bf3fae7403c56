// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NewUser, UserRepository},
    models::auth::{Claims, RegisterUserPayload, User, UserRole, UserStatus},
};

const TOKEN_TTL_DAYS: i64 = 7;

/// Status inicial: parceiros aguardam aprovação do admin.
pub fn initial_status(role: UserRole) -> UserStatus {
    if role.is_partner() {
        UserStatus::Pending
    } else {
        UserStatus::Active
    }
}

/// Usuários rejeitados ou suspensos não recebem token.
pub fn can_log_in(status: UserStatus) -> bool {
    matches!(status, UserStatus::Active | UserStatus::Pending)
}

pub fn create_token(user_id: Uuid, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        // Admin só nasce pelo bootstrap (ADMIN_EMAIL / ADMIN_PASSWORD)
        if payload.role == UserRole::Admin {
            return Err(AppError::invalid_field("role", "role_not_allowed"));
        }

        let hashed_password = hash_password(&payload.password).await?;

        let new_user = self
            .user_repo
            .create_user(
                &self.pool,
                NewUser {
                    email: &payload.email,
                    password_hash: &hashed_password,
                    full_name: &payload.full_name,
                    phone: payload.phone.as_deref(),
                    role: payload.role,
                    status: initial_status(payload.role),
                    upi_id: payload.upi_id.as_deref(),
                },
            )
            .await?;

        tracing::info!("👤 Usuário {} registrado como {:?}", new_user.id, new_user.role);

        create_token(new_user.id, &self.jwt_secret)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        if !can_log_in(user.status) {
            return Err(AppError::AccountNotActive);
        }

        create_token(user.id, &self.jwt_secret)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(token, &self.jwt_secret)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // Suspensão vale na hora, não só no próximo login
        if !can_log_in(user.status) {
            return Err(AppError::AccountNotActive);
        }

        Ok(user)
    }

    /// Garante que o admin configurado no ambiente existe.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        let hashed_password = hash_password(password).await?;
        let admin = self
            .user_repo
            .create_user(
                &self.pool,
                NewUser {
                    email,
                    password_hash: &hashed_password,
                    full_name: "Administrator",
                    phone: None,
                    role: UserRole::Admin,
                    status: UserStatus::Active,
                    upi_id: None,
                },
            )
            .await?;

        tracing::info!("🔑 Admin inicial criado: {}", admin.email);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partners_start_pending_others_active() {
        assert_eq!(initial_status(UserRole::Affiliate), UserStatus::Pending);
        assert_eq!(initial_status(UserRole::Franchisee), UserStatus::Pending);
        assert_eq!(initial_status(UserRole::Seller), UserStatus::Active);
        assert_eq!(initial_status(UserRole::Customer), UserStatus::Active);
    }

    #[test]
    fn rejected_and_suspended_users_cannot_log_in() {
        assert!(can_log_in(UserStatus::Active));
        assert!(can_log_in(UserStatus::Pending));
        assert!(!can_log_in(UserStatus::Rejected));
        assert!(!can_log_in(UserStatus::Suspended));
    }

    #[test]
    fn token_round_trip_keeps_the_subject() {
        let id = Uuid::new_v4();
        let token = create_token(id, "segredo").unwrap();

        let claims = decode_token(&token, "segredo").unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_another_secret_is_refused() {
        let token = create_token(Uuid::new_v4(), "segredo").unwrap();
        assert!(matches!(decode_token(&token, "outro"), Err(AppError::InvalidToken)));
        assert!(matches!(decode_token("lixo", "segredo"), Err(AppError::InvalidToken)));
    }
}
