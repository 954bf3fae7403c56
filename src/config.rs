// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        LeadRepository, PaymentRepository, PropertyRepository, SettingsRepository,
        UserRepository, WithdrawalRepository,
    },
    services::{
        auth::AuthService,
        document_service::DocumentService,
        lead_service::LeadService,
        payable_service::PayableService,
        payment_service::{PaymentGateway, PaymentService, PhonePeGateway},
        property_service::PropertyService,
        settings_service::SettingsService,
        wallet_service::WalletService,
    },
};

// Tudo que vem do ambiente (.env)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    // Front-end para onde o callback de pagamento redireciona
    pub frontend_url: String,
    // URL pública desta API (usada no callbackUrl do gateway)
    pub public_base_url: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub phonepe: PhonePeConfig,
    pub statement_font_dir: String,
}

#[derive(Debug, Clone)]
pub struct PhonePeConfig {
    pub base_url: String,
    pub merchant_id: String,
    pub salt_key: String,
    pub salt_index: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000"),
            frontend_url: optional("FRONTEND_URL", "http://localhost:5173"),
            public_base_url: optional("PUBLIC_BASE_URL", "http://localhost:3000"),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            phonepe: PhonePeConfig {
                base_url: optional(
                    "PHONEPE_BASE_URL",
                    "https://api-preprod.phonepe.com/apis/pg-sandbox",
                ),
                merchant_id: required("PHONEPE_MERCHANT_ID")?,
                salt_key: required("PHONEPE_SALT_KEY")?,
                salt_index: optional("PHONEPE_SALT_INDEX", "1"),
            },
            statement_font_dir: optional("STATEMENT_FONT_DIR", "./fonts"),
        })
    }

    pub fn payment_callback_url(&self) -> String {
        format!("{}/api/payment/callback", self.public_base_url.trim_end_matches('/'))
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{} deve ser definida", name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub user_repo: UserRepository,
    pub property_service: PropertyService,
    pub lead_service: LeadService,
    pub settings_service: SettingsService,
    pub payable_service: PayableService,
    pub wallet_service: WalletService,
    pub payment_service: PaymentService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // As regras padrão são lidas logo abaixo, então o schema precisa existir antes
        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let gateway: Arc<dyn PaymentGateway> = Arc::new(PhonePeGateway::new(
            config.phonepe.clone(),
            config.payment_callback_url(),
        )?);

        let state = Self::build(config, db_pool, gateway)?;

        // Regras padrão injetadas no estado (recarregadas só quando o admin altera)
        state.settings_service.reload().await?;

        Ok(state)
    }

    /// Monta o gráfico de dependências sem tocar no banco.
    pub fn build(
        config: AppConfig,
        db_pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
    ) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let user_repo = UserRepository::new(db_pool.clone());
        let property_repo = PropertyRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let property_service = PropertyService::new(property_repo.clone());
        let lead_service = LeadService::new(lead_repo.clone(), property_repo.clone());
        let settings_service = SettingsService::new(SettingsRepository::new(db_pool.clone()));
        let payable_service = PayableService::new(lead_repo, user_repo.clone(), property_repo);
        let wallet_service = WalletService::new(
            payable_service.clone(),
            WithdrawalRepository::new(db_pool.clone()),
            user_repo.clone(),
            db_pool.clone(),
        );
        let payment_service = PaymentService::new(
            gateway,
            PaymentRepository::new(db_pool.clone()),
            user_repo.clone(),
            db_pool.clone(),
        );
        let document_service = DocumentService::new(config.statement_font_dir.clone());

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            user_repo,
            property_service,
            lead_service,
            settings_service,
            payable_service,
            wallet_service,
            payment_service,
            document_service,
        })
    }
}
