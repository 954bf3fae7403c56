//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

pub fn build_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Gateway chama o callback sem token
    let payment_routes = Router::new()
        .route("/initiate", post(handlers::payments::initiate_payment))
        .route("/callback", post(handlers::payments::payment_callback));

    // Daqui para baixo tudo passa pelo auth_guard
    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/me", get(handlers::users::get_me))
        .route("/{id}/status", patch(handlers::users::update_user_status));

    let property_routes = Router::new()
        .route("/"
               ,post(handlers::properties::create_property)
               .get(handlers::properties::list_properties)
        )
        .route("/{id}"
               ,get(handlers::properties::get_property)
               .put(handlers::properties::update_property)
        )
        .route("/{id}/earning-rules", put(handlers::properties::set_earning_rules));

    let lead_routes = Router::new()
        .route("/"
               ,post(handlers::leads::create_lead)
               .get(handlers::leads::list_leads)
        )
        .route("/{id}", get(handlers::leads::get_lead))
        .route("/{id}/status", patch(handlers::leads::update_lead_status));

    let settings_routes = Router::new()
        .route("/earning-rules"
               ,get(handlers::settings::get_earning_rules)
               .put(handlers::settings::update_earning_rules)
        );

    let wallet_routes = Router::new()
        .route("/", get(handlers::wallet::get_my_wallet))
        .route("/payables", get(handlers::wallet::get_payables))
        .route("/statement", get(handlers::wallet::download_statement))
        .route("/partners/{id}", get(handlers::wallet::get_partner_wallet))
        .route("/withdrawals"
               ,post(handlers::wallet::request_withdrawal)
               .get(handlers::wallet::list_withdrawals)
        )
        .route("/withdrawals/{id}/review", post(handlers::wallet::review_withdrawal));

    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/properties", property_routes)
        .nest("/api/leads", lead_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/wallet", wallet_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/payment", payment_routes)
        .merge(protected)
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    // Nível de log via RUST_LOG (padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    if let (Some(email), Some(password)) = (&app_state.config.admin_email, &app_state.config.admin_password) {
        app_state
            .auth_service
            .ensure_admin(email, password)
            .await
            .expect("Falha ao criar o admin inicial.");
    }

    let addr = app_state.config.bind_addr.clone();
    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    tracing::info!("📚 Swagger em http://{}/swagger-ui", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
