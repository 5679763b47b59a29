use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settlement_backend::{config::Config, crypto::keys::KeyManager, handlers, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,settlement_backend=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // Load or generate the bank's long-lived ECDH keypair
    let keys = KeyManager::load_or_generate(&config.bank_key_path)
        .expect("Failed to load or generate bank keypair");
    tracing::info!(path = %keys.path().display(), "Bank ECDH keypair ready");

    let state = AppState {
        db,
        keys: Arc::new(keys),
        settlement_deadline: Duration::from_secs(config.settlement_deadline_secs),
    };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/", get(handlers::health::service_banner))
        .route("/verify-ledger", post(handlers::ledger::verify_ledger))
        .route("/settle-ledger", post(handlers::ledger::settle_ledger))
        .route("/bank-key", get(handlers::bank_key::get_bank_key))
        .route("/bank-logs", get(handlers::audit::get_bank_logs))
        .layer(cors)
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
