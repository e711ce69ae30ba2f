//! LeadTrack - Sales lead tracking API
//! Mission: Keep every lead, its owner and its conversation history in one place

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use leadtrack_backend::{
    api::{cors_layer, create_router},
    auth::JwtHandler,
    config::Config,
    store::Database,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    let db = Database::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path.display()
        )
    })?;
    info!(path = %config.database_path.display(), "database ready");

    let jwt_handler = Arc::new(JwtHandler::new(&config.jwt_secret, config.token_ttl()?));

    let app = create_router(db, jwt_handler, config.bcrypt_cost)
        .layer(cors_layer(config.cors_origin.as_deref())?);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "leadtrack_backend=debug,leadtrack=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the crate root when launched from elsewhere.
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
