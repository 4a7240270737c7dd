//! services/api/src/bin/api.rs
//!
//! Entry point for the catalog HTTP service.

use api_lib::{
    adapters::DbAdapter,
    config::Config,
    error::ApiError,
    web::{build_router, ApiDoc, AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use book_catalog_core::tones::GenreToneLexicon;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const MAX_DB_CONNECTIONS: u32 = 5;

/// Loads the genre -> tone lexicon from the configured file, or the built-in one.
fn load_lexicon(config: &Config) -> Result<GenreToneLexicon, ApiError> {
    let Some(path) = &config.genre_tone_lexicon_path else {
        return Ok(GenreToneLexicon::builtin());
    };
    let json = std::fs::read_to_string(path)?;
    let lexicon = GenreToneLexicon::from_json(&json).map_err(|e| {
        ApiError::Internal(format!(
            "Invalid genre tone lexicon at {}: {}",
            path.display(),
            e
        ))
    })?;
    info!(
        path = %path.display(),
        genres = lexicon.associations().len(),
        "Loaded genre tone lexicon"
    );
    Ok(lexicon)
}

fn cors_layer(config: &Config) -> Result<CorsLayer, ApiError> {
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]))
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(EnvFilter::new(config.log_level.as_str()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(bind_address = %config.bind_address, "Catalog service configured");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(DbAdapter::new(pool));
    store.run_migrations().await?;
    info!("Catalog schema is up to date");

    let lexicon = load_lexicon(&config)?;
    let cors = cors_layer(&config)?;
    let app_state = Arc::new(AppState::new(store, config.clone(), lexicon));

    let app = Router::new()
        .merge(build_router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!(
        "Listening on {}; API docs at http://{}/swagger-ui",
        config.bind_address, config.bind_address
    );
    axum::serve(listener, app).await?;
    Ok(())
}
