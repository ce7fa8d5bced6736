//! Prefilheus Admin Backend
//!
//! Filtering, reporting and record management for the Prefilheus request
//! intake, backed by a hosted PostgREST collection.

mod api;
mod config;
mod errors;
mod models;
mod pages;
mod query;
mod report;
mod store;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use pages::Pages;
use query::QueryBuilder;
use store::{CollectionStatus, MemoryStore, PostgrestClient, RecordStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub pages: Arc<Pages>,
    pub queries: Arc<QueryBuilder>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Prefilheus Admin Backend");
    tracing::info!("Collection: {}", config.table);
    tracing::info!("Timestamp column: {}", config.timestamp_column);
    tracing::info!("Bind address: {}", config.bind_addr);

    let store = match &config.supabase_url {
        Some(url) => {
            tracing::info!("Remote store: {}", url);
            RecordStore::Remote(PostgrestClient::new(url, &config)?)
        }
        None => {
            tracing::warn!(
                "No remote store configured (PREFILHEUS_SUPABASE_URL). Records are kept in memory!"
            );
            RecordStore::Memory(MemoryStore::new(config.timestamp_column.clone()))
        }
    };

    // Probe the collection so a missing table is reported before the first request
    match store.check_collection().await {
        Ok(CollectionStatus::Available) => tracing::info!("Collection {} is available", config.table),
        Ok(CollectionStatus::Missing) => tracing::warn!(
            "Collection {} does not exist. Create it with: CREATE TABLE {} (id SERIAL PRIMARY KEY, nome TEXT, email TEXT, telefone TEXT, secretaria TEXT, demanda TEXT, {} TIMESTAMP WITH TIME ZONE DEFAULT NOW());",
            config.table,
            config.table,
            config.timestamp_column
        ),
        Err(e) => tracing::warn!("Could not probe collection {}: {}", config.table, e),
    }

    // Create application state
    let state = AppState {
        store: Arc::new(store),
        pages: Arc::new(Pages::default()),
        queries: Arc::new(QueryBuilder::from_config(&config)),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Records
        .route("/records", get(api::list_records))
        .route("/records", post(api::create_record))
        .route("/records", delete(api::delete_all_records))
        .route("/records/{id}", put(api::update_record))
        .route("/records/{id}", delete(api::delete_record))
        // Filter page
        .route("/filter", get(api::get_filter_page))
        .route("/filter/load", post(api::load_filter_page))
        .route("/filter/apply", post(api::apply_filters))
        .route("/filter/active/{label}", delete(api::remove_active_filter))
        .route("/filter/clear", post(api::clear_filters))
        // Report page
        .route("/report", get(api::get_report_page))
        .route("/report", post(api::generate_report))
        .route("/report/clear", post(api::clear_report))
        // Insert form
        .route("/insert", get(api::get_insert_page))
        .route("/insert", post(api::submit_insert))
        // Collection
        .route("/collection/status", get(api::collection_status));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
