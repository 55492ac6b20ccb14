pub mod chat_routes;
pub mod config;
pub mod crypto_routes;
pub mod request_id;
pub mod response_cache;


use axum::{
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use forecast_core::{AggregatedEntry, ForecastError, QueryBackend, QueryCatalog, TextGenerator};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::response_cache::ResponseCache;

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub query_backend: Arc<dyn QueryBackend>,
    pub generator: Arc<dyn TextGenerator>,
    pub catalog: Arc<QueryCatalog>,
    pub top_cache: Arc<ResponseCache<Vec<AggregatedEntry>>>,
}

impl AppState {
    pub fn new(
        query_backend: Arc<dyn QueryBackend>,
        generator: Arc<dyn TextGenerator>,
        catalog: QueryCatalog,
        top_cache: ResponseCache<Vec<AggregatedEntry>>,
    ) -> Self {
        Self {
            query_backend,
            generator,
            catalog: Arc::new(catalog),
            top_cache: Arc::new(top_cache),
        }
    }

    /// Wire the production MindsDB and Cohere clients.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let query_backend = mindsdb_client::MindsDbClient::new(config.mindsdb())?;
        let generator = cohere_client::CohereClient::new(config.cohere())?;

        Ok(Self::new(
            Arc::new(query_backend),
            Arc::new(generator),
            QueryCatalog::new(config.mindsdb_model.clone(), config.mindsdb_table.clone()),
            ResponseCache::new(config.cache_ttl(), config.cache_capacity),
        ))
    }
}

/// Handler error: an HTTP status plus the underlying cause
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<ForecastError> for AppError {
    fn from(error: ForecastError) -> Self {
        let status = match &error {
            ForecastError::UpstreamQuery(_)
            | ForecastError::UpstreamGeneration(_)
            | ForecastError::MalformedTable(_) => StatusCode::BAD_GATEWAY,
            ForecastError::PromptFormat { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::with_status(status, error.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed ({}): {:#}", self.status, self.error);
        } else {
            tracing::warn!("Request rejected ({}): {:#}", self.status, self.error);
        }

        let body = json!({
            "success": false,
            "error": self.error.to_string(),
        });
        (self.status, Json(body)).into_response()
    }
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "cryptosight-api",
        "version": env!("CARGO_PKG_VERSION"),
        "query_backend": state.query_backend.backend_name(),
        "generator": state.generator.backend_name(),
    }))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(crypto_routes::crypto_routes())
        .merge(chat_routes::chat_routes())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr()?;
    tracing::info!("Starting CryptoSight API");
    tracing::info!("  MindsDB: {} (model {}, table {})", config.mindsdb_url, config.mindsdb_model, config.mindsdb_table);
    tracing::info!("  Top-growth cache TTL: {}s", config.cache_ttl_secs);

    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
