//! Prediction listing endpoints.

use axum::{extract::State, routing::get, Json, Router};
use forecast_core::{aggregate_top_growth, AggregatedEntry, ForecastError};
use std::collections::HashSet;

use crate::{AppError, AppState};

/// Cache slot holding the full `/get_top` response
pub const TOP_CACHE_KEY: &str = "cached_response";

pub fn crypto_routes() -> Router<AppState> {
    Router::new()
        .route("/get_top", get(get_top))
        .route("/get_cryptos", get(get_cryptos))
}

/// Coins ranked by growth rate, served from a 24h cache.
async fn get_top(State(state): State<AppState>) -> Result<Json<Vec<AggregatedEntry>>, AppError> {
    let entries = state
        .top_cache
        .get_or_try_insert_with(TOP_CACHE_KEY, || async {
            let table = state
                .query_backend
                .query(&state.catalog.predictions(None))
                .await?;
            let rows = table.prediction_rows()?;
            let entries = aggregate_top_growth(&rows);
            tracing::info!(
                "Aggregated {} prediction rows into {} coins",
                rows.len(),
                entries.len()
            );
            Ok::<_, ForecastError>(entries)
        })
        .await?;

    Ok(Json(entries))
}

/// Distinct coin names, in the order the backend returns them.
async fn get_cryptos(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let table = state
        .query_backend
        .query(&state.catalog.distinct_names())
        .await?;

    let mut seen = HashSet::new();
    let names: Vec<String> = table
        .string_column("crypto_name")?
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect();

    Ok(Json(names))
}
