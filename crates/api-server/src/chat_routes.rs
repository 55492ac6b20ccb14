//! Natural-language chat endpoint.
//!
//! The user's prompt is turned into a `mode||coin||date||amount||summary`
//! line by the text generator, then answered with either recent history
//! (`show`) or the model's predictions (`predict`) for that coin.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use forecast_core::{
    build_instruction, parse_completion, sql::history_window_start, ticker, ParsedPrompt,
    PricePoint, QueryMode,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub prompt: String,
    pub response: Vec<PricePoint>,
    pub response_type: QueryMode,
    pub crypto_name: String,
    pub crypto_code: Option<String>,
    pub date: String,
    pub img_url: String,
    pub amount: String,
    pub summary: String,
}

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat_completion", get(chat_completion))
}

async fn chat_completion(
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<ChatCompletionResponse>, AppError> {
    let today = Local::now().date_naive();
    let response = answer_prompt(&state, query.prompt, today).await?;
    Ok(Json(response))
}

/// Generate, parse and dispatch one chat prompt as of `today`.
pub async fn answer_prompt(
    state: &AppState,
    prompt: String,
    today: NaiveDate,
) -> Result<ChatCompletionResponse, AppError> {
    let completion = state
        .generator
        .generate(&build_instruction(today, &prompt))
        .await?;
    let parsed = parse_completion(&completion)?;
    tracing::info!(
        mode = %parsed.mode,
        crypto = %parsed.crypto_name,
        date = %parsed.date,
        amount = %parsed.amount,
        "Parsed chat prompt"
    );

    let sql = match parsed.mode {
        QueryMode::Show => state
            .catalog
            .history_since(&parsed.crypto_name, history_window_start(today)),
        QueryMode::Predict => state.catalog.predictions(Some(&parsed.crypto_name)),
    };
    let points = state.query_backend.query(&sql).await?.price_points()?;

    let (code, img_url) = ticker::resolve(&parsed.crypto_name);
    let ParsedPrompt {
        mode,
        crypto_name,
        date,
        amount,
        summary,
    } = parsed;

    Ok(ChatCompletionResponse {
        prompt,
        response: points,
        response_type: mode,
        crypto_name,
        crypto_code: code.map(str::to_string),
        date,
        img_url,
        amount,
        summary,
    })
}
