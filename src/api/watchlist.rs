//! Monitored watchlist endpoints.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tickers).post(add_ticker))
        .route("/:ticker", delete(remove_ticker))
        .route("/import-defaults", post(import_defaults))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistResponse {
    pub tickers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTickerRequest {
    pub ticker: String,
}

async fn list_tickers(State(state): State<AppState>) -> Result<Json<WatchlistResponse>> {
    let tickers = state.store.list_monitored_tickers()?;
    Ok(Json(WatchlistResponse { tickers }))
}

async fn add_ticker(
    State(state): State<AppState>,
    Json(req): Json<AddTickerRequest>,
) -> Result<Json<Value>> {
    let ticker = req.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::BadRequest("ticker must not be empty".to_string()));
    }

    let added = state.store.add_monitored_ticker(&ticker)?;
    Ok(Json(json!({ "ticker": ticker, "added": added })))
}

async fn remove_ticker(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Value>> {
    let removed = state.store.remove_monitored_ticker(&ticker)?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "{} is not on the watchlist",
            ticker.to_uppercase()
        )));
    }
    Ok(Json(json!({ "ticker": ticker.to_uppercase(), "removed": true })))
}

async fn import_defaults(State(state): State<AppState>) -> Result<Json<Value>> {
    let imported = state.store.import_default_tickers()?;
    let total = state.store.list_monitored_tickers()?.len();
    Ok(Json(json!({ "imported": imported, "total": total })))
}
