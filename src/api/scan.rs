//! Interactive scan endpoints.

use crate::error::{AppError, Result};
use crate::types::ScanResult;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/run", post(run_scan))
        .route("/latest", get(latest_scan))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunScanRequest {
    /// Tickers to scan; defaults to the monitored watchlist.
    pub tickers: Option<Vec<String>>,
}

/// Run a scan pass synchronously and return the result.
/// Long-running by nature; progress reporting is the caller's concern.
async fn run_scan(
    State(state): State<AppState>,
    body: Option<Json<RunScanRequest>>,
) -> Result<Json<ScanResult>> {
    let requested = body.and_then(|Json(req)| req.tickers);
    let tickers = match requested {
        Some(tickers) if !tickers.is_empty() => tickers,
        _ => state.store.list_monitored_tickers()?,
    };

    if tickers.is_empty() {
        return Err(AppError::BadRequest(
            "no tickers to scan; the watchlist is empty".to_string(),
        ));
    }

    let result = state.scanner.scan(&tickers).await;
    state.store.save_scan_result(&result)?;
    *state.latest.write().unwrap() = Some(result.clone());

    Ok(Json(result))
}

/// Most recently completed pass, falling back to the persisted cache so
/// results survive a restart.
async fn latest_scan(State(state): State<AppState>) -> Result<Json<ScanResult>> {
    if let Some(result) = state.latest.read().unwrap().clone() {
        return Ok(Json(result));
    }

    let Some(result) = state.store.load_last_scan_result()? else {
        return Err(AppError::NotFound("no scan has completed yet".to_string()));
    };

    *state.latest.write().unwrap() = Some(result.clone());
    Ok(Json(result))
}
