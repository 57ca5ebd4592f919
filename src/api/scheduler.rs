//! Scheduler control endpoints.

use crate::error::{AppError, Result};
use crate::services::store::{SETTING_SCAN_INTERVAL, SETTING_SCAN_START_HOUR};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_scheduler))
        .route("/stop", post(stop_scheduler))
        .route("/status", get(scheduler_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Minutes between passes; falls back to the stored setting, then the
    /// configured default.
    pub interval_minutes: Option<u64>,
    /// Local hour of day before which passes are skipped.
    pub start_hour: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<u32>,
}

fn stored_status(state: &AppState) -> Result<SchedulerStatus> {
    let interval_minutes = state
        .store
        .get_setting(SETTING_SCAN_INTERVAL)?
        .and_then(|v| v.parse().ok());
    let start_hour = state
        .store
        .get_setting(SETTING_SCAN_START_HOUR)?
        .and_then(|v| v.parse().ok());

    Ok(SchedulerStatus {
        running: state.scheduler.is_running(),
        interval_minutes,
        start_hour,
    })
}

async fn start_scheduler(
    State(state): State<AppState>,
    body: Option<Json<StartRequest>>,
) -> Result<Json<SchedulerStatus>> {
    let req = body.map(|Json(req)| req);

    let interval_minutes = match req.as_ref().and_then(|r| r.interval_minutes) {
        Some(minutes) => minutes,
        None => state
            .store
            .get_setting(SETTING_SCAN_INTERVAL)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(state.config.default_scan_interval_secs / 60),
    };
    if interval_minutes == 0 {
        return Err(AppError::BadRequest(
            "interval must be at least one minute".to_string(),
        ));
    }

    let start_hour = match req.as_ref().and_then(|r| r.start_hour) {
        Some(hour) => Some(hour),
        None => state
            .store
            .get_setting(SETTING_SCAN_START_HOUR)?
            .and_then(|v| v.parse().ok()),
    };
    if let Some(hour) = start_hour {
        if hour > 23 {
            return Err(AppError::BadRequest(
                "start hour must be between 0 and 23".to_string(),
            ));
        }
    }

    state
        .scheduler
        .clone()
        .start(Duration::from_secs(interval_minutes * 60), start_hour)?;

    // Persist the effective configuration so the next start reuses it.
    state
        .store
        .set_setting(SETTING_SCAN_INTERVAL, &interval_minutes.to_string())?;
    if let Some(hour) = start_hour {
        state
            .store
            .set_setting(SETTING_SCAN_START_HOUR, &hour.to_string())?;
    }

    stored_status(&state).map(Json)
}

async fn stop_scheduler(State(state): State<AppState>) -> Result<Json<SchedulerStatus>> {
    state.scheduler.stop();
    stored_status(&state).map(Json)
}

async fn scheduler_status(State(state): State<AppState>) -> Result<Json<SchedulerStatus>> {
    stored_status(&state).map(Json)
}
