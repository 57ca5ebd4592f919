//! Settings endpoints: scheduler tuning and notifier credentials.

use crate::error::Result;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub fn router() -> Router<AppState> {
    Router::new().route("/:key", get(get_setting).put(put_setting))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingResponse {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutSettingRequest {
    pub value: String,
}

async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SettingResponse>> {
    let value = state.store.get_setting(&key)?;
    Ok(Json(SettingResponse { key, value }))
}

async fn put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutSettingRequest>,
) -> Result<Json<SettingResponse>> {
    state.store.set_setting(&key, &req.value)?;
    Ok(Json(SettingResponse {
        key,
        value: Some(req.value),
    }))
}
