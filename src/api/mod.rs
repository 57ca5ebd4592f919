pub mod health;
pub mod scan;
pub mod scheduler;
pub mod settings;
pub mod watchlist;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/scan", scan::router())
        .nest("/api/scheduler", scheduler::router())
        .nest("/api/watchlist", watchlist::router())
        .nest("/api/settings", settings::router())
}
