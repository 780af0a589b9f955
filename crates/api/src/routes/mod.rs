pub mod generation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /generations              trigger (POST)
/// /generations/poll         poll (POST)
///
/// /prediction               current snapshot (GET)
/// /prediction/price         price check (POST)
/// /prediction/buy           buy (POST)
///
/// /frame                    button dispatch (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    generation::router()
}
