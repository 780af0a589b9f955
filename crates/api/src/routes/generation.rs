use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generations", post(generation::trigger))
        .route("/generations/poll", post(generation::poll))
        .route("/prediction", get(generation::current))
        .route("/prediction/price", post(generation::check_price))
        .route("/prediction/buy", post(generation::buy))
        .route("/frame", post(generation::frame))
        .route("/image-proxy", get(generation::image_proxy))
}
