use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{auth, dashboard},
    AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/logout", get(auth::logout))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
