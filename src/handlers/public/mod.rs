mod auth;
mod coupons;

pub use auth::*;
pub use coupons::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/coupons", get(list_coupons))
        .route("/coupons/available", get(list_available_coupons))
        .route("/coupons/stats", get(coupon_stats))
        .route("/coupons/{id}", get(get_coupon))
        .route("/coupons/{id}/transactions", get(list_coupon_transactions))
}
