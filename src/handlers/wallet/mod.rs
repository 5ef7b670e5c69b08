mod applications;
mod coupons;

pub use applications::*;
pub use coupons::*;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::wallet_auth;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me/coupons", get(list_my_coupons))
        .route("/coupons/{id}/claim", post(claim_coupon))
        .route("/merchant-applications", post(apply_for_merchant))
        .route("/merchant-applications/mine", get(get_my_application))
        .layer(middleware::from_fn_with_state(state, wallet_auth))
}
