mod coupons;

pub use coupons::*;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::require_merchant_role;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/merchant/coupons",
            get(list_merchant_coupons).post(create_coupon),
        )
        .route("/merchant/redeem", post(redeem_coupon))
        .layer(middleware::from_fn_with_state(state, require_merchant_role))
}
