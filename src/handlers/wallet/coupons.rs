use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::error::ApiResult;
use crate::middleware::WalletContext;
use crate::models::Coupon;
use crate::state::AppState;

/// Coupons the caller has claimed and not yet redeemed.
pub async fn list_my_coupons(
    State(state): State<AppState>,
    Extension(ctx): Extension<WalletContext>,
) -> ApiResult<Json<Vec<Coupon>>> {
    Ok(Json(state.coupons.list_for_user(ctx.address())?))
}

pub async fn claim_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<WalletContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Coupon>> {
    Ok(Json(state.coupons.claim(&id, ctx.address())?))
}
