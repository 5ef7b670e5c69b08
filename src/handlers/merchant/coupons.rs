use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::middleware::WalletContext;
use crate::models::{Coupon, CreateCoupon};
use crate::state::AppState;

pub async fn create_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<WalletContext>,
    Json(input): Json<CreateCoupon>,
) -> ApiResult<(StatusCode, Json<Coupon>)> {
    let coupon = state.coupons.create(input, ctx.address()).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn list_merchant_coupons(
    State(state): State<AppState>,
    Extension(ctx): Extension<WalletContext>,
) -> ApiResult<Json<Vec<Coupon>>> {
    Ok(Json(state.coupons.list_by_merchant(ctx.address())?))
}

/// Payload scanned from the customer's QR code.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub coupon_id: String,
    pub user_address: String,
}

pub async fn redeem_coupon(
    State(state): State<AppState>,
    Extension(ctx): Extension<WalletContext>,
    Json(request): Json<RedeemRequest>,
) -> ApiResult<Json<Coupon>> {
    let coupon = state
        .coupons
        .redeem(&request.coupon_id, &request.user_address, ctx.address())?;
    Ok(Json(coupon))
}
