use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::models::{Coupon, CouponStats, TransactionRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CouponListQuery {
    /// Restrict to one merchant's coupons
    #[serde(default)]
    pub merchant: Option<String>,
}

pub async fn list_coupons(
    State(state): State<AppState>,
    Query(query): Query<CouponListQuery>,
) -> ApiResult<Json<Vec<Coupon>>> {
    let coupons = match query.merchant.as_deref() {
        Some(merchant) => state.coupons.list_by_merchant(merchant)?,
        None => state.coupons.list()?,
    };
    Ok(Json(coupons))
}

pub async fn list_available_coupons(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Coupon>>> {
    Ok(Json(state.coupons.list_available()?))
}

pub async fn coupon_stats(
    State(state): State<AppState>,
    Query(query): Query<CouponListQuery>,
) -> ApiResult<Json<CouponStats>> {
    Ok(Json(state.coupons.stats(query.merchant.as_deref())?))
}

pub async fn get_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Coupon>> {
    Ok(Json(state.coupons.get_by_id(&id)?))
}

pub async fn list_coupon_transactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<TransactionRecord>>> {
    Ok(Json(state.coupons.list_transactions(Some(&id))?))
}
