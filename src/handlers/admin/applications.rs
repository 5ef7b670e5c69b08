use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::error::ApiResult;
use crate::middleware::AdminContext;
use crate::models::{MerchantApplication, ReviewApplication};
use crate::state::AppState;

pub async fn list_applications(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MerchantApplication>>> {
    Ok(Json(state.accounts.list_applications()?))
}

pub async fn review_application(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<String>,
    Json(review): Json<ReviewApplication>,
) -> ApiResult<Json<MerchantApplication>> {
    let app = state
        .accounts
        .review_application(&id, &admin.address, review)?;
    Ok(Json(app))
}
