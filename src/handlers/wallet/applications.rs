use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::error::ApiResult;
use crate::middleware::WalletContext;
use crate::models::{CreateMerchantApplication, MerchantApplication};
use crate::state::AppState;

pub async fn apply_for_merchant(
    State(state): State<AppState>,
    Extension(ctx): Extension<WalletContext>,
    Json(input): Json<CreateMerchantApplication>,
) -> ApiResult<(StatusCode, Json<MerchantApplication>)> {
    let app = state.accounts.apply_for_merchant(ctx.address(), input)?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// The caller's most recent application, or `null`.
pub async fn get_my_application(
    State(state): State<AppState>,
    Extension(ctx): Extension<WalletContext>,
) -> ApiResult<Json<Option<MerchantApplication>>> {
    Ok(Json(state.accounts.get_user_application(ctx.address())?))
}
