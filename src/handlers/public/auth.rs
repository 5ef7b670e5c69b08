use axum::{Json, extract::State};

use crate::error::ApiResult;
use crate::models::{LoginRequest, User};
use crate::state::AppState;

/// Sign in with a wallet address. The address is the bearer credential for
/// wallet routes afterwards.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts.login(request)?))
}
