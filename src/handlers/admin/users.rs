use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::error::ApiResult;
use crate::middleware::AdminContext;
use crate::models::User;
use crate::state::AppState;

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.accounts.list_users()?))
}

pub async fn toggle_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts.toggle_user_status(&id, &admin.address)?))
}
