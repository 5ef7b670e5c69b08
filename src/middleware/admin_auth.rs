use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;
use crate::util::extract_bearer_token;

pub const ADMIN_ADDRESS_HEADER: &str = "X-Admin-Address";

/// The acting administrator for this request.
#[derive(Clone)]
pub struct AdminContext {
    pub address: String,
}

fn authenticate_admin(state: &AppState, headers: &HeaderMap) -> Result<AdminContext, AppError> {
    let expected = state
        .admin_api_key
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("Admin access is not configured".into()))?;
    let provided = extract_bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing admin API key".into()))?;

    if !bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(AppError::Unauthorized("Invalid admin API key".into()));
    }

    let address = headers
        .get(ADMIN_ADDRESS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing X-Admin-Address header".into()))?;

    Ok(AdminContext {
        address: address.to_string(),
    })
}

pub async fn admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let admin = authenticate_admin(&state, request.headers())?;
    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}
