use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, CouponError, DomainError};
use crate::models::{User, UserRole};
use crate::state::AppState;
use crate::util::extract_bearer_token;

/// The signed-in wallet for this request.
#[derive(Clone)]
pub struct WalletContext {
    pub user: User,
}

impl WalletContext {
    pub fn address(&self) -> &str {
        &self.user.address
    }
}

/// Resolve the bearer wallet address to an active account.
fn authenticate_wallet(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let address = extract_bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing wallet address".into()))?;

    let user = match state.accounts.get_user(address) {
        Ok(user) => user,
        Err(CouponError::Domain(DomainError::NotFound(_))) => {
            return Err(AppError::Unauthorized("Unknown wallet, sign in first".into()));
        }
        Err(e) => return Err(e.into()),
    };

    if !user.is_active {
        return Err(AppError::Forbidden(DomainError::Inactive.to_string()));
    }
    Ok(user)
}

pub async fn wallet_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate_wallet(&state, request.headers())?;
    request.extensions_mut().insert(WalletContext { user });
    Ok(next.run(request).await)
}

pub async fn require_merchant_role(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate_wallet(&state, request.headers())?;
    if !matches!(user.role, UserRole::Merchant | UserRole::Admin) {
        return Err(AppError::Forbidden("Merchant account required".into()));
    }
    request.extensions_mut().insert(WalletContext { user });
    Ok(next.run(request).await)
}
