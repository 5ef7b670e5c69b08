mod applications;
mod users;

pub use applications::*;
pub use users::*;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::admin_auth;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}/toggle", post(toggle_user))
        .route("/admin/applications", get(list_applications))
        .route("/admin/applications/{id}/review", post(review_application))
        .layer(middleware::from_fn_with_state(state, admin_auth))
}
