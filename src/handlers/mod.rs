pub mod admin;
pub mod merchant;
pub mod public;
pub mod wallet;

use axum::Router;

use crate::state::AppState;

/// Every route, with auth layers applied per area.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .merge(wallet::router(state.clone()))
        .merge(merchant::router(state.clone()))
        .merge(admin::router(state.clone()))
        .with_state(state)
}
