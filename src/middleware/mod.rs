mod admin_auth;
mod wallet_auth;

pub use admin_auth::*;
pub use wallet_auth::*;
