mod coupon;
mod merchant;
mod transaction;
mod user;

pub use coupon::*;
pub use merchant::*;
pub use transaction::*;
pub use user::*;
