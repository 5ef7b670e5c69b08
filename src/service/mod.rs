//! Lifecycle operations over the dual backend.

mod accounts;
mod coupons;

pub use accounts::AccountService;
pub use coupons::CouponService;

use crate::error::{CouponError, Result};

fn require_address(address: &str, what: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(CouponError::validation(format!("{} address is required", what)));
    }
    Ok(())
}
