use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::{CouponError, Result};
use crate::util::{MS_PER_DAY, days_from};

/// Latest expiry accepted at creation time, in days from now.
pub const MAX_EXPIRY_DAYS: i64 = 365;

pub const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CouponCategory {
    Food,
    Retail,
    Services,
    Entertainment,
    Travel,
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Issuing merchant's address
    pub merchant: String,
    /// Display copy of the merchant's name at creation time
    pub merchant_name: String,
    pub category: CouponCategory,
    pub value: f64,
    pub value_type: ValueType,
    /// Unix milliseconds
    pub expiry: i64,
    pub claimed: bool,
    pub redeemed: bool,
    /// Asset id assigned once the mint is confirmed (or a local placeholder)
    pub asset_id: Option<u64>,
    pub created_at: i64,
    pub claimed_at: Option<i64>,
    pub redeemed_at: Option<i64>,
    /// Address of the user who claimed this coupon
    pub claimed_by: Option<String>,
    pub max_redemptions: Option<u32>,
    pub current_redemptions: u32,
    pub terms: Option<String>,
    pub image_url: Option<String>,
}

impl Coupon {
    /// Expiry is computed, never stored: a coupon past its expiry keeps its flags.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiry < now
    }

    /// Unclaimed, unredeemed and strictly before expiry.
    pub fn is_available(&self, now: i64) -> bool {
        !self.claimed && !self.redeemed && self.expiry > now
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCoupon {
    pub name: String,
    pub description: String,
    pub category: CouponCategory,
    pub value: f64,
    pub value_type: ValueType,
    pub expiry: i64,
    #[serde(default)]
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateCoupon {
    pub fn validate(&self, now: i64) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CouponError::validation("Coupon name is required"));
        }
        if name.chars().count() > 100 {
            return Err(CouponError::validation(
                "Coupon name must be at most 100 characters",
            ));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(CouponError::validation("Description is required"));
        }
        if description.chars().count() > 500 {
            return Err(CouponError::validation(
                "Description must be at most 500 characters",
            ));
        }
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err(CouponError::validation("Value must be greater than 0"));
        }
        if self.value_type == ValueType::Percentage && self.value > 100.0 {
            return Err(CouponError::validation("Percentage cannot exceed 100"));
        }
        if self.expiry <= now {
            return Err(CouponError::validation("Expiry must be in the future"));
        }
        if self.expiry > days_from(now, MAX_EXPIRY_DAYS) {
            return Err(CouponError::validation(format!(
                "Expiry cannot be more than {} days away",
                MAX_EXPIRY_DAYS
            )));
        }
        if self.max_redemptions == Some(0) {
            return Err(CouponError::validation(
                "Max redemptions must be at least 1",
            ));
        }
        if let Some(terms) = &self.terms {
            if terms.chars().count() > 1000 {
                return Err(CouponError::validation(
                    "Terms must be at most 1000 characters",
                ));
            }
        }
        Ok(())
    }

    /// Days until expiry, rounded down. Used in log lines only.
    pub fn days_valid(&self, now: i64) -> i64 {
        (self.expiry - now) / MS_PER_DAY
    }
}

/// Counts over a set of coupons at a given instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CouponStats {
    pub total: usize,
    /// Unclaimed, unredeemed and not yet expired
    pub active: usize,
    /// Claimed but not redeemed
    pub claimed: usize,
    pub redeemed: usize,
    pub expired: usize,
}

impl CouponStats {
    pub fn compute(coupons: &[Coupon], now: i64) -> Self {
        coupons.iter().fold(Self::default(), |mut stats, c| {
            stats.total += 1;
            if c.is_available(now) {
                stats.active += 1;
            }
            if c.claimed && !c.redeemed {
                stats.claimed += 1;
            }
            if c.redeemed {
                stats.redeemed += 1;
            }
            if c.is_expired(now) {
                stats.expired += 1;
            }
            stats
        })
    }
}
