use std::sync::Arc;

use tracing::{info, warn};

use super::require_address;
use crate::backend::{AttemptError, Backend, CouponFilter, DualBackend};
use crate::chain::{AssetMinter, MintRequest, PlaceholderMinter};
use crate::error::{DomainError, Result};
use crate::models::*;
use crate::util::{gen_id, generate_tx_reference, now_ms};

/// Create, claim and redeem coupons.
///
/// Every operation runs through [`DualBackend::execute`]; a re-run against the
/// local store repeats the whole operation, reads included.
#[derive(Clone)]
pub struct CouponService {
    backends: DualBackend,
    minter: Arc<dyn AssetMinter>,
}

impl CouponService {
    pub fn new(backends: DualBackend, minter: Arc<dyn AssetMinter>) -> Self {
        Self { backends, minter }
    }

    pub fn backends(&self) -> &DualBackend {
        &self.backends
    }

    pub async fn create(&self, input: CreateCoupon, merchant: &str) -> Result<Coupon> {
        let now = now_ms();
        require_address(merchant, "Merchant")?;
        input.validate(now)?;
        let days_valid = input.days_valid(now);

        let request = MintRequest::for_coupon(&input, merchant);
        let minted = match self.minter.mint(&request).await {
            Ok(asset) => asset,
            Err(e) => {
                warn!(error = %e, merchant, "Asset mint failed, using placeholder asset id");
                PlaceholderMinter::asset()
            }
        };
        let tx_hash = minted.tx_hash.clone().unwrap_or_else(generate_tx_reference);

        let draft = Coupon {
            id: gen_id(),
            name: request.name,
            description: request.description,
            merchant: merchant.to_string(),
            merchant_name: UNKNOWN_MERCHANT.to_string(),
            category: input.category,
            value: input.value,
            value_type: input.value_type,
            expiry: input.expiry,
            claimed: false,
            redeemed: false,
            asset_id: Some(minted.asset_id),
            created_at: now,
            claimed_at: None,
            redeemed_at: None,
            claimed_by: None,
            max_redemptions: input.max_redemptions,
            current_redemptions: 0,
            terms: input.terms.filter(|t| !t.trim().is_empty()),
            image_url: input.image_url,
        };

        let coupon = self.backends.execute("create coupon", |b| {
            let coupon = Coupon {
                merchant_name: merchant_display_name(b, merchant)?,
                ..draft.clone()
            };
            let record = TransactionRecord::confirmed(
                TransactionKind::Create,
                &coupon.id,
                merchant,
                merchant,
                Some(tx_hash.clone()),
            );
            b.insert_coupon(&coupon, &record)?;
            Ok(coupon)
        })?;

        info!(
            coupon_id = %coupon.id,
            asset_id = ?coupon.asset_id,
            merchant,
            days_valid,
            "Coupon created"
        );
        Ok(coupon)
    }

    pub fn claim(&self, coupon_id: &str, user: &str) -> Result<Coupon> {
        require_address(user, "User")?;

        let coupon = self.backends.execute("claim coupon", |b| {
            let now = now_ms();
            let coupon = find_coupon(b, coupon_id)?;
            if coupon.claimed {
                return Err(DomainError::AlreadyClaimed.into());
            }
            if coupon.is_expired(now) {
                return Err(DomainError::Expired.into());
            }
            let record = TransactionRecord::confirmed(
                TransactionKind::Claim,
                coupon_id,
                user,
                &coupon.merchant,
                Some(generate_tx_reference()),
            );
            if !b.mark_claimed(coupon_id, user, now, &record)? {
                return Err(DomainError::AlreadyClaimed.into());
            }
            Ok(Coupon {
                claimed: true,
                claimed_at: Some(now),
                claimed_by: Some(user.to_string()),
                ..coupon
            })
        })?;

        info!(coupon_id, user, "Coupon claimed");
        Ok(coupon)
    }

    /// Redeem a claimed coupon on behalf of its issuing merchant.
    ///
    /// `max_redemptions` is recorded but not enforced here.
    pub fn redeem(&self, coupon_id: &str, user: &str, merchant: &str) -> Result<Coupon> {
        require_address(user, "User")?;
        require_address(merchant, "Merchant")?;

        let coupon = self.backends.execute("redeem coupon", |b| {
            let now = now_ms();
            let coupon = find_coupon(b, coupon_id)?;
            if !coupon.claimed {
                return Err(DomainError::NotClaimed.into());
            }
            if coupon.redeemed {
                return Err(DomainError::AlreadyRedeemed.into());
            }
            if coupon.merchant != merchant {
                return Err(DomainError::Unauthorized.into());
            }
            if coupon.is_expired(now) {
                return Err(DomainError::Expired.into());
            }
            let record = TransactionRecord::confirmed(
                TransactionKind::Redeem,
                coupon_id,
                user,
                merchant,
                Some(generate_tx_reference()),
            );
            if !b.mark_redeemed(coupon_id, now, &record)? {
                return Err(DomainError::AlreadyRedeemed.into());
            }
            Ok(Coupon {
                redeemed: true,
                redeemed_at: Some(now),
                current_redemptions: coupon.current_redemptions + 1,
                ..coupon
            })
        })?;

        info!(coupon_id, user, merchant, "Coupon redeemed");
        Ok(coupon)
    }

    pub fn list(&self) -> Result<Vec<Coupon>> {
        self.list_filtered("list coupons", CouponFilter::All)
    }

    pub fn get_by_id(&self, coupon_id: &str) -> Result<Coupon> {
        self.backends
            .execute("get coupon", |b| find_coupon(b, coupon_id))
    }

    pub fn list_by_merchant(&self, merchant: &str) -> Result<Vec<Coupon>> {
        self.list_filtered(
            "list merchant coupons",
            CouponFilter::Merchant(merchant.to_string()),
        )
    }

    pub fn list_available(&self) -> Result<Vec<Coupon>> {
        self.list_filtered(
            "list available coupons",
            CouponFilter::Available { now: now_ms() },
        )
    }

    /// Coupons the user has claimed and not yet redeemed.
    pub fn list_for_user(&self, user: &str) -> Result<Vec<Coupon>> {
        self.list_filtered(
            "list user coupons",
            CouponFilter::ClaimedBy(user.to_string()),
        )
    }

    /// Counts over all coupons, or one merchant's when `merchant` is given.
    pub fn stats(&self, merchant: Option<&str>) -> Result<CouponStats> {
        let coupons = match merchant {
            Some(m) => self.list_by_merchant(m)?,
            None => self.list()?,
        };
        Ok(CouponStats::compute(&coupons, now_ms()))
    }

    pub fn list_transactions(&self, coupon_id: Option<&str>) -> Result<Vec<TransactionRecord>> {
        self.backends
            .execute("list transactions", |b| Ok(b.list_transactions(coupon_id)?))
    }

    fn list_filtered(&self, operation: &'static str, filter: CouponFilter) -> Result<Vec<Coupon>> {
        self.backends
            .execute(operation, |b| Ok(b.list_coupons(&filter)?))
    }
}

fn find_coupon(b: &dyn Backend, id: &str) -> std::result::Result<Coupon, AttemptError> {
    Ok(b.get_coupon(id)?.ok_or(DomainError::NotFound("Coupon"))?)
}

/// Profile name, else the account's display name, else a fixed label.
fn merchant_display_name(b: &dyn Backend, merchant: &str) -> std::result::Result<String, AttemptError> {
    if let Some(profile) = b.get_merchant(merchant)? {
        return Ok(profile.name);
    }
    let name = b
        .get_user_by_address(merchant)?
        .and_then(|u| u.name)
        .filter(|n| !n.trim().is_empty());
    Ok(name.unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()))
}
