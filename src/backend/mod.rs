//! Persistence backends and the remote -> local fallback policy.
//!
//! Both stores implement [`Backend`], a table-level contract. Every write
//! method is one atomic unit: a lifecycle transition lands together with its
//! transaction record, and an approval together with the applicant's
//! promotion, or nothing lands at all. A failed attempt therefore leaves the
//! remote store untouched before the local re-run.
//!
//! Conditional writes (`mark_claimed`, `mark_redeemed`, `review_application`)
//! return `false` when their precondition no longer holds at write time, so
//! callers can report the authoritative conflict instead of trusting an
//! earlier read.
//!
//! [`DualBackend::execute`] runs an operation against the remote store first
//! and classifies the attempt as an [`Outcome`]. Only `Unavailable` triggers a
//! single wholesale re-run against the local store. The two stores are never
//! reconciled.

mod local;
mod sql;

use std::sync::Arc;

use tracing::warn;

pub use local::LocalStore;
pub use sql::SqlBackend;

use crate::error::{BackendError, CouponError, DomainError};
use crate::models::*;

/// Which coupons a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponFilter {
    /// Everything, newest first
    All,
    /// Issued by this merchant, newest first
    Merchant(String),
    /// Unclaimed, unredeemed and not expired at `now`, newest first
    Available { now: i64 },
    /// Claimed by this user and not yet redeemed, most recently claimed first
    ClaimedBy(String),
}

pub trait Backend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Whether there is a store behind this backend at all. An unconfigured
    /// backend is reported as unavailable without attempting any I/O.
    fn is_configured(&self) -> bool {
        true
    }

    // Coupons
    fn get_coupon(&self, id: &str) -> Result<Option<Coupon>, BackendError>;
    fn list_coupons(&self, filter: &CouponFilter) -> Result<Vec<Coupon>, BackendError>;
    /// Insert a new coupon along with its creation record.
    fn insert_coupon(
        &self,
        coupon: &Coupon,
        record: &TransactionRecord,
    ) -> Result<(), BackendError>;
    /// Conditional on the coupon still being unclaimed. `record` is written
    /// only if the claim is.
    fn mark_claimed(
        &self,
        id: &str,
        user: &str,
        at: i64,
        record: &TransactionRecord,
    ) -> Result<bool, BackendError>;
    /// Conditional on the coupon being claimed and not yet redeemed.
    /// Also increments `current_redemptions`. `record` is written only if the
    /// redemption is.
    fn mark_redeemed(
        &self,
        id: &str,
        at: i64,
        record: &TransactionRecord,
    ) -> Result<bool, BackendError>;

    // Transactions
    fn list_transactions(
        &self,
        coupon_id: Option<&str>,
    ) -> Result<Vec<TransactionRecord>, BackendError>;

    // Users
    fn get_user_by_id(&self, id: &str) -> Result<Option<User>, BackendError>;
    fn get_user_by_address(&self, address: &str) -> Result<Option<User>, BackendError>;
    fn list_users(&self) -> Result<Vec<User>, BackendError>;
    fn upsert_user(&self, user: &User) -> Result<(), BackendError>;

    // Merchant profiles
    fn get_merchant(&self, address: &str) -> Result<Option<MerchantProfile>, BackendError>;
    fn upsert_merchant(&self, profile: &MerchantProfile) -> Result<(), BackendError>;

    // Merchant applications
    fn insert_application(&self, app: &MerchantApplication) -> Result<(), BackendError>;
    fn get_application(&self, id: &str) -> Result<Option<MerchantApplication>, BackendError>;
    fn list_applications(
        &self,
        user_address: Option<&str>,
    ) -> Result<Vec<MerchantApplication>, BackendError>;
    /// Conditional on the application still being pending. A `promotion` is
    /// written only if the review is.
    fn review_application(
        &self,
        review: &ApplicationReview,
        promotion: Option<&MerchantPromotion>,
    ) -> Result<bool, BackendError>;
}

/// Failure of a single attempt against one backend.
#[derive(Debug)]
pub enum AttemptError {
    Domain(DomainError),
    Backend(BackendError),
}

impl From<DomainError> for AttemptError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl From<BackendError> for AttemptError {
    fn from(e: BackendError) -> Self {
        Self::Backend(e)
    }
}

/// Explicit result of running an operation against the remote backend.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The backend answered.
    Available(T),
    /// The backend could not answer; the caller should fall back.
    Unavailable(BackendError),
    /// The backend answered with a business-rule rejection.
    DomainRejected(DomainError),
}

impl<T> Outcome<T> {
    /// Run `op` against `backend` and classify the result.
    pub fn attempt<F>(backend: &dyn Backend, op: F) -> Self
    where
        F: FnOnce(&dyn Backend) -> Result<T, AttemptError>,
    {
        if !backend.is_configured() {
            return Outcome::Unavailable(BackendError::NotConfigured);
        }
        match op(backend) {
            Ok(value) => Outcome::Available(value),
            Err(AttemptError::Domain(e)) => Outcome::DomainRejected(e),
            Err(AttemptError::Backend(e)) => Outcome::Unavailable(e),
        }
    }
}

/// Remote store with a local fallback.
#[derive(Clone)]
pub struct DualBackend {
    remote: Arc<dyn Backend>,
    local: Arc<dyn Backend>,
}

impl DualBackend {
    pub fn new(remote: Arc<dyn Backend>, local: Arc<dyn Backend>) -> Self {
        Self { remote, local }
    }

    pub fn remote(&self) -> &dyn Backend {
        self.remote.as_ref()
    }

    pub fn local(&self) -> &dyn Backend {
        self.local.as_ref()
    }

    /// Run `op` against the remote store, falling back to the local store
    /// once if the remote one is unavailable.
    ///
    /// Domain rejections from either store propagate unchanged. A backend
    /// failure on the local store is terminal.
    pub fn execute<T, F>(&self, operation: &'static str, op: F) -> Result<T, CouponError>
    where
        F: Fn(&dyn Backend) -> Result<T, AttemptError>,
    {
        match Outcome::attempt(self.remote(), &op) {
            Outcome::Available(value) => return Ok(value),
            Outcome::DomainRejected(e) => return Err(e.into()),
            Outcome::Unavailable(BackendError::NotConfigured) => {}
            Outcome::Unavailable(reason) => {
                warn!(
                    operation,
                    backend = self.remote.name(),
                    reason = %reason,
                    "remote backend failed, falling back to local store"
                );
            }
        }

        match op(self.local()) {
            Ok(value) => Ok(value),
            Err(AttemptError::Domain(e)) => Err(e.into()),
            Err(AttemptError::Backend(source)) => {
                Err(CouponError::OperationFailed { operation, source })
            }
        }
    }
}
