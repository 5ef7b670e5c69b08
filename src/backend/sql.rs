use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, TransactionBehavior};

use super::{Backend, CouponFilter};
use crate::db::{self, DbPool, queries};
use crate::error::BackendError;
use crate::models::*;

/// The remote, table-oriented store.
///
/// Built without a pool when no database is configured; it then reports
/// itself unconfigured and every call fails with `NotConfigured`.
#[derive(Clone)]
pub struct SqlBackend {
    pool: Option<DbPool>,
}

impl SqlBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool: Some(pool) }
    }

    pub fn unconfigured() -> Self {
        Self { pool: None }
    }

    pub fn in_memory() -> Result<Self, BackendError> {
        Ok(Self::new(db::create_memory_pool()?))
    }

    pub fn pool(&self) -> Option<&DbPool> {
        self.pool.as_ref()
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, BackendError> {
        let pool = self.pool.as_ref().ok_or(BackendError::NotConfigured)?;
        Ok(pool.get()?)
    }

    /// Run `write` inside one SQLite transaction. Nothing it did is kept
    /// unless it returns `Ok`.
    fn atomically<T, F>(&self, write: F) -> Result<T, BackendError>
    where
        F: FnOnce(&Connection) -> Result<T, BackendError>,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = write(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl Backend for SqlBackend {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn is_configured(&self) -> bool {
        self.pool.is_some()
    }

    fn get_coupon(&self, id: &str) -> Result<Option<Coupon>, BackendError> {
        queries::get_coupon_by_id(&*self.conn()?, id)
    }

    fn list_coupons(&self, filter: &CouponFilter) -> Result<Vec<Coupon>, BackendError> {
        let conn = self.conn()?;
        match filter {
            CouponFilter::All => queries::list_coupons(&conn),
            CouponFilter::Merchant(merchant) => queries::list_coupons_by_merchant(&conn, merchant),
            CouponFilter::Available { now } => queries::list_available_coupons(&conn, *now),
            CouponFilter::ClaimedBy(user) => queries::list_coupons_claimed_by(&conn, user),
        }
    }

    fn insert_coupon(
        &self,
        coupon: &Coupon,
        record: &TransactionRecord,
    ) -> Result<(), BackendError> {
        self.atomically(|conn| {
            queries::create_coupon(conn, coupon)?;
            queries::create_transaction(conn, record)
        })
    }

    fn mark_claimed(
        &self,
        id: &str,
        user: &str,
        at: i64,
        record: &TransactionRecord,
    ) -> Result<bool, BackendError> {
        self.atomically(|conn| {
            if !queries::claim_coupon(conn, id, user, at)? {
                return Ok(false);
            }
            queries::create_transaction(conn, record)?;
            Ok(true)
        })
    }

    fn mark_redeemed(
        &self,
        id: &str,
        at: i64,
        record: &TransactionRecord,
    ) -> Result<bool, BackendError> {
        self.atomically(|conn| {
            if !queries::redeem_coupon(conn, id, at)? {
                return Ok(false);
            }
            queries::create_transaction(conn, record)?;
            Ok(true)
        })
    }

    fn list_transactions(
        &self,
        coupon_id: Option<&str>,
    ) -> Result<Vec<TransactionRecord>, BackendError> {
        let conn = self.conn()?;
        match coupon_id {
            Some(id) => queries::list_transactions_for_coupon(&conn, id),
            None => queries::list_transactions(&conn),
        }
    }

    fn get_user_by_id(&self, id: &str) -> Result<Option<User>, BackendError> {
        queries::get_user_by_id(&*self.conn()?, id)
    }

    fn get_user_by_address(&self, address: &str) -> Result<Option<User>, BackendError> {
        queries::get_user_by_address(&*self.conn()?, address)
    }

    fn list_users(&self) -> Result<Vec<User>, BackendError> {
        queries::list_users(&*self.conn()?)
    }

    fn upsert_user(&self, user: &User) -> Result<(), BackendError> {
        queries::upsert_user(&*self.conn()?, user)
    }

    fn get_merchant(&self, address: &str) -> Result<Option<MerchantProfile>, BackendError> {
        queries::get_merchant(&*self.conn()?, address)
    }

    fn upsert_merchant(&self, profile: &MerchantProfile) -> Result<(), BackendError> {
        queries::upsert_merchant(&*self.conn()?, profile)
    }

    fn insert_application(&self, app: &MerchantApplication) -> Result<(), BackendError> {
        queries::create_application(&*self.conn()?, app)
    }

    fn get_application(&self, id: &str) -> Result<Option<MerchantApplication>, BackendError> {
        queries::get_application(&*self.conn()?, id)
    }

    fn list_applications(
        &self,
        user_address: Option<&str>,
    ) -> Result<Vec<MerchantApplication>, BackendError> {
        let conn = self.conn()?;
        match user_address {
            Some(address) => queries::list_applications_for_user(&conn, address),
            None => queries::list_applications(&conn),
        }
    }

    fn review_application(
        &self,
        review: &ApplicationReview,
        promotion: Option<&MerchantPromotion>,
    ) -> Result<bool, BackendError> {
        self.atomically(|conn| {
            if !queries::review_application(conn, review)? {
                return Ok(false);
            }
            if let Some(promotion) = promotion {
                queries::upsert_user(conn, &promotion.user)?;
                queries::upsert_merchant(conn, &promotion.profile)?;
            }
            Ok(true)
        })
    }
}
