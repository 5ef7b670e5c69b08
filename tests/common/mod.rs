//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

pub use algocoupons::backend::{Backend, CouponFilter, DualBackend, LocalStore, SqlBackend};
pub use algocoupons::chain::PlaceholderMinter;
pub use algocoupons::error::{BackendError, CouponError, DomainError};
pub use algocoupons::models::*;
pub use algocoupons::service::{AccountService, CouponService};
pub use algocoupons::storage::MemoryStorage;
pub use algocoupons::util::{days_from, now_ms};
pub use algocoupons::AppState;

pub const ADMIN_KEY: &str = "test-admin-key";
pub const ADMIN_ADDRESS: &str = "ADMIN_WALLET_ADDRESS";
pub const MERCHANT: &str = "MERCHANT_COFFEE_SHOP_123456789";
pub const USER_A: &str = "USER_A_ADDRESS";
pub const USER_B: &str = "USER_B_ADDRESS";

pub fn local_store() -> Arc<LocalStore> {
    Arc::new(LocalStore::new(Arc::new(MemoryStorage::new())))
}

pub fn sql_backend() -> Arc<SqlBackend> {
    Arc::new(SqlBackend::in_memory().expect("in-memory database"))
}

/// Working remote with a local fallback. Returns both stores for inspection.
pub fn healthy_backends() -> (DualBackend, Arc<SqlBackend>, Arc<LocalStore>) {
    let remote = sql_backend();
    let local = local_store();
    (DualBackend::new(remote.clone(), local.clone()), remote, local)
}

/// Remote that fails every call, with a local fallback.
pub fn failing_backends() -> (DualBackend, Arc<FailingBackend>, Arc<LocalStore>) {
    let remote = Arc::new(FailingBackend::default());
    let local = local_store();
    (DualBackend::new(remote.clone(), local.clone()), remote, local)
}

pub fn coupon_service(backends: DualBackend) -> CouponService {
    CouponService::new(backends, Arc::new(PlaceholderMinter))
}

pub fn create_input(days_valid: i64) -> CreateCoupon {
    CreateCoupon {
        name: "Free Coffee with Pastry".into(),
        description: "Get a free coffee when you purchase any pastry".into(),
        category: CouponCategory::Food,
        value: 100.0,
        value_type: ValueType::Percentage,
        expiry: days_from(now_ms(), days_valid),
        max_redemptions: Some(100),
        terms: Some("One per customer per day".into()),
        image_url: None,
    }
}

/// A coupon written straight to a store, bypassing create-time validation.
pub fn stored_coupon(id: &str, merchant: &str, expiry: i64) -> Coupon {
    Coupon {
        id: id.into(),
        name: "Stored coupon".into(),
        description: "Inserted directly".into(),
        merchant: merchant.into(),
        merchant_name: "Brew & Beans Coffee".into(),
        category: CouponCategory::Food,
        value: 10.0,
        value_type: ValueType::Fixed,
        expiry,
        claimed: false,
        redeemed: false,
        asset_id: Some(1001),
        created_at: now_ms() - 1_000,
        claimed_at: None,
        redeemed_at: None,
        claimed_by: None,
        max_redemptions: None,
        current_redemptions: 0,
        terms: None,
        image_url: None,
    }
}

/// Write a coupon straight to a store together with its creation record.
pub fn insert_stored(backend: &dyn Backend, coupon: &Coupon) {
    let record = TransactionRecord::confirmed(
        TransactionKind::Create,
        &coupon.id,
        &coupon.merchant,
        &coupon.merchant,
        None,
    );
    backend.insert_coupon(coupon, &record).unwrap();
}

/// Claim a stored coupon directly, bypassing the service checks.
pub fn claim_stored(backend: &dyn Backend, id: &str, user: &str) -> bool {
    let record = TransactionRecord::confirmed(TransactionKind::Claim, id, user, MERCHANT, None);
    backend.mark_claimed(id, user, now_ms(), &record).unwrap()
}

/// Redeem a stored coupon directly, bypassing the service checks.
pub fn redeem_stored(backend: &dyn Backend, id: &str) -> bool {
    let record = TransactionRecord::confirmed(TransactionKind::Redeem, id, USER_A, MERCHANT, None);
    backend.mark_redeemed(id, now_ms(), &record).unwrap()
}

/// Make every insert into `table` on the SQL store fail until
/// [`accept_inserts`] is called.
pub fn reject_inserts(remote: &SqlBackend, table: &str) {
    let conn = remote.pool().unwrap().get().unwrap();
    conn.execute_batch(&format!(
        "CREATE TRIGGER reject_{table} BEFORE INSERT ON {table}
         BEGIN SELECT RAISE(ABORT, '{table} unavailable'); END;"
    ))
    .unwrap();
}

pub fn accept_inserts(remote: &SqlBackend, table: &str) {
    let conn = remote.pool().unwrap().get().unwrap();
    conn.execute_batch(&format!("DROP TRIGGER reject_{table};")).unwrap();
}

// ============ Backend test doubles ============

/// A remote backend that is configured but fails every call.
#[derive(Default)]
pub struct FailingBackend {
    calls: AtomicUsize,
}

impl FailingBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::Storage("remote unavailable".into()))
    }
}

impl Backend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }
    fn get_coupon(&self, _: &str) -> Result<Option<Coupon>, BackendError> {
        self.fail()
    }
    fn list_coupons(&self, _: &CouponFilter) -> Result<Vec<Coupon>, BackendError> {
        self.fail()
    }
    fn insert_coupon(&self, _: &Coupon, _: &TransactionRecord) -> Result<(), BackendError> {
        self.fail()
    }
    fn mark_claimed(
        &self,
        _: &str,
        _: &str,
        _: i64,
        _: &TransactionRecord,
    ) -> Result<bool, BackendError> {
        self.fail()
    }
    fn mark_redeemed(&self, _: &str, _: i64, _: &TransactionRecord) -> Result<bool, BackendError> {
        self.fail()
    }
    fn list_transactions(&self, _: Option<&str>) -> Result<Vec<TransactionRecord>, BackendError> {
        self.fail()
    }
    fn get_user_by_id(&self, _: &str) -> Result<Option<User>, BackendError> {
        self.fail()
    }
    fn get_user_by_address(&self, _: &str) -> Result<Option<User>, BackendError> {
        self.fail()
    }
    fn list_users(&self) -> Result<Vec<User>, BackendError> {
        self.fail()
    }
    fn upsert_user(&self, _: &User) -> Result<(), BackendError> {
        self.fail()
    }
    fn get_merchant(&self, _: &str) -> Result<Option<MerchantProfile>, BackendError> {
        self.fail()
    }
    fn upsert_merchant(&self, _: &MerchantProfile) -> Result<(), BackendError> {
        self.fail()
    }
    fn insert_application(&self, _: &MerchantApplication) -> Result<(), BackendError> {
        self.fail()
    }
    fn get_application(&self, _: &str) -> Result<Option<MerchantApplication>, BackendError> {
        self.fail()
    }
    fn list_applications(&self, _: Option<&str>) -> Result<Vec<MerchantApplication>, BackendError> {
        self.fail()
    }
    fn review_application(
        &self,
        _: &ApplicationReview,
        _: Option<&MerchantPromotion>,
    ) -> Result<bool, BackendError> {
        self.fail()
    }
}

/// Wraps a real store but serves coupons as they looked before a concurrent
/// transition, so the service's own precondition checks pass and only the
/// conditional write can catch the conflict.
pub struct StaleReads {
    inner: Arc<dyn Backend>,
    rewind: fn(Coupon) -> Coupon,
}

impl StaleReads {
    /// Coupons read back as never claimed.
    pub fn unclaimed(inner: Arc<dyn Backend>) -> Self {
        Self {
            inner,
            rewind: |c| Coupon {
                claimed: false,
                redeemed: false,
                claimed_at: None,
                redeemed_at: None,
                claimed_by: None,
                ..c
            },
        }
    }

    /// Coupons read back as claimed but not yet redeemed.
    pub fn unredeemed(inner: Arc<dyn Backend>) -> Self {
        Self {
            inner,
            rewind: |c| Coupon {
                redeemed: false,
                redeemed_at: None,
                ..c
            },
        }
    }
}

impl Backend for StaleReads {
    fn name(&self) -> &'static str {
        "stale"
    }
    fn get_coupon(&self, id: &str) -> Result<Option<Coupon>, BackendError> {
        Ok(self.inner.get_coupon(id)?.map(self.rewind))
    }
    fn list_coupons(&self, f: &CouponFilter) -> Result<Vec<Coupon>, BackendError> {
        self.inner.list_coupons(f)
    }
    fn insert_coupon(&self, c: &Coupon, record: &TransactionRecord) -> Result<(), BackendError> {
        self.inner.insert_coupon(c, record)
    }
    fn mark_claimed(
        &self,
        id: &str,
        user: &str,
        at: i64,
        record: &TransactionRecord,
    ) -> Result<bool, BackendError> {
        self.inner.mark_claimed(id, user, at, record)
    }
    fn mark_redeemed(
        &self,
        id: &str,
        at: i64,
        record: &TransactionRecord,
    ) -> Result<bool, BackendError> {
        self.inner.mark_redeemed(id, at, record)
    }
    fn list_transactions(&self, id: Option<&str>) -> Result<Vec<TransactionRecord>, BackendError> {
        self.inner.list_transactions(id)
    }
    fn get_user_by_id(&self, id: &str) -> Result<Option<User>, BackendError> {
        self.inner.get_user_by_id(id)
    }
    fn get_user_by_address(&self, address: &str) -> Result<Option<User>, BackendError> {
        self.inner.get_user_by_address(address)
    }
    fn list_users(&self) -> Result<Vec<User>, BackendError> {
        self.inner.list_users()
    }
    fn upsert_user(&self, user: &User) -> Result<(), BackendError> {
        self.inner.upsert_user(user)
    }
    fn get_merchant(&self, address: &str) -> Result<Option<MerchantProfile>, BackendError> {
        self.inner.get_merchant(address)
    }
    fn upsert_merchant(&self, profile: &MerchantProfile) -> Result<(), BackendError> {
        self.inner.upsert_merchant(profile)
    }
    fn insert_application(&self, app: &MerchantApplication) -> Result<(), BackendError> {
        self.inner.insert_application(app)
    }
    fn get_application(&self, id: &str) -> Result<Option<MerchantApplication>, BackendError> {
        self.inner.get_application(id)
    }
    fn list_applications(
        &self,
        address: Option<&str>,
    ) -> Result<Vec<MerchantApplication>, BackendError> {
        self.inner.list_applications(address)
    }
    fn review_application(
        &self,
        review: &ApplicationReview,
        promotion: Option<&MerchantPromotion>,
    ) -> Result<bool, BackendError> {
        self.inner.review_application(review, promotion)
    }
}

// ============ HTTP helpers ============

/// Router over a healthy remote and an in-memory fallback.
pub fn test_app() -> (Router, AppState) {
    let (backends, _, _) = healthy_backends();
    let state = AppState::new(
        backends,
        Arc::new(PlaceholderMinter),
        Some(ADMIN_KEY.to_string()),
    );
    (algocoupons::handlers::router(state.clone()), state)
}

/// Sign a wallet in and promote it to merchant via a reviewed application.
pub fn make_merchant(state: &AppState, address: &str) {
    state
        .accounts
        .login(LoginRequest {
            address: address.into(),
            name: None,
            email: None,
        })
        .unwrap();
    let app = state
        .accounts
        .apply_for_merchant(
            address,
            CreateMerchantApplication {
                business_name: "Brew & Beans Coffee".into(),
                business_type: "food".into(),
                description: "Artisanal coffee and fresh pastries".into(),
                website: None,
                contact_email: "owner@brewandbeans.com".into(),
            },
        )
        .unwrap();
    state
        .accounts
        .review_application(
            &app.id,
            ADMIN_ADDRESS,
            ReviewApplication {
                decision: ReviewDecision::Approved,
                rejection_reason: None,
            },
        )
        .unwrap();
}

pub fn login(state: &AppState, address: &str) -> User {
    state
        .accounts
        .login(LoginRequest {
            address: address.into(),
            name: None,
            email: None,
        })
        .unwrap()
}

pub fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn admin_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", ADMIN_KEY))
        .header("X-Admin-Address", ADMIN_ADDRESS)
        .header("Content-Type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("Response should be valid JSON")
    };
    (status, json)
}
