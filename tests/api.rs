//! HTTP API tests - routing, auth layers, and error mapping

use axum::http::StatusCode;
use serde_json::{Value, json};

mod common;
use common::*;

fn coupon_body(days_valid: i64) -> Value {
    json!({
        "name": "20% Off Electronics",
        "description": "Save on all electronic items",
        "category": "retail",
        "value": 20.0,
        "value_type": "percentage",
        "expiry": days_from(now_ms(), days_valid),
        "max_redemptions": 50
    })
}

/// Create a coupon through the merchant endpoint and return its id.
async fn create_coupon(app: &axum::Router) -> String {
    let (status, json) = send(
        app,
        post_json("/merchant/coupons", Some(MERCHANT), coupon_body(30)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

// ============ Public routes ============

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, json) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_login_creates_user() {
    let (app, state) = test_app();
    let (status, json) = send(
        &app,
        post_json("/auth/login", None, json!({ "address": USER_A, "name": "Alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["address"], USER_A);
    assert_eq!(json["role"], "user");
    assert_eq!(json["is_active"], true);
    assert!(state.accounts.get_user(USER_A).is_ok());
}

#[tokio::test]
async fn test_login_without_address_is_bad_request() {
    let (app, _) = test_app();
    let (status, json) = send(&app, post_json("/auth/login", None, json!({ "address": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_unknown_coupon_is_not_found() {
    let (app, _) = test_app();
    let (status, json) = send(&app, get("/coupons/does-not-exist", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Coupon not found");
}

#[tokio::test]
async fn test_public_listing_and_stats() {
    let (app, state) = test_app();
    make_merchant(&state, MERCHANT);
    let id = create_coupon(&app).await;

    let (status, json) = send(&app, get("/coupons", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = send(&app, get(&format!("/coupons?merchant={}", USER_B), None)).await;
    assert!(json.as_array().unwrap().is_empty());

    let (_, json) = send(&app, get("/coupons/available", None)).await;
    assert_eq!(json[0]["id"], id.as_str());

    let (_, json) = send(&app, get(&format!("/coupons/stats?merchant={}", MERCHANT), None)).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["active"], 1);
    assert_eq!(json["claimed"], 0);

    let (_, json) = send(&app, get(&format!("/coupons/{}/transactions", id), None)).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["kind"], "create");
}

// ============ Wallet auth ============

#[tokio::test]
async fn test_claim_requires_wallet() {
    let (app, state) = test_app();
    make_merchant(&state, MERCHANT);
    let id = create_coupon(&app).await;

    let uri = format!("/coupons/{}/claim", id);
    let (status, _) = send(&app, post_json(&uri, None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Never signed in
    let (status, _) = send(&app, post_json(&uri, Some(USER_A), json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivated_wallet_is_forbidden() {
    let (app, state) = test_app();
    let user = login(&state, USER_A);
    state
        .accounts
        .toggle_user_status(&user.id, ADMIN_ADDRESS)
        .unwrap();

    let (status, _) = send(&app, get("/me/coupons", Some(USER_A))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_claim_twice_conflicts() {
    let (app, state) = test_app();
    make_merchant(&state, MERCHANT);
    login(&state, USER_A);
    login(&state, USER_B);
    let id = create_coupon(&app).await;
    let uri = format!("/coupons/{}/claim", id);

    let (status, json) = send(&app, post_json(&uri, Some(USER_A), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["claimed"], true);
    assert_eq!(json["claimed_by"], USER_A);

    let (status, json) = send(&app, post_json(&uri, Some(USER_B), json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "ALREADY_CLAIMED");

    let (_, json) = send(&app, get("/me/coupons", Some(USER_A))).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    let (_, json) = send(&app, get("/me/coupons", Some(USER_B))).await;
    assert!(json.as_array().unwrap().is_empty());
}

// ============ Merchant routes ============

#[tokio::test]
async fn test_plain_user_cannot_create_coupons() {
    let (app, state) = test_app();
    login(&state, USER_A);

    let (status, _) = send(
        &app,
        post_json("/merchant/coupons", Some(USER_A), coupon_body(30)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(state.coupons.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_coupon_is_bad_request() {
    let (app, state) = test_app();
    make_merchant(&state, MERCHANT);

    let mut body = coupon_body(30);
    body["value"] = json!(150.0);
    let (status, json) = send(&app, post_json("/merchant/coupons", Some(MERCHANT), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Percentage cannot exceed 100");

    let (status, _) = send(
        &app,
        post_json("/merchant/coupons", Some(MERCHANT), coupon_body(400)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_merchant_create_uses_profile_name() {
    let (app, state) = test_app();
    make_merchant(&state, MERCHANT);

    let (status, json) = send(
        &app,
        post_json("/merchant/coupons", Some(MERCHANT), coupon_body(30)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["merchant"], MERCHANT);
    assert_eq!(json["merchant_name"], "Brew & Beans Coffee");
    assert_eq!(json["claimed"], false);
    assert!(json["asset_id"].is_u64());

    let (_, json) = send(&app, get("/merchant/coupons", Some(MERCHANT))).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_redeem_flow() {
    let (app, state) = test_app();
    make_merchant(&state, MERCHANT);
    make_merchant(&state, USER_B);
    login(&state, USER_A);
    let id = create_coupon(&app).await;

    let redeem = json!({ "coupon_id": id, "user_address": USER_A });

    // Not claimed yet
    let (status, json) = send(
        &app,
        post_json("/merchant/redeem", Some(MERCHANT), redeem.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "NOT_CLAIMED");

    let claim = format!("/coupons/{}/claim", id);
    send(&app, post_json(&claim, Some(USER_A), json!({}))).await;

    // Another merchant
    let (status, _) = send(
        &app,
        post_json("/merchant/redeem", Some(USER_B), redeem.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(
        &app,
        post_json("/merchant/redeem", Some(MERCHANT), redeem.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["redeemed"], true);
    assert_eq!(json["current_redemptions"], 1);

    let (status, json) = send(&app, post_json("/merchant/redeem", Some(MERCHANT), redeem)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "ALREADY_REDEEMED");

    let (_, json) = send(&app, get(&format!("/coupons/{}/transactions", id), None)).await;
    assert_eq!(json.as_array().unwrap().len(), 3);
}

// ============ Applications ============

#[tokio::test]
async fn test_application_submit_and_fetch() {
    let (app, state) = test_app();
    login(&state, USER_A);

    let (status, json) = send(&app, get("/merchant-applications/mine", Some(USER_A))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.is_null());

    let body = json!({
        "business_name": "Tech Store",
        "business_type": "retail",
        "description": "Latest gadgets and electronics",
        "contact_email": "sales@techstore.com"
    });
    let (status, json) = send(
        &app,
        post_json("/merchant-applications", Some(USER_A), body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "pending");

    let (status, json) = send(&app, post_json("/merchant-applications", Some(USER_A), body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "APPLICATION_EXISTS");

    let (_, json) = send(&app, get("/merchant-applications/mine", Some(USER_A))).await;
    assert_eq!(json["business_name"], "Tech Store");
}

// ============ Admin routes ============

#[tokio::test]
async fn test_admin_requires_api_key() {
    let (app, _) = test_app();

    let (status, _) = send(&app, get("/admin/users", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/admin/users", Some("wrong-key"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Right key, no acting address
    let (status, _) = send(&app, get("/admin/users", Some(ADMIN_KEY))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(&app, admin_request("GET", "/admin/users", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.is_array());
}

#[tokio::test]
async fn test_admin_disabled_without_key() {
    let (backends, _, _) = healthy_backends();
    let state = AppState::new(backends, std::sync::Arc::new(PlaceholderMinter), None);
    let app = algocoupons::handlers::router(state);

    let (status, _) = send(&app, admin_request("GET", "/admin/users", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_review_promotes_applicant() {
    let (app, state) = test_app();
    login(&state, USER_A);
    let application = state
        .accounts
        .apply_for_merchant(
            USER_A,
            CreateMerchantApplication {
                business_name: "Fitness Plus Gym".into(),
                business_type: "health".into(),
                description: "Modern gym with personal trainers".into(),
                website: None,
                contact_email: "info@fitnessplus.com".into(),
            },
        )
        .unwrap();

    let (status, json) = send(&app, admin_request("GET", "/admin/applications", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let uri = format!("/admin/applications/{}/review", application.id);
    let (status, json) = send(
        &app,
        admin_request("POST", &uri, Some(json!({ "decision": "rejected" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, json) = send(
        &app,
        admin_request("POST", &uri, Some(json!({ "decision": "approved" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "approved");
    assert_eq!(json["reviewed_by"], ADMIN_ADDRESS);

    let (status, json) = send(
        &app,
        admin_request("POST", &uri, Some(json!({ "decision": "approved" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "ALREADY_REVIEWED");

    // Promoted user can now issue coupons
    let (status, _) = send(
        &app,
        post_json("/merchant/coupons", Some(USER_A), coupon_body(7)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_toggle_user() {
    let (app, state) = test_app();
    let user = login(&state, USER_A);
    let admin = login(&state, ADMIN_ADDRESS);

    let uri = format!("/admin/users/{}/toggle", user.id);
    let (status, json) = send(&app, admin_request("POST", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_active"], false);

    let (status, _) = send(
        &app,
        post_json("/auth/login", None, json!({ "address": USER_A })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let self_uri = format!("/admin/users/{}/toggle", admin.id);
    let (status, _) = send(&app, admin_request("POST", &self_uri, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, admin_request("POST", "/admin/users/missing/toggle", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
