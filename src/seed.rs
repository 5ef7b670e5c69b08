//! Demo catalogue for local development.

use tracing::info;

use crate::backend::{Backend, CouponFilter, LocalStore};
use crate::error::BackendError;
use crate::models::*;
use crate::util::{days_from, now_ms};

const COFFEE_SHOP: &str = "MERCHANT_COFFEE_SHOP_123456789";
const PIZZA_PALACE: &str = "MERCHANT_PIZZA_PALACE_987654321";
const TECH_STORE: &str = "MERCHANT_TECH_STORE_456789123";
const SPA: &str = "MERCHANT_SPA_WELLNESS_789123456";

pub const DEMO_USER: &str = "USER_ADDRESS_123456789";
const OTHER_DEMO_USER: &str = "USER_ADDRESS_987654321";

/// Populate an empty local store with demo merchants, coupons and
/// transactions. Returns false, writing nothing, if coupons already exist.
pub fn seed_demo(store: &LocalStore) -> Result<bool, BackendError> {
    if !store.list_coupons(&CouponFilter::All)?.is_empty() {
        return Ok(false);
    }

    let now = now_ms();
    let coupons = demo_coupons(now);
    store.replace_merchants(&demo_merchants(now))?;
    store.replace_coupons(&coupons)?;
    store.replace_transactions(&demo_transactions(now))?;

    info!(coupons = coupons.len(), "Seeded demo data into local store");
    Ok(true)
}

fn merchant(
    address: &str,
    name: &str,
    description: &str,
    category: &str,
    joined_at: i64,
) -> MerchantProfile {
    let slug: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    MerchantProfile {
        address: address.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        website: Some(format!("https://{}.com", slug)),
        verified: true,
        joined_at,
    }
}

fn demo_merchants(now: i64) -> Vec<MerchantProfile> {
    vec![
        merchant(
            COFFEE_SHOP,
            "Brew & Beans Coffee",
            "Premium coffee shop serving artisanal coffee and fresh pastries",
            "food",
            days_from(now, -30),
        ),
        merchant(
            PIZZA_PALACE,
            "Pizza Palace",
            "Authentic Italian pizza with fresh ingredients",
            "food",
            days_from(now, -45),
        ),
        merchant(
            TECH_STORE,
            "TechHub Electronics",
            "Latest gadgets and electronics at competitive prices",
            "retail",
            days_from(now, -60),
        ),
        merchant(
            SPA,
            "Zen Spa & Wellness",
            "Relaxation and wellness services for mind and body",
            "health",
            days_from(now, -20),
        ),
    ]
}

struct DemoCoupon {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    merchant: &'static str,
    merchant_name: &'static str,
    category: CouponCategory,
    value: f64,
    value_type: ValueType,
    expires_in_days: i64,
    created_days_ago: i64,
    asset_id: u64,
    max_redemptions: u32,
    terms: &'static str,
}

impl DemoCoupon {
    fn build(self, now: i64) -> Coupon {
        Coupon {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            merchant: self.merchant.to_string(),
            merchant_name: self.merchant_name.to_string(),
            category: self.category,
            value: self.value,
            value_type: self.value_type,
            expiry: days_from(now, self.expires_in_days),
            claimed: false,
            redeemed: false,
            asset_id: Some(self.asset_id),
            created_at: days_from(now, -self.created_days_ago),
            claimed_at: None,
            redeemed_at: None,
            claimed_by: None,
            max_redemptions: Some(self.max_redemptions),
            current_redemptions: 0,
            terms: Some(self.terms.to_string()),
            image_url: None,
        }
    }
}

fn demo_coupons(now: i64) -> Vec<Coupon> {
    let free_coffee = DemoCoupon {
        id: "coupon_001",
        name: "Free Coffee with Pastry",
        description: "Get a free coffee when you purchase any pastry. Valid for all coffee sizes.",
        merchant: COFFEE_SHOP,
        merchant_name: "Brew & Beans Coffee",
        category: CouponCategory::Food,
        value: 100.0,
        value_type: ValueType::Percentage,
        expires_in_days: 30,
        created_days_ago: 5,
        asset_id: 1001,
        max_redemptions: 100,
        terms: "Valid with purchase of any pastry. One per customer per day.",
    }
    .build(now);

    let pizza = DemoCoupon {
        id: "coupon_002",
        name: "20% Off Large Pizza",
        description: "Save 20% on any large pizza. Choose from our wide selection of toppings.",
        merchant: PIZZA_PALACE,
        merchant_name: "Pizza Palace",
        category: CouponCategory::Food,
        value: 20.0,
        value_type: ValueType::Percentage,
        expires_in_days: 14,
        created_days_ago: 3,
        asset_id: 1002,
        max_redemptions: 50,
        terms: "Valid on large pizzas only. Cannot be combined with other offers.",
    }
    .build(now);

    let electronics = Coupon {
        claimed: true,
        claimed_at: Some(days_from(now, -2)),
        claimed_by: Some(DEMO_USER.to_string()),
        ..DemoCoupon {
            id: "coupon_003",
            name: "$50 Off Electronics",
            description: "Get $50 off any electronics purchase over $200. Latest gadgets included.",
            merchant: TECH_STORE,
            merchant_name: "TechHub Electronics",
            category: CouponCategory::Retail,
            value: 50.0,
            value_type: ValueType::Fixed,
            expires_in_days: 21,
            created_days_ago: 7,
            asset_id: 1003,
            max_redemptions: 25,
            terms: "Minimum purchase of $200 required. Valid on all electronics.",
        }
        .build(now)
    };

    let spa = DemoCoupon {
        id: "coupon_004",
        name: "Free Spa Consultation",
        description: "Complimentary 30-minute wellness consultation with our certified therapists.",
        merchant: SPA,
        merchant_name: "Zen Spa & Wellness",
        category: CouponCategory::Health,
        value: 100.0,
        value_type: ValueType::Percentage,
        expires_in_days: 45,
        created_days_ago: 1,
        asset_id: 1004,
        max_redemptions: 20,
        terms: "Appointment required. First-time customers only.",
    }
    .build(now);

    let coffee_deal = Coupon {
        claimed: true,
        redeemed: true,
        claimed_at: Some(days_from(now, -5)),
        redeemed_at: Some(days_from(now, -1)),
        claimed_by: Some(OTHER_DEMO_USER.to_string()),
        current_redemptions: 1,
        ..DemoCoupon {
            id: "coupon_005",
            name: "Buy 2 Get 1 Free Coffee",
            description: "Purchase two coffees and get the third one absolutely free. Any size, any blend.",
            merchant: COFFEE_SHOP,
            merchant_name: "Brew & Beans Coffee",
            category: CouponCategory::Food,
            value: 33.0,
            value_type: ValueType::Percentage,
            expires_in_days: 7,
            created_days_ago: 10,
            asset_id: 1005,
            max_redemptions: 30,
            terms: "Valid on all coffee sizes and blends. Lowest priced item is free.",
        }
        .build(now)
    };

    // newest first, matching the order the store keeps
    let mut coupons = vec![free_coffee, pizza, electronics, spa, coffee_deal];
    coupons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    coupons
}

fn demo_transactions(now: i64) -> Vec<TransactionRecord> {
    let tx = |id: &str,
              kind: TransactionKind,
              coupon_id: &str,
              user: &str,
              merchant: &str,
              days_ago: i64,
              hash: &str| TransactionRecord {
        id: id.to_string(),
        kind,
        coupon_id: coupon_id.to_string(),
        user_address: user.to_string(),
        merchant_address: merchant.to_string(),
        timestamp: days_from(now, -days_ago),
        tx_hash: Some(hash.to_string()),
        status: TransactionStatus::Confirmed,
    };
    vec![
        tx("tx_003", TransactionKind::Redeem, "coupon_005", OTHER_DEMO_USER, COFFEE_SHOP, 1, "TX_HASH_REDEEM_003"),
        tx("tx_002", TransactionKind::Claim, "coupon_003", DEMO_USER, TECH_STORE, 2, "TX_HASH_CLAIM_002"),
        tx("tx_001", TransactionKind::Create, "coupon_001", COFFEE_SHOP, COFFEE_SHOP, 5, "TX_HASH_CREATE_001"),
    ]
}
