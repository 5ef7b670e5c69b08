//! Shared utility functions.

use axum::http::HeaderMap;
use chrono::Utc;
use rand::Rng;

pub const MS_PER_DAY: i64 = 86_400_000;

/// Current time as Unix milliseconds. All coupon timestamps use this unit.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Unix milliseconds `days` from `base`.
pub fn days_from(base: i64, days: i64) -> i64 {
    base + days * MS_PER_DAY
}

/// Generate an opaque record id.
pub fn gen_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generate an off-chain transaction reference in the `TX_XXXXXXXXXXXXXXXX` form.
pub fn generate_tx_reference() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..16)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("TX_{}", suffix)
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
