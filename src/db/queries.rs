use rusqlite::{Connection, params};

use super::DbResult;
use super::from_row::{
    APPLICATION_COLS, COUPON_COLS, MERCHANT_COLS, TRANSACTION_COLS, USER_COLS, query_all,
    query_one,
};
use crate::models::*;

// ============ Coupons ============

pub fn create_coupon(conn: &Connection, coupon: &Coupon) -> DbResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO coupons ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            COUPON_COLS
        ),
        params![
            &coupon.id,
            &coupon.name,
            &coupon.description,
            &coupon.merchant,
            &coupon.merchant_name,
            coupon.category.as_ref(),
            coupon.value,
            coupon.value_type.as_ref(),
            coupon.expiry,
            coupon.claimed,
            coupon.redeemed,
            coupon.asset_id.map(|id| id as i64),
            coupon.created_at,
            coupon.claimed_at,
            coupon.redeemed_at,
            &coupon.claimed_by,
            coupon.max_redemptions,
            coupon.current_redemptions,
            &coupon.terms,
            &coupon.image_url,
        ],
    )?;
    Ok(())
}

pub fn get_coupon_by_id(conn: &Connection, id: &str) -> DbResult<Option<Coupon>> {
    query_one(
        conn,
        &format!("SELECT {} FROM coupons WHERE id = ?1", COUPON_COLS),
        params![id],
    )
}

pub fn list_coupons(conn: &Connection) -> DbResult<Vec<Coupon>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM coupons ORDER BY created_at DESC, rowid DESC",
            COUPON_COLS
        ),
        params![],
    )
}

pub fn list_coupons_by_merchant(conn: &Connection, merchant: &str) -> DbResult<Vec<Coupon>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM coupons WHERE merchant = ?1 ORDER BY created_at DESC, rowid DESC",
            COUPON_COLS
        ),
        params![merchant],
    )
}

pub fn list_available_coupons(conn: &Connection, now: i64) -> DbResult<Vec<Coupon>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM coupons WHERE claimed = 0 AND redeemed = 0 AND expiry > ?1
             ORDER BY created_at DESC, rowid DESC",
            COUPON_COLS
        ),
        params![now],
    )
}

pub fn list_coupons_claimed_by(conn: &Connection, user: &str) -> DbResult<Vec<Coupon>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM coupons WHERE claimed_by = ?1 AND claimed = 1 AND redeemed = 0
             ORDER BY claimed_at DESC, rowid DESC",
            COUPON_COLS
        ),
        params![user],
    )
}

/// Mark a coupon claimed, only if it is still unclaimed.
/// Returns false when no row matched, i.e. someone else claimed it first.
pub fn claim_coupon(conn: &Connection, id: &str, user: &str, claimed_at: i64) -> DbResult<bool> {
    let updated = conn.execute(
        "UPDATE coupons SET claimed = 1, claimed_at = ?2, claimed_by = ?3
         WHERE id = ?1 AND claimed = 0",
        params![id, claimed_at, user],
    )?;
    Ok(updated > 0)
}

/// Mark a claimed coupon redeemed and bump its redemption counter,
/// only if it is not redeemed yet.
pub fn redeem_coupon(conn: &Connection, id: &str, redeemed_at: i64) -> DbResult<bool> {
    let updated = conn.execute(
        "UPDATE coupons SET redeemed = 1, redeemed_at = ?2, current_redemptions = current_redemptions + 1
         WHERE id = ?1 AND claimed = 1 AND redeemed = 0",
        params![id, redeemed_at],
    )?;
    Ok(updated > 0)
}

// ============ Transactions ============

pub fn create_transaction(conn: &Connection, tx: &TransactionRecord) -> DbResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO transactions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            TRANSACTION_COLS
        ),
        params![
            &tx.id,
            tx.kind.as_ref(),
            &tx.coupon_id,
            &tx.user_address,
            &tx.merchant_address,
            tx.timestamp,
            &tx.tx_hash,
            tx.status.as_ref(),
        ],
    )?;
    Ok(())
}

pub fn list_transactions(conn: &Connection) -> DbResult<Vec<TransactionRecord>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM transactions ORDER BY timestamp DESC, rowid DESC",
            TRANSACTION_COLS
        ),
        params![],
    )
}

pub fn list_transactions_for_coupon(
    conn: &Connection,
    coupon_id: &str,
) -> DbResult<Vec<TransactionRecord>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM transactions WHERE coupon_id = ?1 ORDER BY timestamp DESC, rowid DESC",
            TRANSACTION_COLS
        ),
        params![coupon_id],
    )
}

// ============ Users ============

/// Insert a user, or overwrite every mutable field if the id exists.
pub fn upsert_user(conn: &Connection, user: &User) -> DbResult<()> {
    conn.execute(
        "INSERT INTO users (id, address, role, name, email, created_at, last_login_at, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            role = excluded.role,
            name = excluded.name,
            email = excluded.email,
            last_login_at = excluded.last_login_at,
            is_active = excluded.is_active",
        params![
            &user.id,
            &user.address,
            user.role.as_ref(),
            &user.name,
            &user.email,
            user.created_at,
            user.last_login_at,
            user.is_active,
        ],
    )?;
    Ok(())
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> DbResult<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        params![id],
    )
}

pub fn get_user_by_address(conn: &Connection, address: &str) -> DbResult<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE address = ?1", USER_COLS),
        params![address],
    )
}

pub fn list_users(conn: &Connection) -> DbResult<Vec<User>> {
    query_all(
        conn,
        &format!("SELECT {} FROM users ORDER BY created_at DESC, rowid DESC", USER_COLS),
        params![],
    )
}

// ============ Merchant Profiles ============

pub fn upsert_merchant(conn: &Connection, profile: &MerchantProfile) -> DbResult<()> {
    conn.execute(
        "INSERT INTO merchant_profiles (address, name, description, category, website, verified, joined_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(address) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            category = excluded.category,
            website = excluded.website,
            verified = excluded.verified",
        params![
            &profile.address,
            &profile.name,
            &profile.description,
            &profile.category,
            &profile.website,
            profile.verified,
            profile.joined_at,
        ],
    )?;
    Ok(())
}

pub fn get_merchant(conn: &Connection, address: &str) -> DbResult<Option<MerchantProfile>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM merchant_profiles WHERE address = ?1",
            MERCHANT_COLS
        ),
        params![address],
    )
}

// ============ Merchant Applications ============

pub fn create_application(conn: &Connection, app: &MerchantApplication) -> DbResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO merchant_applications ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            APPLICATION_COLS
        ),
        params![
            &app.id,
            &app.user_address,
            &app.business_name,
            &app.business_type,
            &app.description,
            &app.website,
            &app.contact_email,
            app.status.as_ref(),
            app.applied_at,
            app.reviewed_at,
            &app.reviewed_by,
            &app.rejection_reason,
        ],
    )?;
    Ok(())
}

pub fn get_application(conn: &Connection, id: &str) -> DbResult<Option<MerchantApplication>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM merchant_applications WHERE id = ?1",
            APPLICATION_COLS
        ),
        params![id],
    )
}

pub fn list_applications(conn: &Connection) -> DbResult<Vec<MerchantApplication>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM merchant_applications ORDER BY applied_at DESC, rowid DESC",
            APPLICATION_COLS
        ),
        params![],
    )
}

pub fn list_applications_for_user(
    conn: &Connection,
    user_address: &str,
) -> DbResult<Vec<MerchantApplication>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM merchant_applications WHERE user_address = ?1
             ORDER BY applied_at DESC, rowid DESC",
            APPLICATION_COLS
        ),
        params![user_address],
    )
}

/// Record a review decision, only if the application is still pending.
pub fn review_application(conn: &Connection, review: &ApplicationReview) -> DbResult<bool> {
    let updated = conn.execute(
        "UPDATE merchant_applications
         SET status = ?2, reviewed_at = ?3, reviewed_by = ?4, rejection_reason = ?5
         WHERE id = ?1 AND status = 'pending'",
        params![
            &review.id,
            review.status.as_ref(),
            review.reviewed_at,
            &review.reviewed_by,
            &review.rejection_reason,
        ],
    )?;
    Ok(updated > 0)
}
