//! Row mapping for the SQL backend.
//!
//! Each model has a `*_COLS` list whose order matches its `FromRow` impl,
//! so `SELECT {COLS} FROM ...` can be mapped positionally.

use std::str::FromStr;

use rusqlite::{Connection, Params, Row, types::Type};

use crate::error::BackendError;
use crate::models::*;

pub const COUPON_COLS: &str = "id, name, description, merchant, merchant_name, category, value, value_type, expiry, claimed, redeemed, asset_id, created_at, claimed_at, redeemed_at, claimed_by, max_redemptions, current_redemptions, terms, image_url";

pub const TRANSACTION_COLS: &str =
    "id, kind, coupon_id, user_address, merchant_address, timestamp, tx_hash, status";

pub const USER_COLS: &str =
    "id, address, role, name, email, created_at, last_login_at, is_active";

pub const MERCHANT_COLS: &str =
    "address, name, description, category, website, verified, joined_at";

pub const APPLICATION_COLS: &str = "id, user_address, business_name, business_type, description, website, contact_email, status, applied_at, reviewed_at, reviewed_by, rejection_reason";

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Parse a TEXT column into a strum-backed enum.
fn parse_enum<T: FromStr>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected value '{}'", raw).into(),
        )
    })
}

impl FromRow for Coupon {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let asset_id: Option<i64> = row.get(11)?;
        Ok(Coupon {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            merchant: row.get(3)?,
            merchant_name: row.get(4)?,
            category: parse_enum(row, 5)?,
            value: row.get(6)?,
            value_type: parse_enum(row, 7)?,
            expiry: row.get(8)?,
            claimed: row.get(9)?,
            redeemed: row.get(10)?,
            asset_id: asset_id.map(|id| id as u64),
            created_at: row.get(12)?,
            claimed_at: row.get(13)?,
            redeemed_at: row.get(14)?,
            claimed_by: row.get(15)?,
            max_redemptions: row.get(16)?,
            current_redemptions: row.get(17)?,
            terms: row.get(18)?,
            image_url: row.get(19)?,
        })
    }
}

impl FromRow for TransactionRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TransactionRecord {
            id: row.get(0)?,
            kind: parse_enum(row, 1)?,
            coupon_id: row.get(2)?,
            user_address: row.get(3)?,
            merchant_address: row.get(4)?,
            timestamp: row.get(5)?,
            tx_hash: row.get(6)?,
            status: parse_enum(row, 7)?,
        })
    }
}

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            address: row.get(1)?,
            role: parse_enum(row, 2)?,
            name: row.get(3)?,
            email: row.get(4)?,
            created_at: row.get(5)?,
            last_login_at: row.get(6)?,
            is_active: row.get(7)?,
        })
    }
}

impl FromRow for MerchantProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(MerchantProfile {
            address: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            website: row.get(4)?,
            verified: row.get(5)?,
            joined_at: row.get(6)?,
        })
    }
}

impl FromRow for MerchantApplication {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(MerchantApplication {
            id: row.get(0)?,
            user_address: row.get(1)?,
            business_name: row.get(2)?,
            business_type: row.get(3)?,
            description: row.get(4)?,
            website: row.get(5)?,
            contact_email: row.get(6)?,
            status: parse_enum(row, 7)?,
            applied_at: row.get(8)?,
            reviewed_at: row.get(9)?,
            reviewed_by: row.get(10)?,
            rejection_reason: row.get(11)?,
        })
    }
}

pub fn query_one<T: FromRow, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<T>, BackendError> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(T::from_row(row)?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<T>, BackendError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
}
