mod from_row;
pub mod queries;

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::BackendError;

pub use from_row::{FromRow, query_all, query_one};

pub type DbPool = Pool<SqliteConnectionManager>;

pub type DbResult<T> = std::result::Result<T, BackendError>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS coupons (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    merchant TEXT NOT NULL,
    merchant_name TEXT NOT NULL,
    category TEXT NOT NULL,
    value REAL NOT NULL,
    value_type TEXT NOT NULL,
    expiry INTEGER NOT NULL,
    claimed INTEGER NOT NULL DEFAULT 0,
    redeemed INTEGER NOT NULL DEFAULT 0,
    asset_id INTEGER,
    created_at INTEGER NOT NULL,
    claimed_at INTEGER,
    redeemed_at INTEGER,
    claimed_by TEXT,
    max_redemptions INTEGER,
    current_redemptions INTEGER NOT NULL DEFAULT 0,
    terms TEXT,
    image_url TEXT,
    CHECK (redeemed = 0 OR claimed = 1)
);
CREATE INDEX IF NOT EXISTS idx_coupons_merchant ON coupons(merchant);
CREATE INDEX IF NOT EXISTS idx_coupons_claimed_by ON coupons(claimed_by);

CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    coupon_id TEXT NOT NULL,
    user_address TEXT NOT NULL,
    merchant_address TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    tx_hash TEXT,
    status TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_transactions_coupon ON transactions(coupon_id);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    address TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    name TEXT,
    email TEXT,
    created_at INTEGER NOT NULL,
    last_login_at INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS merchant_profiles (
    address TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    website TEXT,
    verified INTEGER NOT NULL DEFAULT 0,
    joined_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS merchant_applications (
    id TEXT PRIMARY KEY,
    user_address TEXT NOT NULL,
    business_name TEXT NOT NULL,
    business_type TEXT NOT NULL,
    description TEXT NOT NULL,
    website TEXT,
    contact_email TEXT NOT NULL,
    status TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    reviewed_at INTEGER,
    reviewed_by TEXT,
    rejection_reason TEXT
);
CREATE INDEX IF NOT EXISTS idx_applications_user ON merchant_applications(user_address);
"#;

/// Create tables and indexes if they don't exist.
pub fn init_db(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Open a pooled SQLite database at `path` and make sure the schema exists.
pub fn create_pool(path: impl AsRef<Path>) -> DbResult<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|c| {
        // journal_mode answers with a row, so it can't go through execute
        c.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
        c.busy_timeout(Duration::from_secs(5))
    });
    let pool = Pool::builder().max_size(8).build(manager)?;
    init_db(&*pool.get()?)?;
    Ok(pool)
}

/// In-memory pool for tests. A single connection, since every SQLite
/// `:memory:` connection is its own database.
pub fn create_memory_pool() -> DbResult<DbPool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager)?;
    init_db(&*pool.get()?)?;
    Ok(pool)
}
