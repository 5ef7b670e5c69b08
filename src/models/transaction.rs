use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::util::{gen_id, now_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionKind {
    Create,
    Claim,
    Redeem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Append-only audit entry, one per lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub kind: TransactionKind,
    pub coupon_id: String,
    pub user_address: String,
    pub merchant_address: String,
    /// Unix milliseconds
    pub timestamp: i64,
    pub tx_hash: Option<String>,
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// A confirmed record stamped with the current time.
    pub fn confirmed(
        kind: TransactionKind,
        coupon_id: &str,
        user_address: &str,
        merchant_address: &str,
        tx_hash: Option<String>,
    ) -> Self {
        Self {
            id: gen_id(),
            kind,
            coupon_id: coupon_id.to_string(),
            user_address: user_address.to_string(),
            merchant_address: merchant_address.to_string(),
            timestamp: now_ms(),
            tx_hash,
            status: TransactionStatus::Confirmed,
        }
    }
}
