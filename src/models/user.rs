use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::util::{gen_id, now_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    User,
    Merchant,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Wallet address (unique)
    pub address: String,
    pub role: UserRole,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: i64,
    pub last_login_at: i64,
    pub is_active: bool,
}

impl User {
    /// A fresh, active account with the `user` role.
    pub fn new(address: &str, name: Option<String>, email: Option<String>) -> Self {
        let now = now_ms();
        Self {
            id: gen_id(),
            address: address.to_string(),
            role: UserRole::User,
            name,
            email,
            created_at: now,
            last_login_at: now,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
