use std::env;
use std::time::Duration;

use crate::chain::AlgodConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Remote database file. `None` leaves the remote backend unconfigured.
    pub database_path: Option<String>,
    /// Fallback store file. `None` keeps the fallback store in memory.
    pub local_store_path: Option<String>,
    /// Bearer key for the admin routes. Admin routes refuse everything when unset.
    pub admin_api_key: Option<String>,
    pub algod: AlgodConfig,
    pub dev_mode: bool,
    /// Fill an empty fallback store with demo data at startup
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("COUPONS_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let confirm_attempts: u32 = env::var("MINT_CONFIRM_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);
        let poll_interval_ms: u64 = env::var("MINT_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let algod = AlgodConfig {
            server: env::var("ALGOD_SERVER")
                .unwrap_or_else(|_| "https://testnet-api.algonode.cloud".to_string()),
            port: non_empty("ALGOD_PORT").and_then(|p| p.parse().ok()),
            token: non_empty("ALGOD_TOKEN"),
            network: env::var("ALGOD_NETWORK").unwrap_or_else(|_| "testnet".to_string()),
            confirm_attempts,
            poll_interval: Duration::from_millis(poll_interval_ms),
        };

        Self {
            host,
            port,
            database_path: non_empty("DATABASE_PATH"),
            local_store_path: non_empty("LOCAL_STORE_PATH"),
            admin_api_key: non_empty("ADMIN_API_KEY"),
            algod,
            dev_mode,
            seed_demo: dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Env var value, treating unset and blank the same.
fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
