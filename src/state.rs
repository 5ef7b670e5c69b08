use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::{DualBackend, LocalStore, SqlBackend};
use crate::chain::{AlgodMinter, AssetMinter, PlaceholderMinter, TransactionSigner};
use crate::config::Config;
use crate::db;
use crate::error::BackendError;
use crate::seed;
use crate::service::{AccountService, CouponService};
use crate::storage::{FileStorage, MemoryStorage, StorageAdapter};

#[derive(Clone)]
pub struct AppState {
    pub coupons: CouponService,
    pub accounts: AccountService,
    pub admin_api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        backends: DualBackend,
        minter: Arc<dyn AssetMinter>,
        admin_api_key: Option<String>,
    ) -> Self {
        Self {
            coupons: CouponService::new(backends.clone(), minter),
            accounts: AccountService::new(backends),
            admin_api_key: admin_api_key.map(Arc::from),
        }
    }

    /// Wire both stores and the minter from configuration.
    ///
    /// Without a `signer` coupons get placeholder asset ids.
    pub fn from_config(
        config: &Config,
        signer: Option<Arc<dyn TransactionSigner>>,
    ) -> Result<Self, BackendError> {
        let remote = match &config.database_path {
            Some(path) => {
                info!(path = %path, "Using remote database");
                SqlBackend::new(db::create_pool(path)?)
            }
            None => {
                warn!("DATABASE_PATH not set, all operations will use the local store");
                SqlBackend::unconfigured()
            }
        };

        let storage: Arc<dyn StorageAdapter> = match &config.local_store_path {
            Some(path) => Arc::new(FileStorage::open(path)?),
            None => Arc::new(MemoryStorage::new()),
        };
        let local = Arc::new(LocalStore::new(storage));
        if config.seed_demo {
            seed::seed_demo(&local)?;
        }

        let minter: Arc<dyn AssetMinter> = match signer {
            Some(signer) => {
                info!(
                    server = %config.algod.base_url(),
                    network = %config.algod.network,
                    "Minting coupon assets through algod"
                );
                Arc::new(AlgodMinter::new(config.algod.clone(), signer))
            }
            None => {
                info!("No transaction signer configured, coupons get placeholder asset ids");
                Arc::new(PlaceholderMinter)
            }
        };

        Ok(Self::new(
            DualBackend::new(Arc::new(remote), local),
            minter,
            config.admin_api_key.clone(),
        ))
    }
}
