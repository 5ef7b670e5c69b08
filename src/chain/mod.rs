//! Asset issuance for new coupons.
//!
//! Every coupon is backed by a single-unit asset. [`AssetMinter`] is the seam:
//! [`AlgodMinter`] submits a signed asset-creation transaction to an algod
//! node, [`PlaceholderMinter`] hands out a local id when no node is usable.

mod algod;
mod hash;

use std::future::Future;
use std::pin::Pin;

use rand::Rng;
use thiserror::Error;

pub use algod::{
    AlgodConfig, AlgodMinter, AssetCreateParams, SignedTransaction, SuggestedParams,
    TransactionSigner,
};
pub use hash::ContentHash;

use crate::models::{CouponCategory, CreateCoupon, ValueType};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("algod request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("algod returned {status}: {body}")]
    Node { status: u16, body: String },
    #[error("signing failed: {0}")]
    Signer(String),
    #[error("transaction rejected: {0}")]
    Rejected(String),
    #[error("transaction not confirmed after {attempts} rounds")]
    ConfirmationTimeout { attempts: u32 },
    #[error("confirmed transaction carries no asset index")]
    MissingAssetIndex,
}

/// Descriptive coupon fields that go on chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MintRequest {
    pub name: String,
    pub description: String,
    pub category: CouponCategory,
    pub value: f64,
    pub value_type: ValueType,
    pub expiry: i64,
    pub merchant: String,
}

impl MintRequest {
    pub fn for_coupon(input: &CreateCoupon, merchant: &str) -> Self {
        Self {
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            category: input.category,
            value: input.value,
            value_type: input.value_type,
            expiry: input.expiry,
            merchant: merchant.to_string(),
        }
    }

    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of(self)
    }
}

/// Result of a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedAsset {
    pub asset_id: u64,
    /// Confirmed transaction id; `None` for placeholder ids
    pub tx_hash: Option<String>,
}

pub type MintFuture<'a> = Pin<Box<dyn Future<Output = Result<MintedAsset, ChainError>> + Send + 'a>>;

pub trait AssetMinter: Send + Sync {
    fn mint<'a>(&'a self, request: &'a MintRequest) -> MintFuture<'a>;
}

/// Range placeholder ids are drawn from.
pub const PLACEHOLDER_ID_RANGE: std::ops::Range<u64> = 10_000..1_010_000;

/// Offline minter. Never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderMinter;

impl PlaceholderMinter {
    pub fn asset() -> MintedAsset {
        MintedAsset {
            asset_id: rand::thread_rng().gen_range(PLACEHOLDER_ID_RANGE),
            tx_hash: None,
        }
    }
}

impl AssetMinter for PlaceholderMinter {
    fn mint<'a>(&'a self, _request: &'a MintRequest) -> MintFuture<'a> {
        Box::pin(async { Ok(Self::asset()) })
    }
}
