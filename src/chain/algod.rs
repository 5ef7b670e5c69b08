use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info};

use super::{AssetMinter, ChainError, MintFuture, MintRequest, MintedAsset};

const TOKEN_HEADER: &str = "X-Algo-API-Token";
const UNIT_NAME: &str = "COUPON";
const MAX_ASSET_NAME_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct AlgodConfig {
    pub server: String,
    pub port: Option<u16>,
    pub token: Option<String>,
    pub network: String,
    /// Pending-transaction polls before giving up
    pub confirm_attempts: u32,
    pub poll_interval: Duration,
}

impl AlgodConfig {
    pub fn base_url(&self) -> String {
        let server = self.server.trim_end_matches('/');
        match self.port {
            Some(port) => format!("{}:{}", server, port),
            None => server.to_string(),
        }
    }
}

/// Suggested transaction parameters from `/v2/transactions/params`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuggestedParams {
    pub fee: u64,
    pub min_fee: u64,
    pub last_round: u64,
    pub genesis_id: String,
    pub genesis_hash: String,
}

/// Fields of the asset-creation transaction for one coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCreateParams {
    pub creator: String,
    pub total: u64,
    pub decimals: u32,
    pub unit_name: &'static str,
    pub asset_name: String,
    pub metadata_hash: [u8; 32],
}

impl AssetCreateParams {
    pub fn for_request(request: &MintRequest) -> Self {
        Self {
            creator: request.merchant.clone(),
            total: 1,
            decimals: 0,
            unit_name: UNIT_NAME,
            asset_name: truncate_bytes(&request.name, MAX_ASSET_NAME_BYTES).to_string(),
            metadata_hash: *request.content_hash().as_bytes(),
        }
    }
}

/// A transaction ready for submission.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx_id: String,
    pub bytes: Vec<u8>,
}

/// Builds and signs asset-creation transactions. Key custody lives behind this.
pub trait TransactionSigner: Send + Sync {
    fn sign_asset_create(
        &self,
        params: &SuggestedParams,
        asset: &AssetCreateParams,
    ) -> Result<SignedTransaction, ChainError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PendingTransaction {
    #[serde(default)]
    confirmed_round: Option<u64>,
    #[serde(default)]
    pool_error: String,
    #[serde(default)]
    asset_index: Option<u64>,
}

pub struct AlgodMinter {
    client: Client,
    config: AlgodConfig,
    signer: Arc<dyn TransactionSigner>,
}

impl AlgodMinter {
    pub fn new(config: AlgodConfig, signer: Arc<dyn TransactionSigner>) -> Self {
        Self {
            client: Client::new(),
            config,
            signer,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.get(format!("{}{}", self.config.base_url(), path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.post(format!("{}{}", self.config.base_url(), path)))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn suggested_params(&self) -> Result<SuggestedParams, ChainError> {
        let response = check(self.get("/v2/transactions/params").send().await?).await?;
        Ok(response.json().await?)
    }

    async fn submit(&self, signed: SignedTransaction) -> Result<String, ChainError> {
        let response = check(
            self.post("/v2/transactions")
                .header("Content-Type", "application/x-binary")
                .body(signed.bytes)
                .send()
                .await?,
        )
        .await?;
        let submitted: SubmitResponse = response.json().await?;
        Ok(submitted.tx_id)
    }

    /// Poll until the transaction is confirmed, the pool rejects it, or the
    /// attempt budget runs out.
    async fn wait_for_confirmation(&self, tx_id: &str) -> Result<PendingTransaction, ChainError> {
        let attempts = self.config.confirm_attempts;
        let path = format!("/v2/transactions/pending/{}", tx_id);

        for attempt in 1..=attempts {
            let response = check(self.get(&path).send().await?).await?;
            let pending: PendingTransaction = response.json().await?;

            if !pending.pool_error.is_empty() {
                return Err(ChainError::Rejected(pending.pool_error));
            }
            if pending.confirmed_round.is_some_and(|round| round > 0) {
                return Ok(pending);
            }

            debug!(tx_id, attempt, "transaction still pending");
            if attempt < attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        Err(ChainError::ConfirmationTimeout { attempts })
    }

    async fn mint_asset(&self, request: &MintRequest) -> Result<MintedAsset, ChainError> {
        let params = self.suggested_params().await?;
        let asset = AssetCreateParams::for_request(request);
        let signed = self.signer.sign_asset_create(&params, &asset)?;

        let tx_id = self.submit(signed).await?;
        let confirmed = self.wait_for_confirmation(&tx_id).await?;
        let asset_id = confirmed.asset_index.ok_or(ChainError::MissingAssetIndex)?;

        info!(
            asset_id,
            tx_id = %tx_id,
            network = %self.config.network,
            "Coupon asset minted"
        );

        Ok(MintedAsset {
            asset_id,
            tx_hash: Some(tx_id),
        })
    }
}

impl AssetMinter for AlgodMinter {
    fn mint<'a>(&'a self, request: &'a MintRequest) -> MintFuture<'a> {
        Box::pin(self.mint_asset(request))
    }
}

async fn check(response: Response) -> Result<Response, ChainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ChainError::Node {
        status: status.as_u16(),
        body,
    })
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
