use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use super::MintRequest;

/// SHA-256 over a coupon's descriptive fields, newline-joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(request: &MintRequest) -> Self {
        let value = request.value.to_string();
        let expiry = request.expiry.to_string();
        let fields = [
            request.name.as_str(),
            request.description.as_str(),
            request.category.as_ref(),
            value.as_str(),
            request.value_type.as_ref(),
            expiry.as_str(),
            request.merchant.as_str(),
        ];
        let digest = Sha256::digest(fields.join("\n").as_bytes());
        Self(digest.into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Form used as the asset metadata hash.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}
