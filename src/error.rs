//! Error types for decoding, provider calls and facade operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where in the decode pipeline a payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Hex,
    Address,
    Value,
    MultiAsset,
    Bech32,
}

impl DecodeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeStage::Hex => "hex",
            DecodeStage::Address => "address",
            DecodeStage::Value => "value",
            DecodeStage::MultiAsset => "multiasset",
            DecodeStage::Bech32 => "bech32",
        }
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary decoder failures. Always carry the offending input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed payload at {stage} stage ({reason}): {input}")]
    Malformed {
        stage: DecodeStage,
        input: String,
        reason: String,
    },

    #[error("not a base address: {input}")]
    InvalidAddressFormat { input: String },

    #[error("base address has no key-hash stake credential: {input}")]
    MissingStakeCredential { input: String },
}

impl DecodeError {
    pub fn malformed(stage: DecodeStage, input: impl Into<String>, reason: impl ToString) -> Self {
        DecodeError::Malformed { stage, input: input.into(), reason: reason.to_string() }
    }

    pub fn stage(&self) -> DecodeStage {
        match self {
            DecodeError::Malformed { stage, .. } => *stage,
            DecodeError::InvalidAddressFormat { .. } | DecodeError::MissingStakeCredential { .. } => {
                DecodeStage::Address
            }
        }
    }
}

/// Opaque CIP-30 APIError. The code is provider-defined and never interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("provider error (code {code:?}): {info}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub info: String,
}

impl ProviderError {
    pub fn new(code: Option<i64>, info: impl Into<String>) -> Self {
        Self { code, info: info.into() }
    }

    pub fn other(info: impl Into<String>) -> Self {
        Self { code: None, info: info.into() }
    }
}

/// Errors surfaced by the wallet facade and session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid asset filter: {0}")]
    InvalidAssetFilter(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{context}: {source}")]
    Authorization {
        context: String,
        #[source]
        source: ProviderError,
    },
}

pub type WalletResult<T> = Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_reports_stage_and_input() {
        let err = DecodeError::malformed(DecodeStage::Hex, "zz", "odd length");
        assert_eq!(err.stage(), DecodeStage::Hex);
        let msg = err.to_string();
        assert!(msg.contains("hex"));
        assert!(msg.contains("zz"));
    }

    #[test]
    fn authorization_error_keeps_provider_payload() {
        let err = WalletError::Authorization {
            context: "signData failed".into(),
            source: ProviderError::new(Some(3), "user declined"),
        };
        assert!(err.to_string().starts_with("signData failed"));
        assert!(err.to_string().contains("user declined"));
    }
}
