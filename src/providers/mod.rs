// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # External Collaborators
//!
//! The onboarding flow depends on five outside services. Each one sits behind
//! a trait so the session state machine and the workflow never see transport
//! details:
//!
//! | Trait | Implementation | Failure |
//! |-------|----------------|---------|
//! | [`WalletConnector`] | [`wallet::SignatureWalletConnector`] | `NotConnected` |
//! | [`CaptchaVerifier`] | [`recaptcha::RecaptchaClient`] | `CaptchaFailed` |
//! | [`DocumentStore`] | [`pinata::PinataClient`] | `UploadError` |
//! | [`IdentityExtractor`] | [`openai::OpenAiVisionClient`] | `ExtractionError` |
//! | [`TokenMinter`] | [`crate::blockchain::DidTokenMinter`] | `MintError`, `MintUnconfirmed` |
//!
//! Liveness detection is deliberately reduced to a [`LivenessSignal`] so the
//! state machine stays agnostic to the detection method.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::blockchain::{DidTokenMinter, DisabledMinter};
use crate::config::AppConfig;

pub mod openai;
pub mod pinata;
pub mod recaptcha;
pub mod wallet;

#[cfg(test)]
pub mod fake;

/// Errors raised by external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Wallet not connected: {0}")]
    NotConnected(String),

    #[error("Captcha verification failed: {0}")]
    CaptchaFailed(String),

    #[error("Upload failed: {0}")]
    UploadError(String),

    #[error("Identity extraction failed: {0}")]
    ExtractionError(String),

    #[error("Minting failed: {0}")]
    MintError(String),

    #[error("Mint submitted but not confirmed: {0}")]
    MintUnconfirmed(String),

    #[error("{0} timed out after {1:?}")]
    Timeout(&'static str, Duration),

    #[error("Collaborator misconfigured: {0}")]
    Misconfigured(String),
}

/// Proof that the caller controls a wallet.
#[derive(Debug, Clone)]
pub struct WalletClaim {
    /// Address the user claims to own.
    pub address: String,
    /// Message that was signed.
    pub message: String,
    /// 65-byte hex signature over `message` (EIP-191 personal sign).
    pub signature: String,
}

/// A document submitted for pinning.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Content pinned to IPFS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedContent {
    /// Content identifier.
    pub cid: String,
    /// Gateway URL for the content.
    pub url: String,
}

/// Document-level metadata returned by extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
    /// Any further fields the vision model reported.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

/// Identity fields read from an ID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityFields {
    pub full_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub id_number: String,
    pub metadata: DocumentMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    /// Extraction confidence in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Result of a confirmed mint transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: String,
    pub token_id: String,
}

#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Verify the claim and return the normalized wallet address.
    async fn connect(&self, claim: &WalletClaim) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Whether the widget token is a pass.
    async fn verify(&self, token: &str) -> Result<bool, CollaboratorError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn upload_file(&self, upload: &DocumentUpload) -> Result<PinnedContent, CollaboratorError>;

    async fn upload_json(&self, name: &str, content: &Value)
        -> Result<PinnedContent, CollaboratorError>;
}

#[async_trait]
pub trait IdentityExtractor: Send + Sync {
    async fn extract(&self, image_url: &str) -> Result<IdentityFields, CollaboratorError>;
}

#[async_trait]
pub trait TokenMinter: Send + Sync {
    async fn mint(&self, metadata_uri: &str) -> Result<MintReceipt, CollaboratorError>;
}

/// Decides whether a selfie capture counts as a live person.
pub trait LivenessSignal: Send + Sync {
    fn assess(&self, capture: &str) -> bool;
}

/// Accepts any non-empty image capture.
#[derive(Debug, Default, Clone, Copy)]
pub struct CapturePresence;

impl LivenessSignal for CapturePresence {
    fn assess(&self, capture: &str) -> bool {
        let capture = capture.trim();
        match capture.strip_prefix("data:") {
            Some(rest) => {
                rest.starts_with("image/")
                    && rest
                        .split_once(',')
                        .is_some_and(|(_, data)| !data.is_empty())
            }
            None => !capture.is_empty(),
        }
    }
}

/// The set of collaborators a workflow runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub wallet: Arc<dyn WalletConnector>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub documents: Arc<dyn DocumentStore>,
    pub extractor: Arc<dyn IdentityExtractor>,
    pub minter: Arc<dyn TokenMinter>,
    pub liveness: Arc<dyn LivenessSignal>,
}

impl Collaborators {
    /// Build the production clients from configuration.
    ///
    /// Missing minting credentials do not fail startup; minting then reports
    /// `Misconfigured` when attempted.
    pub fn from_config(config: &AppConfig) -> Result<Self, CollaboratorError> {
        let minter: Arc<dyn TokenMinter> = match config.minter_private_key.as_deref() {
            Some(key) => Arc::new(
                DidTokenMinter::new(&config.did_rpc_url, &config.did_contract_address, key)
                    .map_err(|e| CollaboratorError::Misconfigured(e.to_string()))?,
            ),
            None => Arc::new(DisabledMinter),
        };

        Ok(Self {
            wallet: Arc::new(wallet::SignatureWalletConnector),
            captcha: Arc::new(recaptcha::RecaptchaClient::new(config.recaptcha_secret.clone())?),
            documents: Arc::new(pinata::PinataClient::new(
                config.pinata_jwt.clone(),
                &config.pinata_gateway,
            )?),
            extractor: Arc::new(openai::OpenAiVisionClient::new(
                config.openai_api_key.clone(),
                &config.openai_model,
            )?),
            minter,
            liveness: Arc::new(CapturePresence),
        })
    }
}

/// Shared HTTP client settings for the external services.
pub(crate) fn http_client() -> Result<reqwest::Client, CollaboratorError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|e| CollaboratorError::Misconfigured(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_presence_requires_image_payload() {
        let signal = CapturePresence;
        assert!(signal.assess("data:image/jpeg;base64,/9j/4AAQ"));
        assert!(signal.assess("ipfs://selfie"));
        assert!(!signal.assess(""));
        assert!(!signal.assess("   "));
        assert!(!signal.assess("data:image/png;base64,"));
        assert!(!signal.assess("data:text/plain;base64,aGk="));
    }

    #[test]
    fn identity_fields_accept_sparse_metadata() {
        let fields: IdentityFields = serde_json::from_value(serde_json::json!({
            "fullName": "Ada Lovelace",
            "dateOfBirth": "1815-12-10",
            "gender": "F",
            "idNumber": "X1",
            "metadata": { "documentType": "Passport", "mrz": "P<GBR" }
        }))
        .unwrap();
        assert_eq!(fields.metadata.document_type.as_deref(), Some("Passport"));
        assert_eq!(fields.metadata.extra.get("mrz"), Some(&Value::from("P<GBR")));
        assert!(fields.confidence.is_none());
    }
}
