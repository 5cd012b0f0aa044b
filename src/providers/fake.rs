// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process collaborators for tests.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    CaptchaVerifier, CapturePresence, CollaboratorError, Collaborators, DocumentStore,
    DocumentUpload, IdentityExtractor, IdentityFields, MintReceipt, PinnedContent, TokenMinter,
    WalletClaim, WalletConnector,
};
use crate::onboarding::demo::fallback_identity;

/// Trusts the claimed address as-is.
pub struct TrustingWallet;

#[async_trait]
impl WalletConnector for TrustingWallet {
    async fn connect(&self, claim: &WalletClaim) -> Result<String, CollaboratorError> {
        if claim.signature.is_empty() {
            return Err(CollaboratorError::NotConnected("missing signature".to_string()));
        }
        Ok(claim.address.clone())
    }
}

/// Passes exactly the token `"pass"`.
pub struct FixedCaptcha;

#[async_trait]
impl CaptchaVerifier for FixedCaptcha {
    async fn verify(&self, token: &str) -> Result<bool, CollaboratorError> {
        Ok(token == "pass")
    }
}

/// Pins everything under a counter-based CID.
#[derive(Default)]
pub struct MemoryStore {
    pub uploads: AtomicUsize,
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upload_file(&self, upload: &DocumentUpload) -> Result<PinnedContent, CollaboratorError> {
        if upload.bytes.is_empty() {
            return Err(CollaboratorError::UploadError("empty file".to_string()));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(PinnedContent {
            cid: format!("QmFile{n}"),
            url: format!("https://ipfs.test/QmFile{n}"),
        })
    }

    async fn upload_json(&self, _name: &str, _content: &Value) -> Result<PinnedContent, CollaboratorError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(PinnedContent {
            cid: format!("QmMeta{n}"),
            url: format!("https://ipfs.test/QmMeta{n}"),
        })
    }
}

/// Extractor returning a fixed outcome.
pub enum ScriptedExtractor {
    Succeed(IdentityFields),
    Fail,
    Hang,
    /// Returns the sample identity after the delay.
    Slow(Duration),
}

#[async_trait]
impl IdentityExtractor for ScriptedExtractor {
    async fn extract(&self, _image_url: &str) -> Result<IdentityFields, CollaboratorError> {
        match self {
            ScriptedExtractor::Succeed(fields) => Ok(fields.clone()),
            ScriptedExtractor::Fail => Err(CollaboratorError::ExtractionError(
                "model unavailable".to_string(),
            )),
            ScriptedExtractor::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(fallback_identity())
            }
            ScriptedExtractor::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(sample_identity())
            }
        }
    }
}

/// Minter that either confirms with token 7 or fails.
pub struct ScriptedMinter {
    pub succeed: bool,
}

#[async_trait]
impl TokenMinter for ScriptedMinter {
    async fn mint(&self, metadata_uri: &str) -> Result<MintReceipt, CollaboratorError> {
        if !self.succeed {
            return Err(CollaboratorError::MintError("execution reverted".to_string()));
        }
        assert!(metadata_uri.starts_with("https://ipfs.test/"));
        Ok(MintReceipt {
            tx_hash: "0xfeed".to_string(),
            token_id: "7".to_string(),
        })
    }
}

/// Minter that counts calls and confirms token 7 after `delay`.
pub struct CountingMinter {
    pub calls: AtomicUsize,
    pub delay: Duration,
}

impl CountingMinter {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenMinter for CountingMinter {
    async fn mint(&self, _metadata_uri: &str) -> Result<MintReceipt, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(MintReceipt {
            tx_hash: "0xfeed".to_string(),
            token_id: "7".to_string(),
        })
    }
}

/// Extracted identity used by the happy-path fakes.
pub fn sample_identity() -> IdentityFields {
    IdentityFields {
        full_name: "Jane Roe".to_string(),
        ..fallback_identity()
    }
}

pub fn collaborators() -> Collaborators {
    Collaborators {
        wallet: Arc::new(TrustingWallet),
        captcha: Arc::new(FixedCaptcha),
        documents: Arc::new(MemoryStore::default()),
        extractor: Arc::new(ScriptedExtractor::Succeed(sample_identity())),
        minter: Arc::new(ScriptedMinter { succeed: true }),
        liveness: Arc::new(CapturePresence),
    }
}
