// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Step Workflow
//!
//! Drives the wizard steps that need an external collaborator. Every
//! operation follows the same shape:
//!
//! 1. Lock the session, check it is at the right step, copy out the inputs.
//! 2. Release the lock and await the collaborator under a timeout.
//! 3. Re-lock, re-check the step, apply the outcome through the
//!    [`OnboardingSession`] mutators.
//!
//! A session is therefore never locked across network I/O, and an outcome is
//! dropped if the client navigated away while the call was in flight.

use std::{future::Future, time::Duration};

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::demo::{demo_identity_fields, fallback_identity};
use super::keys;
use super::session::{CollectedData, OnboardingSession};
use super::step::CreationStep;
use crate::providers::{
    wallet::wallet_challenge, CollaboratorError, Collaborators, DocumentUpload, IdentityFields,
    WalletClaim,
};
use crate::store::SessionHandle;

/// ID image formats accepted by the upload step.
pub const ACCEPTED_DOCUMENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("Operation belongs to step {expected:?} but the session is at {actual:?}")]
    WrongStep {
        expected: CreationStep,
        actual: CreationStep,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Liveness check rejected the capture")]
    LivenessRejected,

    #[error("A mint is already in flight for this session")]
    MintInProgress,

    #[error("The ID document changed while it was being read; extract again")]
    DocumentChanged,
}

/// Runs collaborator-backed steps against a session.
pub struct OnboardingWorkflow {
    services: Collaborators,
    timeout: Duration,
}

impl OnboardingWorkflow {
    pub fn new(services: Collaborators, timeout: Duration) -> Self {
        Self { services, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = Result<T, CollaboratorError>>,
    ) -> Result<T, CollaboratorError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(collaborator = what, timeout = ?self.timeout, "Collaborator call timed out");
                Err(CollaboratorError::Timeout(what, self.timeout))
            }
        }
    }

    /// Link a wallet by checking a signature over the session's challenge.
    ///
    /// Allowed at any step; only completes the step when the session sits at
    /// `WalletConnection`.
    pub async fn connect_wallet(
        &self,
        session_id: Uuid,
        handle: &SessionHandle,
        address: &str,
        signature: &str,
    ) -> Result<bool, WorkflowError> {
        let claim = WalletClaim {
            address: address.to_string(),
            message: wallet_challenge(session_id),
            signature: signature.to_string(),
        };
        let wallet = self
            .call("wallet connector", self.services.wallet.connect(&claim))
            .await?;

        let mut session = handle.lock().await;
        let mut changed =
            session.update_data(fields([(keys::WALLET_ADDRESS, Value::from(wallet.as_str()))]));
        if session.current_step == CreationStep::WalletConnection {
            changed |= session.mark_step_completed(true);
        }
        info!(session_id = %session_id, wallet = %wallet, "Wallet connected");
        Ok(changed)
    }

    pub async fn verify_captcha(
        &self,
        handle: &SessionHandle,
        token: &str,
    ) -> Result<bool, WorkflowError> {
        require_step(&*handle.lock().await, CreationStep::Recaptcha)?;

        let passed = self
            .call("captcha verifier", self.services.captcha.verify(token))
            .await?;
        if !passed {
            return Err(CollaboratorError::CaptchaFailed("token was rejected".to_string()).into());
        }

        let mut session = handle.lock().await;
        require_step(&session, CreationStep::Recaptcha)?;
        let mut changed =
            session.update_data(fields([(keys::CAPTCHA_COMPLETED, Value::Bool(true))]));
        changed |= session.set_verification_score(15);
        changed |= session.mark_step_completed(true);
        Ok(changed)
    }

    /// Pin an ID image and record where it lives.
    pub async fn upload_document(
        &self,
        handle: &SessionHandle,
        upload: DocumentUpload,
    ) -> Result<bool, WorkflowError> {
        if !ACCEPTED_DOCUMENT_TYPES.contains(&upload.content_type.as_str()) {
            return Err(WorkflowError::InvalidInput(format!(
                "unsupported document type {}; upload a JPEG or PNG image",
                upload.content_type
            )));
        }
        if upload.bytes.is_empty() {
            return Err(WorkflowError::InvalidInput("document is empty".to_string()));
        }
        require_step(&*handle.lock().await, CreationStep::ImageSelection)?;

        let pinned = self
            .call("document store", self.services.documents.upload_file(&upload))
            .await?;

        let mut session = handle.lock().await;
        require_step(&session, CreationStep::ImageSelection)?;
        let mut changed = session.update_data(fields([
            (keys::IPFS_URL, Value::from(pinned.url.as_str())),
            (keys::IPFS_HASH, Value::from(pinned.cid.as_str())),
            (keys::FILE_NAME, Value::from(upload.file_name.as_str())),
            (keys::FILE_TYPE, Value::from(upload.content_type.as_str())),
            (keys::FILE_SIZE, Value::from(upload.bytes.len())),
        ]));
        changed |= session.mark_step_completed(true);
        info!(cid = %pinned.cid, size = upload.bytes.len(), "ID document pinned");
        Ok(changed)
    }

    /// Discard the uploaded document so a new one can be chosen.
    pub async fn change_document(&self, handle: &SessionHandle) -> Result<bool, WorkflowError> {
        let mut session = handle.lock().await;
        require_step(&session, CreationStep::ImageSelection)?;
        let mut changed = session.update_data(fields([
            (keys::IMAGE_DATA, Value::Null),
            (keys::IPFS_URL, Value::Null),
            (keys::IPFS_HASH, Value::Null),
            (keys::FILE_NAME, Value::Null),
            (keys::FILE_TYPE, Value::Null),
            (keys::FILE_SIZE, Value::Null),
        ]));
        changed |= session.mark_step_completed(false);
        Ok(changed)
    }

    pub async fn capture_liveness(
        &self,
        handle: &SessionHandle,
        image_data_url: &str,
    ) -> Result<bool, WorkflowError> {
        let mut session = handle.lock().await;
        require_step(&session, CreationStep::LivenessVerification)?;
        if !self.services.liveness.assess(image_data_url) {
            return Err(WorkflowError::LivenessRejected);
        }

        let mut changed = session.update_data(fields([
            (keys::LIVENESS_IMAGE, Value::from(image_data_url)),
            (keys::LIVENESS_VERIFIED, Value::Bool(true)),
            (keys::LIVENESS_TIMESTAMP, Value::from(Utc::now().to_rfc3339())),
        ]));
        changed |= session.mark_step_completed(true);
        Ok(changed)
    }

    pub async fn retake_liveness(&self, handle: &SessionHandle) -> Result<bool, WorkflowError> {
        let mut session = handle.lock().await;
        require_step(&session, CreationStep::LivenessVerification)?;
        let mut changed = session.update_data(fields([
            (keys::LIVENESS_IMAGE, Value::Null),
            (keys::LIVENESS_VERIFIED, Value::Bool(false)),
            (keys::LIVENESS_TIMESTAMP, Value::Null),
        ]));
        changed |= session.mark_step_completed(false);
        Ok(changed)
    }

    /// Read identity fields off the uploaded ID image.
    ///
    /// A failed extraction does not block the wizard: the canned identity is
    /// stored instead, with `extractionFallback` and `extractionError` set.
    ///
    /// If the document was replaced while the extractor ran, the outcome
    /// belongs to the old image and is discarded.
    pub async fn extract_identity(&self, handle: &SessionHandle) -> Result<bool, WorkflowError> {
        let image_url = {
            let mut session = handle.lock().await;
            require_step(&session, CreationStep::Extraction)?;
            if session.flag(keys::EXTRACTED_INFO) {
                return Ok(session.mark_step_completed(true));
            }
            extraction_source(&session)
        };

        let outcome = match image_url.as_deref() {
            Some(url) => {
                self.call("identity extractor", self.services.extractor.extract(url))
                    .await
            }
            None => Err(CollaboratorError::ExtractionError(
                "no ID image has been uploaded".to_string(),
            )),
        };

        let mut session = handle.lock().await;
        require_step(&session, CreationStep::Extraction)?;
        if extraction_source(&session) != image_url {
            warn!("ID document changed during extraction, discarding result");
            return Err(WorkflowError::DocumentChanged);
        }
        let mut changed = match outcome {
            Ok(extracted) => {
                info!(document_type = ?extracted.metadata.document_type, "Identity extracted");
                let mut patch = extraction_record(&extracted);
                patch.insert(keys::EXTRACTION_FALLBACK.to_string(), Value::Bool(false));
                patch.insert(keys::EXTRACTION_ERROR.to_string(), Value::Null);
                session.update_data(patch)
            }
            Err(e) => {
                warn!(error = %e, "Extraction failed, storing fallback identity");
                let mut patch = extraction_record(&fallback_identity());
                patch.insert(keys::EXTRACTION_FALLBACK.to_string(), Value::Bool(true));
                patch.insert(keys::EXTRACTION_ERROR.to_string(), Value::from(e.to_string()));
                session.update_data(patch)
            }
        };
        changed |= session.mark_step_completed(true);
        Ok(changed)
    }

    /// Confirm the extracted identity, or the demo identity on the skipped path.
    pub async fn verify_identity(&self, handle: &SessionHandle) -> Result<bool, WorkflowError> {
        let mut session = handle.lock().await;
        require_step(&session, CreationStep::Verification)?;

        let details = session
            .collected_data
            .get(keys::DOCUMENT_DETAILS)
            .filter(|value| value.is_object())
            .and_then(|value| serde_json::from_value::<IdentityFields>(value.clone()).ok());
        let details = match details {
            Some(details) => details,
            None if session.skipped_identity_verification || session.flag(keys::IS_DEMO) => {
                demo_identity_fields()
            }
            None => {
                return Err(WorkflowError::InvalidInput(
                    "no extracted identity to verify".to_string(),
                ))
            }
        };

        let mut changed = session.update_data(fields([
            (keys::VERIFIED_INFO, Value::Bool(true)),
            (keys::FULL_NAME, Value::from(details.full_name.as_str())),
            (keys::DOCUMENT_NUMBER, Value::from(details.id_number.as_str())),
            (
                keys::DOCUMENT_TYPE,
                details
                    .metadata
                    .document_type
                    .as_deref()
                    .map_or(Value::Null, Value::from),
            ),
            (keys::VERIFIED_DETAILS, to_value(&details)),
            (keys::VERIFICATION_TIMESTAMP, Value::from(Utc::now().to_rfc3339())),
        ]));
        changed |= session.mark_step_completed(true);
        Ok(changed)
    }

    /// Pin the token metadata and mint the DID token.
    ///
    /// `mintingInProgress` is set before the lock is released, so a second
    /// call gets [`WorkflowError::MintInProgress`] instead of minting again.
    /// The marker is cleared only when the mint definitely did not happen; a
    /// timeout or an unconfirmed transaction leaves it set.
    pub async fn mint(&self, handle: &SessionHandle) -> Result<bool, WorkflowError> {
        let (metadata, wallet) = {
            let mut session = handle.lock().await;
            require_step(&session, CreationStep::Minting)?;
            if session.flag(keys::MINTING_COMPLETE) {
                return Ok(session.mark_step_completed(true));
            }
            if session.flag(keys::MINTING_IN_PROGRESS) {
                return Err(WorkflowError::MintInProgress);
            }
            let Some(wallet) = session.text(keys::WALLET_ADDRESS).map(str::to_string) else {
                return Err(CollaboratorError::NotConnected(
                    "connect a wallet before minting".to_string(),
                )
                .into());
            };
            let metadata = token_metadata(&session);
            session.update_data(fields([(keys::MINTING_IN_PROGRESS, Value::Bool(true))]));
            (metadata, wallet)
        };

        let pinned = match self
            .call(
                "document store",
                self.services
                    .documents
                    .upload_json(&format!("ryt-did-{wallet}"), &metadata),
            )
            .await
        {
            Ok(pinned) => pinned,
            Err(e) => {
                release_mint(handle).await;
                return Err(e.into());
            }
        };

        let receipt = match self
            .call("token minter", self.services.minter.mint(&pinned.url))
            .await
        {
            Ok(receipt) => receipt,
            Err(e @ (CollaboratorError::Timeout(..) | CollaboratorError::MintUnconfirmed(_))) => {
                warn!(wallet = %wallet, error = %e, "Mint outcome unknown, keeping in-flight marker");
                return Err(e.into());
            }
            Err(e) => {
                release_mint(handle).await;
                return Err(e.into());
            }
        };

        // The token exists on-chain now; record it even if the client moved
        // away from the minting step in the meantime.
        let mut session = handle.lock().await;
        let mut changed = session.update_data(fields([
            (keys::METADATA_URI, Value::from(pinned.url.as_str())),
            (keys::DID_IDENTIFIER, Value::from(receipt.token_id.as_str())),
            (keys::TOKEN_ID, Value::from(receipt.token_id.as_str())),
            (keys::MINTING_COMPLETE, Value::Bool(true)),
            (keys::MINTING_IN_PROGRESS, Value::Bool(false)),
            (keys::MINTING_TIMESTAMP, Value::from(Utc::now().to_rfc3339())),
            (keys::TRANSACTION_HASH, Value::from(receipt.tx_hash.as_str())),
        ]));
        if session.current_step == CreationStep::Minting {
            changed |= session.mark_step_completed(true);
        }
        info!(
            wallet = %wallet,
            token_id = %receipt.token_id,
            tx_hash = %receipt.tx_hash,
            "DID token minted"
        );
        Ok(changed)
    }
}

async fn release_mint(handle: &SessionHandle) {
    handle
        .lock()
        .await
        .update_data(fields([(keys::MINTING_IN_PROGRESS, Value::Bool(false))]));
}

/// ERC-721 metadata describing the session's DID.
pub fn token_metadata(session: &OnboardingSession) -> Value {
    json!({
        "name": "RYT DID",
        "description": "Decentralized identity issued through RYT DID onboarding.",
        "image": session.text(keys::IPFS_URL).unwrap_or_default(),
        "attributes": [
            { "trait_type": "DID", "value": session.did_string() },
            { "trait_type": "Verification Score", "value": session.verification_score },
            { "trait_type": "Demo", "value": session.flag(keys::IS_DEMO) },
            {
                "trait_type": "Document Type",
                "value": session.text(keys::DOCUMENT_TYPE).unwrap_or("None")
            }
        ]
    })
}

/// Image the extractor reads: the pinned document, else inline image data.
fn extraction_source(session: &OnboardingSession) -> Option<String> {
    session
        .text(keys::IPFS_URL)
        .or_else(|| session.text(keys::IMAGE_DATA))
        .map(str::to_string)
}

fn require_step(session: &OnboardingSession, expected: CreationStep) -> Result<(), WorkflowError> {
    if session.current_step != expected {
        return Err(WorkflowError::WrongStep {
            expected,
            actual: session.current_step,
        });
    }
    Ok(())
}

/// Collected-data fields written by the extraction step. Blank fields fall
/// back to the canned identity.
fn extraction_record(extracted: &IdentityFields) -> CollectedData {
    let fallback = fallback_identity();
    let pick = |value: &str, default: &str| {
        Value::from(if value.trim().is_empty() { default } else { value })
    };
    let document_type = extracted
        .metadata
        .document_type
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .or(fallback.metadata.document_type.as_deref())
        .map_or(Value::Null, Value::from);

    let mut record = fields([
        (keys::EXTRACTED_INFO, Value::Bool(true)),
        (keys::FULL_NAME, pick(&extracted.full_name, &fallback.full_name)),
        (keys::DOCUMENT_NUMBER, pick(&extracted.id_number, &fallback.id_number)),
        (keys::DATE_OF_BIRTH, pick(&extracted.date_of_birth, &fallback.date_of_birth)),
        (keys::DOCUMENT_TYPE, document_type),
        (keys::DOCUMENT_DETAILS, to_value(extracted)),
    ]);
    if let Some(raw) = extracted.raw_text.as_deref() {
        record.insert(keys::RAW_EXTRACTION_TEXT.to_string(), Value::from(raw));
    }
    record
}

fn to_value(fields: &IdentityFields) -> Value {
    serde_json::to_value(fields).unwrap_or(Value::Null)
}

fn fields<const N: usize>(entries: [(&str, Value); N]) -> CollectedData {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
