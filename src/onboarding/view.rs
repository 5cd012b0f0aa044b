// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only views over a session: the wizard snapshot and the DID profile.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::keys;
use super::session::OnboardingSession;
use super::step::CreationStep;
use crate::blockchain::AVAX_FUJI;

/// Full session state plus the fields the stepper UI derives from it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: OnboardingSession,
    pub step_index: usize,
    pub step_label: String,
    /// Stepper progress bar percentage.
    pub progress: u8,
    pub can_advance: bool,
    pub can_retreat: bool,
    pub did: String,
}

/// Summary shown on the final profile screen.
///
/// Field names are snake_case like every other API body; only the contents
/// of `collected_data` keep the front-end's camelCase keys.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DidProfile {
    pub did: String,
    pub display_name: String,
    pub wallet_address: Option<String>,
    pub wallet_connected: bool,
    pub date_of_birth: Option<String>,
    pub document_number: Option<String>,
    pub document_type: Option<String>,
    pub issuing_country: Option<String>,
    pub gender: Option<String>,
    pub confidence: Option<f64>,
    pub id_image_url: Option<String>,
    pub ipfs_hash: Option<String>,
    pub liveness_image: Option<String>,
    pub liveness_timestamp: Option<String>,
    pub transaction_hash: Option<String>,
    /// Block explorer link for the mint transaction.
    pub explorer_url: Option<String>,
    pub token_id: Option<String>,
    pub minting_timestamp: Option<String>,
    pub verification_score: u8,
    pub is_demo: bool,
    pub current_step: CreationStep,
}

impl OnboardingSession {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.clone(),
            step_index: self.current_step.index(),
            step_label: self.current_step.label().to_string(),
            progress: self.current_step.progress(),
            can_advance: self.can_advance(),
            can_retreat: self.can_retreat(),
            did: self.did_string(),
        }
    }

    pub fn profile(&self) -> DidProfile {
        let owned = |key: &str| {
            self.text(key)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let details = self.collected_data.get(keys::DOCUMENT_DETAILS);
        let detail = |pointer: &str| {
            details
                .and_then(|value| value.pointer(pointer))
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let wallet_address = owned(keys::WALLET_ADDRESS);
        let transaction_hash = owned(keys::TRANSACTION_HASH);

        DidProfile {
            did: self.did_string(),
            display_name: owned(keys::FULL_NAME).unwrap_or_else(|| "Anonymous User".to_string()),
            wallet_connected: wallet_address.is_some(),
            wallet_address,
            date_of_birth: owned(keys::DATE_OF_BIRTH),
            document_number: owned(keys::DOCUMENT_NUMBER),
            document_type: owned(keys::DOCUMENT_TYPE),
            issuing_country: detail("/metadata/issuingCountry"),
            gender: detail("/gender"),
            confidence: details
                .and_then(|value| value.get("confidence"))
                .and_then(Value::as_f64),
            id_image_url: owned(keys::IPFS_URL),
            ipfs_hash: owned(keys::IPFS_HASH),
            liveness_image: owned(keys::LIVENESS_IMAGE),
            liveness_timestamp: owned(keys::LIVENESS_TIMESTAMP),
            explorer_url: transaction_hash
                .as_deref()
                .map(|hash| AVAX_FUJI.explorer_tx_url(hash)),
            transaction_hash,
            token_id: owned(keys::TOKEN_ID),
            minting_timestamp: owned(keys::MINTING_TIMESTAMP),
            verification_score: self.verification_score,
            is_demo: self.flag(keys::IS_DEMO),
            current_step: self.current_step,
        }
    }
}
