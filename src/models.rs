// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive `ToSchema`
//! for OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Sessions**: creation and the snapshot returned by every session call
//! - **Navigation**: bodies of the raw state machine operations
//! - **Steps**: bodies of the collaborator-backed wizard steps

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::onboarding::{CollectedData, SessionSnapshot};
use crate::providers::DocumentUpload;

// =============================================================================
// Session Models
// =============================================================================

/// Returned when a new onboarding session is created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    /// Message the user's wallet must sign to link itself to this session.
    pub wallet_challenge: String,
    pub session: SessionSnapshot,
}

/// Session state after an operation.
///
/// `changed` is `false` when the operation was a no-op, for example
/// advancing before the current step is complete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub changed: bool,
    pub session: SessionSnapshot,
}

// =============================================================================
// Navigation Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkCompletedRequest {
    pub completed: bool,
}

/// Fields to shallow-merge into the collected data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDataRequest {
    #[schema(value_type = Object)]
    pub data: CollectedData,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetScoreRequest {
    pub score: u8,
}

// =============================================================================
// Step Models
// =============================================================================

/// Wallet link proof.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectWalletRequest {
    /// Address the user claims to control.
    pub address: String,
    /// Hex personal-sign signature over the session's `wallet_challenge`.
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaptchaRequest {
    /// reCAPTCHA widget response token.
    pub token: String,
}

/// ID image upload.
///
/// `content` is standard base64, optionally as a `data:` URL; a `data:` URL's
/// media type overrides `content_type`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadDocumentRequest {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub content: String,
}

impl UploadDocumentRequest {
    pub fn into_upload(self) -> Result<DocumentUpload, ApiError> {
        let (content_type, encoded) = match self.content.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| ApiError::bad_request("Malformed data URL"))?;
                let media_type = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| ApiError::bad_request("Data URL must be base64 encoded"))?;
                (Some(media_type.to_string()), payload)
            }
            None => (self.content_type, self.content.as_str()),
        };

        let content_type =
            content_type.ok_or_else(|| ApiError::bad_request("content_type is required"))?;
        let bytes = Base64::decode_vec(encoded.trim())
            .map_err(|e| ApiError::bad_request(format!("Invalid base64 content: {e}")))?;

        Ok(DocumentUpload {
            file_name: self.file_name,
            content_type,
            bytes,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LivenessCaptureRequest {
    /// Selfie capture as an image `data:` URL.
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn upload_accepts_plain_base64() {
        let upload = UploadDocumentRequest {
            file_name: "id.png".into(),
            content_type: Some("image/png".into()),
            content: "AQID".into(),
        }
        .into_upload()
        .unwrap();
        assert_eq!(upload.bytes, vec![1, 2, 3]);
        assert_eq!(upload.content_type, "image/png");
    }

    #[test]
    fn upload_reads_media_type_from_data_url() {
        let upload = UploadDocumentRequest {
            file_name: "id.jpg".into(),
            content_type: Some("image/png".into()),
            content: "data:image/jpeg;base64,AQID".into(),
        }
        .into_upload()
        .unwrap();
        assert_eq!(upload.content_type, "image/jpeg");
        assert_eq!(upload.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn upload_rejects_bad_input() {
        let bad_base64 = UploadDocumentRequest {
            file_name: "id.png".into(),
            content_type: Some("image/png".into()),
            content: "not base64!".into(),
        };
        assert_eq!(bad_base64.into_upload().unwrap_err().status, StatusCode::BAD_REQUEST);

        let no_type = UploadDocumentRequest {
            file_name: "id.png".into(),
            content_type: None,
            content: "AQID".into(),
        };
        assert!(no_type.into_upload().is_err());

        let not_base64_url = UploadDocumentRequest {
            file_name: "id.png".into(),
            content_type: None,
            content: "data:image/png,AQID".into(),
        };
        assert!(not_base64_url.into_upload().is_err());
    }
}
