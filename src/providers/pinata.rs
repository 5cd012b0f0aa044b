// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pinata IPFS pinning for ID images and token metadata.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{http_client, CollaboratorError, DocumentStore, DocumentUpload, PinnedContent};

const DEFAULT_API_BASE_URL: &str = "https://api.pinata.cloud";

/// CID returned in demo mode when no Pinata credentials are configured.
pub const DEMO_CID: &str = "bafkreiaapyrob3rqaxquyfd7lh4wclbtm5ooynxms5y23izagctpboe2zq";

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Clone)]
pub struct PinataClient {
    jwt: Option<String>,
    gateway: String,
    api_base_url: String,
    http: Client,
}

impl PinataClient {
    pub fn new(jwt: Option<String>, gateway: &str) -> Result<Self, CollaboratorError> {
        Ok(Self {
            jwt,
            gateway: gateway.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http: http_client()?,
        })
    }

    pub fn is_demo(&self) -> bool {
        self.jwt.is_none()
    }

    /// Gateway URL for a CID.
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}/{}", self.gateway.trim_end_matches('/'), cid)
    }

    fn demo_pin(&self, what: &str) -> PinnedContent {
        warn!(what, "Pinata JWT not set, returning demo CID");
        PinnedContent {
            cid: DEMO_CID.to_string(),
            url: self.gateway_url(DEMO_CID),
        }
    }

    async fn pin(
        &self,
        jwt: &str,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<PinnedContent, CollaboratorError> {
        let response = request
            .header("Authorization", format!("Bearer {jwt}"))
            .send()
            .await
            .map_err(|e| CollaboratorError::UploadError(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::UploadError(format!(
                "POST {path} returned {status}: {body}"
            )));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::UploadError(format!("POST {path} invalid JSON: {e}")))?;

        info!(cid = %pinned.ipfs_hash, path, "Content pinned to IPFS");
        Ok(PinnedContent {
            url: self.gateway_url(&pinned.ipfs_hash),
            cid: pinned.ipfs_hash,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl DocumentStore for PinataClient {
    async fn upload_file(&self, upload: &DocumentUpload) -> Result<PinnedContent, CollaboratorError> {
        let Some(jwt) = self.jwt.as_deref() else {
            return Ok(self.demo_pin(&upload.file_name));
        };

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| CollaboratorError::UploadError(format!("invalid content type: {e}")))?;

        let form = Form::new()
            .part("file", part)
            .text(
                "pinataMetadata",
                json!({ "name": upload.file_name }).to_string(),
            )
            .text("pinataOptions", json!({ "cidVersion": 0 }).to_string());

        let path = "/pinning/pinFileToIPFS";
        let request = self.http.post(self.endpoint(path)).multipart(form);
        self.pin(jwt, request, path).await
    }

    async fn upload_json(
        &self,
        name: &str,
        content: &Value,
    ) -> Result<PinnedContent, CollaboratorError> {
        let Some(jwt) = self.jwt.as_deref() else {
            return Ok(self.demo_pin(name));
        };

        let payload = json!({
            "pinataContent": content,
            "pinataMetadata": { "name": name },
            "pinataOptions": { "cidVersion": 0 }
        });

        let path = "/pinning/pinJSONToIPFS";
        let request = self.http.post(self.endpoint(path)).json(&payload);
        self.pin(jwt, request, path).await
    }
}
