// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google reCAPTCHA server-side verification.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::{http_client, CaptchaVerifier, CollaboratorError};

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifies widget tokens against the `siteverify` endpoint.
///
/// Without a secret the client runs in demo mode and accepts any non-empty
/// token, matching the widget's public test key.
#[derive(Debug, Clone)]
pub struct RecaptchaClient {
    secret: Option<String>,
    verify_url: String,
    http: Client,
}

impl RecaptchaClient {
    pub fn new(secret: Option<String>) -> Result<Self, CollaboratorError> {
        Ok(Self {
            secret,
            verify_url: SITEVERIFY_URL.to_string(),
            http: http_client()?,
        })
    }

    pub fn is_demo(&self) -> bool {
        self.secret.is_none()
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaClient {
    async fn verify(&self, token: &str) -> Result<bool, CollaboratorError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(false);
        }

        let Some(secret) = self.secret.as_deref() else {
            warn!("reCAPTCHA secret not set, accepting token in demo mode");
            return Ok(true);
        };

        let response = self
            .http
            .post(&self.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await
            .map_err(|e| CollaboratorError::CaptchaFailed(format!("siteverify request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::CaptchaFailed(format!(
                "siteverify returned {status}: {body}"
            )));
        }

        let verdict: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::CaptchaFailed(format!("invalid siteverify response: {e}")))?;

        if !verdict.success {
            info!(error_codes = ?verdict.error_codes, "reCAPTCHA token rejected");
        }
        Ok(verdict.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_mode_accepts_non_empty_tokens() {
        let client = RecaptchaClient::new(None).unwrap();
        assert!(client.is_demo());
        assert!(client.verify("03AFcWeA").await.unwrap());
        assert!(!client.verify("  ").await.unwrap());
    }

    #[test]
    fn parses_siteverify_error_codes() {
        let verdict: SiteVerifyResponse = serde_json::from_str(
            r#"{"success": false, "error-codes": ["invalid-input-response"]}"#,
        )
        .unwrap();
        assert!(!verdict.success);
        assert_eq!(verdict.error_codes, vec!["invalid-input-response"]);

        let ok: SiteVerifyResponse =
            serde_json::from_str(r#"{"success": true, "hostname": "localhost"}"#).unwrap();
        assert!(ok.success);
        assert!(ok.error_codes.is_empty());
    }
}
