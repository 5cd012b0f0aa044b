// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OpenAI vision extraction of ID document fields.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::{http_client, CollaboratorError, DocumentMetadata, IdentityExtractor, IdentityFields};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 1000;

/// Confidence reported until the model provides its own.
const DEFAULT_CONFIDENCE: f64 = 0.92;

const EXTRACTION_PROMPT: &str = r#"Analyze this ID document image and extract the following information in JSON format:
- fullName: The person's full name
- dateOfBirth: Date of birth in the format found on the document
- gender: Gender of the person (M/F, Male/Female)
- idNumber: ID or document number
- metadata: Basic information about the document (type of ID, country, etc.)

Return ONLY a valid JSON object with these fields and nothing else. If a field cannot be found, use null.
Format:
{
  "fullName": "...",
  "dateOfBirth": "...",
  "gender": "...",
  "idNumber": "...",
  "metadata": {
    "documentType": "...",
    "issuingCountry": "..."
  }
}"#;

#[derive(Debug, Clone)]
pub struct OpenAiVisionClient {
    api_key: Option<String>,
    model: String,
    api_url: String,
    http: Client,
}

impl OpenAiVisionClient {
    pub fn new(api_key: Option<String>, model: &str) -> Result<Self, CollaboratorError> {
        Ok(Self {
            api_key,
            model: model.to_string(),
            api_url: CHAT_COMPLETIONS_URL.to_string(),
            http: http_client()?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body(&self, image_url: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": EXTRACTION_PROMPT },
                    { "type": "image_url", "image_url": { "url": image_url } }
                ]
            }],
            "max_tokens": MAX_TOKENS
        })
    }
}

#[async_trait]
impl IdentityExtractor for OpenAiVisionClient {
    async fn extract(&self, image_url: &str) -> Result<IdentityFields, CollaboratorError> {
        if image_url.trim().is_empty() {
            return Err(CollaboratorError::ExtractionError(
                "No image URL provided for extraction".to_string(),
            ));
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CollaboratorError::ExtractionError(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        };

        let preview: String = image_url.chars().take(30).collect();
        info!(image = %preview, model = %self.model, "Sending ID image to vision model");

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&self.request_body(image_url))
            .send()
            .await
            .map_err(|e| CollaboratorError::ExtractionError(format!("vision request failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| CollaboratorError::ExtractionError(format!("invalid vision response: {e}")))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        if let Some(total) = body.pointer("/usage/total_tokens").and_then(Value::as_u64) {
            debug!(total_tokens = total, "Vision response received");
        }

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CollaboratorError::ExtractionError("vision response has no message content".to_string())
            })?;

        parse_identity_reply(content)
    }
}

fn api_error(status: u16, body: &Value) -> CollaboratorError {
    let code = body.pointer("/error/code").and_then(Value::as_str);
    if code == Some("insufficient_quota") {
        return CollaboratorError::ExtractionError(
            "OpenAI API quota exceeded. Please check your billing details or try again later."
                .to_string(),
        );
    }
    let message = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    warn!(status, code = ?code, "Vision API returned an error");
    CollaboratorError::ExtractionError(format!("OpenAI API error: {status} - {message}"))
}

/// Turn the model's reply into identity fields.
///
/// Accepts a bare JSON object or prose with a JSON object embedded in it
/// (for example inside a fenced code block).
pub fn parse_identity_reply(content: &str) -> Result<IdentityFields, CollaboratorError> {
    let (parsed, raw_text) = match serde_json::from_str::<Value>(content.trim()) {
        Ok(Value::Object(map)) => {
            let pretty = serde_json::to_string_pretty(&map).unwrap_or_else(|_| content.to_string());
            (map, pretty)
        }
        _ => (embedded_object(content)?, content.to_string()),
    };

    let text = |key: &str| {
        parsed
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let metadata = match parsed.get("metadata") {
        Some(Value::Object(fields)) => reply_metadata(fields),
        _ => DocumentMetadata {
            file_type: Some("image".to_string()),
            file_size: Some("unknown".to_string()),
            ..Default::default()
        },
    };

    Ok(IdentityFields {
        full_name: text("fullName"),
        date_of_birth: text("dateOfBirth"),
        gender: text("gender"),
        id_number: text("idNumber"),
        metadata,
        raw_text: Some(raw_text),
        confidence: Some(DEFAULT_CONFIDENCE),
    })
}

/// Read the reply's metadata one field at a time; numbers and booleans are
/// kept as their text form and any other value counts as absent.
fn reply_metadata(fields: &Map<String, Value>) -> DocumentMetadata {
    let mut extra = fields.clone();
    let mut take = |key: &str| {
        extra.remove(key).and_then(|value| match value {
            Value::String(text) => Some(text),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        })
    };

    DocumentMetadata {
        document_type: take("documentType"),
        issuing_country: take("issuingCountry"),
        file_type: take("fileType"),
        file_size: take("fileSize"),
        extra,
    }
}

/// The span from the first `{` to the last `}` parsed as a JSON object.
fn embedded_object(content: &str) -> Result<Map<String, Value>, CollaboratorError> {
    let span = content
        .find('{')
        .zip(content.rfind('}'))
        .filter(|(start, end)| start < end)
        .map(|(start, end)| &content[start..=end])
        .ok_or_else(|| CollaboratorError::ExtractionError("No JSON found in response".to_string()))?;

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CollaboratorError::ExtractionError(
            "Failed to parse extracted information: not an object".to_string(),
        )),
        Err(e) => Err(CollaboratorError::ExtractionError(format!(
            "Failed to parse extracted information: {e}"
        ))),
    }
}
