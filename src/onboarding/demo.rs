// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canned identity records used when real verification is skipped or fails.

use serde_json::{json, Value};

use crate::providers::{DocumentMetadata, IdentityFields};

/// Placeholder identity stored under `demoData` when verification is skipped.
pub fn demo_identity() -> Value {
    json!({
        "firstName": "John",
        "lastName": "Doe",
        "dateOfBirth": "1990-01-01",
        "nationality": "International",
        "documentType": "None",
        "documentNumber": "DEMO-12345"
    })
}

/// Identity substituted when extraction fails, so the wizard can continue.
pub fn fallback_identity() -> IdentityFields {
    IdentityFields {
        full_name: "John Doe".to_string(),
        date_of_birth: "1990-01-01".to_string(),
        gender: "Male".to_string(),
        id_number: "AB123456789".to_string(),
        metadata: DocumentMetadata {
            document_type: Some("National ID".to_string()),
            issuing_country: Some("United States".to_string()),
            file_type: Some("image/jpeg".to_string()),
            file_size: Some("Unknown".to_string()),
            extra: Default::default(),
        },
        raw_text: None,
        confidence: Some(0.92),
    }
}

/// Identity fields built from the demo record, for steps that need
/// [`IdentityFields`] on the skipped path.
pub fn demo_identity_fields() -> IdentityFields {
    IdentityFields {
        full_name: "John Doe".to_string(),
        date_of_birth: "1990-01-01".to_string(),
        gender: String::new(),
        id_number: "DEMO-12345".to_string(),
        metadata: DocumentMetadata {
            document_type: Some("None".to_string()),
            issuing_country: Some("International".to_string()),
            ..Default::default()
        },
        raw_text: None,
        confidence: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_record_matches_demo_fields() {
        let record = demo_identity();
        let fields = demo_identity_fields();
        assert_eq!(record["documentNumber"], fields.id_number.as_str());
        assert_eq!(record["dateOfBirth"], fields.date_of_birth.as_str());
    }

    #[test]
    fn fallback_identity_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(fallback_identity()).unwrap();
        assert_eq!(value["fullName"], "John Doe");
        assert_eq!(value["idNumber"], "AB123456789");
        assert_eq!(value["metadata"]["documentType"], "National ID");
        assert!(value.get("rawText").is_none());
    }
}
