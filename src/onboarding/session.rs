// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Onboarding Session State Machine
//!
//! [`OnboardingSession`] owns the state of one wizard run and is the only
//! place that state changes. Every mutator degrades to a silent no-op when its
//! precondition does not hold and reports whether anything changed, so a
//! badly sequenced client can never corrupt the session.
//!
//! ## Transition graph
//!
//! ```text
//! WalletConnection -> Recaptcha -> ImageSelection -> LivenessVerification -> Extraction -> Verification -> Minting -> Completed
//! ```
//!
//! Once identity verification is skipped the session takes the short path:
//! `advance` jumps over `LivenessVerification`/`Extraction` straight to
//! `Verification`, and `retreat` from `Verification` returns to
//! `ImageSelection`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use utoipa::ToSchema;

use super::demo::demo_identity;
use super::keys;
use super::step::{score_for, CreationStep};

/// Key/value data accumulated by the wizard steps.
pub type CollectedData = Map<String, Value>;

/// State of a single onboarding run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OnboardingSession {
    /// The active step.
    pub current_step: CreationStep,
    /// Fields contributed by each step.
    #[schema(value_type = Object)]
    pub collected_data: CollectedData,
    /// Whether the active step's exit condition is satisfied.
    pub step_completed: bool,
    /// 0-100 summary of how much verification was really performed.
    pub verification_score: u8,
    /// Sticky flag set once the user skips identity verification.
    pub skipped_identity_verification: bool,
}

impl Default for OnboardingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingSession {
    /// Fresh session as the wizard mounts it.
    ///
    /// Starts at `Recaptcha`: wallet connection is a pre-check performed
    /// before the wizard is shown.
    pub fn new() -> Self {
        let mut collected_data = Map::new();
        collected_data.insert(keys::CAPTCHA_COMPLETED.to_string(), Value::Bool(false));
        Self {
            current_step: CreationStep::Recaptcha,
            collected_data,
            step_completed: false,
            verification_score: 10,
            skipped_identity_verification: false,
        }
    }

    /// Shallow-merge `patch` into the collected data.
    ///
    /// Returns `false` without touching anything when every key of `patch`
    /// already holds an equal value.
    pub fn update_data(&mut self, patch: CollectedData) -> bool {
        let has_new_data = patch
            .iter()
            .any(|(key, value)| self.collected_data.get(key) != Some(value));
        if !has_new_data {
            return false;
        }

        debug!(keys = ?patch.keys().collect::<Vec<_>>(), "Session data updated");
        self.collected_data.extend(patch);
        true
    }

    /// Set whether the active step is complete. Idempotent.
    pub fn mark_step_completed(&mut self, done: bool) -> bool {
        if self.step_completed == done {
            return false;
        }
        self.step_completed = done;
        true
    }

    /// Overwrite the verification score. No clamping is applied.
    pub fn set_verification_score(&mut self, score: u8) -> bool {
        if self.verification_score == score {
            return false;
        }
        self.verification_score = score;
        true
    }

    pub fn can_advance(&self) -> bool {
        self.current_step < CreationStep::Completed && self.step_completed
    }

    pub fn can_retreat(&self) -> bool {
        self.current_step > CreationStep::Recaptcha
    }

    /// Move to the next step ("Next" button).
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        let Some(mut next) = self.current_step.next() else {
            return false;
        };

        if self.skipped_identity_verification && next.is_identity_capture() {
            next = CreationStep::Verification;
        }

        debug!(from = ?self.current_step, to = ?next, "Advancing onboarding step");
        self.current_step = next;
        self.step_completed = false;
        self.verification_score = score_for(next, self.skipped_identity_verification);
        true
    }

    /// Move to the previous step ("Back" button). Stops at `Recaptcha`.
    pub fn retreat(&mut self) -> bool {
        if !self.can_retreat() {
            return false;
        }
        let leaving = self.current_step;
        let Some(mut previous) = leaving.previous() else {
            return false;
        };

        if self.skipped_identity_verification && leaving == CreationStep::Verification {
            previous = CreationStep::ImageSelection;
        }

        // Backing out of the upload step forces the captcha to be solved again.
        let back_to_captcha = leaving == CreationStep::ImageSelection;
        if back_to_captcha {
            self.collected_data
                .insert(keys::CAPTCHA_COMPLETED.to_string(), Value::Bool(false));
        }

        debug!(from = ?leaving, to = ?previous, "Retreating onboarding step");
        self.current_step = previous;
        self.verification_score = score_for(previous, self.skipped_identity_verification);
        self.step_completed = !(previous == CreationStep::Recaptcha && back_to_captcha);
        true
    }

    /// Bypass ID capture, substituting the demo identity.
    ///
    /// The landing step and score depend on how much real verification was
    /// done before skipping.
    pub fn skip_identity_verification(&mut self) -> bool {
        let (target, score) = match (self.current_step, self.skipped_identity_verification) {
            (CreationStep::ImageSelection, _) => (CreationStep::LivenessVerification, 25),
            (CreationStep::LivenessVerification, false) => (CreationStep::Extraction, 40),
            _ => (CreationStep::Verification, 25),
        };

        self.collected_data
            .insert(keys::IS_DEMO.to_string(), Value::Bool(true));
        self.collected_data
            .insert(keys::DEMO_DATA.to_string(), demo_identity());

        debug!(from = ?self.current_step, to = ?target, score, "Identity verification skipped");
        self.current_step = target;
        self.step_completed = true;
        self.verification_score = score;
        self.skipped_identity_verification = true;
        true
    }

    /// String value of a collected key, treating null and non-strings as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.collected_data.get(key).and_then(Value::as_str)
    }

    /// Boolean flag of a collected key; absent or non-boolean reads as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.collected_data
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Display form of the user's DID.
    pub fn did_string(&self) -> String {
        let suffix = self
            .text(keys::DID_IDENTIFIER)
            .or_else(|| self.text(keys::WALLET_ADDRESS))
            .unwrap_or("0x0");
        format!("did:ryt:{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> CollectedData {
        match value {
            Value::Object(map) => map,
            _ => panic!("patch must be an object"),
        }
    }

    fn session_at_image_selection() -> OnboardingSession {
        let mut session = OnboardingSession::new();
        session.update_data(patch(json!({ "captchaCompleted": true })));
        session.mark_step_completed(true);
        assert!(session.advance());
        assert_eq!(session.current_step, CreationStep::ImageSelection);
        session
    }

    #[test]
    fn new_session_defaults() {
        let session = OnboardingSession::new();
        assert_eq!(session.current_step, CreationStep::Recaptcha);
        assert_eq!(session.verification_score, 10);
        assert!(!session.step_completed);
        assert!(!session.skipped_identity_verification);
        assert_eq!(session.collected_data.get("captchaCompleted"), Some(&json!(false)));
    }

    #[test]
    fn advance_is_blocked_until_step_completed() {
        let mut session = OnboardingSession::new();
        assert!(!session.advance());
        assert_eq!(session.current_step, CreationStep::Recaptcha);
        assert_eq!(session.verification_score, 10);
    }

    #[test]
    fn end_to_end_happy_path() {
        let mut session = OnboardingSession::new();
        assert!(!session.advance());

        session.mark_step_completed(true);
        assert!(session.advance());
        assert_eq!(session.current_step, CreationStep::ImageSelection);
        assert_eq!(session.verification_score, 25);
        assert!(!session.step_completed);

        session.update_data(patch(json!({ "ipfsUrl": "cid123" })));
        session.mark_step_completed(true);
        assert!(session.advance());
        assert_eq!(session.current_step, CreationStep::LivenessVerification);
        assert_eq!(session.verification_score, 35);

        let mut expected = vec![
            (CreationStep::Extraction, 60),
            (CreationStep::Verification, 75),
            (CreationStep::Minting, 92),
            (CreationStep::Completed, 100),
        ]
        .into_iter();
        while session.current_step < CreationStep::Completed {
            session.mark_step_completed(true);
            session.advance();
            let (step, score) = expected.next().unwrap();
            assert_eq!(session.current_step, step);
            assert_eq!(session.verification_score, score);
        }
    }

    #[test]
    fn completed_is_terminal() {
        let mut session = OnboardingSession::new();
        while session.current_step < CreationStep::Completed {
            session.mark_step_completed(true);
            session.advance();
        }
        session.mark_step_completed(true);
        assert!(!session.advance());
        session.mark_step_completed(false);
        assert!(!session.advance());
        assert_eq!(session.current_step, CreationStep::Completed);
        assert_eq!(session.verification_score, 100);
    }

    #[test]
    fn update_data_short_circuits_on_equal_values() {
        let mut session = OnboardingSession::new();
        assert!(session.update_data(patch(json!({ "a": 1 }))));
        assert!(!session.update_data(patch(json!({ "a": 1 }))));
        assert!(session.update_data(patch(json!({ "a": 2 }))));
    }

    #[test]
    fn update_data_never_drops_absent_keys() {
        let mut session = OnboardingSession::new();
        session.update_data(patch(json!({ "walletAddress": "0xabc" })));
        session.update_data(patch(json!({ "ipfsUrl": "cid" })));
        assert_eq!(session.text("walletAddress"), Some("0xabc"));
        assert_eq!(session.text("ipfsUrl"), Some("cid"));
        assert_eq!(session.collected_data.get("captchaCompleted"), Some(&json!(false)));
    }

    #[test]
    fn mark_step_completed_is_idempotent() {
        let mut session = OnboardingSession::new();
        assert!(session.mark_step_completed(true));
        assert!(!session.mark_step_completed(true));
        assert!(session.mark_step_completed(false));
    }

    #[test]
    fn set_verification_score_overwrites_without_clamping() {
        let mut session = OnboardingSession::new();
        assert!(session.set_verification_score(150));
        assert_eq!(session.verification_score, 150);
        assert!(!session.set_verification_score(150));
    }

    #[test]
    fn skip_from_image_selection_takes_short_path() {
        let mut session = session_at_image_selection();
        assert!(session.skip_identity_verification());
        assert_eq!(session.current_step, CreationStep::LivenessVerification);
        assert_eq!(session.verification_score, 25);
        assert!(session.step_completed);
        assert!(session.skipped_identity_verification);
        assert!(session.flag("isDemo"));
        assert_eq!(
            session.collected_data["demoData"]["documentNumber"],
            json!("DEMO-12345")
        );

        assert!(session.advance());
        assert_eq!(session.current_step, CreationStep::Verification);
        assert_eq!(session.verification_score, 40);

        session.mark_step_completed(true);
        session.advance();
        assert_eq!(session.current_step, CreationStep::Minting);
        assert_eq!(session.verification_score, 60);
    }

    #[test]
    fn skip_from_liveness_depends_on_earlier_skip() {
        let mut session = session_at_image_selection();
        session.mark_step_completed(true);
        session.advance();
        assert_eq!(session.current_step, CreationStep::LivenessVerification);

        session.skip_identity_verification();
        assert_eq!(session.current_step, CreationStep::Extraction);
        assert_eq!(session.verification_score, 40);

        let mut skipped_twice = session_at_image_selection();
        skipped_twice.skip_identity_verification();
        skipped_twice.skip_identity_verification();
        assert_eq!(skipped_twice.current_step, CreationStep::Verification);
        assert_eq!(skipped_twice.verification_score, 25);
    }

    #[test]
    fn skip_from_other_steps_lands_on_verification() {
        let mut session = OnboardingSession::new();
        session.skip_identity_verification();
        assert_eq!(session.current_step, CreationStep::Verification);
        assert_eq!(session.verification_score, 25);
    }

    #[test]
    fn retreat_mirrors_skip_shortcut() {
        let mut session = session_at_image_selection();
        session.skip_identity_verification();
        session.advance();
        assert_eq!(session.current_step, CreationStep::Verification);

        assert!(session.retreat());
        assert_eq!(session.current_step, CreationStep::ImageSelection);
        assert_eq!(session.verification_score, 25);
        assert!(session.step_completed);
    }

    #[test]
    fn retreat_past_upload_resets_captcha() {
        let mut session = session_at_image_selection();
        session.update_data(patch(json!({ "ipfsUrl": "cid" })));
        session.mark_step_completed(true);
        session.advance();
        assert_eq!(session.current_step, CreationStep::LivenessVerification);

        assert!(session.retreat());
        assert_eq!(session.current_step, CreationStep::ImageSelection);
        assert!(session.step_completed);
        assert!(session.flag("captchaCompleted"));

        assert!(session.retreat());
        assert_eq!(session.current_step, CreationStep::Recaptcha);
        assert!(!session.flag("captchaCompleted"));
        assert!(!session.step_completed);
        assert_eq!(session.verification_score, 15);
    }

    #[test]
    fn second_retreat_from_upload_is_a_noop() {
        let mut session = session_at_image_selection();
        assert!(session.flag("captchaCompleted"));

        assert!(session.retreat());
        assert_eq!(session.current_step, CreationStep::Recaptcha);
        assert!(!session.flag("captchaCompleted"));
        assert!(!session.step_completed);
        let after_first = session.clone();

        assert!(!session.retreat());
        assert_eq!(session, after_first);
        assert!(!session.flag("captchaCompleted"));
        assert!(!session.step_completed);
        assert_eq!(session.verification_score, 15);
    }

    #[test]
    fn retreat_stops_at_recaptcha() {
        let mut session = OnboardingSession::new();
        assert!(!session.retreat());
        assert_eq!(session.current_step, CreationStep::Recaptcha);

        session.current_step = CreationStep::WalletConnection;
        assert!(!session.retreat());
        assert_eq!(session.current_step, CreationStep::WalletConnection);
    }

    #[test]
    fn navigation_scores_stay_consistent_with_table() {
        for skipped in [false, true] {
            let mut session = session_at_image_selection();
            if skipped {
                session.skip_identity_verification();
            }
            for _ in 0..6 {
                session.mark_step_completed(true);
                session.advance();
                assert_eq!(
                    session.verification_score,
                    score_for(session.current_step, skipped)
                );
            }
            while session.retreat() {
                assert_eq!(
                    session.verification_score,
                    score_for(session.current_step, skipped)
                );
                if skipped {
                    assert!(!session.current_step.is_identity_capture());
                }
            }
            assert_eq!(session.current_step, CreationStep::Recaptcha);
        }
    }

    #[test]
    fn did_string_prefers_identifier_then_wallet() {
        let mut session = OnboardingSession::new();
        assert_eq!(session.did_string(), "did:ryt:0x0");

        session.update_data(patch(json!({ "walletAddress": "0xabc" })));
        assert_eq!(session.did_string(), "did:ryt:0xabc");

        session.update_data(patch(json!({ "didIdentifier": "42" })));
        assert_eq!(session.did_string(), "did:ryt:42");

        session.update_data(patch(json!({ "didIdentifier": null })));
        assert_eq!(session.did_string(), "did:ryt:0xabc");
    }
}
