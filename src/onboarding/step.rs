// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Onboarding steps and the verification score table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Steps of the DID creation wizard, in navigation order.
///
/// The discriminant is the zero-based position used to compute forward and
/// backward navigation distance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CreationStep {
    WalletConnection = 0,
    Recaptcha = 1,
    ImageSelection = 2,
    LivenessVerification = 3,
    Extraction = 4,
    Verification = 5,
    Minting = 6,
    Completed = 7,
}

impl CreationStep {
    /// All steps in order.
    pub const ALL: [CreationStep; 8] = [
        CreationStep::WalletConnection,
        CreationStep::Recaptcha,
        CreationStep::ImageSelection,
        CreationStep::LivenessVerification,
        CreationStep::Extraction,
        CreationStep::Verification,
        CreationStep::Minting,
        CreationStep::Completed,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The following step, or `None` at `Completed`.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding step, or `None` at `WalletConnection`.
    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Stepper label shown by the wizard.
    pub const fn label(self) -> &'static str {
        match self {
            CreationStep::WalletConnection => "Connect Wallet",
            CreationStep::Recaptcha => "Security Check",
            CreationStep::ImageSelection => "Select ID",
            CreationStep::LivenessVerification => "Proof of Liveness",
            CreationStep::Extraction => "Verify Info",
            CreationStep::Verification => "Validate Info",
            CreationStep::Minting => "Mint DID",
            CreationStep::Completed => "Complete",
        }
    }

    /// Stepper progress percentage.
    pub const fn progress(self) -> u8 {
        match self {
            CreationStep::WalletConnection => 10,
            CreationStep::Recaptcha => 15,
            CreationStep::ImageSelection => 20,
            CreationStep::LivenessVerification => 30,
            CreationStep::Extraction => 40,
            CreationStep::Verification => 60,
            CreationStep::Minting => 80,
            CreationStep::Completed => 100,
        }
    }

    /// Whether this step is bypassed once identity verification was skipped.
    pub const fn is_identity_capture(self) -> bool {
        matches!(
            self,
            CreationStep::LivenessVerification | CreationStep::Extraction
        )
    }
}

/// Verification score for landing on `step` by forward or backward navigation.
///
/// Extraction is never reached through navigation once verification is
/// skipped, so its skipped entry just mirrors the regular one.
pub const fn score_for(step: CreationStep, skipped: bool) -> u8 {
    match (step, skipped) {
        (CreationStep::WalletConnection, _) => 10,
        (CreationStep::Recaptcha, _) => 15,
        (CreationStep::ImageSelection, _) => 25,
        (CreationStep::LivenessVerification, _) => 35,
        (CreationStep::Extraction, _) => 60,
        (CreationStep::Verification, false) => 75,
        (CreationStep::Verification, true) => 40,
        (CreationStep::Minting, false) => 92,
        (CreationStep::Minting, true) => 60,
        (CreationStep::Completed, _) => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_totally_ordered() {
        for pair in CreationStep::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert_eq!(pair[1].previous(), Some(pair[0]));
        }
        assert_eq!(CreationStep::Completed.next(), None);
        assert_eq!(CreationStep::WalletConnection.previous(), None);
    }

    #[test]
    fn score_table_matches_published_values() {
        let regular: Vec<u8> = CreationStep::ALL
            .iter()
            .map(|step| score_for(*step, false))
            .collect();
        assert_eq!(regular, vec![10, 15, 25, 35, 60, 75, 92, 100]);

        assert_eq!(score_for(CreationStep::Verification, true), 40);
        assert_eq!(score_for(CreationStep::Minting, true), 60);
        assert_eq!(score_for(CreationStep::Completed, true), 100);
        assert_eq!(score_for(CreationStep::ImageSelection, true), 25);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&CreationStep::LivenessVerification).unwrap();
        assert_eq!(json, r#""liveness_verification""#);
        let step: CreationStep = serde_json::from_str(r#""wallet_connection""#).unwrap();
        assert_eq!(step, CreationStep::WalletConnection);
    }
}
