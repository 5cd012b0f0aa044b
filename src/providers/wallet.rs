// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet ownership check via EIP-191 signature recovery.

use std::str::FromStr;

use alloy::primitives::{Address, Signature};
use async_trait::async_trait;
use uuid::Uuid;

use super::{CollaboratorError, WalletClaim, WalletConnector};

/// Message a wallet signs to link itself to an onboarding session.
pub fn wallet_challenge(session_id: Uuid) -> String {
    format!(
        "Sign this message to link your wallet to RYT DID onboarding.\n\nSession: {session_id}"
    )
}

/// Connects a wallet by recovering the signer of a personal message.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureWalletConnector;

impl SignatureWalletConnector {
    /// Recover the signer of `claim.message` and check it against the claimed address.
    pub fn recover(claim: &WalletClaim) -> Result<Address, CollaboratorError> {
        let claimed = Address::from_str(claim.address.trim())
            .map_err(|e| CollaboratorError::NotConnected(format!("invalid address: {e}")))?;

        let signature = Signature::from_str(claim.signature.trim())
            .map_err(|e| CollaboratorError::NotConnected(format!("invalid signature: {e}")))?;

        let recovered = signature
            .recover_address_from_msg(claim.message.as_bytes())
            .map_err(|e| CollaboratorError::NotConnected(format!("signature recovery failed: {e}")))?;

        if recovered != claimed {
            return Err(CollaboratorError::NotConnected(
                "signature does not belong to the claimed address".to_string(),
            ));
        }

        Ok(claimed)
    }
}

#[async_trait]
impl WalletConnector for SignatureWalletConnector {
    async fn connect(&self, claim: &WalletClaim) -> Result<String, CollaboratorError> {
        let address = Self::recover(claim)?;
        Ok(address.to_checksum(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    fn signer() -> PrivateKeySigner {
        PrivateKeySigner::from_slice(&[0x11; 32]).unwrap()
    }

    fn signed_claim(signer: &PrivateKeySigner, message: &str) -> WalletClaim {
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        WalletClaim {
            address: signer.address().to_string(),
            message: message.to_string(),
            signature: alloy::hex::encode_prefixed(signature.as_bytes()),
        }
    }

    #[tokio::test]
    async fn connect_accepts_matching_signature() {
        let signer = signer();
        let challenge = wallet_challenge(Uuid::new_v4());
        let claim = signed_claim(&signer, &challenge);

        let address = SignatureWalletConnector.connect(&claim).await.unwrap();
        assert_eq!(address, signer.address().to_checksum(None));
    }

    #[tokio::test]
    async fn connect_rejects_signature_over_other_message() {
        let signer = signer();
        let mut claim = signed_claim(&signer, "something else");
        claim.message = wallet_challenge(Uuid::new_v4());

        let err = SignatureWalletConnector.connect(&claim).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::NotConnected(_)));
    }

    #[tokio::test]
    async fn connect_rejects_malformed_input() {
        let claim = WalletClaim {
            address: "not-an-address".to_string(),
            message: "hi".to_string(),
            signature: "0x00".to_string(),
        };
        assert!(SignatureWalletConnector.connect(&claim).await.is_err());
    }

    #[test]
    fn challenge_names_the_session() {
        let id = Uuid::new_v4();
        assert!(wallet_challenge(id).ends_with(&id.to_string()));
    }
}
