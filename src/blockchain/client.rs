// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DID token minting client.

use std::str::FromStr;

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::ProviderBuilder,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tracing::info;

use super::contract::{minted_token_id, IDidToken};
use crate::providers::{CollaboratorError, MintReceipt, TokenMinter};

/// Mints DID tokens from a server-held minting account.
pub struct DidTokenMinter {
    rpc_url: url::Url,
    contract_address: Address,
    wallet: EthereumWallet,
    minter_address: Address,
}

impl DidTokenMinter {
    pub fn new(
        rpc_url: &str,
        contract_address: &str,
        private_key_hex: &str,
    ) -> Result<Self, DidChainError> {
        let rpc_url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| DidChainError::InvalidRpcUrl(e.to_string()))?;
        let contract_address = Address::from_str(contract_address)
            .map_err(|e| DidChainError::InvalidAddress(e.to_string()))?;

        let signer = Self::create_signer(private_key_hex)?;
        let minter_address = signer.address();

        Ok(Self {
            rpc_url,
            contract_address,
            wallet: EthereumWallet::from(signer),
            minter_address,
        })
    }

    /// Create a signer from a hex private key (with or without `0x`).
    pub fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, DidChainError> {
        let trimmed = private_key_hex.trim();
        let key_bytes = alloy::hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
            .map_err(|e| DidChainError::InvalidPrivateKey(e.to_string()))?;

        PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| DidChainError::InvalidPrivateKey(e.to_string()))
    }

    pub fn minter_address(&self) -> Address {
        self.minter_address
    }

    /// Call `mint(token_uri)` and wait for the confirmation receipt.
    ///
    /// The token id comes from the receipt's `Transfer` event; when the
    /// contract emits none, the transaction hash stands in for it.
    pub async fn mint_token(&self, token_uri: &str) -> Result<MintReceipt, DidChainError> {
        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(self.rpc_url.clone());
        let contract = IDidToken::new(self.contract_address, provider);

        let pending = contract
            .mint(token_uri.to_string())
            .send()
            .await
            .map_err(|e| DidChainError::ContractError(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        info!(tx_hash = %tx_hash, minter = %self.minter_address, "DID mint transaction submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| DidChainError::Unconfirmed(format!("{tx_hash}: {e}")))?;
        if !receipt.status() {
            return Err(DidChainError::TransactionFailed(format!(
                "transaction {tx_hash} reverted"
            )));
        }

        let token_id = minted_token_id(receipt.inner.logs())
            .map(|id| id.to_string())
            .unwrap_or_else(|| tx_hash.to_string());

        info!(tx_hash = %tx_hash, token_id = %token_id, "DID token minted");
        Ok(MintReceipt {
            tx_hash: tx_hash.to_string(),
            token_id,
        })
    }
}

#[async_trait]
impl TokenMinter for DidTokenMinter {
    async fn mint(&self, metadata_uri: &str) -> Result<MintReceipt, CollaboratorError> {
        self.mint_token(metadata_uri).await.map_err(|e| match e {
            DidChainError::Unconfirmed(_) => CollaboratorError::MintUnconfirmed(e.to_string()),
            _ => CollaboratorError::MintError(e.to_string()),
        })
    }
}

/// Stand-in used when no minting key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMinter;

#[async_trait]
impl TokenMinter for DisabledMinter {
    async fn mint(&self, _metadata_uri: &str) -> Result<MintReceipt, CollaboratorError> {
        Err(CollaboratorError::Misconfigured(
            "MINTER_PRIVATE_KEY is not set; minting is unavailable".to_string(),
        ))
    }
}

/// Errors that can occur during minting.
#[derive(Debug, thiserror::Error)]
pub enum DidChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Sent, but no receipt was obtained; the mint may still land.
    #[error("Transaction unconfirmed: {0}")]
    Unconfirmed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{AVAX_FUJI, DEFAULT_DID_CONTRACT};

    const KEY: &str = "1111111111111111111111111111111111111111111111111111111111111111";

    #[test]
    fn create_signer_accepts_optional_prefix() {
        let plain = DidTokenMinter::create_signer(KEY).unwrap();
        let prefixed = DidTokenMinter::create_signer(&format!("0x{KEY}")).unwrap();
        assert_eq!(plain.address(), prefixed.address());
    }

    #[test]
    fn create_signer_rejects_garbage() {
        assert!(matches!(
            DidTokenMinter::create_signer("zz"),
            Err(DidChainError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn new_validates_inputs() {
        let minter = DidTokenMinter::new(AVAX_FUJI.rpc_url, DEFAULT_DID_CONTRACT, KEY).unwrap();
        assert_eq!(
            minter.minter_address(),
            DidTokenMinter::create_signer(KEY).unwrap().address()
        );

        assert!(matches!(
            DidTokenMinter::new("not a url", DEFAULT_DID_CONTRACT, KEY),
            Err(DidChainError::InvalidRpcUrl(_))
        ));
        assert!(matches!(
            DidTokenMinter::new(AVAX_FUJI.rpc_url, "0x1234", KEY),
            Err(DidChainError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn disabled_minter_reports_misconfiguration() {
        let err = DisabledMinter.mint("ipfs://meta").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Misconfigured(_)));
    }
}
