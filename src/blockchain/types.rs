// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain constants for DID minting.

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

impl NetworkConfig {
    /// Explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

/// Avalanche Fuji Testnet configuration.
pub const AVAX_FUJI: NetworkConfig = NetworkConfig {
    name: "Avalanche Fuji Testnet",
    chain_id: 43113,
    rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
    explorer_url: "https://testnet.snowtrace.io",
};

/// Deployed DID token contract exposing `mint(string tokenURI)`.
pub const DEFAULT_DID_CONTRACT: &str = "0x66332e60b24BB4C729A2Be07Ab733C26242A5aAD";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_tx_url_joins_path() {
        assert_eq!(
            AVAX_FUJI.explorer_tx_url("0xabc"),
            "https://testnet.snowtrace.io/tx/0xabc"
        );
    }
}
