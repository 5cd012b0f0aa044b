// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DID token contract bindings.

use alloy::{primitives::U256, rpc::types::Log, sol};

// Only the mint entry point is called; Transfer is decoded from the receipt.
sol! {
    #[sol(rpc)]
    interface IDidToken {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        function mint(string tokenURI) external;
    }
}

/// Token id of the first ERC-721 `Transfer` event in `logs`.
pub fn minted_token_id(logs: &[Log]) -> Option<U256> {
    logs.iter()
        .find_map(|log| log.log_decode::<IDidToken::Transfer>().ok())
        .map(|decoded| decoded.inner.data.tokenId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, LogData};
    use alloy::sol_types::SolEvent;

    fn transfer_log(token_id: u64) -> Log {
        let topics = vec![
            IDidToken::Transfer::SIGNATURE_HASH,
            B256::ZERO,
            Address::repeat_byte(0x22).into_word(),
            B256::from(U256::from(token_id)),
        ];
        Log {
            inner: alloy::primitives::Log {
                address: Address::repeat_byte(0x66),
                data: LogData::new_unchecked(topics, Default::default()),
            },
            ..Default::default()
        }
    }

    #[test]
    fn reads_token_id_from_transfer_log() {
        let logs = vec![transfer_log(49)];
        assert_eq!(minted_token_id(&logs), Some(U256::from(49u64)));
    }

    #[test]
    fn no_transfer_log_yields_none() {
        assert_eq!(minted_token_id(&[]), None);
        let unrelated = Log::default();
        assert_eq!(minted_token_id(&[unrelated]), None);
    }
}
