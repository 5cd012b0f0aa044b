// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM integration for minting DID tokens.
//!
//! This module provides functionality for:
//! - Loading the minting account from a hex private key
//! - Calling the DID token contract's `mint(string)` function
//! - Reading the minted token id from the confirmation receipt

pub mod client;
pub mod contract;
pub mod types;

pub use client::{DidChainError, DidTokenMinter, DisabledMinter};
pub use types::*;
