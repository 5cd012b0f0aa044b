// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RYT DID Onboarding - Decentralized Identifier Creation Service
//!
//! Hosts the DID creation wizard as server-side sessions. Each session walks
//! through wallet connection, a security check, ID upload, liveness, identity
//! extraction and verification, and finally mints a DID token.
//!
//! ## Modules
//!
//! - `onboarding` - Session state machine and step workflow
//! - `providers` - External collaborators (reCAPTCHA, Pinata, OpenAI, wallet)
//! - `blockchain` - DID token minting on an EVM chain
//! - `api` - HTTP API handlers (Axum)
//! - `store` / `reaper` - In-memory session registry and idle cleanup

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod onboarding;
pub mod providers;
pub mod reaper;
pub mod state;
pub mod store;
