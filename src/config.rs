// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `COLLABORATOR_TIMEOUT_SECS` | Timeout for each external call | `30` |
//! | `SESSION_TTL_SECS` | Idle lifetime of an onboarding session | `3600` |
//! | `RECAPTCHA_SECRET` | reCAPTCHA server secret | Demo mode |
//! | `PINATA_JWT` | Pinata API bearer token | Demo mode |
//! | `PINATA_GATEWAY` | IPFS gateway prefix | `https://gateway.pinata.cloud/ipfs/` |
//! | `OPENAI_API_KEY` | OpenAI API key for ID extraction | Extraction falls back |
//! | `OPENAI_MODEL` | Vision model | `gpt-4o` |
//! | `DID_RPC_URL` | EVM JSON-RPC endpoint | Avalanche Fuji |
//! | `DID_CONTRACT_ADDRESS` | DID token contract | Fuji deployment |
//! | `MINTER_PRIVATE_KEY` | Hex key of the minting account | Minting unavailable |

use std::{net::SocketAddr, time::Duration};

use crate::blockchain::{AVAX_FUJI, DEFAULT_DID_CONTRACT};
use crate::logging::LogFormat;

pub const HOST_ENV: &str = "HOST";
pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable selecting the log output format.
///
/// Accepted values: `json` for log aggregation, `pretty` for development.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Upper bound on any single collaborator call, in seconds.
///
/// The HTTP clients carry their own shorter request timeout; this one also
/// covers waiting for a mint transaction to confirm.
pub const COLLABORATOR_TIMEOUT_ENV: &str = "COLLABORATOR_TIMEOUT_SECS";
pub const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 30;

/// Sessions untouched for this many seconds are discarded by the reaper.
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

pub const RECAPTCHA_SECRET_ENV: &str = "RECAPTCHA_SECRET";

pub const PINATA_JWT_ENV: &str = "PINATA_JWT";
pub const PINATA_GATEWAY_ENV: &str = "PINATA_GATEWAY";
pub const DEFAULT_PINATA_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

pub const DID_RPC_URL_ENV: &str = "DID_RPC_URL";
pub const DID_CONTRACT_ADDRESS_ENV: &str = "DID_CONTRACT_ADDRESS";

/// Hex private key of the account paying for DID mints.
///
/// # Security
/// Never log this value. Without it the service still runs, but minting
/// reports a configuration error.
pub const MINTER_PRIVATE_KEY_ENV: &str = "MINTER_PRIVATE_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings read from the environment at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub collaborator_timeout: Duration,
    pub session_ttl: Duration,
    pub recaptcha_secret: Option<String>,
    pub pinata_jwt: Option<String>,
    pub pinata_gateway: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub did_rpc_url: String,
    pub did_contract_address: String,
    pub minter_private_key: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_format", &self.log_format)
            .field("collaborator_timeout", &self.collaborator_timeout)
            .field("session_ttl", &self.session_ttl)
            .field("recaptcha_secret", &self.recaptcha_secret.as_ref().map(|_| "<redacted>"))
            .field("pinata_jwt", &self.pinata_jwt.as_ref().map(|_| "<redacted>"))
            .field("pinata_gateway", &self.pinata_gateway)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_model", &self.openai_model)
            .field("did_rpc_url", &self.did_rpc_url)
            .field("did_contract_address", &self.did_contract_address)
            .field(
                "minter_private_key",
                &self.minter_private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::Pretty,
            collaborator_timeout: Duration::from_secs(DEFAULT_COLLABORATOR_TIMEOUT_SECS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            recaptcha_secret: None,
            pinata_jwt: None,
            pinata_gateway: DEFAULT_PINATA_GATEWAY.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            did_rpc_url: AVAX_FUJI.rpc_url.to_string(),
            did_contract_address: DEFAULT_DID_CONTRACT.to_string(),
            minter_private_key: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default(HOST_ENV, DEFAULT_HOST),
            port: env_parse(PORT_ENV, DEFAULT_PORT)?,
            log_format: LogFormat::parse(&env_or_default(LOG_FORMAT_ENV, "pretty")),
            collaborator_timeout: Duration::from_secs(env_parse(
                COLLABORATOR_TIMEOUT_ENV,
                DEFAULT_COLLABORATOR_TIMEOUT_SECS,
            )?),
            session_ttl: Duration::from_secs(env_parse(SESSION_TTL_ENV, DEFAULT_SESSION_TTL_SECS)?),
            recaptcha_secret: env_optional(RECAPTCHA_SECRET_ENV),
            pinata_jwt: env_optional(PINATA_JWT_ENV),
            pinata_gateway: env_or_default(PINATA_GATEWAY_ENV, DEFAULT_PINATA_GATEWAY),
            openai_api_key: env_optional(OPENAI_API_KEY_ENV),
            openai_model: env_or_default(OPENAI_MODEL_ENV, DEFAULT_OPENAI_MODEL),
            did_rpc_url: env_or_default(DID_RPC_URL_ENV, AVAX_FUJI.rpc_url),
            did_contract_address: env_or_default(DID_CONTRACT_ADDRESS_ENV, DEFAULT_DID_CONTRACT),
            minter_private_key: env_optional(MINTER_PRIVATE_KEY_ENV),
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })
    }
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env_optional(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}
