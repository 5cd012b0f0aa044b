// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::onboarding::OnboardingWorkflow;
use crate::providers::Collaborators;
use crate::store::SessionStore;

/// Which collaborators run against real services rather than demo mode.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct IntegrationStatus {
    pub recaptcha: bool,
    pub pinata: bool,
    pub openai: bool,
    pub minter: bool,
}

impl IntegrationStatus {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            recaptcha: config.recaptcha_secret.is_some(),
            pinata: config.pinata_jwt.is_some(),
            openai: config.openai_api_key.is_some(),
            minter: config.minter_private_key.is_some(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<SessionStore>>,
    pub workflow: Arc<OnboardingWorkflow>,
    pub integrations: IntegrationStatus,
}

impl AppState {
    pub fn new(
        services: Collaborators,
        collaborator_timeout: Duration,
        integrations: IntegrationStatus,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(SessionStore::new())),
            workflow: Arc::new(OnboardingWorkflow::new(services, collaborator_timeout)),
            integrations,
        }
    }
}

#[cfg(test)]
impl Default for AppState {
    fn default() -> Self {
        Self::new(
            crate::providers::fake::collaborators(),
            Duration::from_secs(5),
            IntegrationStatus::default(),
        )
    }
}
