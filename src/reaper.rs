// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Idle Session Reaper
//!
//! Onboarding sessions live only in memory. A user who abandons the wizard
//! leaves a session behind, so every `sweep_interval` the reaper drops the
//! sessions nobody has touched for longer than the configured TTL.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`, cancelled by `main` on
//! SIGINT/SIGTERM.

use std::{sync::Arc, time::Duration};

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::store::SessionStore;

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct SessionReaper {
    sessions: Arc<RwLock<SessionStore>>,
    ttl: Duration,
    sweep_interval: Duration,
}

impl SessionReaper {
    pub fn new(sessions: Arc<RwLock<SessionStore>>, ttl: Duration) -> Self {
        Self {
            sessions,
            ttl,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Run until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            ttl_secs = self.ttl.as_secs(),
            interval_secs = self.sweep_interval.as_secs(),
            "Session reaper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.sweep_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Session reaper shutting down");
                    return;
                }
            }

            let (reaped, remaining) = {
                let mut store = self.sessions.write().await;
                let reaped = store.reap_idle(self.ttl);
                (reaped, store.len())
            };
            if reaped > 0 {
                info!(reaped, remaining, "Discarded idle onboarding sessions");
            } else {
                debug!(remaining, "No idle onboarding sessions");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reaps_idle_sessions_until_cancelled() {
        let sessions = Arc::new(RwLock::new(SessionStore::new()));
        sessions.write().await.create();

        let shutdown = CancellationToken::new();
        let reaper = SessionReaper::new(sessions.clone(), Duration::ZERO)
            .with_sweep_interval(Duration::from_millis(10));
        let task = tokio::spawn(reaper.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(sessions.read().await.is_empty());

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn keeps_fresh_sessions() {
        let sessions = Arc::new(RwLock::new(SessionStore::new()));
        sessions.write().await.create();

        let shutdown = CancellationToken::new();
        let reaper = SessionReaper::new(sessions.clone(), Duration::from_secs(3600))
            .with_sweep_interval(Duration::from_millis(10));
        let task = tokio::spawn(reaper.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        task.await.unwrap();
        assert_eq!(sessions.read().await.len(), 1);
    }
}
