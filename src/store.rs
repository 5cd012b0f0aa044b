// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory registry of onboarding sessions.
//!
//! Each session sits behind its own mutex so mutations of one session are
//! serialized without blocking the others. Nothing survives a restart.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ApiError;
use crate::onboarding::OnboardingSession;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<OnboardingSession>>;

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Entry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh session.
    pub fn create(&mut self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(OnboardingSession::new()));
        self.sessions.insert(
            id,
            Entry {
                handle: handle.clone(),
                last_seen: Instant::now(),
            },
        );
        (id, handle)
    }

    /// Look up a session and mark it as recently used.
    pub fn checkout(&mut self, id: &Uuid) -> Result<SessionHandle, ApiError> {
        let entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found("Session not found"))?;
        entry.last_seen = Instant::now();
        Ok(entry.handle.clone())
    }

    pub fn remove(&mut self, id: &Uuid) -> Result<(), ApiError> {
        if self.sessions.remove(id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found("Session not found"))
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for at least `ttl`. Returns how many were removed.
    pub fn reap_idle(&mut self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < ttl);
        before - self.sessions.len()
    }
}
