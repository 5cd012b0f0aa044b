// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DID onboarding wizard.
//!
//! - `step` - ordered wizard steps and the verification score table
//! - `session` - the per-session state machine
//! - `view` - snapshot and profile projections
//! - `workflow` - steps backed by external collaborators
//! - `demo` - canned identities for the skipped and fallback paths
//! - `keys` - well-known collected-data keys

pub mod demo;
pub mod keys;
pub mod session;
pub mod step;
pub mod view;
pub mod workflow;

pub use session::{CollectedData, OnboardingSession};
pub use step::{score_for, CreationStep};
pub use view::{DidProfile, SessionSnapshot};
pub use workflow::{OnboardingWorkflow, WorkflowError};
