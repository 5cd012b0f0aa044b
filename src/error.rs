// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::onboarding::WorkflowError;
use crate::providers::CollaboratorError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<CollaboratorError> for ApiError {
    fn from(err: CollaboratorError) -> Self {
        let message = err.to_string();
        match err {
            CollaboratorError::NotConnected(_) => Self::unauthorized(message),
            CollaboratorError::CaptchaFailed(_) => Self::unprocessable(message),
            CollaboratorError::UploadError(_)
            | CollaboratorError::ExtractionError(_)
            | CollaboratorError::MintError(_) => {
                warn!(error = %message, "Collaborator call failed");
                Self::bad_gateway(message)
            }
            CollaboratorError::Timeout(..) => Self::gateway_timeout(message),
            CollaboratorError::MintUnconfirmed(_) => {
                warn!(error = %message, "Mint outcome unknown");
                Self::gateway_timeout(message)
            }
            CollaboratorError::Misconfigured(_) => {
                warn!(error = %message, "Collaborator misconfigured");
                Self::internal(message)
            }
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Collaborator(inner) => inner.into(),
            WorkflowError::WrongStep { .. }
            | WorkflowError::MintInProgress
            | WorkflowError::DocumentChanged => {
                Self::conflict(err.to_string())
            }
            WorkflowError::InvalidInput(_) => Self::bad_request(err.to_string()),
            WorkflowError::LivenessRejected => Self::unprocessable(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
