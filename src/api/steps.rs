// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wizard steps backed by external collaborators.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::sessions::{checkout, respond};
use crate::{
    error::ApiError,
    models::{
        CaptchaRequest, ConnectWalletRequest, LivenessCaptureRequest, SessionResponse,
        UploadDocumentRequest,
    },
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/wallet",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    request_body = ConnectWalletRequest,
    tag = "Steps",
    responses(
        (status = 200, body = SessionResponse),
        (status = 401, description = "Signature does not prove wallet ownership"),
        (status = 404)
    )
)]
pub async fn connect_wallet(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ConnectWalletRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let changed = state
        .workflow
        .connect_wallet(session_id, &handle, &request.address, &request.signature)
        .await?;
    Ok(respond(&handle, changed).await)
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/captcha",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    request_body = CaptchaRequest,
    tag = "Steps",
    responses(
        (status = 200, body = SessionResponse),
        (status = 409, description = "Session is not at the security check"),
        (status = 422, description = "Captcha token rejected")
    )
)]
pub async fn verify_captcha(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CaptchaRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let changed = state.workflow.verify_captcha(&handle, &request.token).await?;
    Ok(respond(&handle, changed).await)
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/document",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    request_body = UploadDocumentRequest,
    tag = "Steps",
    responses(
        (status = 200, body = SessionResponse),
        (status = 400, description = "Not a JPEG/PNG or not valid base64"),
        (status = 502, description = "IPFS pinning failed")
    )
)]
pub async fn upload_document(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let upload = request.into_upload()?;
    let handle = checkout(&state, session_id).await?;
    let changed = state.workflow.upload_document(&handle, upload).await?;
    Ok(respond(&handle, changed).await)
}

#[utoipa::path(
    delete,
    path = "/v1/sessions/{session_id}/document",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Steps",
    responses((status = 200, body = SessionResponse), (status = 409))
)]
pub async fn change_document(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let changed = state.workflow.change_document(&handle).await?;
    Ok(respond(&handle, changed).await)
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/liveness",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    request_body = LivenessCaptureRequest,
    tag = "Steps",
    responses(
        (status = 200, body = SessionResponse),
        (status = 422, description = "Capture did not pass the liveness check")
    )
)]
pub async fn capture_liveness(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<LivenessCaptureRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let changed = state.workflow.capture_liveness(&handle, &request.image).await?;
    Ok(respond(&handle, changed).await)
}

#[utoipa::path(
    delete,
    path = "/v1/sessions/{session_id}/liveness",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Steps",
    responses((status = 200, body = SessionResponse), (status = 409))
)]
pub async fn retake_liveness(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let changed = state.workflow.retake_liveness(&handle).await?;
    Ok(respond(&handle, changed).await)
}

/// Extraction failures still answer 200: the session then carries the
/// fallback identity with `extractionFallback` set.
#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/extraction",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Steps",
    responses((status = 200, body = SessionResponse), (status = 409))
)]
pub async fn extract_identity(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let changed = state.workflow.extract_identity(&handle).await?;
    Ok(respond(&handle, changed).await)
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/verification",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Steps",
    responses(
        (status = 200, body = SessionResponse),
        (status = 400, description = "Nothing has been extracted yet"),
        (status = 409)
    )
)]
pub async fn verify_identity(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let changed = state.workflow.verify_identity(&handle).await?;
    Ok(respond(&handle, changed).await)
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/mint",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Steps",
    responses(
        (status = 200, body = SessionResponse),
        (status = 401, description = "No wallet connected"),
        (status = 502, description = "Metadata pinning or minting failed"),
        (status = 504, description = "Minting timed out")
    )
)]
pub async fn mint(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let changed = state.workflow.mint(&handle).await?;
    Ok(respond(&handle, changed).await)
}
