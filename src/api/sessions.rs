// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session lifecycle and raw navigation endpoints.
//!
//! Navigation never fails on a bad sequence: a rejected transition answers
//! 200 with `changed: false`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{
        CreateSessionResponse, MarkCompletedRequest, SessionResponse, SetScoreRequest,
        UpdateDataRequest,
    },
    onboarding::{keys, DidProfile, OnboardingSession},
    providers::wallet::wallet_challenge,
    state::AppState,
    store::SessionHandle,
};

pub(crate) async fn checkout(state: &AppState, id: Uuid) -> Result<SessionHandle, ApiError> {
    state.sessions.write().await.checkout(&id)
}

pub(crate) async fn respond(handle: &SessionHandle, changed: bool) -> Json<SessionResponse> {
    let session = handle.lock().await;
    Json(SessionResponse {
        changed,
        session: session.snapshot(),
    })
}

/// Apply a synchronous state machine operation and report the new state.
async fn apply(
    state: &AppState,
    id: Uuid,
    op: impl FnOnce(&mut OnboardingSession) -> bool,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(state, id).await?;
    let mut session = handle.lock().await;
    let changed = op(&mut *session);
    Ok(Json(SessionResponse {
        changed,
        session: session.snapshot(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/sessions",
    tag = "Sessions",
    responses((status = 201, body = CreateSessionResponse))
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let (session_id, handle) = state.sessions.write().await.create();
    info!(session_id = %session_id, "Onboarding session created");

    let session = handle.lock().await.snapshot();
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            wallet_challenge: wallet_challenge(session_id),
            session,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Sessions",
    responses((status = 200, body = SessionResponse), (status = 404))
)]
pub async fn get_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    Ok(respond(&handle, false).await)
}

#[utoipa::path(
    delete,
    path = "/v1/sessions/{session_id}",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Sessions",
    responses((status = 204), (status = 404))
)]
pub async fn delete_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.sessions.write().await.remove(&session_id)?;
    info!(session_id = %session_id, "Onboarding session discarded");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/next",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Navigation",
    responses((status = 200, body = SessionResponse), (status = 404))
)]
pub async fn next_step(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply(&state, session_id, OnboardingSession::advance).await
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/back",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Navigation",
    responses((status = 200, body = SessionResponse), (status = 404))
)]
pub async fn previous_step(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply(&state, session_id, OnboardingSession::retreat).await
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/complete",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    request_body = MarkCompletedRequest,
    tag = "Navigation",
    responses((status = 200, body = SessionResponse), (status = 404))
)]
pub async fn mark_completed(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<MarkCompletedRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply(&state, session_id, |session| {
        session.mark_step_completed(request.completed)
    })
    .await
}

#[utoipa::path(
    patch,
    path = "/v1/sessions/{session_id}/data",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    request_body = UpdateDataRequest,
    tag = "Navigation",
    responses(
        (status = 200, body = SessionResponse),
        (status = 400, description = "Patch touches a key owned by a wizard step"),
        (status = 404)
    )
)]
pub async fn update_data(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdateDataRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if let Some(key) = request
        .data
        .keys()
        .find(|key| keys::WORKFLOW_OWNED.contains(&key.as_str()))
    {
        return Err(ApiError::bad_request(format!(
            "{key} is set by its wizard step and cannot be written directly"
        )));
    }
    apply(&state, session_id, |session| session.update_data(request.data)).await
}

#[utoipa::path(
    put,
    path = "/v1/sessions/{session_id}/score",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    request_body = SetScoreRequest,
    tag = "Navigation",
    responses((status = 200, body = SessionResponse), (status = 404))
)]
pub async fn set_score(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<SetScoreRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply(&state, session_id, |session| {
        session.set_verification_score(request.score)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/v1/sessions/{session_id}/skip",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Navigation",
    responses((status = 200, body = SessionResponse), (status = 404))
)]
pub async fn skip_identity(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply(&state, session_id, OnboardingSession::skip_identity_verification).await
}

#[utoipa::path(
    get,
    path = "/v1/sessions/{session_id}/profile",
    params(("session_id" = Uuid, Path, description = "Onboarding session id")),
    tag = "Sessions",
    responses((status = 200, body = DidProfile), (status = 404))
)]
pub async fn get_profile(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<DidProfile>, ApiError> {
    let handle = checkout(&state, session_id).await?;
    let profile = handle.lock().await.profile();
    Ok(Json(profile))
}
