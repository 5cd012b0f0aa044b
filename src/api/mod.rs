// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        CaptchaRequest, ConnectWalletRequest, CreateSessionResponse, LivenessCaptureRequest,
        MarkCompletedRequest, SessionResponse, SetScoreRequest, UpdateDataRequest,
        UploadDocumentRequest,
    },
    onboarding::{CreationStep, DidProfile, OnboardingSession, SessionSnapshot},
    providers::{DocumentMetadata, IdentityFields},
    state::{AppState, IntegrationStatus},
};

pub mod health;
pub mod sessions;
pub mod steps;

/// Request body cap; ID images arrive base64-encoded in JSON.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{session_id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/{session_id}/next", post(sessions::next_step))
        .route("/sessions/{session_id}/back", post(sessions::previous_step))
        .route("/sessions/{session_id}/complete", post(sessions::mark_completed))
        .route("/sessions/{session_id}/data", patch(sessions::update_data))
        .route("/sessions/{session_id}/score", put(sessions::set_score))
        .route("/sessions/{session_id}/skip", post(sessions::skip_identity))
        .route("/sessions/{session_id}/profile", get(sessions::get_profile))
        .route("/sessions/{session_id}/wallet", post(steps::connect_wallet))
        .route("/sessions/{session_id}/captcha", post(steps::verify_captcha))
        .route(
            "/sessions/{session_id}/document",
            post(steps::upload_document).delete(steps::change_document),
        )
        .route(
            "/sessions/{session_id}/liveness",
            post(steps::capture_liveness).delete(steps::retake_liveness),
        )
        .route("/sessions/{session_id}/extraction", post(steps::extract_identity))
        .route("/sessions/{session_id}/verification", post(steps::verify_identity))
        .route("/sessions/{session_id}/mint", post(steps::mint))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        sessions::create_session,
        sessions::get_session,
        sessions::delete_session,
        sessions::next_step,
        sessions::previous_step,
        sessions::mark_completed,
        sessions::update_data,
        sessions::set_score,
        sessions::skip_identity,
        sessions::get_profile,
        steps::connect_wallet,
        steps::verify_captcha,
        steps::upload_document,
        steps::change_document,
        steps::capture_liveness,
        steps::retake_liveness,
        steps::extract_identity,
        steps::verify_identity,
        steps::mint,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CreationStep,
            OnboardingSession,
            SessionSnapshot,
            DidProfile,
            IdentityFields,
            DocumentMetadata,
            IntegrationStatus,
            CreateSessionResponse,
            SessionResponse,
            MarkCompletedRequest,
            UpdateDataRequest,
            SetScoreRequest,
            ConnectWalletRequest,
            CaptchaRequest,
            UploadDocumentRequest,
            LivenessCaptureRequest,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Sessions", description = "Onboarding session lifecycle and profile"),
        (name = "Navigation", description = "Raw wizard state machine operations"),
        (name = "Steps", description = "Wizard steps backed by external services"),
        (name = "Health", description = "Health probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::default());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn create_and_fetch_session_over_http() {
        let app = router(AppState::default());

        let response = app
            .clone()
            .oneshot(Request::post("/v1/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let id = created["session_id"].as_str().unwrap().to_string();
        assert_eq!(created["session"]["current_step"], "recaptcha");

        let response = app
            .oneshot(
                Request::post(format!("/v1/sessions/{id}/next"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let moved: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(moved["changed"], false);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let app = router(AppState::default());
        let response = app
            .oneshot(
                Request::get(format!("/v1/sessions/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn openapi_lists_session_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/sessions/{session_id}/mint"));
        assert!(doc.paths.paths.contains_key("/health/ready"));
    }
}
