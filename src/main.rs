// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use ryt_did_onboarding::{
    api::router,
    config::{AppConfig, DEFAULT_LOG_FILTER},
    logging::init_logging,
    providers::Collaborators,
    reaper::SessionReaper,
    state::{AppState, IntegrationStatus},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Invalid configuration");
    init_logging(config.log_format, DEFAULT_LOG_FILTER);

    let integrations = IntegrationStatus::from_config(&config);
    if !integrations.recaptcha {
        warn!("RECAPTCHA_SECRET not set: captcha runs in demo mode");
    }
    if !integrations.pinata {
        warn!("PINATA_JWT not set: IPFS uploads return the demo CID");
    }
    if !integrations.openai {
        warn!("OPENAI_API_KEY not set: extraction will use the fallback identity");
    }
    if !integrations.minter {
        warn!("MINTER_PRIVATE_KEY not set: minting is unavailable");
    }

    let services = Collaborators::from_config(&config).expect("Failed to build collaborators");
    let state = AppState::new(services, config.collaborator_timeout, integrations);

    let shutdown = CancellationToken::new();
    let reaper = SessionReaper::new(state.sessions.clone(), config.session_ttl);
    let reaper_task = tokio::spawn(reaper.run(shutdown.clone()));

    let app = router(state);
    let addr = config.bind_address().expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(
        %addr,
        timeout_secs = config.collaborator_timeout.as_secs(),
        session_ttl_secs = config.session_ttl.as_secs(),
        "RYT DID onboarding server listening (docs at /docs)"
    );

    let server_shutdown = shutdown.clone();
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_signal().await;
            server_shutdown.cancel();
        })
        .await
    {
        error!(error = %e, "HTTP server failed");
    }

    shutdown.cancel();
    if let Err(e) = reaper_task.await {
        warn!(error = %e, "Session reaper task ended abnormally");
    }
    info!("Server stopped");
}

/// Wait for SIGINT or SIGTERM.
async fn wait_for_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
