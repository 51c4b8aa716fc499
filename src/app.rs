/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (request id / access log / timeout)
 * - axum::serve() で起動、SIGTERM/SIGINT で graceful shutdown
 */
use anyhow::Result;
use axum::Router;
use std::{net::SocketAddr, panic, process, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::cache::{CacheTarget, ValkeyConnector};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,jerry_fixture=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the container is launched.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting {:?} fixture in {:?} mode on {}",
        config.variant,
        config.app_env,
        config.addr
    );

    let addr = config.addr;
    let state = build_state(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn build_state(config: Config) -> Result<AppState> {
    let target = CacheTarget::new(config.redis_host.clone(), config.redis_port);
    tracing::info!(
        dependency = %target,
        max_attempts = config.probe_policy.max_attempts(),
        delay_ms = config.probe_policy.delay().as_millis() as u64,
        request_timeout_ms = config.request_timeout.as_millis() as u64,
        "dependency probe target"
    );

    // Does not dial: connections are opened per probe attempt.
    let cache = ValkeyConnector::new(target, config.probe_connect_timeout)?;

    Ok(AppState::new(Arc::new(config), Arc::new(cache)))
}

fn build_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout;
    let router = api::routes(state.config.variant).with_state(state);

    middleware::http::apply(router, timeout)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
