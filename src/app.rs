/*
 * Responsibility
 * - Config読み込み → 依存生成 (PgPool, AuthGateway) → Router 組み立て
 * - Middleware の適用 (CORS / security headers / HTTP)
 * - axum::serve() で起動し、シグナルで graceful shutdown → pool を閉じる
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{Json, Router, routing::get};
use serde_json::json;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppEnv, Config};
use crate::repos::user_repo::PgUserDirectory;
use crate::services::auth::build_auth_gateway;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,carpool_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost".
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
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
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = connect_db(&config).await?;

    let directory = Arc::new(PgUserDirectory::new(db.clone()));
    let gateway = build_auth_gateway(&config.auth, directory)?;

    let state = AppState::new(db.clone(), gateway);
    let app = build_router(state, config.app_env, &config.cors_allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped, closing database pool");
    db.close().await;
    Ok(())
}

/// Pool settings shared by startup and by anything that needs a pool shaped
/// like the production one.
pub fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .max_lifetime(Duration::from_secs(5 * 60))
}

async fn connect_db(config: &Config) -> Result<PgPool> {
    let db = pool_options(config)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    if config.db_run_migrations {
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("failed to run migrations")?;
        tracing::info!("database migrations applied");
    }

    Ok(db)
}

pub fn build_router(state: AppState, app_env: AppEnv, cors_allowed_origins: &[String]) -> Router {
    async fn welcome() -> Json<serde_json::Value> {
        Json(json!({"message": "Welcome to Car Backend API!"}))
    }

    let router = Router::new()
        .route("/", get(welcome))
        .nest("/api/v1", api::v1::routes(state.auth.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, app_env, cors_allowed_origins);
    middleware::http::apply(router)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
