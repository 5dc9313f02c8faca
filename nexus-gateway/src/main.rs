//! Nexus cross-border instant-payments gateway.
//!
//! Wires C1–C9 into an axum HTTP service: loads settings and XSD schemas at
//! startup (both fatal on failure), connects to Postgres and runs
//! migrations, spawns the callback worker pool, and installs the ingress
//! guard ahead of every route.

mod callback;
mod config;
mod db;
mod error;
mod iso20022;
mod metrics;
mod rate_limit;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use nexus_core::quote::QuoteEngine;
use nexus_core::schema::SchemaRegistry;

use config::Settings;
use metrics::METRICS;
use rate_limit::RateLimiter;
use state::{default_fxp_policy, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::load()?;
    tracing::info!(bind_addr = %settings.bind_addr, "starting nexus-gateway");

    let schemas = SchemaRegistry::load(&settings.xsd_dir)
        .map_err(|e| anyhow::anyhow!("fatal: failed to load XSD schemas from {:?}: {e}", settings.xsd_dir))?;

    let db = db::connect(&settings.database_url).await?;

    let http_client = reqwest::Client::builder()
        .build()
        .expect("reqwest client builder never fails with default config");
    let callbacks = callback::CallbackDispatcher::spawn(settings.callback_worker_pool_size, http_client);

    let rate_limiter = Arc::new(RateLimiter::new(
        settings.rate_limit_enabled,
        settings.rate_limit_requests_per_minute,
        settings.rate_limit_burst,
    ));

    let state = AppState {
        db,
        schemas: Arc::new(schemas),
        quotes: Arc::new(QuoteEngine::new(default_fxp_policy())),
        callbacks,
        settings: Arc::new(settings.clone()),
    };

    let app = build_router(state, rate_limiter);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(bind_addr = %settings.bind_addr, "nexus-gateway listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

fn build_router(state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    let iso20022_routes = Router::new()
        .route("/pacs008", post(iso20022::pacs008::submit))
        .route("/pacs002", post(iso20022::pacs002::submit))
        .route("/acmt023", post(iso20022::acmt::submit_request))
        .route("/acmt024", post(iso20022::acmt::submit_response))
        .route("/pain001", post(iso20022::accept_and_log::pain001))
        .route("/pain002", post(iso20022::accept_and_log::pain002))
        .route("/camt103", post(iso20022::accept_and_log::camt103))
        .route("/camt053", post(iso20022::accept_and_log::camt053))
        .route("/pacs004", post(iso20022::accept_and_log::pacs004))
        .route("/pacs028", post(iso20022::accept_and_log::pacs028))
        .route("/camt056", post(iso20022::accept_and_log::camt056))
        .route("/camt029", post(iso20022::accept_and_log::camt029))
        .route("/validate", post(iso20022::validate::validate));

    let quote_routes = Router::new()
        .route("/quotes", post(routes::quotes::create))
        .route("/quotes/:id", get(routes::quotes::get))
        .route("/quotes/:id/intermediary-agents", get(routes::quotes::intermediary_agents))
        .route("/pre-transaction-disclosure", get(routes::quotes::disclosure));

    let actor_routes = Router::new()
        .route("/actors", post(routes::actors::register).get(routes::actors::list))
        .route("/actors/:id", get(routes::actors::get))
        .route("/actors/:id/rotate-secret", post(routes::actors::rotate_secret))
        .route("/actors/:id/test-callback", post(routes::actors::test_callback));

    let payment_routes = Router::new()
        .route("/payments/:uetr", get(routes::payments::get))
        .route("/payments/:uetr/events", get(routes::payments::events))
        .route("/payments/:uetr/messages", get(routes::payments::messages))
        .route("/payments/:uetr/status", get(routes::payments::status));

    let v1 = Router::new()
        .nest("/iso20022", iso20022_routes)
        .merge(quote_routes)
        .merge(actor_routes)
        .merge(payment_routes);

    Router::new()
        .nest("/v1", v1)
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_http_metrics))
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit::enforce))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn track_http_metrics(req: axum::extract::Request, next: axum::middleware::Next) -> Response {
    METRICS.http_requests_in_flight.inc();
    let timer = METRICS.http_request_duration_seconds.start_timer();
    let started = Instant::now();
    let response = next.run(req).await;
    timer.observe_duration();
    METRICS.http_requests_in_flight.dec();
    METRICS.http_requests_total.inc();
    let _ = started;
    response
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    #[serde(rename = "dbConnected")]
    db_connected: bool,
}

async fn health(State(state): State<AppState>) -> Response {
    let db_connected = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let status = if db_connected { "ok" } else { "degraded" };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            service: "nexus-gateway",
            db_connected,
        }),
    )
        .into_response()
}

async fn metrics_handler() -> Response {
    match METRICS.export() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
