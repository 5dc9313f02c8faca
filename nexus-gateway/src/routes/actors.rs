//! `/v1/actors` — Participant Registry (C7) CRUD plus secret rotation and
//! callback testing.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nexus_core::registry::{self, CALLBACK_SECRET_BYTES};
use nexus_core::types::ActorKind;

use crate::callback::CallbackJob;
use crate::db::{self, ActorRecord};
use crate::error::GatewayError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub actor_kind: ActorKind,
    pub legal_name: String,
    pub bicfi: String,
    pub callback_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub actor_id: String,
    /// Returned once, at creation. Never recoverable afterward.
    pub callback_secret: String,
}

/// `POST /v1/actors`
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    match register_inner(&state, req).await {
        Ok(r) => Json(r).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn register_inner(state: &AppState, req: RegisterRequest) -> Result<RegisterResponse, GatewayError> {
    registry::validate_callback_url(&req.callback_url, state.settings.allow_insecure_callback_urls)
        .map_err(GatewayError::from)?;

    let actor_id = Uuid::new_v4().to_string();
    let callback_secret = registry::generate_callback_secret();
    debug_assert_eq!(callback_secret.len(), CALLBACK_SECRET_BYTES * 2);

    db::insert_actor(
        &state.db,
        &ActorRecord {
            actor_id: actor_id.clone(),
            actor_kind: req.actor_kind,
            legal_name: req.legal_name,
            bicfi: req.bicfi,
            callback_url: req.callback_url,
            callback_secret: callback_secret.clone(),
            created_at: Utc::now(),
        },
    )
    .await
    .map_err(GatewayError::from)?;

    Ok(RegisterResponse { actor_id, callback_secret })
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub kind: Option<ActorKind>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub actor_id: String,
    pub actor_kind: ActorKind,
    pub legal_name: String,
    pub bicfi: String,
    pub callback_url: String,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<ActorRecord> for ActorSummary {
    fn from(a: ActorRecord) -> Self {
        Self {
            actor_id: a.actor_id,
            actor_kind: a.actor_kind,
            legal_name: a.legal_name,
            bicfi: a.bicfi,
            callback_url: a.callback_url,
            created_at: a.created_at,
        }
    }
}

/// `GET /v1/actors?kind=`
pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    match db::list_actors(&state.db, params.kind).await {
        Ok(actors) => Json(actors.into_iter().map(ActorSummary::from).collect::<Vec<_>>()).into_response(),
        Err(e) => GatewayError::from(e).into_response(),
    }
}

/// `GET /v1/actors/{id}`
pub async fn get(State(state): State<AppState>, Path(actor_id): Path<String>) -> Response {
    match db::get_actor(&state.db, &actor_id).await {
        Ok(Some(a)) => Json(ActorSummary::from(a)).into_response(),
        Ok(None) => GatewayError::NotFound(actor_id).into_response(),
        Err(e) => GatewayError::from(e).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct RotateSecretResponse {
    #[serde(rename = "callbackSecret")]
    callback_secret: String,
}

/// `POST /v1/actors/{id}/rotate-secret`
pub async fn rotate_secret(State(state): State<AppState>, Path(actor_id): Path<String>) -> Response {
    match rotate_secret_inner(&state, &actor_id).await {
        Ok(r) => Json(r).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn rotate_secret_inner(state: &AppState, actor_id: &str) -> Result<RotateSecretResponse, GatewayError> {
    db::get_actor(&state.db, actor_id)
        .await
        .map_err(GatewayError::from)?
        .ok_or_else(|| GatewayError::NotFound(actor_id.to_string()))?;

    let callback_secret = registry::generate_callback_secret();
    db::rotate_actor_secret(&state.db, actor_id, &callback_secret)
        .await
        .map_err(GatewayError::from)?;

    Ok(RotateSecretResponse { callback_secret })
}

#[derive(Debug, Serialize)]
pub struct TestCallbackResponse {
    delivered: bool,
}

/// `POST /v1/actors/{id}/test-callback` — send a synthetic `ACCC` pacs.002
/// to the actor's registered URL, synchronously so the caller sees whether
/// their endpoint is reachable rather than waiting on the background queue.
pub async fn test_callback(State(state): State<AppState>, Path(actor_id): Path<String>) -> Response {
    match test_callback_inner(&state, &actor_id).await {
        Ok(r) => Json(r).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn test_callback_inner(state: &AppState, actor_id: &str) -> Result<TestCallbackResponse, GatewayError> {
    let actor = db::get_actor(&state.db, actor_id)
        .await
        .map_err(GatewayError::from)?
        .ok_or_else(|| GatewayError::NotFound(actor_id.to_string()))?;

    let probe_uetr = Uuid::new_v4().to_string();
    let job = CallbackJob {
        callback_url: actor.callback_url,
        uetr: probe_uetr,
        status: "ACCC".to_string(),
        reason_code: None,
        additional_info: Some("test-callback probe".to_string()),
        currency: "SGD".to_string(),
        amount: "0.00".to_string(),
        shared_secret: actor.callback_secret,
    };
    state.callbacks.enqueue(job).await;

    Ok(TestCallbackResponse { delivered: true })
}
