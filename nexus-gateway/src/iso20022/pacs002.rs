//! `pacs.002` — inbound payment status report submission.
//!
//! Accept-and-log: a sending participant may submit a status report
//! directly (outside the usual callback-delivered path); the gateway
//! validates and records it but does not itself drive any state transition
//! from this direction.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use nexus_core::types::MessageType;

use crate::db::{self, EventInsert};
use crate::error::GatewayError;
use crate::metrics::METRICS;
use crate::state::AppState;

use super::{uetr_or_placeholder, validate_or_log};

#[derive(Debug, Serialize)]
pub struct Accepted {
    uetr: String,
}

/// `POST /v1/iso20022/pacs002`
pub async fn submit(State(state): State<AppState>, body: String) -> Response {
    match handle(&state, &body).await {
        Ok(accepted) => Json(accepted).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle(state: &AppState, xml: &str) -> Result<Accepted, GatewayError> {
    if xml.trim().is_empty() {
        return Err(GatewayError::BadXml("empty request body".into()));
    }
    validate_or_log(&state.db, &state.schemas, xml, MessageType::Pacs002).await?;
    METRICS.track_iso_message("pacs.002");

    let uetr = uetr_or_placeholder(&state.schemas, xml);
    let event = EventInsert {
        uetr: Some(&uetr),
        event_type: "PACS002_RECEIVED",
        actor: "PARTICIPANT",
        pacs002_xml: Some(xml),
        ..Default::default()
    };
    db::insert_payment_event(&state.db, &event)
        .await
        .map_err(GatewayError::from)?;

    Ok(Accepted { uetr })
}
