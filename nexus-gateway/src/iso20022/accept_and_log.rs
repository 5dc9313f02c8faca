//! Accept-and-log handlers (§4.5 Release 1 note): `pain.001`, `camt.103`,
//! `pacs.004`, `pacs.028`, `camt.056`, `camt.029` are validated and recorded
//! but never themselves advance payment state — only a matching new
//! `pacs.008` (returns) or the manual recall desk (not an HTTP endpoint)
//! does that. `pain.002` and `camt.053` are gateway-only emission endpoints
//! outside the eleven-member schema registry; they are accepted and logged
//! under the generic event `data` payload rather than a dedicated raw-XML
//! column, since no Nexus message family defines one for them.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use nexus_core::types::MessageType;

use crate::db::{self, EventInsert};
use crate::error::GatewayError;
use crate::metrics::METRICS;
use crate::state::AppState;

use super::{set_message_slot, uetr_or_placeholder, validate_or_log};

#[derive(Debug, Serialize)]
pub struct Accepted {
    uetr: String,
    #[serde(rename = "eventType")]
    event_type: &'static str,
}

async fn accept_and_log(
    state: &AppState,
    xml: &str,
    message_type: MessageType,
    event_type: &'static str,
) -> Result<Accepted, GatewayError> {
    if xml.trim().is_empty() {
        return Err(GatewayError::BadXml("empty request body".into()));
    }
    validate_or_log(&state.db, &state.schemas, xml, message_type).await?;
    METRICS.track_iso_message(message_type.short_name());

    let uetr = uetr_or_placeholder(&state.schemas, xml);
    let mut event = EventInsert {
        uetr: Some(&uetr),
        event_type,
        actor: "PARTICIPANT",
        ..Default::default()
    };
    set_message_slot(&mut event, message_type, xml);
    db::insert_payment_event(&state.db, &event)
        .await
        .map_err(GatewayError::from)?;

    Ok(Accepted { uetr, event_type })
}

macro_rules! accept_and_log_route {
    ($fn_name:ident, $message_type:expr, $event_type:literal) => {
        /// Accept-and-log handler; see module docs for why this never
        /// advances payment state.
        pub async fn $fn_name(State(state): State<AppState>, body: String) -> Response {
            match accept_and_log(&state, &body, $message_type, $event_type).await {
                Ok(accepted) => Json(accepted).into_response(),
                Err(e) => e.into_response(),
            }
        }
    };
}

accept_and_log_route!(pain001, MessageType::Pain001, "PAIN001_RECEIVED");
accept_and_log_route!(camt103, MessageType::Camt103, "CAMT103_RECEIVED");
accept_and_log_route!(pacs004, MessageType::Pacs004, "PACS004_RECEIVED");
accept_and_log_route!(pacs028, MessageType::Pacs028, "PACS028_RECEIVED");
accept_and_log_route!(camt056, MessageType::Camt056, "CAMT056_RECEIVED");
accept_and_log_route!(camt029, MessageType::Camt029, "CAMT029_RECEIVED");

/// `pain.002` and `camt.053` are supplemented beyond the base schema
/// registry: no XSD is loaded for either, so they skip C1 and are recorded
/// verbatim in the event's `data` payload.
async fn accept_ungoverned(
    state: &AppState,
    xml: &str,
    short_name: &'static str,
    event_type: &'static str,
) -> Result<Accepted, GatewayError> {
    if xml.trim().is_empty() {
        return Err(GatewayError::BadXml("empty request body".into()));
    }
    METRICS.track_iso_message(short_name);

    let uetr = uetr_or_placeholder(&state.schemas, xml);
    let event = EventInsert {
        uetr: Some(&uetr),
        event_type,
        actor: "GATEWAY",
        data: serde_json::json!({ "messageType": short_name, "rawMessage": xml }),
        ..Default::default()
    };
    db::insert_payment_event(&state.db, &event)
        .await
        .map_err(GatewayError::from)?;

    Ok(Accepted { uetr, event_type })
}

/// `POST /v1/iso20022/pain002`
pub async fn pain002(State(state): State<AppState>, body: String) -> Response {
    match accept_ungoverned(&state, &body, "pain.002", "PAIN002_RECEIVED").await {
        Ok(accepted) => Json(accepted).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /v1/iso20022/camt053`
pub async fn camt053(State(state): State<AppState>, body: String) -> Response {
    match accept_ungoverned(&state, &body, "camt.053", "CAMT053_RECEIVED").await {
        Ok(accepted) => Json(accepted).into_response(),
        Err(e) => e.into_response(),
    }
}
