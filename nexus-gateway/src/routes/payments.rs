//! `/v1/payments`, `/v1/payments/{uetr}/{events,messages,status}` — audit
//! views over C3. Every query also accepts `correlation_id` so proxy
//! resolution conversations (which never have a UETR) can be inspected the
//! same way (scenario 6).

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use nexus_core::types::PaymentStatus;

use crate::db::{self, EventRow, MessageEnvelope, PaymentRecord};
use crate::error::GatewayError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct KeyParams {
    pub correlation_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub event_id: uuid::Uuid,
    pub uetr: Option<String>,
    pub correlation_id: Option<String>,
    pub event_type: String,
    pub actor: String,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

impl From<EventRow> for EventView {
    fn from(e: EventRow) -> Self {
        Self {
            event_id: e.event_id,
            uetr: e.uetr,
            correlation_id: e.correlation_id,
            event_type: e.event_type,
            actor: e.actor,
            occurred_at: e.occurred_at,
        }
    }
}

/// `GET /v1/payments/{uetr}/events`
pub async fn events(State(state): State<AppState>, Path(uetr): Path<String>) -> Response {
    match db::events_by_uetr(&state.db, &uetr).await {
        Ok(rows) => Json(rows.into_iter().map(EventView::from).collect::<Vec<_>>()).into_response(),
        Err(e) => GatewayError::from(e).into_response(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub event_id: uuid::Uuid,
    pub message_type: &'static str,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub xml: String,
}

impl From<MessageEnvelope> for MessageView {
    fn from(m: MessageEnvelope) -> Self {
        Self {
            event_id: m.event_id,
            message_type: m.message_type,
            occurred_at: m.occurred_at,
            xml: m.xml,
        }
    }
}

/// `GET /v1/payments/{uetr}/messages?correlation_id=` — when `correlation_id`
/// is present it takes precedence, since conversations like proxy
/// resolution never have a UETR at all (§8 scenario 6).
pub async fn messages(
    State(state): State<AppState>,
    Path(uetr): Path<String>,
    Query(params): Query<KeyParams>,
) -> Response {
    let result = match params.correlation_id {
        Some(correlation_id) => db::messages_by_correlation_id(&state.db, &correlation_id).await,
        None => db::messages_by_uetr(&state.db, &uetr).await,
    };
    match result {
        Ok(rows) => Json(rows.into_iter().map(MessageView::from).collect::<Vec<_>>()).into_response(),
        Err(e) => GatewayError::from(e).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub uetr: String,
    pub status: PaymentStatus,
}

/// `GET /v1/payments/{uetr}/status`
pub async fn status(State(state): State<AppState>, Path(uetr): Path<String>) -> Response {
    match db::latest_status_by_uetr(&state.db, &uetr).await {
        Ok(Some(status)) => Json(StatusView { uetr, status }).into_response(),
        Ok(None) => GatewayError::NotFound(uetr).into_response(),
        Err(e) => GatewayError::from(e).into_response(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub uetr: String,
    pub initiated_at: chrono::DateTime<chrono::Utc>,
    pub quote_id: Option<String>,
    pub source_psp_bic: String,
    pub destination_psp_bic: String,
    pub source_currency: String,
    pub destination_currency: String,
    pub interbank_settlement_amount: rust_decimal::Decimal,
    pub exchange_rate: rust_decimal::Decimal,
    pub status: PaymentStatus,
}

impl From<PaymentRecord> for PaymentView {
    fn from(p: PaymentRecord) -> Self {
        Self {
            uetr: p.uetr,
            initiated_at: p.initiated_at,
            quote_id: p.quote_id,
            source_psp_bic: p.source_psp_bic,
            destination_psp_bic: p.destination_psp_bic,
            source_currency: p.source_currency,
            destination_currency: p.destination_currency,
            interbank_settlement_amount: p.interbank_settlement_amount,
            exchange_rate: p.exchange_rate,
            status: p.status,
        }
    }
}

/// `GET /v1/payments/{uetr}`
pub async fn get(State(state): State<AppState>, Path(uetr): Path<String>) -> Response {
    match db::get_payment_by_uetr(&state.db, &uetr).await {
        Ok(Some(p)) => Json(PaymentView::from(p)).into_response(),
        Ok(None) => GatewayError::NotFound(uetr).into_response(),
        Err(e) => GatewayError::from(e).into_response(),
    }
}
