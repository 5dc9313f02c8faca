//! `acmt.023` / `acmt.024` — proxy-resolution request/response (C8).
//!
//! The two messages form a conversation keyed by `Vrfctn/Id` (request) /
//! `Rpt/OrgnlId` (response), which this gateway treats as the correlation
//! identifier — distinct from a UETR, since proxy resolution happens before
//! any payment exists.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use nexus_core::addressing::{mask_name, ResolutionOutcome};
use nexus_core::types::MessageType;

use crate::db::{self, EventInsert};
use crate::error::GatewayError;
use crate::metrics::METRICS;
use crate::state::AppState;

use super::validate_or_log;

#[derive(Debug, Deserialize)]
struct Acmt023Document {
    #[serde(rename = "IdVrfctnReq")]
    request: IdVrfctnReq,
}

#[derive(Debug, Deserialize)]
struct IdVrfctnReq {
    #[serde(rename = "Vrfctn")]
    verification: Verification,
}

#[derive(Debug, Deserialize)]
struct Verification {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct Acmt024Document {
    #[serde(rename = "IdVrfctnRpt")]
    report: IdVrfctnRpt,
}

#[derive(Debug, Deserialize)]
struct IdVrfctnRpt {
    #[serde(rename = "Rpt")]
    report: Rpt,
}

#[derive(Debug, Deserialize)]
struct Rpt {
    #[serde(rename = "OrgnlId")]
    original_id: String,
    #[serde(rename = "Vrfctn")]
    verified: String,
}

#[derive(Debug, Deserialize)]
pub struct Acmt023Params {
    #[serde(rename = "acmt024Endpoint")]
    pub acmt024_endpoint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Acmt023Accepted {
    #[serde(rename = "correlationId")]
    correlation_id: String,
}

/// `POST /v1/iso20022/acmt023?acmt024Endpoint=URL`
pub async fn submit_request(
    State(state): State<AppState>,
    Query(params): Query<Acmt023Params>,
    body: String,
) -> Response {
    match handle_request(&state, &params, &body).await {
        Ok(accepted) => Json(accepted).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_request(
    state: &AppState,
    params: &Acmt023Params,
    xml: &str,
) -> Result<Acmt023Accepted, GatewayError> {
    if xml.trim().is_empty() {
        return Err(GatewayError::BadXml("empty request body".into()));
    }
    validate_or_log(&state.db, &state.schemas, xml, MessageType::Acmt023).await?;
    METRICS.track_iso_message("acmt.023");

    let doc: Acmt023Document = quick_xml::de::from_str(xml)
        .map_err(|e| GatewayError::BadXml(format!("acmt.023 parse error: {e}")))?;
    let correlation_id = doc.request.verification.id;

    let event = EventInsert {
        correlation_id: Some(&correlation_id),
        event_type: "PROXY_RESOLUTION_REQUESTED",
        actor: "PSP",
        data: serde_json::json!({ "acmt024Endpoint": params.acmt024_endpoint }),
        acmt023_xml: Some(xml),
        ..Default::default()
    };
    db::insert_payment_event(&state.db, &event)
        .await
        .map_err(GatewayError::from)?;

    Ok(Acmt023Accepted { correlation_id })
}

#[derive(Debug, Serialize)]
pub struct Acmt024Accepted {
    #[serde(rename = "correlationId")]
    correlation_id: String,
    outcome: &'static str,
}

/// `POST /v1/iso20022/acmt024`
pub async fn submit_response(State(state): State<AppState>, body: String) -> Response {
    match handle_response(&state, &body).await {
        Ok(accepted) => Json(accepted).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle_response(state: &AppState, xml: &str) -> Result<Acmt024Accepted, GatewayError> {
    if xml.trim().is_empty() {
        return Err(GatewayError::BadXml("empty request body".into()));
    }
    validate_or_log(&state.db, &state.schemas, xml, MessageType::Acmt024).await?;
    METRICS.track_iso_message("acmt.024");

    let doc: Acmt024Document = quick_xml::de::from_str(xml)
        .map_err(|e| GatewayError::BadXml(format!("acmt.024 parse error: {e}")))?;
    let correlation_id = doc.report.report.original_id;
    let verified = doc.report.report.verified.trim().eq_ignore_ascii_case("true");

    let outcome = if verified {
        ResolutionOutcome::Resolved {
            account_id: correlation_id.clone(),
            masked_name: mask_name("Unknown"),
            bic: String::new(),
        }
    } else {
        ResolutionOutcome::Unresolved
    };
    let outcome_str = match outcome {
        ResolutionOutcome::Resolved { .. } => "RESOLVED",
        ResolutionOutcome::Unresolved => "UNRESOLVED",
    };

    let event = EventInsert {
        correlation_id: Some(&correlation_id),
        event_type: "PROXY_RESOLUTION_RESPONDED",
        actor: "PDO",
        data: serde_json::json!({ "outcome": outcome_str }),
        acmt024_xml: Some(xml),
        ..Default::default()
    };
    db::insert_payment_event(&state.db, &event)
        .await
        .map_err(GatewayError::from)?;

    Ok(Acmt024Accepted {
        correlation_id,
        outcome: outcome_str,
    })
}
