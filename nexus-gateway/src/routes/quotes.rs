//! `/v1/quotes`, `/v1/quotes/{id}`, `/v1/quotes/{id}/intermediary-agents`,
//! `/v1/pre-transaction-disclosure` — C4's HTTP surface.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use nexus_core::quote::{PreTransactionDisclosure, Quote, QuoteRequest};
use nexus_core::types::{ActorKind, AmountType};

use crate::db::{self, ActorRecord, QuoteRecord};
use crate::error::GatewayError;
use crate::metrics::METRICS;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub source_currency: String,
    pub destination_currency: String,
    pub amount: Decimal,
    pub amount_type: AmountType,
    pub psp_bic: Option<String>,
}

fn to_record(q: &Quote) -> QuoteRecord {
    QuoteRecord {
        quote_id: q.quote_id.clone(),
        fxp_id: q.fxp_id.clone(),
        source_currency: q.source_currency.clone(),
        destination_currency: q.destination_currency.clone(),
        amount_type: match q.amount_type {
            AmountType::SourceFixed => "SOURCE_FIXED".to_string(),
            AmountType::DestinationFixed => "DESTINATION_FIXED".to_string(),
        },
        base_rate: q.base_rate,
        final_rate: q.final_rate,
        base_spread_bps: q.base_spread_bps as i32,
        applied_spread_bps: q.applied_spread_bps as i32,
        source_interbank_amount: q.source_interbank_amount,
        destination_interbank_amount: q.destination_interbank_amount,
        creditor_account_amount: q.creditor_account_amount,
        destination_psp_fee: q.destination_psp_fee,
        created_at: q.created_at,
        expires_at: q.expires_at,
    }
}

fn to_quote(r: QuoteRecord) -> Quote {
    let amount_type = if r.amount_type == "DESTINATION_FIXED" {
        AmountType::DestinationFixed
    } else {
        AmountType::SourceFixed
    };
    Quote {
        quote_id: r.quote_id,
        fxp_id: r.fxp_id,
        source_currency: r.source_currency,
        destination_currency: r.destination_currency,
        amount_type,
        base_rate: r.base_rate,
        final_rate: r.final_rate,
        base_spread_bps: r.base_spread_bps as i64,
        tier_improvement_bps: 0,
        psp_improvement_bps: 0,
        applied_spread_bps: r.applied_spread_bps as i64,
        source_interbank_amount: r.source_interbank_amount,
        destination_interbank_amount: r.destination_interbank_amount,
        creditor_account_amount: r.creditor_account_amount,
        destination_psp_fee: r.destination_psp_fee,
        created_at: r.created_at,
        expires_at: r.expires_at,
    }
}

/// `POST /v1/quotes`
pub async fn create(State(state): State<AppState>, Json(req): Json<CreateQuoteRequest>) -> Response {
    match create_inner(&state, req).await {
        Ok(quote) => Json(quote).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn create_inner(state: &AppState, req: CreateQuoteRequest) -> Result<Quote, GatewayError> {
    let timer = METRICS.quote_create_duration_seconds.start_timer();
    let quote = state
        .quotes
        .create_quote(
            &QuoteRequest {
                source_currency: req.source_currency,
                destination_currency: req.destination_currency,
                amount: req.amount,
                amount_type: req.amount_type,
                psp_bic: req.psp_bic,
            },
            crate::iso20022::now(),
        )
        .map_err(GatewayError::from)?;
    timer.observe_duration();

    db::insert_quote(&state.db, &to_record(&quote))
        .await
        .map_err(GatewayError::from)?;
    METRICS.quotes_created_total.inc();

    Ok(quote)
}

/// `GET /v1/quotes/{id}`
pub async fn get(State(state): State<AppState>, Path(quote_id): Path<String>) -> Response {
    match db::get_quote(&state.db, &quote_id).await {
        Ok(Some(record)) => Json(to_quote(record)).into_response(),
        Ok(None) => GatewayError::QuoteNotFound(quote_id).into_response(),
        Err(e) => GatewayError::from(e).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct IntermediaryAgent {
    #[serde(rename = "actorId")]
    actor_id: String,
    #[serde(rename = "legalName")]
    legal_name: String,
    bicfi: String,
}

/// `GET /v1/quotes/{id}/intermediary-agents` — the Settlement Access
/// Providers holding the quote-issuing FXP's nostro accounts. Release 1 has
/// no FXP-to-SAP ownership mapping in the data model, so this returns every
/// registered SAP actor rather than ones scoped to the specific FXP.
pub async fn intermediary_agents(State(state): State<AppState>, Path(quote_id): Path<String>) -> Response {
    match intermediary_agents_inner(&state, &quote_id).await {
        Ok(agents) => Json(agents).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn intermediary_agents_inner(
    state: &AppState,
    quote_id: &str,
) -> Result<Vec<IntermediaryAgent>, GatewayError> {
    db::get_quote(&state.db, quote_id)
        .await
        .map_err(GatewayError::from)?
        .ok_or_else(|| GatewayError::QuoteNotFound(quote_id.to_string()))?;

    let saps: Vec<ActorRecord> = db::list_actors(&state.db, Some(ActorKind::Sap))
        .await
        .map_err(GatewayError::from)?;

    Ok(saps
        .into_iter()
        .map(|a| IntermediaryAgent {
            actor_id: a.actor_id,
            legal_name: a.legal_name,
            bicfi: a.bicfi,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub struct DisclosureParams {
    pub quote_id: String,
    pub source_psp_fee_type: Option<String>,
}

/// `GET /v1/pre-transaction-disclosure?quote_id=&source_psp_fee_type=`
pub async fn disclosure(State(state): State<AppState>, Query(params): Query<DisclosureParams>) -> Response {
    match disclosure_inner(&state, &params).await {
        Ok(d) => Json(d).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn disclosure_inner(
    state: &AppState,
    params: &DisclosureParams,
) -> Result<PreTransactionDisclosure, GatewayError> {
    let record = db::get_quote(&state.db, &params.quote_id)
        .await
        .map_err(GatewayError::from)?
        .ok_or_else(|| GatewayError::QuoteNotFound(params.quote_id.clone()))?;
    let quote = to_quote(record);

    // Mirrors the original's `AND expires_at > NOW()` filter: a stale quote
    // is reported as not found rather than disclosed.
    state
        .quotes
        .disclose(&quote, crate::iso20022::now(), params.source_psp_fee_type.as_deref())
        .map_err(GatewayError::from)
}
