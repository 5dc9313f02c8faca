//! `pacs.008` — FI-to-FI customer credit transfer (payment instruction).
//!
//! This is the only message family that binds to a quote and decides a
//! terminal disposition; every other family in this module is accept-and-log.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use nexus_core::numeric;
use nexus_core::quote::{Quote, QuoteEngine, StaticFxpPolicy};
use nexus_core::types::{self, MessageType, PaymentStatus, ReasonCode};

use crate::callback::CallbackJob;
use crate::db::{self, EventInsert, PaymentRecord, QuoteRecord};
use crate::error::GatewayError;
use crate::metrics::METRICS;
use crate::state::AppState;

use super::{extract_quote_id, validate_or_log, NEXUS_QUOTE_ID_PREFIX};

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "FIToFICstmrCdtTrf")]
    fi_to_fi_customer_credit_transfer: FiToFiCustomerCreditTransfer,
}

#[derive(Debug, Deserialize)]
struct FiToFiCustomerCreditTransfer {
    #[serde(rename = "GrpHdr")]
    group_header: GroupHeader,
    #[serde(rename = "CdtTrfTxInf")]
    credit_transfer_transaction: CreditTransferTransaction,
}

#[derive(Debug, Deserialize)]
struct GroupHeader {
    #[serde(rename = "CreDtTm")]
    creation_date_time: String,
}

#[derive(Debug, Deserialize)]
struct CreditTransferTransaction {
    #[serde(rename = "PmtId")]
    payment_identification: PaymentIdentification,
    #[serde(rename = "IntrBkSttlmAmt")]
    interbank_settlement_amount: ActiveCurrencyAndAmount,
    #[serde(rename = "Dbtr")]
    debtor: PartyIdentification,
    #[serde(rename = "DbtrAcct", default)]
    debtor_account: Option<CashAccount>,
    #[serde(rename = "DbtrAgt")]
    debtor_agent: BranchAndFinancialInstitutionIdentification,
    #[serde(rename = "CdtrAgt")]
    creditor_agent: BranchAndFinancialInstitutionIdentification,
    #[serde(rename = "Cdtr")]
    creditor: PartyIdentification,
    #[serde(rename = "CdtrAcct", default)]
    creditor_account: Option<CashAccount>,
    #[serde(rename = "RmtInf", default)]
    remittance_information: Option<RemittanceInformation>,
}

#[derive(Debug, Deserialize)]
struct PaymentIdentification {
    #[serde(rename = "EndToEndId")]
    end_to_end_id: String,
    #[serde(rename = "UETR", default)]
    uetr: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActiveCurrencyAndAmount {
    #[serde(rename = "Ccy")]
    currency: String,
    #[serde(rename = "$value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct PartyIdentification {
    #[serde(rename = "Nm", default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BranchAndFinancialInstitutionIdentification {
    #[serde(rename = "FinInstnId")]
    financial_institution_identification: FinancialInstitutionIdentification,
}

#[derive(Debug, Deserialize)]
struct FinancialInstitutionIdentification {
    #[serde(rename = "BICFI", default)]
    bic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CashAccount {
    #[serde(rename = "Id")]
    identification: AccountIdentificationType,
}

#[derive(Debug, Deserialize)]
struct AccountIdentificationType {
    #[serde(rename = "IBAN", default)]
    iban: Option<String>,
    #[serde(rename = "Othr", default)]
    other: Option<GenericAccountIdentification>,
}

#[derive(Debug, Deserialize)]
struct GenericAccountIdentification {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct RemittanceInformation {
    #[serde(rename = "Ustrd", default)]
    unstructured: Vec<String>,
}

fn account_text(acct: &Option<CashAccount>) -> String {
    match acct {
        Some(CashAccount {
            identification: AccountIdentificationType { iban: Some(iban), .. },
        }) => iban.clone(),
        Some(CashAccount {
            identification: AccountIdentificationType { other: Some(o), .. },
        }) => o.id.clone(),
        _ => String::new(),
    }
}

#[derive(Debug, Deserialize)]
pub struct Params {
    #[serde(rename = "pacs002Endpoint")]
    pub pacs002_endpoint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub uetr: String,
    pub status: &'static str,
    #[serde(rename = "callbackEndpoint")]
    pub callback_endpoint: String,
    #[serde(rename = "processedAt")]
    pub processed_at: DateTime<Utc>,
}

fn quote_record_to_quote(r: QuoteRecord, amount_type: types::AmountType) -> Quote {
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

/// `POST /v1/iso20022/pacs008?pacs002Endpoint=URL`
pub async fn submit(
    State(state): State<AppState>,
    Query(params): Query<Params>,
    body: String,
) -> Response {
    match handle(&state, &params, &body).await {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle(state: &AppState, params: &Params, xml: &str) -> Result<Ack, GatewayError> {
    if xml.trim().is_empty() {
        return Err(GatewayError::BadXml("empty request body".into()));
    }

    validate_or_log(&state.db, &state.schemas, xml, MessageType::Pacs008).await?;

    let doc: Document = quick_xml::de::from_str(xml)
        .map_err(|e| GatewayError::BadXml(format!("pacs.008 parse error: {e}")))?;
    let tx = doc.fi_to_fi_customer_credit_transfer.credit_transfer_transaction;

    let uetr = tx
        .payment_identification
        .uetr
        .clone()
        .unwrap_or_else(|| tx.payment_identification.end_to_end_id.clone());

    let initiated_at = DateTime::parse_from_rfc3339(
        &doc.fi_to_fi_customer_credit_transfer.group_header.creation_date_time,
    )
    .map(|d| d.with_timezone(&Utc))
    .unwrap_or_else(|_| super::now());

    let pacs002_endpoint = params.pacs002_endpoint.clone().unwrap_or_default();

    METRICS.track_iso_message("pacs.008");
    METRICS.payments_received_total.inc();

    // I8: a resubmission of the same (uetr, initiatedAt) is idempotent and
    // returns the already-decided outcome without writing a second event or
    // scheduling a second callback.
    if let Some(existing) = db::get_payment_by_uetr(&state.db, &uetr)
        .await
        .map_err(GatewayError::from)?
    {
        if existing.initiated_at == initiated_at {
            let status = if existing.status == PaymentStatus::Accepted {
                "ACCEPTED"
            } else {
                "RECEIVED"
            };
            return Ok(Ack {
                uetr,
                status,
                callback_endpoint: existing.callback_url.unwrap_or(pacs002_endpoint),
                processed_at: super::now(),
            });
        }
    }

    let unstructured = tx
        .remittance_information
        .as_ref()
        .map(|r| r.unstructured.clone())
        .unwrap_or_default();
    let quote_id = extract_quote_id(&unstructured);

    let instructed_amount = Decimal::from_str(&tx.interbank_settlement_amount.value)
        .map_err(|_| GatewayError::BadXml("IntrBkSttlmAmt is not a valid decimal".into()))?;
    let instructed_currency = tx.interbank_settlement_amount.currency.clone();

    let debtor_name = tx.debtor.name.clone().unwrap_or_default();
    let debtor_account = account_text(&tx.debtor_account);
    let debtor_bic = tx
        .debtor_agent
        .financial_institution_identification
        .bic
        .clone()
        .unwrap_or_default();
    let creditor_name = tx.creditor.name.clone().unwrap_or_default();
    let creditor_account = account_text(&tx.creditor_account);
    let creditor_bic = tx
        .creditor_agent
        .financial_institution_identification
        .bic
        .clone()
        .unwrap_or_default();

    let binding = match bind_quote(state, quote_id.as_deref(), &instructed_amount, &instructed_currency).await {
        Ok(quote) => Ok(quote),
        Err(BindError::Invariant) => {
            // Never surfaced to the client and never persisted: §7 treats an
            // invariant violation as an internal fault, not a business
            // rejection, so this instruction leaves no payment record behind.
            return Err(GatewayError::InvariantViolation);
        }
        Err(BindError::Rejected(reason)) => Err(reason),
    };

    let (status, reason_code, effective_rate) = match &binding {
        Ok(quote) => (PaymentStatus::Accepted, None, quote.final_rate),
        Err(reason) => (PaymentStatus::Rejected, Some(*reason), Decimal::ZERO),
    };

    let payment = PaymentRecord {
        uetr: uetr.clone(),
        initiated_at,
        quote_id: quote_id.clone(),
        source_psp_bic: debtor_bic,
        destination_psp_bic: creditor_bic,
        debtor_name,
        debtor_account,
        creditor_name,
        creditor_account,
        source_currency: instructed_currency.clone(),
        destination_currency: binding
            .as_ref()
            .map(|q| q.destination_currency.clone())
            .unwrap_or_else(|_| instructed_currency.clone()),
        interbank_settlement_amount: instructed_amount,
        exchange_rate: effective_rate,
        status,
        callback_url: Some(pacs002_endpoint.clone()),
    };

    let mut event = EventInsert {
        uetr: Some(&uetr),
        event_type: "PAYMENT_RECEIVED",
        actor: "GATEWAY",
        data: serde_json::json!({
            "quoteId": quote_id,
            "reasonCode": reason_code.map(|r| r.code()),
        }),
        ..Default::default()
    };
    event.pacs008_xml = Some(xml);
    db::upsert_payment_and_event(&state.db, &payment, &event)
        .await
        .map_err(GatewayError::from)?;

    if status == PaymentStatus::Accepted {
        METRICS.payments_accepted_total.inc();
    } else {
        METRICS.payments_rejected_total.inc();
    }

    let ack_status = if status == PaymentStatus::Accepted { "ACCEPTED" } else { "RECEIVED" };
    let ack = Ack {
        uetr: uetr.clone(),
        status: ack_status,
        callback_endpoint: pacs002_endpoint.clone(),
        processed_at: super::now(),
    };

    let (callback_status, reason_str) = if status == PaymentStatus::Accepted {
        ("ACCC".to_string(), None)
    } else {
        ("RJCT".to_string(), reason_code.map(|r| r.code().to_string()))
    };
    state
        .callbacks
        .enqueue(CallbackJob {
            callback_url: pacs002_endpoint,
            uetr,
            status: callback_status,
            reason_code: reason_str,
            additional_info: reason_code.map(|r| r.description().to_string()),
            currency: instructed_currency,
            amount: instructed_amount.to_string(),
            shared_secret: state.settings.callback_secret.clone(),
        })
        .await;

    Ok(ack)
}

/// Why a pacs.008 failed to bind to a quote. `Rejected` is an ordinary
/// business outcome (AB04, persisted, acknowledged); `Invariant` means one
/// of I1-I5 broke on a quote already accepted as live and amount-matched,
/// which per §7 is an internal fault that fails closed instead.
enum BindError {
    Rejected(ReasonCode),
    Invariant,
}

/// Resolve and validate the quote a pacs.008 instruction binds to: missing,
/// expired, or amount/rate-mismatched quotes all reject with AB04 per §4.5
/// step 4. A quote is referenced via the `NEXUSQUOTEID:<uuid>` marker in
/// `RmtInf/Ustrd`, mirroring the `NEXUSORIGINALUETR` convention used for
/// returns — base ISO 20022 has no dedicated field for a Nexus quote id.
async fn bind_quote(
    state: &AppState,
    quote_id: Option<&str>,
    instructed_amount: &Decimal,
    instructed_currency: &str,
) -> Result<Quote, BindError> {
    let quote_id = quote_id.ok_or(BindError::Rejected(ReasonCode::Ab04))?;
    let record = db::get_quote(&state.db, quote_id)
        .await
        .map_err(|_| BindError::Rejected(ReasonCode::Ab04))?
        .ok_or(BindError::Rejected(ReasonCode::Ab04))?;

    let amount_type = types::AmountType::SourceFixed;
    let quote = quote_record_to_quote(record, amount_type);

    QuoteEngine::<StaticFxpPolicy>::check_live(&quote, super::now()).map_err(|_| {
        METRICS.quotes_expired_total.inc();
        BindError::Rejected(ReasonCode::Ab04)
    })?;

    if instructed_currency != quote.source_currency {
        return Err(BindError::Rejected(ReasonCode::Ab04));
    }
    if !numeric::amounts_match(*instructed_amount, quote.source_interbank_amount, instructed_currency) {
        return Err(BindError::Rejected(ReasonCode::Ab04));
    }

    state.quotes.disclose(&quote, super::now(), None).map_err(|e| {
        tracing::error!(error = %e, quote_id = %quote_id, "invariant violation binding quote");
        BindError::Invariant
    })?;

    Ok(quote)
}

/// Helper used by the `pacs.008` builder in integration tests: embeds the
/// quote-id marker the way a sending PSP is expected to.
pub fn remittance_with_quote_id(quote_id: &str, free_text: &str) -> String {
    format!("{free_text} {NEXUS_QUOTE_ID_PREFIX}{quote_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remittance_marker_round_trips_through_extraction() {
        let line = remittance_with_quote_id("11111111-1111-1111-1111-111111111111", "payment for invoice 42");
        let extracted = extract_quote_id(&[line]);
        assert_eq!(extracted, Some("11111111-1111-1111-1111-111111111111".to_string()));
    }

    #[test]
    fn parses_minimal_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pacs.008.001.13">
  <FIToFICstmrCdtTrf>
    <GrpHdr>
      <CreDtTm>2026-01-01T00:00:00Z</CreDtTm>
    </GrpHdr>
    <CdtTrfTxInf>
      <PmtId>
        <EndToEndId>E2E-1</EndToEndId>
        <UETR>a1b2c3d4-0000-0000-0000-000000000001</UETR>
      </PmtId>
      <IntrBkSttlmAmt Ccy="SGD">1000.00</IntrBkSttlmAmt>
      <Dbtr><Nm>Alice</Nm></Dbtr>
      <DbtrAgt><FinInstnId><BICFI>DBSSSGSG</BICFI></FinInstnId></DbtrAgt>
      <CdtrAgt><FinInstnId><BICFI>BBLTHBKK</BICFI></FinInstnId></CdtrAgt>
      <Cdtr><Nm>Bob</Nm></Cdtr>
      <RmtInf><Ustrd>NEXUSQUOTEID:a1b2c3d4-0000-0000-0000-000000000099</Ustrd></RmtInf>
    </CdtTrfTxInf>
  </FIToFICstmrCdtTrf>
</Document>"#;

        let doc: Document = quick_xml::de::from_str(xml).unwrap();
        let tx = doc.fi_to_fi_customer_credit_transfer.credit_transfer_transaction;
        assert_eq!(tx.payment_identification.end_to_end_id, "E2E-1");
        assert_eq!(tx.interbank_settlement_amount.currency, "SGD");
    }
}
