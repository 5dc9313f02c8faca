//! ISO 20022 Pipeline (C5): one handler per message family, sharing the
//! seven-step skeleton described by the component design — validate, parse,
//! bind (payment instructions only), persist, ack, schedule callback.

pub mod accept_and_log;
pub mod acmt;
pub mod pacs002;
pub mod pacs008;
pub mod validate;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use nexus_core::schema::SchemaRegistry;
use nexus_core::types::MessageType;

use crate::db::{self, EventInsert};
use crate::error::GatewayError;

/// A UETR extracted from a malformed document, or synthesized so every
/// ingress failure still keys an audit row.
pub fn uetr_or_placeholder(schemas: &SchemaRegistry, xml: &str) -> String {
    schemas
        .safe_extract_uetr(xml)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Run C1 validation and, on failure, write the `SCHEMA_VALIDATION_FAILED`
/// audit event before returning the boundary error. Shared by every accept
/// handler so a malformed document is never silently dropped.
pub async fn validate_or_log(
    pool: &sqlx::PgPool,
    schemas: &SchemaRegistry,
    xml: &str,
    message_type: MessageType,
) -> Result<(), GatewayError> {
    let result = schemas.validate(xml, Some(message_type));
    if result.valid {
        return Ok(());
    }

    crate::metrics::METRICS.xsd_validation_failures_total.inc();
    let uetr = uetr_or_placeholder(schemas, xml);
    let mut event = EventInsert {
        uetr: Some(&uetr),
        event_type: "SCHEMA_VALIDATION_FAILED",
        actor: "GATEWAY",
        data: serde_json::json!({ "errors": result.errors }),
        ..Default::default()
    };
    set_message_slot(&mut event, message_type, xml);
    if let Err(e) = db::insert_payment_event(pool, &event).await {
        tracing::error!(error = %e, "failed to record schema validation failure");
    }

    Err(GatewayError::XsdValidationFailed {
        message_type: result.message_type,
        errors: result.errors,
    })
}

/// Route the raw XML into the one [`EventInsert`] slot matching its family.
pub fn set_message_slot<'a>(event: &mut EventInsert<'a>, message_type: MessageType, xml: &'a str) {
    match message_type {
        MessageType::Pacs008 => event.pacs008_xml = Some(xml),
        MessageType::Pacs002 => event.pacs002_xml = Some(xml),
        MessageType::Acmt023 => event.acmt023_xml = Some(xml),
        MessageType::Acmt024 => event.acmt024_xml = Some(xml),
        MessageType::Camt054 => event.camt054_xml = Some(xml),
        MessageType::Camt103 => event.camt103_xml = Some(xml),
        MessageType::Pain001 => event.pain001_xml = Some(xml),
        MessageType::Pacs004 => event.pacs004_xml = Some(xml),
        MessageType::Pacs028 => event.pacs028_xml = Some(xml),
        MessageType::Camt056 => event.camt056_xml = Some(xml),
        MessageType::Camt029 => event.camt029_xml = Some(xml),
    }
}

/// The marker embedded in a `pacs.008`'s unstructured remittance information
/// that names the quote this instruction binds to, mirroring the
/// `NEXUSORIGINALUETR:<uuid>` convention `nexus_core::types` uses for
/// returns — quotes, like original payments, have no dedicated XML field in
/// the base ISO 20022 message set.
pub const NEXUS_QUOTE_ID_PREFIX: &str = "NEXUSQUOTEID:";

/// Extract the bound quote id from remittance-info free-text lines.
pub fn extract_quote_id(unstructured: &[String]) -> Option<String> {
    for line in unstructured {
        if let Some(idx) = line.find(NEXUS_QUOTE_ID_PREFIX) {
            let rest = &line[idx + NEXUS_QUOTE_ID_PREFIX.len()..];
            let id: String = rest
                .chars()
                .take_while(|c| c.is_ascii_hexdigit() || *c == '-')
                .collect();
            if !id.is_empty() {
                return Some(id);
            }
        }
    }
    None
}

/// `now()` pinned through one call so a single request sees one consistent
/// clock reading across bind/expiry checks and persistence timestamps.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
