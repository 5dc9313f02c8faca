//! Event & Payment Store (C3).
//!
//! Two logical tables (`payments`, `payment_events`) plus `quotes` and
//! `actors`. Every handler calls [`insert_payment_event`] (optionally via
//! [`upsert_payment_and_event`]) exactly once per accepted message, inside
//! one transaction, so the audit log is complete even for malformed
//! traffic. Uses the runtime-checked `sqlx::query`/`query_as` API rather
//! than the `query!` macro family: those require either a live database or
//! a checked-in `.sqlx` offline cache at build time, neither of which this
//! workspace carries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{error, info};
use uuid::Uuid;

use nexus_core::types::{ActorKind, PaymentStatus};

/// Connect to Postgres and run pending migrations. Mirrors the teacher's
/// startup sequence (`PgPoolOptions::max_connections` then `sqlx::migrate!`).
pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(50)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// A canonical payment row, keyed by `(uetr, initiated_at)`.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub uetr: String,
    pub initiated_at: DateTime<Utc>,
    pub quote_id: Option<String>,
    pub source_psp_bic: String,
    pub destination_psp_bic: String,
    pub debtor_name: String,
    pub debtor_account: String,
    pub creditor_name: String,
    pub creditor_account: String,
    pub source_currency: String,
    pub destination_currency: String,
    pub interbank_settlement_amount: Decimal,
    pub exchange_rate: Decimal,
    pub status: PaymentStatus,
    pub callback_url: Option<String>,
}

fn status_str(s: PaymentStatus) -> &'static str {
    match s {
        PaymentStatus::Received => "RECEIVED",
        PaymentStatus::Submitted => "SUBMITTED",
        PaymentStatus::Accepted => "ACCEPTED",
        PaymentStatus::Rejected => "REJECTED",
        PaymentStatus::Returned => "RETURNED",
        PaymentStatus::Recalled => "RECALLED",
    }
}

fn status_from_str(s: &str) -> PaymentStatus {
    match s {
        "SUBMITTED" => PaymentStatus::Submitted,
        "ACCEPTED" => PaymentStatus::Accepted,
        "REJECTED" => PaymentStatus::Rejected,
        "RETURNED" => PaymentStatus::Returned,
        "RECALLED" => PaymentStatus::Recalled,
        _ => PaymentStatus::Received,
    }
}

/// Upsert a payment row. Keyed on `(uetr, initiated_at)`: a re-submission of
/// the same pair updates `status`/`updated_at` only, satisfying I8
/// idempotency without creating a second row.
pub async fn upsert_payment(pool: &PgPool, p: &PaymentRecord) -> Result<(), sqlx::Error> {
    info!(uetr = %p.uetr, "upserting payment");
    sqlx::query(
        r#"
        INSERT INTO payments (
            uetr, initiated_at, quote_id, source_psp_bic, destination_psp_bic,
            debtor_name, debtor_account, creditor_name, creditor_account,
            source_currency, destination_currency, interbank_settlement_amount,
            exchange_rate, status, callback_url, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15, NOW())
        ON CONFLICT (uetr, initiated_at) DO UPDATE
            SET status = EXCLUDED.status, updated_at = NOW()
        "#,
    )
    .bind(&p.uetr)
    .bind(p.initiated_at)
    .bind(&p.quote_id)
    .bind(&p.source_psp_bic)
    .bind(&p.destination_psp_bic)
    .bind(&p.debtor_name)
    .bind(&p.debtor_account)
    .bind(&p.creditor_name)
    .bind(&p.creditor_account)
    .bind(&p.source_currency)
    .bind(&p.destination_currency)
    .bind(p.interbank_settlement_amount)
    .bind(p.exchange_rate)
    .bind(status_str(p.status))
    .bind(&p.callback_url)
    .execute(pool)
    .await?;
    Ok(())
}

/// Update a payment's status by UETR (latest `initiated_at` row), e.g. on
/// downstream ACCC/RJCT disposition, a return, or a recall resolution.
pub async fn update_status_by_uetr(
    pool: &PgPool,
    uetr: &str,
    status: PaymentStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE payments SET status = $1, updated_at = NOW()
        WHERE uetr = $2
        "#,
    )
    .bind(status_str(status))
    .bind(uetr)
    .execute(pool)
    .await?;
    Ok(())
}

/// Latest payment row for a UETR, used for quote-binding, callback-endpoint
/// lookup, and the audit views.
pub async fn get_payment_by_uetr(
    pool: &PgPool,
    uetr: &str,
) -> Result<Option<PaymentRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT uetr, initiated_at, quote_id, source_psp_bic, destination_psp_bic,
               debtor_name, debtor_account, creditor_name, creditor_account,
               source_currency, destination_currency, interbank_settlement_amount,
               exchange_rate, status, callback_url
        FROM payments WHERE uetr = $1
        ORDER BY initiated_at DESC LIMIT 1
        "#,
    )
    .bind(uetr)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| PaymentRecord {
        uetr: r.get("uetr"),
        initiated_at: r.get("initiated_at"),
        quote_id: r.get("quote_id"),
        source_psp_bic: r.get("source_psp_bic"),
        destination_psp_bic: r.get("destination_psp_bic"),
        debtor_name: r.get("debtor_name"),
        debtor_account: r.get("debtor_account"),
        creditor_name: r.get("creditor_name"),
        creditor_account: r.get("creditor_account"),
        source_currency: r.get("source_currency"),
        destination_currency: r.get("destination_currency"),
        interbank_settlement_amount: r.get("interbank_settlement_amount"),
        exchange_rate: r.get("exchange_rate"),
        status: status_from_str(r.get::<String, _>("status").as_str()),
        callback_url: r.get("callback_url"),
    }))
}

/// One nullable-slot-per-message-family event row.
#[derive(Debug, Clone, Default)]
pub struct EventInsert<'a> {
    pub uetr: Option<&'a str>,
    pub correlation_id: Option<&'a str>,
    pub event_type: &'a str,
    pub actor: &'a str,
    pub data: serde_json::Value,
    pub pacs008_xml: Option<&'a str>,
    pub pacs002_xml: Option<&'a str>,
    pub acmt023_xml: Option<&'a str>,
    pub acmt024_xml: Option<&'a str>,
    pub camt054_xml: Option<&'a str>,
    pub camt103_xml: Option<&'a str>,
    pub pain001_xml: Option<&'a str>,
    pub pacs004_xml: Option<&'a str>,
    pub pacs028_xml: Option<&'a str>,
    pub camt056_xml: Option<&'a str>,
    pub camt029_xml: Option<&'a str>,
}

/// Append one event row. Never mutated, never deleted.
pub async fn insert_payment_event(pool: &PgPool, e: &EventInsert<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO payment_events (
            event_id, uetr, correlation_id, event_type, actor, data, occurred_at,
            pacs008_message, pacs002_message, acmt023_message, acmt024_message,
            camt054_message, camt103_message, pain001_message, pacs004_message,
            pacs028_message, camt056_message, camt029_message
        ) VALUES (
            gen_random_uuid(), $1,$2,$3,$4,$5, NOW(),
            $6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16
        )
        "#,
    )
    .bind(e.uetr)
    .bind(e.correlation_id)
    .bind(e.event_type)
    .bind(e.actor)
    .bind(&e.data)
    .bind(e.pacs008_xml)
    .bind(e.pacs002_xml)
    .bind(e.acmt023_xml)
    .bind(e.acmt024_xml)
    .bind(e.camt054_xml)
    .bind(e.camt103_xml)
    .bind(e.pain001_xml)
    .bind(e.pacs004_xml)
    .bind(e.pacs028_xml)
    .bind(e.camt056_xml)
    .bind(e.camt029_xml)
    .execute(pool)
    .await?;
    Ok(())
}

/// Persist the payment and its first event atomically. Handlers call this
/// once on acceptance; the acknowledgement is only emitted once this
/// transaction commits (persist-then-ack, §5).
pub async fn upsert_payment_and_event(
    pool: &PgPool,
    payment: &PaymentRecord,
    event: &EventInsert<'_>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO payments (
            uetr, initiated_at, quote_id, source_psp_bic, destination_psp_bic,
            debtor_name, debtor_account, creditor_name, creditor_account,
            source_currency, destination_currency, interbank_settlement_amount,
            exchange_rate, status, callback_url, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15, NOW())
        ON CONFLICT (uetr, initiated_at) DO UPDATE
            SET status = EXCLUDED.status, updated_at = NOW()
        "#,
    )
    .bind(&payment.uetr)
    .bind(payment.initiated_at)
    .bind(&payment.quote_id)
    .bind(&payment.source_psp_bic)
    .bind(&payment.destination_psp_bic)
    .bind(&payment.debtor_name)
    .bind(&payment.debtor_account)
    .bind(&payment.creditor_name)
    .bind(&payment.creditor_account)
    .bind(&payment.source_currency)
    .bind(&payment.destination_currency)
    .bind(payment.interbank_settlement_amount)
    .bind(payment.exchange_rate)
    .bind(status_str(payment.status))
    .bind(&payment.callback_url)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO payment_events (
            event_id, uetr, correlation_id, event_type, actor, data, occurred_at,
            pacs008_message, pacs002_message, acmt023_message, acmt024_message,
            camt054_message, camt103_message, pain001_message, pacs004_message,
            pacs028_message, camt056_message, camt029_message
        ) VALUES (
            gen_random_uuid(), $1,$2,$3,$4,$5, NOW(),
            $6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16
        )
        "#,
    )
    .bind(event.uetr)
    .bind(event.correlation_id)
    .bind(event.event_type)
    .bind(event.actor)
    .bind(&event.data)
    .bind(event.pacs008_xml)
    .bind(event.pacs002_xml)
    .bind(event.acmt023_xml)
    .bind(event.acmt024_xml)
    .bind(event.camt054_xml)
    .bind(event.camt103_xml)
    .bind(event.pain001_xml)
    .bind(event.pacs004_xml)
    .bind(event.pacs028_xml)
    .bind(event.camt056_xml)
    .bind(event.camt029_xml)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// A stored event row, as returned by the audit queries.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub event_id: Uuid,
    pub uetr: Option<String>,
    pub correlation_id: Option<String>,
    pub event_type: String,
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
}

/// Events for a UETR, ordered by timestamp then insertion order (§4.3).
pub async fn events_by_uetr(pool: &PgPool, uetr: &str) -> Result<Vec<EventRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT event_id, uetr, correlation_id, event_type, actor, occurred_at
        FROM payment_events WHERE uetr = $1
        ORDER BY occurred_at ASC, event_id ASC
        "#,
    )
    .bind(uetr)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| EventRow {
            event_id: r.get("event_id"),
            uetr: r.get("uetr"),
            correlation_id: r.get("correlation_id"),
            event_type: r.get("event_type"),
            actor: r.get("actor"),
            occurred_at: r.get("occurred_at"),
        })
        .collect())
}

/// Events for a proxy-resolution conversation (C8 query).
pub async fn events_by_correlation_id(
    pool: &PgPool,
    correlation_id: &str,
) -> Result<Vec<EventRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT event_id, uetr, correlation_id, event_type, actor, occurred_at
        FROM payment_events WHERE correlation_id = $1
        ORDER BY occurred_at ASC, event_id ASC
        "#,
    )
    .bind(correlation_id)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| EventRow {
            event_id: r.get("event_id"),
            uetr: r.get("uetr"),
            correlation_id: r.get("correlation_id"),
            event_type: r.get("event_type"),
            actor: r.get("actor"),
            occurred_at: r.get("occurred_at"),
        })
        .collect())
}

/// One ordered raw-message envelope (whichever slot was populated).
#[derive(Debug, Clone)]
pub struct MessageEnvelope {
    pub event_id: Uuid,
    pub message_type: &'static str,
    pub occurred_at: DateTime<Utc>,
    pub xml: String,
}

const MESSAGE_COLUMNS: &[(&str, &str)] = &[
    ("pacs008_message", "pacs.008"),
    ("pacs002_message", "pacs.002"),
    ("acmt023_message", "acmt.023"),
    ("acmt024_message", "acmt.024"),
    ("camt054_message", "camt.054"),
    ("camt103_message", "camt.103"),
    ("pain001_message", "pain.001"),
    ("pacs004_message", "pacs.004"),
    ("pacs028_message", "pacs.028"),
    ("camt056_message", "camt.056"),
    ("camt029_message", "camt.029"),
];

/// Ordered raw envelopes for a UETR, across every message family.
pub async fn messages_by_uetr(
    pool: &PgPool,
    uetr: &str,
) -> Result<Vec<MessageEnvelope>, sqlx::Error> {
    messages_by_key(pool, "uetr", uetr).await
}

/// Ordered raw envelopes for a correlation id (used by the C8 conversation query).
pub async fn messages_by_correlation_id(
    pool: &PgPool,
    correlation_id: &str,
) -> Result<Vec<MessageEnvelope>, sqlx::Error> {
    messages_by_key(pool, "correlation_id", correlation_id).await
}

async fn messages_by_key(
    pool: &PgPool,
    key_column: &str,
    key: &str,
) -> Result<Vec<MessageEnvelope>, sqlx::Error> {
    let columns = MESSAGE_COLUMNS
        .iter()
        .map(|(c, _)| *c)
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!(
        "SELECT event_id, occurred_at, {columns} FROM payment_events WHERE {key_column} = $1 ORDER BY occurred_at ASC, event_id ASC"
    );
    let rows = sqlx::query(&query).bind(key).fetch_all(pool).await?;

    let mut out = Vec::new();
    for row in rows {
        let event_id: Uuid = row.get("event_id");
        let occurred_at: DateTime<Utc> = row.get("occurred_at");
        for (column, message_type) in MESSAGE_COLUMNS {
            if let Some(xml) = row.get::<Option<String>, _>(*column) {
                out.push(MessageEnvelope {
                    event_id,
                    message_type,
                    occurred_at,
                    xml,
                });
            }
        }
    }
    Ok(out)
}

/// Latest status for a UETR.
pub async fn latest_status_by_uetr(
    pool: &PgPool,
    uetr: &str,
) -> Result<Option<PaymentStatus>, sqlx::Error> {
    Ok(get_payment_by_uetr(pool, uetr).await?.map(|p| p.status))
}

/// A registered participant actor row.
#[derive(Debug, Clone)]
pub struct ActorRecord {
    pub actor_id: String,
    pub actor_kind: ActorKind,
    pub legal_name: String,
    pub bicfi: String,
    pub callback_url: String,
    pub callback_secret: String,
    pub created_at: DateTime<Utc>,
}

fn actor_kind_str(k: ActorKind) -> &'static str {
    match k {
        ActorKind::Fxp => "FXP",
        ActorKind::Ipso => "IPSO",
        ActorKind::Psp => "PSP",
        ActorKind::Sap => "SAP",
        ActorKind::Pdo => "PDO",
    }
}

fn actor_kind_from_str(s: &str) -> ActorKind {
    match s {
        "FXP" => ActorKind::Fxp,
        "IPSO" => ActorKind::Ipso,
        "SAP" => ActorKind::Sap,
        "PDO" => ActorKind::Pdo,
        _ => ActorKind::Psp,
    }
}

/// Insert a new actor. `callback_secret` is stored opaque to every
/// component except the callback dispatcher's signer.
pub async fn insert_actor(pool: &PgPool, a: &ActorRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO actors (actor_id, actor_kind, legal_name, bicfi, callback_url, callback_secret, created_at)
        VALUES ($1,$2,$3,$4,$5,$6,$7)
        "#,
    )
    .bind(&a.actor_id)
    .bind(actor_kind_str(a.actor_kind))
    .bind(&a.legal_name)
    .bind(&a.bicfi)
    .bind(&a.callback_url)
    .bind(&a.callback_secret)
    .bind(a.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch one actor.
pub async fn get_actor(pool: &PgPool, actor_id: &str) -> Result<Option<ActorRecord>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT actor_id, actor_kind, legal_name, bicfi, callback_url, callback_secret, created_at FROM actors WHERE actor_id = $1",
    )
    .bind(actor_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_actor))
}

/// List actors, optionally filtered by kind.
pub async fn list_actors(
    pool: &PgPool,
    kind: Option<ActorKind>,
) -> Result<Vec<ActorRecord>, sqlx::Error> {
    let rows = match kind {
        Some(k) => {
            sqlx::query(
                "SELECT actor_id, actor_kind, legal_name, bicfi, callback_url, callback_secret, created_at FROM actors WHERE actor_kind = $1 ORDER BY created_at DESC",
            )
            .bind(actor_kind_str(k))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT actor_id, actor_kind, legal_name, bicfi, callback_url, callback_secret, created_at FROM actors ORDER BY created_at DESC",
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows.into_iter().map(row_to_actor).collect())
}

/// Replace an actor's callback secret, returning nothing (the new plaintext
/// is handed back to the caller by the route handler, not re-read from storage).
pub async fn rotate_actor_secret(
    pool: &PgPool,
    actor_id: &str,
    new_secret: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE actors SET callback_secret = $1 WHERE actor_id = $2")
        .bind(new_secret)
        .bind(actor_id)
        .execute(pool)
        .await?;
    Ok(())
}

fn row_to_actor(r: sqlx::postgres::PgRow) -> ActorRecord {
    ActorRecord {
        actor_id: r.get("actor_id"),
        actor_kind: actor_kind_from_str(r.get::<String, _>("actor_kind").as_str()),
        legal_name: r.get("legal_name"),
        bicfi: r.get("bicfi"),
        callback_url: r.get("callback_url"),
        callback_secret: r.get("callback_secret"),
        created_at: r.get("created_at"),
    }
}

/// A persisted quote row (mirrors `nexus_core::quote::Quote`).
#[derive(Debug, Clone)]
pub struct QuoteRecord {
    pub quote_id: String,
    pub fxp_id: String,
    pub source_currency: String,
    pub destination_currency: String,
    pub amount_type: String,
    pub base_rate: Decimal,
    pub final_rate: Decimal,
    pub base_spread_bps: i32,
    pub applied_spread_bps: i32,
    pub source_interbank_amount: Decimal,
    pub destination_interbank_amount: Decimal,
    pub creditor_account_amount: Decimal,
    pub destination_psp_fee: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Persist a freshly created quote. Quotes are immutable and never deleted.
pub async fn insert_quote(pool: &PgPool, q: &QuoteRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO quotes (
            quote_id, fxp_id, source_currency, destination_currency, amount_type,
            base_rate, final_rate, base_spread_bps, applied_spread_bps,
            source_interbank_amount, destination_interbank_amount,
            creditor_account_amount, destination_psp_fee, created_at, expires_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
        "#,
    )
    .bind(&q.quote_id)
    .bind(&q.fxp_id)
    .bind(&q.source_currency)
    .bind(&q.destination_currency)
    .bind(&q.amount_type)
    .bind(q.base_rate)
    .bind(q.final_rate)
    .bind(q.base_spread_bps)
    .bind(q.applied_spread_bps)
    .bind(q.source_interbank_amount)
    .bind(q.destination_interbank_amount)
    .bind(q.creditor_account_amount)
    .bind(q.destination_psp_fee)
    .bind(q.created_at)
    .bind(q.expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch a quote by id, regardless of expiry (expiry is judged by the caller).
pub async fn get_quote(pool: &PgPool, quote_id: &str) -> Result<Option<QuoteRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT quote_id, fxp_id, source_currency, destination_currency, amount_type,
               base_rate, final_rate, base_spread_bps, applied_spread_bps,
               source_interbank_amount, destination_interbank_amount,
               creditor_account_amount, destination_psp_fee, created_at, expires_at
        FROM quotes WHERE quote_id = $1
        "#,
    )
    .bind(quote_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| QuoteRecord {
        quote_id: r.get("quote_id"),
        fxp_id: r.get("fxp_id"),
        source_currency: r.get("source_currency"),
        destination_currency: r.get("destination_currency"),
        amount_type: r.get("amount_type"),
        base_rate: r.get("base_rate"),
        final_rate: r.get("final_rate"),
        base_spread_bps: r.get("base_spread_bps"),
        applied_spread_bps: r.get("applied_spread_bps"),
        source_interbank_amount: r.get("source_interbank_amount"),
        destination_interbank_amount: r.get("destination_interbank_amount"),
        creditor_account_amount: r.get("creditor_account_amount"),
        destination_psp_fee: r.get("destination_psp_fee"),
        created_at: r.get("created_at"),
        expires_at: r.get("expires_at"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn upsert_payment_is_idempotent_on_uetr_and_initiated_at(pool: PgPool) {
        let initiated_at = Utc::now();
        let record = PaymentRecord {
            uetr: "a1b2c3d4-0000-0000-0000-000000000001".to_string(),
            initiated_at,
            quote_id: None,
            source_psp_bic: "DBSSSGSG".to_string(),
            destination_psp_bic: "BBLTHBKK".to_string(),
            debtor_name: "Alice".to_string(),
            debtor_account: "SG-ACC-1".to_string(),
            creditor_name: "Bob".to_string(),
            creditor_account: "TH-ACC-1".to_string(),
            source_currency: "SGD".to_string(),
            destination_currency: "THB".to_string(),
            interbank_settlement_amount: Decimal::new(100000, 2),
            exchange_rate: Decimal::new(257207, 4),
            status: PaymentStatus::Received,
            callback_url: None,
        };

        upsert_payment(&pool, &record).await.unwrap();
        upsert_payment(&pool, &record).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments WHERE uetr = $1")
            .bind(&record.uetr)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }
}
