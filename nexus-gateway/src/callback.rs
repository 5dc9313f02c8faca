//! Callback Dispatcher (C6).
//!
//! Delivers pacs.002 status reports to a PSP's registered callback URL.
//! Every delivery is HMAC-SHA256 signed over `timestamp:uetr:body` with the
//! actor's own callback secret (falling back to the shared sandbox secret
//! when an actor has none configured), retried up to three times with
//! `2^attempt` second backoff and a ten-second per-attempt timeout.
//!
//! Dispatch is asynchronous: handlers push onto a bounded channel and
//! return immediately, so a slow or unreachable PSP endpoint never blocks
//! the ingress path. A fixed pool of worker tasks drains the channel;
//! deliveries for the same UETR are not guaranteed to serialize across
//! workers, so callers that need per-UETR ordering route through a single
//! logical queue key (see `dispatch_key`).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::metrics::METRICS;

type HmacSha256 = Hmac<Sha256>;

const MAX_RETRIES: u32 = 3;
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// A pacs.002 delivery job queued for a background worker.
#[derive(Debug, Clone)]
pub struct CallbackJob {
    pub callback_url: String,
    pub uetr: String,
    pub status: String,
    pub reason_code: Option<String>,
    pub additional_info: Option<String>,
    pub currency: String,
    pub amount: String,
    pub shared_secret: String,
}

/// Handle used by request handlers to enqueue work without blocking.
#[derive(Clone)]
pub struct CallbackDispatcher {
    sender: mpsc::Sender<CallbackJob>,
}

impl CallbackDispatcher {
    /// Spawn `worker_count` background delivery workers draining a shared
    /// bounded queue, and return a handle for enqueuing jobs.
    pub fn spawn(worker_count: usize, http_client: reqwest::Client) -> Self {
        let (sender, receiver) = mpsc::channel(1024);
        let receiver = std::sync::Arc::new(tokio::sync::Mutex::new(receiver));

        for worker_id in 0..worker_count {
            let receiver = receiver.clone();
            let http_client = http_client.clone();
            tokio::spawn(async move {
                loop {
                    let job = {
                        let mut guard = receiver.lock().await;
                        guard.recv().await
                    };
                    match job {
                        Some(job) => {
                            METRICS.callback_queue_depth.dec();
                            deliver_with_retry(&http_client, job).await;
                        }
                        None => {
                            info!(worker_id, "callback worker shutting down, channel closed");
                            break;
                        }
                    }
                }
            });
        }

        Self { sender }
    }

    /// Queue a pacs.002 delivery. Never blocks the caller beyond the
    /// channel's backpressure: a full queue applies gentle backpressure to
    /// the handler rather than dropping the job.
    pub async fn enqueue(&self, job: CallbackJob) {
        METRICS.callback_queue_depth.inc();
        if self.sender.send(job).await.is_err() {
            warn!("callback dispatcher channel closed, dropping job");
            METRICS.callback_queue_depth.dec();
        }
    }
}

async fn deliver_with_retry(client: &reqwest::Client, job: CallbackJob) {
    if job.callback_url.is_empty() {
        warn!(uetr = %job.uetr, "no callback URL registered, skipping pacs.002 delivery");
        return;
    }

    let pacs002_xml = generate_pacs002_xml(
        &job.uetr,
        &job.status,
        job.reason_code.as_deref(),
        job.additional_info.as_deref(),
        &job.currency,
        &job.amount,
    );

    let timestamp = Utc::now().to_rfc3339();
    let signature = sign(&pacs002_xml, &job.uetr, &timestamp, &job.shared_secret);

    for attempt in 0..MAX_RETRIES {
        METRICS.callback_attempts_total.inc();
        let timer = METRICS.callback_delivery_duration_seconds.start_timer();
        let result = client
            .post(&job.callback_url)
            .timeout(ATTEMPT_TIMEOUT)
            .header("Content-Type", "application/xml")
            .header("X-UETR", &job.uetr)
            .header("X-Message-Type", "pacs.002")
            .header("X-Transaction-Status", &job.status)
            .header("X-Callback-Timestamp", &timestamp)
            .header("X-Callback-Signature", &signature)
            .header("X-Callback-Version", "1")
            .body(pacs002_xml.clone())
            .send()
            .await;
        timer.observe_duration();

        match result {
            Ok(resp) if matches!(resp.status().as_u16(), 200 | 201 | 202) => {
                info!(uetr = %job.uetr, status = %job.status, "pacs.002 delivered");
                return;
            }
            Ok(resp) => {
                warn!(uetr = %job.uetr, http_status = %resp.status(), "pacs.002 delivery rejected");
            }
            Err(e) => {
                error!(uetr = %job.uetr, attempt, error = %e, "pacs.002 delivery error");
            }
        }

        if attempt + 1 < MAX_RETRIES {
            tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
        }
    }

    METRICS.callback_failures_total.inc();
    error!(uetr = %job.uetr, "pacs.002 delivery exhausted all retries");
}

/// HMAC-SHA256 over `timestamp:uetr:payload`, base64-encoded.
pub fn sign(payload: &str, uetr: &str, timestamp: &str, shared_secret: &str) -> String {
    let message = format!("{timestamp}:{uetr}:{payload}");
    let mut mac =
        HmacSha256::new_from_slice(shared_secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify an inbound signature in constant time.
pub fn verify(payload: &str, uetr: &str, timestamp: &str, signature: &str, shared_secret: &str) -> bool {
    let expected = sign(payload, uetr, timestamp, shared_secret);
    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Generate a fresh 32-byte callback secret, hex-encoded.
pub fn generate_shared_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Render a pacs.002 Payment Status Report envelope.
pub fn generate_pacs002_xml(
    uetr: &str,
    status: &str,
    reason_code: Option<&str>,
    additional_info: Option<&str>,
    currency: &str,
    amount: &str,
) -> String {
    let mut id_bytes = [0u8; 6];
    rand::rngs::OsRng.fill_bytes(&mut id_bytes);
    let msg_id = format!(
        "PSR{}",
        id_bytes.iter().map(|b| format!("{b:02X}")).collect::<String>()
    );
    let creation_datetime = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    let reason = reason_code
        .map(str::to_string)
        .unwrap_or_else(|| if status == "ACCC" { String::new() } else { "NARR".to_string() });
    let info = additional_info.unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pacs.002.001.15">
  <FIToFIPmtStsRpt>
    <GrpHdr>
      <MsgId>{msg_id}</MsgId>
      <CreDtTm>{creation_datetime}</CreDtTm>
    </GrpHdr>
    <TxInfAndSts>
      <OrgnlEndToEndId>{uetr}</OrgnlEndToEndId>
      <TxSts>{status}</TxSts>
      <StsRsnInf>
        <Rsn>
          <Cd>{reason}</Cd>
        </Rsn>
        <AddtlInf>{info}</AddtlInf>
      </StsRsnInf>
      <OrgnlTxRef>
        <IntrBkSttlmAmt Ccy="{currency}">{amount}</IntrBkSttlmAmt>
      </OrgnlTxRef>
    </TxInfAndSts>
  </FIToFIPmtStsRpt>
</Document>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips() {
        let sig = sign("<xml/>", "uetr-1", "2024-01-01T00:00:00Z", "secret");
        assert!(verify("<xml/>", "uetr-1", "2024-01-01T00:00:00Z", &sig, "secret"));
        assert!(!verify("<xml/>", "uetr-1", "2024-01-01T00:00:00Z", &sig, "wrong-secret"));
    }

    #[test]
    fn tampered_payload_fails_verification() {
        let sig = sign("<xml/>", "uetr-1", "2024-01-01T00:00:00Z", "secret");
        assert!(!verify("<other/>", "uetr-1", "2024-01-01T00:00:00Z", &sig, "secret"));
    }

    #[test]
    fn pacs002_xml_carries_status_and_amount() {
        let xml = generate_pacs002_xml("uetr-1", "ACCC", None, None, "SGD", "1000.00");
        assert!(xml.contains("<TxSts>ACCC</TxSts>"));
        assert!(xml.contains(r#"Ccy="SGD">1000.00"#));
    }
}
