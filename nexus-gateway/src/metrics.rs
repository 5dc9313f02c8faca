//! Prometheus metrics, served at `/metrics`.
//!
//! Tracks ingress throughput, per-message-family volume, quote lifecycle,
//! callback delivery, and the ingress guard. Registered once at startup
//! into a single [`Registry`] rather than the default global registry, so
//! tests can construct an isolated [`Metrics`] without cross-talk.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_with_registry, register_histogram_with_registry,
    register_int_gauge_with_registry, Counter, Encoder, Histogram, HistogramOpts, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

/// Process-wide metrics registry and instruments.
pub struct Metrics {
    pub registry: Registry,

    pub http_requests_total: Counter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,

    pub iso_messages_total: Counter,
    pub iso_pacs008_total: Counter,
    pub iso_pacs002_total: Counter,
    pub iso_acmt023_total: Counter,
    pub iso_acmt024_total: Counter,
    pub iso_camt054_total: Counter,
    pub iso_camt103_total: Counter,
    pub iso_pain001_total: Counter,
    pub iso_pain002_total: Counter,
    pub iso_pacs004_total: Counter,
    pub iso_pacs028_total: Counter,
    pub iso_camt056_total: Counter,
    pub iso_camt029_total: Counter,
    pub iso_camt053_total: Counter,
    pub xsd_validation_failures_total: Counter,

    pub quotes_created_total: Counter,
    pub quotes_expired_total: Counter,
    pub quote_create_duration_seconds: Histogram,

    pub payments_received_total: Counter,
    pub payments_accepted_total: Counter,
    pub payments_rejected_total: Counter,
    pub payments_returned_total: Counter,
    pub payments_recalled_total: Counter,

    pub callback_attempts_total: Counter,
    pub callback_failures_total: Counter,
    pub callback_delivery_duration_seconds: Histogram,
    pub callback_queue_depth: IntGauge,

    pub rate_limit_rejections_total: Counter,

    pub db_operations_total: Counter,
    pub db_errors_total: Counter,
}

impl Metrics {
    /// Build a fresh, independent registry. Call once at startup.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = register_counter_with_registry!(
            Opts::new("nexus_http_requests_total", "Total HTTP requests processed"),
            registry
        )?;
        let http_request_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "nexus_http_request_duration_seconds",
                "HTTP request duration in seconds"
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            registry
        )?;
        let http_requests_in_flight = register_int_gauge_with_registry!(
            Opts::new(
                "nexus_http_requests_in_flight",
                "HTTP requests currently being processed"
            ),
            registry
        )?;

        let iso_messages_total = register_counter_with_registry!(
            Opts::new(
                "nexus_iso_messages_total",
                "Total ISO 20022 messages accepted, across all families"
            ),
            registry
        )?;
        let iso_pacs008_total = register_counter_with_registry!(
            Opts::new("nexus_iso_pacs008_total", "pacs.008 messages received"),
            registry
        )?;
        let iso_pacs002_total = register_counter_with_registry!(
            Opts::new("nexus_iso_pacs002_total", "pacs.002 messages received"),
            registry
        )?;
        let iso_acmt023_total = register_counter_with_registry!(
            Opts::new("nexus_iso_acmt023_total", "acmt.023 messages received"),
            registry
        )?;
        let iso_acmt024_total = register_counter_with_registry!(
            Opts::new("nexus_iso_acmt024_total", "acmt.024 messages received"),
            registry
        )?;
        let iso_camt054_total = register_counter_with_registry!(
            Opts::new("nexus_iso_camt054_total", "camt.054 messages received"),
            registry
        )?;
        let iso_camt103_total = register_counter_with_registry!(
            Opts::new("nexus_iso_camt103_total", "camt.103 messages received"),
            registry
        )?;
        let iso_pain001_total = register_counter_with_registry!(
            Opts::new("nexus_iso_pain001_total", "pain.001 messages received"),
            registry
        )?;
        let iso_pain002_total = register_counter_with_registry!(
            Opts::new("nexus_iso_pain002_total", "pain.002 messages emitted"),
            registry
        )?;
        let iso_pacs004_total = register_counter_with_registry!(
            Opts::new("nexus_iso_pacs004_total", "pacs.004 messages received"),
            registry
        )?;
        let iso_pacs028_total = register_counter_with_registry!(
            Opts::new("nexus_iso_pacs028_total", "pacs.028 messages received"),
            registry
        )?;
        let iso_camt056_total = register_counter_with_registry!(
            Opts::new("nexus_iso_camt056_total", "camt.056 messages received"),
            registry
        )?;
        let iso_camt029_total = register_counter_with_registry!(
            Opts::new("nexus_iso_camt029_total", "camt.029 messages received"),
            registry
        )?;
        let iso_camt053_total = register_counter_with_registry!(
            Opts::new("nexus_iso_camt053_total", "camt.053 statements emitted"),
            registry
        )?;
        let xsd_validation_failures_total = register_counter_with_registry!(
            Opts::new(
                "nexus_xsd_validation_failures_total",
                "Inbound messages rejected by the schema validator"
            ),
            registry
        )?;

        let quotes_created_total = register_counter_with_registry!(
            Opts::new("nexus_quotes_created_total", "Total quotes created"),
            registry
        )?;
        let quotes_expired_total = register_counter_with_registry!(
            Opts::new(
                "nexus_quotes_expired_total",
                "Quotes rejected at bind-time for having expired"
            ),
            registry
        )?;
        let quote_create_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "nexus_quote_create_duration_seconds",
                "Quote creation latency in seconds"
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            registry
        )?;

        let payments_received_total = register_counter_with_registry!(
            Opts::new("nexus_payments_received_total", "Payment instructions received"),
            registry
        )?;
        let payments_accepted_total = register_counter_with_registry!(
            Opts::new("nexus_payments_accepted_total", "Payments reaching ACCC"),
            registry
        )?;
        let payments_rejected_total = register_counter_with_registry!(
            Opts::new("nexus_payments_rejected_total", "Payments reaching RJCT"),
            registry
        )?;
        let payments_returned_total = register_counter_with_registry!(
            Opts::new("nexus_payments_returned_total", "Payments returned via pacs.004"),
            registry
        )?;
        let payments_recalled_total = register_counter_with_registry!(
            Opts::new("nexus_payments_recalled_total", "Payments recalled via camt.056/camt.029"),
            registry
        )?;

        let callback_attempts_total = register_counter_with_registry!(
            Opts::new("nexus_callback_attempts_total", "Outbound callback delivery attempts"),
            registry
        )?;
        let callback_failures_total = register_counter_with_registry!(
            Opts::new(
                "nexus_callback_failures_total",
                "Callback deliveries exhausting all retries"
            ),
            registry
        )?;
        let callback_delivery_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "nexus_callback_delivery_duration_seconds",
                "Per-attempt callback delivery latency in seconds"
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0]),
            registry
        )?;
        let callback_queue_depth = register_int_gauge_with_registry!(
            Opts::new("nexus_callback_queue_depth", "Pending callback worker queue depth"),
            registry
        )?;

        let rate_limit_rejections_total = register_counter_with_registry!(
            Opts::new("nexus_rate_limit_rejections_total", "Requests rejected by the ingress guard"),
            registry
        )?;

        let db_operations_total = register_counter_with_registry!(
            Opts::new("nexus_db_operations_total", "Total database operations"),
            registry
        )?;
        let db_errors_total = register_counter_with_registry!(
            Opts::new("nexus_db_errors_total", "Total database errors"),
            registry
        )?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            iso_messages_total,
            iso_pacs008_total,
            iso_pacs002_total,
            iso_acmt023_total,
            iso_acmt024_total,
            iso_camt054_total,
            iso_camt103_total,
            iso_pain001_total,
            iso_pain002_total,
            iso_pacs004_total,
            iso_pacs028_total,
            iso_camt056_total,
            iso_camt029_total,
            iso_camt053_total,
            xsd_validation_failures_total,
            quotes_created_total,
            quotes_expired_total,
            quote_create_duration_seconds,
            payments_received_total,
            payments_accepted_total,
            payments_rejected_total,
            payments_returned_total,
            payments_recalled_total,
            callback_attempts_total,
            callback_failures_total,
            callback_delivery_duration_seconds,
            callback_queue_depth,
            rate_limit_rejections_total,
            db_operations_total,
            db_errors_total,
        })
    }

    /// Render the current snapshot in the Prometheus text exposition format.
    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Bump the per-family and aggregate counters for one inbound/outbound message.
    pub fn track_iso_message(&self, short_name: &str) {
        self.iso_messages_total.inc();
        match short_name {
            "pacs.008" => self.iso_pacs008_total.inc(),
            "pacs.002" => self.iso_pacs002_total.inc(),
            "acmt.023" => self.iso_acmt023_total.inc(),
            "acmt.024" => self.iso_acmt024_total.inc(),
            "camt.054" => self.iso_camt054_total.inc(),
            "camt.103" => self.iso_camt103_total.inc(),
            "pain.001" => self.iso_pain001_total.inc(),
            "pain.002" => self.iso_pain002_total.inc(),
            "pacs.004" => self.iso_pacs004_total.inc(),
            "pacs.028" => self.iso_pacs028_total.inc(),
            "camt.056" => self.iso_camt056_total.inc(),
            "camt.029" => self.iso_camt029_total.inc(),
            "camt.053" => self.iso_camt053_total.inc(),
            _ => {}
        }
    }
}

/// Process-wide metrics instance, initialized on first use.
pub static METRICS: Lazy<Arc<Metrics>> =
    Lazy::new(|| Arc::new(Metrics::new().expect("failed to initialize metrics")));
