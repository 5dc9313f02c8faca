//! Process-wide shared state, injected into every handler via axum's
//! `State` extractor.

use std::sync::Arc;

use nexus_core::quote::{QuoteEngine, StaticFxpPolicy};
use nexus_core::schema::SchemaRegistry;
use sqlx::PgPool;

use crate::callback::CallbackDispatcher;
use crate::config::Settings;

/// Shared application state. Cheap to clone: everything behind an `Arc` or
/// already-cloneable (`PgPool` is itself a pool handle).
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub schemas: Arc<SchemaRegistry>,
    pub quotes: Arc<QuoteEngine<StaticFxpPolicy>>,
    pub callbacks: CallbackDispatcher,
    pub settings: Arc<Settings>,
}

/// The Release 1 sandbox FXP roster: one market-making rate per supported
/// Nexus corridor. A real deployment replaces this with RFQ-based discovery;
/// the `FxpPolicy` seam in `nexus_core::quote` is what makes that a
/// drop-in replacement rather than a rewrite.
pub fn default_fxp_policy() -> StaticFxpPolicy {
    use rust_decimal_macros::dec;
    StaticFxpPolicy::new(vec![
        ("SGD", "THB", "FXP-001", 50, dec!(25.85)),
        ("THB", "SGD", "FXP-001", 50, dec!(0.0387)),
        ("SGD", "MYR", "FXP-002", 40, dec!(3.48)),
        ("MYR", "SGD", "FXP-002", 40, dec!(0.2874)),
        ("SGD", "PHP", "FXP-003", 60, dec!(42.10)),
        ("PHP", "SGD", "FXP-003", 60, dec!(0.02375)),
        ("SGD", "IDR", "FXP-004", 70, dec!(11580.00)),
        ("IDR", "SGD", "FXP-004", 70, dec!(0.0000864)),
        ("SGD", "INR", "FXP-005", 55, dec!(61.90)),
        ("INR", "SGD", "FXP-005", 55, dec!(0.01616)),
    ])
}
