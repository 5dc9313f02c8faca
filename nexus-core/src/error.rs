//! Error taxonomy for the gateway core.
//!
//! These are domain-kind errors, not transport errors: the HTTP layer in
//! `nexus-gateway` maps each variant onto the wire taxonomy described by the
//! external interface (client input, quote lifecycle, invariant, infra).

use thiserror::Error;

/// Core domain error.
#[derive(Debug, Error)]
pub enum Error {
    /// Inbound XML could not be parsed at all.
    #[error("malformed XML: {0}")]
    BadXml(String),

    /// XSD structural validation failed; carries the rule violations.
    #[error("XSD validation failed for {message_type}: {errors:?}")]
    XsdValidationFailed {
        /// Message type under validation.
        message_type: String,
        /// Individual rule violations.
        errors: Vec<crate::schema::ValidationError>,
    },

    /// No schema registered for the requested or detected message type.
    #[error("schema not loaded for message type: {0}")]
    SchemaNotLoaded(String),

    /// Quote id does not exist.
    #[error("quote not found: {0}")]
    QuoteNotFound(String),

    /// Quote exists but `now >= expiresAt`.
    #[error("quote expired: {0}")]
    QuoteExpired(String),

    /// Instruction amounts/rate disagree with the bound quote.
    #[error("rate mismatch for quote {0}")]
    RateMismatch(String),

    /// Registry input failed URL/shape validation.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A numeric invariant (I1-I8) was violated. Never surfaced verbatim to
    /// clients; the boundary maps this to a generic 500.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result alias for core domain operations.
pub type Result<T> = std::result::Result<T, Error>;
