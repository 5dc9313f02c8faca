//! HTTP-boundary error taxonomy.
//!
//! Converts `nexus_core::Error` (and local transport/infra failures) into
//! the JSON/status-code contract in the external interface: `{error,
//! validationErrors?, reference?}` with the HTTP codes named in the error
//! handling design. Nothing below this line leaks internal messages or
//! stack traces to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use nexus_core::schema::ValidationError;

/// Gateway-wide error type. Every axum handler returns `Result<_, GatewayError>`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Body was empty or not valid UTF-8/XML at all.
    #[error("bad XML: {0}")]
    BadXml(String),

    /// Structural schema validation failed.
    #[error("XSD validation failed")]
    XsdValidationFailed {
        /// Message type under validation, if known.
        message_type: Option<String>,
        /// Rule violations.
        errors: Vec<ValidationError>,
    },

    /// Registry input failed URL/shape validation.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A referenced quote id does not exist.
    #[error("quote not found: {0}")]
    QuoteNotFound(String),

    /// Quote id is not a recognizable identifier.
    #[error("invalid quote id: {0}")]
    InvalidQuoteId(String),

    /// Entity (payment, actor, conversation) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A numeric invariant broke. Never surfaced verbatim.
    #[error("invariant violation")]
    InvariantViolation,

    /// Database is unreachable or a query failed unexpectedly.
    #[error("database unavailable")]
    DbUnavailable(#[from] sqlx::Error),

    /// Ingress guard rejected the request.
    #[error("rate limit exceeded")]
    RateLimitExceeded {
        /// Limit that was exceeded.
        limit: u32,
        /// Seconds until the window resets.
        retry_after: u64,
    },
}

impl From<nexus_core::Error> for GatewayError {
    fn from(err: nexus_core::Error) -> Self {
        match err {
            nexus_core::Error::BadXml(m) => GatewayError::BadXml(m),
            nexus_core::Error::XsdValidationFailed {
                message_type,
                errors,
            } => GatewayError::XsdValidationFailed {
                message_type: Some(message_type),
                errors,
            },
            nexus_core::Error::SchemaNotLoaded(m) => GatewayError::XsdValidationFailed {
                message_type: Some(m),
                errors: vec![],
            },
            nexus_core::Error::QuoteNotFound(id) => GatewayError::QuoteNotFound(id),
            nexus_core::Error::QuoteExpired(id) => GatewayError::QuoteNotFound(id),
            nexus_core::Error::RateMismatch(id) => GatewayError::InvalidQuoteId(id),
            nexus_core::Error::InvalidUrl(m) => GatewayError::InvalidUrl(m),
            nexus_core::Error::InvariantViolation(m) => {
                tracing::error!(violation = %m, "invariant violation, failing closed");
                GatewayError::InvariantViolation
            }
            nexus_core::Error::NotFound(m) => GatewayError::NotFound(m),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_errors: Option<Vec<ValidationError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<&'static str>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::BadXml(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "BAD_XML",
                    message_type: None,
                    validation_errors: None,
                    reference: None,
                },
            ),
            GatewayError::XsdValidationFailed {
                message_type,
                errors,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "XSD_VALIDATION_FAILED",
                    message_type,
                    validation_errors: Some(errors),
                    reference: Some("https://www.iso20022.org"),
                },
            ),
            GatewayError::InvalidUrl(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "INVALID_URL",
                    message_type: None,
                    validation_errors: None,
                    reference: None,
                },
            ),
            GatewayError::InvalidQuoteId(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "INVALID_QUOTE_ID",
                    message_type: None,
                    validation_errors: None,
                    reference: None,
                },
            ),
            GatewayError::QuoteNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "QUOTE_NOT_FOUND",
                    message_type: None,
                    validation_errors: None,
                    reference: None,
                },
            ),
            GatewayError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "NOT_FOUND",
                    message_type: None,
                    validation_errors: None,
                    reference: None,
                },
            ),
            GatewayError::InvariantViolation => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "INTERNAL_ERROR",
                    message_type: None,
                    validation_errors: None,
                    reference: None,
                },
            ),
            GatewayError::DbUnavailable(ref e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        error: "DB_UNAVAILABLE",
                        message_type: None,
                        validation_errors: None,
                        reference: None,
                    },
                )
            }
            GatewayError::RateLimitExceeded { limit, retry_after } => {
                let resp = Json(json!({
                    "error": "RATE_LIMIT_EXCEEDED",
                    "message": "too many requests",
                    "retryAfter": retry_after,
                    "limit": limit,
                }));
                return (StatusCode::TOO_MANY_REQUESTS, resp).into_response();
            }
        };
        (status, Json(body)).into_response()
    }
}
