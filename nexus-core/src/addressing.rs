//! Addressing Correlator (C8) domain model.
//!
//! A proxy-resolution conversation is keyed by a `correlationId`, which is
//! never a UETR: proxy resolution happens before a payment exists. This
//! module models the outcome of a resolved/unresolved conversation; the
//! request/response pair itself is persisted as events by `nexus-gateway`.

use serde::{Deserialize, Serialize};

/// Outcome of a proxy-resolution conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// The proxy resolved to an account.
    Resolved {
        /// Resolved account identifier.
        account_id: String,
        /// Masked account-holder name, safe to log/return.
        masked_name: String,
        /// BIC of the resolving institution.
        bic: String,
    },
    /// The proxy did not resolve; carries reason code `BE23`.
    Unresolved,
}

/// Mask an account-holder name for inclusion in an acmt.024 response: first
/// character kept, remainder redacted.
pub fn mask_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{first}{}", "*".repeat(chars.count().max(1))),
        None => "REDACTED".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_first_character() {
        assert_eq!(mask_name("Alice"), "A****");
        assert_eq!(mask_name(""), "REDACTED");
    }
}
