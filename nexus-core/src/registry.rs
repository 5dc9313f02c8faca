//! Participant Registry (C7) domain model.
//!
//! CRUD orchestration and persistence live in `nexus-gateway`; this module
//! owns the shape of an actor, secret generation, and callback-URL validation
//! rules so both the gateway and any future admin surface share one
//! definition of "valid registration."

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ActorKind;

/// Minimum entropy for a generated callback secret, per §4.7 ("≥ 32 bytes
/// from a cryptographic RNG").
pub const CALLBACK_SECRET_BYTES: usize = 32;

/// A registered participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantActor {
    /// Unique actor id.
    pub actor_id: String,
    /// Role this actor plays in the network.
    pub actor_kind: ActorKind,
    /// Legal entity name.
    pub legal_name: String,
    /// BIC/BICFI identifying this actor's institution.
    pub bicfi: String,
    /// URL the dispatcher POSTs status reports to.
    pub callback_url: String,
}

/// Generate a new callback secret: 32 random bytes, hex-encoded.
pub fn generate_callback_secret() -> String {
    let mut bytes = [0u8; CALLBACK_SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Validate a callback URL per §4.7: must parse as an absolute URL; scheme
/// must be `https` unless `allow_insecure` (sandbox mode) is set, in which
/// case `http` is also accepted.
pub fn validate_callback_url(url: &str, allow_insecure: bool) -> Result<()> {
    let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "https" => Ok(()),
        "http" if allow_insecure => Ok(()),
        other => Err(Error::InvalidUrl(format!(
            "scheme '{other}' not permitted for callback URL: {url}"
        ))),
    }
}

/// BIC/BICFI shape check: 8 or 11 alphanumeric characters.
pub fn is_valid_bic(bic: &str) -> bool {
    let len = bic.len();
    (len == 8 || len == 11) && bic.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_has_required_entropy() {
        let secret = generate_callback_secret();
        assert_eq!(secret.len(), CALLBACK_SECRET_BYTES * 2);
    }

    #[test]
    fn https_always_valid_http_only_in_sandbox() {
        assert!(validate_callback_url("https://psp.example.com/cb", false).is_ok());
        assert!(validate_callback_url("http://psp.example.com/cb", false).is_err());
        assert!(validate_callback_url("http://psp.example.com/cb", true).is_ok());
        assert!(validate_callback_url("not-a-url", true).is_err());
    }

    #[test]
    fn bic_shape() {
        assert!(is_valid_bic("DBSSSGSG"));
        assert!(is_valid_bic("DBSSSGSGXXX"));
        assert!(!is_valid_bic("SHORT"));
    }
}
