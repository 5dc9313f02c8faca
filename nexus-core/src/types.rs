//! Shared ISO 20022 semantic types used across the core.

use serde::{Deserialize, Serialize};

/// ISO 20022 message families the gateway ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Customer credit transfer (payment instruction).
    Pacs008,
    /// Payment status report.
    Pacs002,
    /// Proxy-resolution request.
    Acmt023,
    /// Proxy-resolution response.
    Acmt024,
    /// FI-to-FI payment cancellation request (recall).
    Camt056,
    /// Resolution of investigation.
    Camt029,
    /// Debit/credit notification.
    Camt054,
    /// Notification to receive (reservation).
    Camt103,
    /// Customer credit transfer initiation.
    Pain001,
    /// Payment return.
    Pacs004,
    /// FI-to-FI payment status request.
    Pacs028,
}

impl MessageType {
    /// The XSD message identifier, as used in `urn:iso:std:iso:20022:tech:xsd:<id>`.
    pub fn schema_id(&self) -> &'static str {
        match self {
            MessageType::Pacs008 => "pacs.008.001.13",
            MessageType::Pacs002 => "pacs.002.001.15",
            MessageType::Acmt023 => "acmt.023.001.04",
            MessageType::Acmt024 => "acmt.024.001.04",
            MessageType::Camt056 => "camt.056.001.11",
            MessageType::Camt029 => "camt.029.001.13",
            MessageType::Camt054 => "camt.054.001.13",
            MessageType::Camt103 => "camt.103.001.03",
            MessageType::Pain001 => "pain.001.001.12",
            MessageType::Pacs004 => "pacs.004.001.14",
            MessageType::Pacs028 => "pacs.028.001.06",
        }
    }

    /// The wire name used in headers, events, and the `messageType` field (e.g. "pacs.008").
    pub fn short_name(&self) -> &'static str {
        match self {
            MessageType::Pacs008 => "pacs.008",
            MessageType::Pacs002 => "pacs.002",
            MessageType::Acmt023 => "acmt.023",
            MessageType::Acmt024 => "acmt.024",
            MessageType::Camt056 => "camt.056",
            MessageType::Camt029 => "camt.029",
            MessageType::Camt054 => "camt.054",
            MessageType::Camt103 => "camt.103",
            MessageType::Pain001 => "pain.001",
            MessageType::Pacs004 => "pacs.004",
            MessageType::Pacs028 => "pacs.028",
        }
    }

    /// Derive a message type from an XSD `targetNamespace` or document `xmlns`,
    /// taking the final colon-separated path component (e.g.
    /// `urn:iso:std:iso:20022:tech:xsd:pacs.008.001.13` -> `pacs.008.001.13`).
    pub fn from_namespace(ns: &str) -> Option<Self> {
        let last = ns.rsplit(':').next()?;
        let family = last.split('.').take(2).collect::<Vec<_>>().join(".");
        match family.as_str() {
            "pacs.008" => Some(MessageType::Pacs008),
            "pacs.002" => Some(MessageType::Pacs002),
            "acmt.023" => Some(MessageType::Acmt023),
            "acmt.024" => Some(MessageType::Acmt024),
            "camt.056" => Some(MessageType::Camt056),
            "camt.029" => Some(MessageType::Camt029),
            "camt.054" => Some(MessageType::Camt054),
            "camt.103" => Some(MessageType::Camt103),
            "pain.001" => Some(MessageType::Pain001),
            "pacs.004" => Some(MessageType::Pacs004),
            "pacs.028" => Some(MessageType::Pacs028),
            _ => None,
        }
    }
}

/// Whether a quote request pins the source or destination leg amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmountType {
    /// `amount` is the source-currency principal.
    SourceFixed,
    /// `amount` is the destination-currency payout.
    DestinationFixed,
}

/// Lifecycle status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Instruction received, not yet bound to a quote.
    Received,
    /// Quote-binding succeeded; awaiting downstream disposition.
    Submitted,
    /// Terminal: accepted (`ACCC`).
    Accepted,
    /// Terminal: rejected (`RJCT`).
    Rejected,
    /// Terminal: returned via a subsequent pacs.008.
    Returned,
    /// Terminal: recalled via a resolved camt.056 investigation.
    Recalled,
}

impl PaymentStatus {
    /// Terminal states never transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Accepted
                | PaymentStatus::Rejected
                | PaymentStatus::Returned
                | PaymentStatus::Recalled
        )
    }
}

/// Participant actor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActorKind {
    /// Foreign Exchange Provider.
    Fxp,
    /// Instant Payment System Operator.
    Ipso,
    /// Payment Service Provider.
    Psp,
    /// Settlement Access Provider.
    Sap,
    /// Proxy Directory Operator.
    Pdo,
}

/// The fixed, closed set of ISO 20022 status-report reason codes. Used verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    /// Transaction aborted (timeout).
    Ab03,
    /// Quote expired / rate mismatch.
    Ab04,
    /// Invalid cut-off time.
    Tm01,
    /// Incorrect account number.
    Ac01,
    /// Closed account.
    Ac04,
    /// Amount above limit.
    Am02,
    /// Insufficient funds.
    Am04,
    /// Duplicate payment.
    Dupl,
    /// Not specified (customer).
    Ms02,
    /// Regulatory block.
    Rr04,
    /// Invalid proxy.
    Be23,
    /// Invalid settlement agent.
    Rc11,
    /// Narrative (free-text).
    Narr,
}

impl ReasonCode {
    /// The four-letter ISO 20022 code, verbatim.
    pub fn code(&self) -> &'static str {
        match self {
            ReasonCode::Ab03 => "AB03",
            ReasonCode::Ab04 => "AB04",
            ReasonCode::Tm01 => "TM01",
            ReasonCode::Ac01 => "AC01",
            ReasonCode::Ac04 => "AC04",
            ReasonCode::Am02 => "AM02",
            ReasonCode::Am04 => "AM04",
            ReasonCode::Dupl => "DUPL",
            ReasonCode::Ms02 => "MS02",
            ReasonCode::Rr04 => "RR04",
            ReasonCode::Be23 => "BE23",
            ReasonCode::Rc11 => "RC11",
            ReasonCode::Narr => "NARR",
        }
    }

    /// Human description, drawn from the glossary.
    pub fn description(&self) -> &'static str {
        match self {
            ReasonCode::Ab03 => "Transaction aborted (timeout)",
            ReasonCode::Ab04 => "Quote expired / rate mismatch",
            ReasonCode::Tm01 => "Invalid cut-off time",
            ReasonCode::Ac01 => "Incorrect account number",
            ReasonCode::Ac04 => "Closed account",
            ReasonCode::Am02 => "Amount above limit",
            ReasonCode::Am04 => "Insufficient funds",
            ReasonCode::Dupl => "Duplicate payment",
            ReasonCode::Ms02 => "Not specified (customer)",
            ReasonCode::Rr04 => "Regulatory block",
            ReasonCode::Be23 => "Invalid proxy",
            ReasonCode::Rc11 => "Invalid settlement agent",
            ReasonCode::Narr => "Narrative (free-text)",
        }
    }
}

/// The distinguished prefix embedded in a return's remittance-info free-text,
/// naming the original payment this return refers to.
pub const NEXUS_ORIGINAL_UETR_PREFIX: &str = "NEXUSORIGINALUETR:";

/// Matches `NEXUSORIGINALUETR:<uuid>` in remittance-info free-text and
/// returns the referenced UETR, lowercased.
pub fn extract_original_uetr(remittance_info: &str) -> Option<String> {
    let idx = remittance_info.find(NEXUS_ORIGINAL_UETR_PREFIX)?;
    let rest = &remittance_info[idx + NEXUS_ORIGINAL_UETR_PREFIX.len()..];
    let uuid_str: String = rest
        .chars()
        .take_while(|c| c.is_ascii_hexdigit() || *c == '-')
        .collect();
    uuid::Uuid::parse_str(&uuid_str)
        .ok()
        .map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_detection() {
        assert_eq!(
            MessageType::from_namespace("urn:iso:std:iso:20022:tech:xsd:pacs.008.001.13"),
            Some(MessageType::Pacs008)
        );
        assert_eq!(
            MessageType::from_namespace("urn:iso:std:iso:20022:tech:xsd:camt.056.001.11"),
            Some(MessageType::Camt056)
        );
        assert_eq!(MessageType::from_namespace("not-a-namespace"), None);
    }

    #[test]
    fn original_uetr_extraction() {
        let uetr = "a1b2c3d4-0000-0000-0000-000000000001";
        let remit = format!("Return for payment NEXUSORIGINALUETR:{uetr} processed");
        assert_eq!(extract_original_uetr(&remit), Some(uetr.to_string()));
        assert_eq!(extract_original_uetr("no marker here"), None);
    }
}
