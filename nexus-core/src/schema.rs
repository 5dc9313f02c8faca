//! XML schema validator (C1).
//!
//! No crate in this workspace's lineage performs true XSD compilation; the
//! validator instead follows the structural, rule-per-element approach the
//! gateway's settlement engine already uses for ISO 20022 (`roxmltree`
//! traversal, `ValidationResult`/`ValidationError` accumulation). A
//! `SchemaRegistry` still loads and parses an `.xsd` file per message type
//! at startup, the way a real XSD engine would, so that a missing or
//! malformed schema directory is startup-fatal as the contract requires;
//! actual document checking then runs the structural rule set for the
//! detected message type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::MessageType;

/// Severity of a single rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Blocks acceptance of the document.
    Error,
    /// Logged, does not block acceptance.
    Warning,
}

/// One structural rule violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Short machine-readable code, e.g. `MISSING_FIELD`.
    pub code: String,
    /// Severity of the violation.
    pub severity: Severity,
    /// Dotted/slashed path to the offending element or attribute.
    pub field_path: String,
    /// Human-readable description.
    pub message: String,
}

/// Outcome of validating one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no error-severity violations were recorded.
    pub valid: bool,
    /// The message type validation ran against.
    pub message_type: Option<String>,
    /// Error-severity violations.
    pub errors: Vec<ValidationError>,
    /// Warning-severity violations.
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    fn success(message_type: Option<String>) -> Self {
        Self {
            valid: true,
            message_type,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn add_error(&mut self, code: &str, field_path: &str, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            code: code.to_string(),
            severity: Severity::Error,
            field_path: field_path.to_string(),
            message: message.into(),
        });
    }

    fn add_warning(&mut self, code: &str, field_path: &str, message: impl Into<String>) {
        self.warnings.push(ValidationError {
            code: code.to_string(),
            severity: Severity::Warning,
            field_path: field_path.to_string(),
            message: message.into(),
        });
    }
}

/// A loaded schema entry: just enough of the XSD to prove it parsed and to
/// know its declared namespace; actual checking is rule-based.
#[derive(Debug, Clone)]
struct SchemaEntry {
    namespace: String,
}

/// Registry of loaded schemas, read-only after startup (§5 shared-state
/// contract: the schema cache is process-global and read-only once built).
pub struct SchemaRegistry {
    schemas: HashMap<MessageType, SchemaEntry>,
    max_body_bytes: usize,
}

const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024; // 1 MiB, per §5 suggestion.

impl SchemaRegistry {
    /// Load every supported message family's XSD from `dir`. Fatal
    /// (returns `Err`) if the directory is unreadable or any required
    /// schema fails to parse as well-formed XML; the caller should treat
    /// this as startup-fatal.
    pub fn load(dir: &Path) -> Result<Self> {
        let families = [
            MessageType::Pacs008,
            MessageType::Pacs002,
            MessageType::Acmt023,
            MessageType::Acmt024,
            MessageType::Camt054,
            MessageType::Camt103,
            MessageType::Pain001,
            MessageType::Pacs004,
            MessageType::Pacs028,
            MessageType::Camt056,
            MessageType::Camt029,
        ];

        let mut schemas = HashMap::new();
        for message_type in families {
            let file_name = format!("{}.xsd", message_type.schema_id());
            let path = dir.join(&file_name);
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                Error::SchemaNotLoaded(format!("{}: {e}", path.display()))
            })?;
            let doc = roxmltree::Document::parse(&contents).map_err(|e| {
                Error::SchemaNotLoaded(format!("{} did not parse: {e}", path.display()))
            })?;
            let namespace = doc
                .root_element()
                .attribute("targetNamespace")
                .unwrap_or_default()
                .to_string();
            schemas.insert(message_type, SchemaEntry { namespace });
        }

        Ok(Self {
            schemas,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Build a registry in-memory without touching the filesystem, for
    /// tests and for environments that embed schema text directly.
    pub fn from_namespaces(entries: &[(MessageType, &str)]) -> Self {
        let mut schemas = HashMap::new();
        for (mt, ns) in entries {
            schemas.insert(
                *mt,
                SchemaEntry {
                    namespace: (*ns).to_string(),
                },
            );
        }
        Self {
            schemas,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Detect the message type from the document's root `xmlns`.
    pub fn detect_message_type(&self, xml: &str) -> Option<MessageType> {
        let doc = roxmltree::Document::parse(xml).ok()?;
        let ns = doc.root_element().tag_name().namespace()?;
        MessageType::from_namespace(ns)
    }

    /// Validate `xml` against the schema for `message_type`, or the
    /// auto-detected type when `message_type` is `None`.
    pub fn validate(&self, xml: &str, message_type: Option<MessageType>) -> ValidationResult {
        if xml.len() > self.max_body_bytes {
            let mut result = ValidationResult::success(message_type.map(|m| m.short_name().to_string()));
            result.add_error(
                "BODY_TOO_LARGE",
                "root",
                format!("body exceeds {} bytes", self.max_body_bytes),
            );
            return result;
        }

        let message_type = match message_type.or_else(|| self.detect_message_type(xml)) {
            Some(mt) => mt,
            None => {
                let mut result = ValidationResult::success(None);
                result.add_error(
                    "SCHEMA_NOT_LOADED",
                    "Document@xmlns",
                    "could not detect message type from namespace",
                );
                return result;
            }
        };

        if !self.schemas.contains_key(&message_type) {
            let mut result =
                ValidationResult::success(Some(message_type.short_name().to_string()));
            result.add_error(
                "SCHEMA_NOT_LOADED",
                "Document@xmlns",
                format!("no schema loaded for {}", message_type.short_name()),
            );
            return result;
        }

        let doc = match roxmltree::Document::parse(xml) {
            Ok(d) => d,
            Err(e) => {
                let mut result =
                    ValidationResult::success(Some(message_type.short_name().to_string()));
                result.add_error("XML_PARSE_ERROR", "root", format!("XML parsing failed: {e}"));
                return result;
            }
        };

        let mut result = ValidationResult::success(Some(message_type.short_name().to_string()));
        let root = doc.root_element();
        if root.tag_name().name() != "Document" {
            result.add_error(
                "INVALID_ROOT",
                "root",
                format!("expected 'Document' root element, found '{}'", root.tag_name().name()),
            );
            return result;
        }

        match message_type {
            MessageType::Pacs008 => self.validate_pacs008(&root, &mut result),
            MessageType::Pacs002 => self.validate_pacs002(&root, &mut result),
            MessageType::Acmt023 | MessageType::Acmt024 => {
                self.validate_acmt(&root, message_type, &mut result)
            }
            _ => self.validate_generic(&root, &mut result),
        }

        result
    }

    /// Extract the transaction reference without failing on malformed
    /// input. Tries `<UETR>` then `<OrgnlEndToEndId>` then `<EndToEndId>`,
    /// depth-first, anywhere in the document.
    pub fn safe_extract_uetr(&self, xml: &str) -> Option<String> {
        let doc = roxmltree::Document::parse(xml).ok()?;
        for tag in ["UETR", "OrgnlEndToEndId", "EndToEndId"] {
            if let Some(node) = doc
                .descendants()
                .find(|n| n.is_element() && n.tag_name().name() == tag)
            {
                if let Some(text) = node.text() {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        return Some(trimmed.to_string());
                    }
                }
            }
        }
        None
    }

    fn validate_pacs008(&self, node: &roxmltree::Node, result: &mut ValidationResult) {
        let body = match node
            .children()
            .find(|n| n.tag_name().name() == "FIToFICstmrCdtTrf")
        {
            Some(n) => n,
            None => {
                result.add_error(
                    "MISSING_ELEMENT",
                    "FIToFICstmrCdtTrf",
                    "missing FIToFICstmrCdtTrf element",
                );
                return;
            }
        };

        self.validate_group_header(&body, result);

        let tx = match body.children().find(|n| n.tag_name().name() == "CdtTrfTxInf") {
            Some(n) => n,
            None => {
                result.add_error("MISSING_ELEMENT", "CdtTrfTxInf", "missing CdtTrfTxInf element");
                return;
            }
        };

        if tx.children().find(|n| n.tag_name().name() == "PmtId").is_none() {
            result.add_error("MISSING_ELEMENT", "CdtTrfTxInf/PmtId", "missing PmtId");
        }

        match tx.children().find(|n| n.tag_name().name() == "IntrBkSttlmAmt") {
            Some(amt) => self.validate_amount(&amt, "CdtTrfTxInf/IntrBkSttlmAmt", result),
            None => result.add_error(
                "MISSING_FIELD",
                "CdtTrfTxInf/IntrBkSttlmAmt",
                "missing IntrBkSttlmAmt",
            ),
        }

        for (tag, path) in [("Dbtr", "CdtTrfTxInf/Dbtr"), ("Cdtr", "CdtTrfTxInf/Cdtr")] {
            match tx.children().find(|n| n.tag_name().name() == tag) {
                Some(party) => self.validate_party(&party, path, result),
                None => result.add_error("MISSING_ELEMENT", path, format!("missing {tag}")),
            }
        }
    }

    fn validate_pacs002(&self, node: &roxmltree::Node, result: &mut ValidationResult) {
        let body = match node
            .children()
            .find(|n| n.tag_name().name() == "FIToFIPmtStsRpt")
        {
            Some(n) => n,
            None => {
                result.add_error(
                    "MISSING_ELEMENT",
                    "FIToFIPmtStsRpt",
                    "missing FIToFIPmtStsRpt element",
                );
                return;
            }
        };
        self.validate_group_header(&body, result);

        if body
            .children()
            .find(|n| n.tag_name().name() == "TxInfAndSts")
            .is_none()
        {
            result.add_error("MISSING_ELEMENT", "TxInfAndSts", "missing TxInfAndSts");
        }
    }

    fn validate_acmt(
        &self,
        node: &roxmltree::Node,
        message_type: MessageType,
        result: &mut ValidationResult,
    ) {
        let tag = match message_type {
            MessageType::Acmt023 => "IdVrfctnRqst",
            MessageType::Acmt024 => "IdVrfctnRpt",
            _ => unreachable!(),
        };
        if node.children().find(|n| n.tag_name().name() == tag).is_none() {
            result.add_warning(
                "MISSING_ELEMENT",
                tag,
                format!("missing {tag}; structural check is lenient for {message_type:?}"),
            );
        }
    }

    fn validate_generic(&self, node: &roxmltree::Node, result: &mut ValidationResult) {
        if !node.has_children() {
            result.add_warning("EMPTY_DOCUMENT", "Document", "document body is empty");
        }
    }

    fn validate_group_header(&self, node: &roxmltree::Node, result: &mut ValidationResult) {
        let grp_hdr = match node.children().find(|n| n.tag_name().name() == "GrpHdr") {
            Some(n) => n,
            None => {
                result.add_error("MISSING_ELEMENT", "GrpHdr", "missing GrpHdr element");
                return;
            }
        };

        match self.child_text(&grp_hdr, "MsgId") {
            Some(id) if !id.is_empty() && id.len() <= 35 => {}
            Some(id) => result.add_error(
                "INVALID_LENGTH",
                "GrpHdr/MsgId",
                format!("MsgId must be 1-35 characters, got {}", id.len()),
            ),
            None => result.add_error("MISSING_FIELD", "GrpHdr/MsgId", "missing MsgId"),
        }

        if self.child_text(&grp_hdr, "CreDtTm").is_none() {
            result.add_error("MISSING_FIELD", "GrpHdr/CreDtTm", "missing CreDtTm");
        }
    }

    fn validate_amount(&self, node: &roxmltree::Node, path: &str, result: &mut ValidationResult) {
        let ccy = match node.attribute("Ccy") {
            Some(c) => c,
            None => {
                result.add_error("MISSING_ATTRIBUTE", &format!("{path}@Ccy"), "missing Ccy attribute");
                return;
            }
        };

        match node.text().map(|t| t.parse::<Decimal>()) {
            Some(Ok(amount)) if amount > Decimal::ZERO => {}
            Some(Ok(_)) => result.add_error("INVALID_AMOUNT", path, "amount must be greater than zero"),
            Some(Err(_)) => result.add_error("INVALID_FORMAT", path, "amount is not a valid decimal"),
            None => result.add_error("MISSING_VALUE", path, "amount value is empty"),
        }

        let _ = ccy;
    }

    fn validate_party(&self, node: &roxmltree::Node, path: &str, result: &mut ValidationResult) {
        if self.child_text(node, "Nm").is_none() {
            result.add_warning("MISSING_FIELD", &format!("{path}/Nm"), "missing party name");
        }

        match node.children().find(|n| n.tag_name().name() == "FinInstnId") {
            Some(fin_instn) => match self.child_text(&fin_instn, "BICFI") {
                Some(bic) if is_valid_bic(&bic) => {}
                Some(bic) => result.add_error(
                    "INVALID_BIC",
                    &format!("{path}/FinInstnId/BICFI"),
                    format!("invalid BIC format: {bic}"),
                ),
                None => result.add_error(
                    "MISSING_FIELD",
                    &format!("{path}/FinInstnId/BICFI"),
                    "missing BIC code",
                ),
            },
            None => result.add_error(
                "MISSING_ELEMENT",
                &format!("{path}/FinInstnId"),
                "missing FinInstnId",
            ),
        }
    }

    fn child_text(&self, node: &roxmltree::Node, tag: &str) -> Option<String> {
        node.children()
            .find(|n| n.tag_name().name() == tag)
            .and_then(|n| n.text())
            .map(|s| s.to_string())
    }
}

fn is_valid_bic(bic: &str) -> bool {
    let len = bic.len();
    (len == 8 || len == 11) && bic.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_namespaces(&[
            (MessageType::Pacs008, "urn:iso:std:iso:20022:tech:xsd:pacs.008.001.13"),
            (MessageType::Pacs002, "urn:iso:std:iso:20022:tech:xsd:pacs.002.001.15"),
        ])
    }

    #[test]
    fn valid_pacs008_passes() {
        let xml = r#"<?xml version="1.0"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pacs.008.001.13">
  <FIToFICstmrCdtTrf>
    <GrpHdr><MsgId>MSG001</MsgId><CreDtTm>2026-01-01T00:00:00Z</CreDtTm></GrpHdr>
    <CdtTrfTxInf>
      <PmtId><EndToEndId>E2E1</EndToEndId><UETR>a1b2c3d4-0000-0000-0000-000000000001</UETR></PmtId>
      <IntrBkSttlmAmt Ccy="SGD">1000.00</IntrBkSttlmAmt>
      <Dbtr><Nm>Alice</Nm><FinInstnId><BICFI>DBSSSGSG</BICFI></FinInstnId></Dbtr>
      <Cdtr><Nm>Bob</Nm><FinInstnId><BICFI>BBLTHBKK</BICFI></FinInstnId></Cdtr>
    </CdtTrfTxInf>
  </FIToFICstmrCdtTrf>
</Document>"#;
        let result = registry().validate(xml, Some(MessageType::Pacs008));
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn missing_bic_is_rejected() {
        let xml = r#"<?xml version="1.0"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pacs.008.001.13">
  <FIToFICstmrCdtTrf>
    <GrpHdr><MsgId>MSG001</MsgId><CreDtTm>2026-01-01T00:00:00Z</CreDtTm></GrpHdr>
    <CdtTrfTxInf>
      <PmtId><EndToEndId>E2E1</EndToEndId></PmtId>
      <IntrBkSttlmAmt Ccy="SGD">1000.00</IntrBkSttlmAmt>
      <Dbtr><Nm>Alice</Nm><FinInstnId><BICFI>BAD</BICFI></FinInstnId></Dbtr>
      <Cdtr><Nm>Bob</Nm><FinInstnId><BICFI>BBLTHBKK</BICFI></FinInstnId></Cdtr>
    </CdtTrfTxInf>
  </FIToFICstmrCdtTrf>
</Document>"#;
        let result = registry().validate(xml, Some(MessageType::Pacs008));
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.code == "INVALID_BIC"));
    }

    #[test]
    fn malformed_xml_reports_parse_error() {
        let result = registry().validate("<not-xml", Some(MessageType::Pacs008));
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, "XML_PARSE_ERROR");
    }

    #[test]
    fn safe_extract_uetr_survives_malformed_input() {
        let xml = "<Document><PmtId><UETR>a1b2c3d4-0000-0000-0000-000000000001</UETR>";
        assert_eq!(
            registry().safe_extract_uetr(xml),
            Some("a1b2c3d4-0000-0000-0000-000000000001".to_string())
        );
        assert_eq!(registry().safe_extract_uetr("not xml at all"), None);
    }
}
