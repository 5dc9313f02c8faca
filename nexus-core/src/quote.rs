//! Quote Engine (C4): creation, disclosure, and expiry of FX quotes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::numeric::{self, InvariantInputs};
use crate::types::AmountType;

/// Validity window for every issued quote.
pub const QUOTE_VALIDITY_SECONDS: i64 = 600;

/// A live market-making quote from an FXP, as returned by an [`FxpPolicy`].
#[derive(Debug, Clone)]
pub struct FxpQuote {
    /// The FXP's actor id.
    pub fxp_id: String,
    /// Base spread the FXP charges, in basis points.
    pub base_spread_bps: i64,
    /// Live mid-market rate, destination units per source unit.
    pub base_rate: Decimal,
}

/// Pluggable FXP-selection policy. FXP routing/liquidity selection itself is
/// out of scope; this seam exists so a real routing engine can be dropped in
/// without touching quote math.
pub trait FxpPolicy: Send + Sync {
    /// Pick an FXP and its live rate for the named currency pair.
    fn quote(&self, source_currency: &str, destination_currency: &str) -> Result<FxpQuote>;

    /// Tier improvement in basis points for this request (loyalty/volume tier).
    fn tier_improvement_bps(&self, _source_currency: &str, _destination_currency: &str) -> i64 {
        0
    }

    /// PSP-specific improvement in basis points, if the requesting PSP has a
    /// negotiated rate.
    fn psp_improvement_bps(&self, _psp_bic: Option<&str>) -> i64 {
        0
    }
}

/// A single deterministic in-memory FXP roster, sufficient for a Release 1
/// sandbox deployment. Real FXP discovery/RFQ is a pluggable concern.
pub struct StaticFxpPolicy {
    rate_table: Vec<(String, String, FxpQuote)>,
}

impl StaticFxpPolicy {
    /// Build a policy from `(source, destination, fxp_id, base_spread_bps, base_rate)` tuples.
    pub fn new(rates: Vec<(&str, &str, &str, i64, Decimal)>) -> Self {
        let rate_table = rates
            .into_iter()
            .map(|(src, dst, fxp_id, spread, rate)| {
                (
                    src.to_string(),
                    dst.to_string(),
                    FxpQuote {
                        fxp_id: fxp_id.to_string(),
                        base_spread_bps: spread,
                        base_rate: rate,
                    },
                )
            })
            .collect();
        Self { rate_table }
    }
}

impl FxpPolicy for StaticFxpPolicy {
    fn quote(&self, source_currency: &str, destination_currency: &str) -> Result<FxpQuote> {
        self.rate_table
            .iter()
            .find(|(s, d, _)| s == source_currency && d == destination_currency)
            .map(|(_, _, q)| q.clone())
            .ok_or_else(|| {
                Error::QuoteNotFound(format!(
                    "no FXP rate for {source_currency}->{destination_currency}"
                ))
            })
    }
}

/// Request to create a quote.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    /// ISO 4217 source currency.
    pub source_currency: String,
    /// ISO 4217 destination currency.
    pub destination_currency: String,
    /// Amount, interpreted per `amount_type`.
    pub amount: Decimal,
    /// Whether `amount` pins the source or destination leg.
    pub amount_type: AmountType,
    /// Optional requesting PSP BIC, used for PSP-specific improvements.
    pub psp_bic: Option<String>,
}

/// An immutable, issued quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Unique quote id.
    pub quote_id: String,
    /// The FXP that issued this quote.
    pub fxp_id: String,
    /// ISO 4217 source currency.
    pub source_currency: String,
    /// ISO 4217 destination currency.
    pub destination_currency: String,
    /// Which leg the requester pinned.
    pub amount_type: AmountType,
    /// Mid-market rate, destination per source.
    pub base_rate: Decimal,
    /// Customer rate after applied spread.
    pub final_rate: Decimal,
    /// FXP's base spread, in basis points.
    pub base_spread_bps: i64,
    /// Tier improvement applied, in basis points.
    pub tier_improvement_bps: i64,
    /// PSP-specific improvement applied, in basis points.
    pub psp_improvement_bps: i64,
    /// `max(0, base - tier - psp)`.
    pub applied_spread_bps: i64,
    /// Source-currency leg amount.
    pub source_interbank_amount: Decimal,
    /// Destination-currency leg amount.
    pub destination_interbank_amount: Decimal,
    /// Net amount credited to the recipient after the destination fee.
    pub creditor_account_amount: Decimal,
    /// Destination PSP fee.
    pub destination_psp_fee: Decimal,
    /// When this quote was issued.
    pub created_at: DateTime<Utc>,
    /// When this quote stops being bindable. `created_at + 600s`.
    pub expires_at: DateTime<Utc>,
}

impl Quote {
    /// True while `now < expires_at`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// The full pre-transaction disclosure, read from the stored quote plus
/// derived source-side figures. Never recomputes the quote's own amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreTransactionDisclosure {
    /// The quote this disclosure was built from.
    pub quote_id: String,
    /// Mid-market rate.
    pub market_rate: Decimal,
    /// Customer rate.
    pub customer_rate: Decimal,
    /// Applied spread, in basis points.
    pub applied_spread_bps: i64,
    /// Net amount credited to the recipient.
    pub recipient_net_amount: Decimal,
    /// Gross destination payout before the destination fee.
    pub payout_gross_amount: Decimal,
    /// Destination PSP fee.
    pub destination_psp_fee: Decimal,
    /// ISO 4217 destination currency.
    pub destination_currency: String,
    /// Source-currency principal.
    pub sender_principal: Decimal,
    /// Source PSP fee.
    pub source_psp_fee: Decimal,
    /// Nexus scheme fee.
    pub scheme_fee: Decimal,
    /// `senderPrincipal + sourcePspFee + schemeFee`.
    pub sender_total: Decimal,
    /// ISO 4217 source currency.
    pub source_currency: String,
    /// `recipientNetAmount / senderTotal`.
    pub effective_rate: Decimal,
    /// Percentage cost relative to the mid-market principal.
    pub total_cost_percent: Decimal,
    /// Quote's expiry, carried through for the caller's convenience.
    pub quote_valid_until: DateTime<Utc>,
}

/// Quote creation, lookup and disclosure. Stateless: callers supply the
/// clock and persistence; this type is pure computation over an [`FxpPolicy`].
pub struct QuoteEngine<P: FxpPolicy> {
    policy: P,
}

impl<P: FxpPolicy> QuoteEngine<P> {
    /// Build an engine over the given FXP-selection policy.
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Create a quote per §4.4: floor the applied spread at zero, derive the
    /// two leg amounts from `amount_type`, compute the destination fee and
    /// net payout, and stamp a 600-second expiry from `now`.
    pub fn create_quote(&self, req: &QuoteRequest, now: DateTime<Utc>) -> Result<Quote> {
        let fxp = self
            .policy
            .quote(&req.source_currency, &req.destination_currency)?;
        let tier_bps = self
            .policy
            .tier_improvement_bps(&req.source_currency, &req.destination_currency);
        let psp_bps = self.policy.psp_improvement_bps(req.psp_bic.as_deref());

        let applied_spread_bps = (fxp.base_spread_bps - tier_bps - psp_bps).max(0);
        let spread_fraction = Decimal::new(applied_spread_bps, 4); // bps / 10_000
        let final_rate = fxp.base_rate * (Decimal::ONE - spread_fraction);

        let (source_interbank_amount, destination_interbank_amount) = match req.amount_type {
            AmountType::SourceFixed => {
                let source = numeric::quantize(req.amount, &req.source_currency);
                let destination =
                    numeric::quantize(source * final_rate, &req.destination_currency);
                (source, destination)
            }
            AmountType::DestinationFixed => {
                let destination = numeric::quantize(req.amount, &req.destination_currency);
                let source =
                    numeric::quantize(destination / final_rate, &req.source_currency);
                (source, destination)
            }
        };

        let destination_psp_fee =
            numeric::destination_fee(destination_interbank_amount, &req.destination_currency);
        let creditor_account_amount = numeric::quantize(
            destination_interbank_amount - destination_psp_fee,
            &req.destination_currency,
        );

        Ok(Quote {
            quote_id: Uuid::new_v4().to_string(),
            fxp_id: fxp.fxp_id,
            source_currency: req.source_currency.clone(),
            destination_currency: req.destination_currency.clone(),
            amount_type: req.amount_type,
            base_rate: fxp.base_rate,
            final_rate,
            base_spread_bps: fxp.base_spread_bps,
            tier_improvement_bps: tier_bps,
            psp_improvement_bps: psp_bps,
            applied_spread_bps,
            source_interbank_amount,
            destination_interbank_amount,
            creditor_account_amount,
            destination_psp_fee,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(QUOTE_VALIDITY_SECONDS),
        })
    }

    /// Look up a quote for binding purposes: `Err(QuoteExpired)` if stale.
    /// Never deletes the record; callers keep it for audit.
    pub fn check_live(quote: &Quote, now: DateTime<Utc>) -> Result<()> {
        if quote.is_live(now) {
            Ok(())
        } else {
            Err(Error::QuoteExpired(quote.quote_id.clone()))
        }
    }

    /// Build the pre-transaction disclosure from an already-stored,
    /// still-live quote. Rejects an expired quote with `QuoteExpired` before
    /// computing anything, then asserts I1-I5; any invariant violation is
    /// reported as `INVARIANT_VIOLATION` naming the quote id.
    pub fn disclose(
        &self,
        quote: &Quote,
        now: DateTime<Utc>,
        source_psp_fee_type: Option<&str>,
    ) -> Result<PreTransactionDisclosure> {
        let _ = source_psp_fee_type; // reserved for fee-schedule overrides, not modeled in Release 1

        Self::check_live(quote, now)?;

        let sender_principal = match quote.amount_type {
            AmountType::SourceFixed => quote.source_interbank_amount,
            AmountType::DestinationFixed => quote.source_interbank_amount,
        };
        let source_psp_fee = numeric::source_psp_fee(sender_principal, &quote.source_currency);
        let scheme_fee = numeric::scheme_fee(sender_principal, &quote.source_currency);
        let sender_total = numeric::quantize(
            sender_principal + source_psp_fee + scheme_fee,
            &quote.source_currency,
        );
        let effective_rate = if sender_total.is_zero() {
            Decimal::ZERO
        } else {
            quote.creditor_account_amount / sender_total
        };

        let mid_principal = quote.destination_interbank_amount / quote.base_rate;
        let total_cost_percent = if mid_principal.is_zero() {
            Decimal::ZERO
        } else {
            ((sender_total - mid_principal) / mid_principal) * Decimal::from(100)
        };

        numeric::require_invariants(
            &InvariantInputs {
                payout_gross_amount: quote.destination_interbank_amount,
                creditor_account_amount: quote.creditor_account_amount,
                destination_psp_fee: quote.destination_psp_fee,
                sender_principal,
                source_psp_fee,
                scheme_fee,
                sender_total,
                effective_rate,
                final_rate: quote.final_rate,
                base_rate: quote.base_rate,
                applied_spread_bps: quote.applied_spread_bps,
            },
            &quote.quote_id,
        )?;

        Ok(PreTransactionDisclosure {
            quote_id: quote.quote_id.clone(),
            market_rate: quote.base_rate.round_dp(4),
            customer_rate: quote.final_rate.round_dp(4),
            applied_spread_bps: quote.applied_spread_bps,
            recipient_net_amount: quote.creditor_account_amount,
            payout_gross_amount: quote.destination_interbank_amount,
            destination_psp_fee: quote.destination_psp_fee,
            destination_currency: quote.destination_currency.clone(),
            sender_principal,
            source_psp_fee,
            scheme_fee,
            sender_total,
            source_currency: quote.source_currency.clone(),
            effective_rate: effective_rate.round_dp(4),
            total_cost_percent: total_cost_percent.round_dp(4),
            quote_valid_until: quote.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn engine() -> QuoteEngine<StaticFxpPolicy> {
        QuoteEngine::new(StaticFxpPolicy::new(vec![(
            "SGD", "THB", "FXP-001", 50, dec!(25.85),
        )]))
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn happy_path_sgd_thb_matches_worked_example() {
        let quote = engine()
            .create_quote(
                &QuoteRequest {
                    source_currency: "SGD".to_string(),
                    destination_currency: "THB".to_string(),
                    amount: dec!(1000.00),
                    amount_type: AmountType::SourceFixed,
                    psp_bic: None,
                },
                now(),
            )
            .unwrap();

        assert_eq!(quote.final_rate, dec!(25.7207));
        assert_eq!(quote.source_interbank_amount, dec!(1000.00));
        assert_eq!(quote.destination_interbank_amount, dec!(25720.70));
        assert_eq!(quote.destination_psp_fee, dec!(35.72));
        assert_eq!(quote.creditor_account_amount, dec!(25684.98));
        assert_eq!(quote.expires_at - quote.created_at, chrono::Duration::seconds(600));
    }

    #[test]
    fn expiry_is_strict() {
        let quote = engine()
            .create_quote(
                &QuoteRequest {
                    source_currency: "SGD".to_string(),
                    destination_currency: "THB".to_string(),
                    amount: dec!(1000.00),
                    amount_type: AmountType::SourceFixed,
                    psp_bic: None,
                },
                now(),
            )
            .unwrap();

        assert!(QuoteEngine::<StaticFxpPolicy>::check_live(&quote, now() + chrono::Duration::seconds(599)).is_ok());
        assert!(QuoteEngine::<StaticFxpPolicy>::check_live(&quote, now() + chrono::Duration::seconds(601)).is_err());
    }

    #[test]
    fn disclosure_satisfies_invariants() {
        let e = engine();
        let quote = e
            .create_quote(
                &QuoteRequest {
                    source_currency: "SGD".to_string(),
                    destination_currency: "THB".to_string(),
                    amount: dec!(1000.00),
                    amount_type: AmountType::SourceFixed,
                    psp_bic: None,
                },
                now(),
            )
            .unwrap();
        let disclosure = e.disclose(&quote, now(), None).unwrap();
        assert!(disclosure.sender_total > disclosure.sender_principal);
        assert!(disclosure.effective_rate <= disclosure.market_rate);
    }

    #[test]
    fn disclose_rejects_expired_quote() {
        let e = engine();
        let quote = e
            .create_quote(
                &QuoteRequest {
                    source_currency: "SGD".to_string(),
                    destination_currency: "THB".to_string(),
                    amount: dec!(1000.00),
                    amount_type: AmountType::SourceFixed,
                    psp_bic: None,
                },
                now(),
            )
            .unwrap();

        let after_expiry = now() + chrono::Duration::seconds(QUOTE_VALIDITY_SECONDS + 1);
        let err = e.disclose(&quote, after_expiry, None).unwrap_err();
        assert!(matches!(err, Error::QuoteExpired(id) if id == quote.quote_id));
    }
}
