//! Fixed-decimal arithmetic kernel.
//!
//! All monetary math lives here so that fee tables are not duplicated
//! across modules (design note: the source duplicated them, this is the
//! single source of truth). Every computation touching I1-I8 uses
//! `rust_decimal::Decimal` with half-even rounding; floating point never
//! appears in this module.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// `{fixed, percent, min, max}` destination fee structure for one currency.
#[derive(Debug, Clone, Copy)]
pub struct FeeStructure {
    /// Flat component.
    pub fixed: Decimal,
    /// Proportional component, as a fraction (0.001 = 0.1%).
    pub percent: Decimal,
    /// Floor after the fixed+percent calculation.
    pub min: Decimal,
    /// Ceiling after the fixed+percent calculation.
    pub max: Decimal,
}

impl FeeStructure {
    fn apply(&self, base: Decimal) -> Decimal {
        let calculated = self.fixed + base * self.percent;
        calculated.clamp(self.min, self.max)
    }
}

/// Per-currency destination fee table. Currencies absent from this table
/// fall back to [`default_fee_structure`].
pub fn destination_fee_table() -> HashMap<&'static str, FeeStructure> {
    let mut m = HashMap::new();
    m.insert(
        "SGD",
        FeeStructure {
            fixed: dec(50, 2),
            percent: dec(1, 3),
            min: dec(50, 2),
            max: dec(500, 2),
        },
    );
    m.insert(
        "THB",
        FeeStructure {
            fixed: dec(1000, 2),
            percent: dec(1, 3),
            min: dec(1000, 2),
            max: dec(10000, 2),
        },
    );
    m.insert(
        "MYR",
        FeeStructure {
            fixed: dec(100, 2),
            percent: dec(1, 3),
            min: dec(100, 2),
            max: dec(1000, 2),
        },
    );
    m.insert(
        "PHP",
        FeeStructure {
            fixed: dec(2500, 2),
            percent: dec(2, 3),
            min: dec(2500, 2),
            max: dec(25000, 2),
        },
    );
    m.insert(
        "IDR",
        FeeStructure {
            fixed: Decimal::from(500),
            percent: dec(1, 3),
            min: Decimal::from(500),
            max: Decimal::from(50_000),
        },
    );
    m.insert(
        "INR",
        FeeStructure {
            fixed: dec(2500, 2),
            percent: dec(1, 3),
            min: dec(2500, 2),
            max: dec(25000, 2),
        },
    );
    m
}

/// Fallback fee structure for currencies not named in the table.
pub fn default_fee_structure() -> FeeStructure {
    FeeStructure {
        fixed: dec(100, 2),
        percent: dec(1, 3),
        min: dec(100, 2),
        max: dec(1000, 2),
    }
}

fn dec(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

/// Per-currency decimal scale. Defaults to 2 (most currencies); zero-decimal
/// currencies are named explicitly.
pub fn currency_scale(currency: &str) -> u32 {
    match currency {
        "JPY" | "IDR" => 0,
        _ => 2,
    }
}

/// Round `amount` to the currency's scale, half-even.
pub fn quantize(amount: Decimal, currency: &str) -> Decimal {
    amount.round_dp_with_strategy(currency_scale(currency), RoundingStrategy::MidpointNearestEven)
}

/// Destination PSP fee charged against the gross destination payout.
pub fn destination_fee(gross_payout: Decimal, currency: &str) -> Decimal {
    let table = destination_fee_table();
    let structure = table
        .get(currency)
        .copied()
        .unwrap_or_else(default_fee_structure);
    quantize(structure.apply(gross_payout), currency)
}

/// Source PSP fee: `0.50 + principal * 0.001`, clamped to `[0.50, 10.00]`.
pub fn source_psp_fee(principal: Decimal, currency: &str) -> Decimal {
    let fee = (dec(50, 2) + principal * dec(1, 3)).clamp(dec(50, 2), dec(1000, 2));
    quantize(fee, currency)
}

/// Nexus scheme fee: `0.10 + principal * 0.0005`, clamped to `[0.10, 5.00]`.
pub fn scheme_fee(principal: Decimal, currency: &str) -> Decimal {
    let fee = (dec(10, 2) + principal * dec(5, 4)).clamp(dec(10, 2), dec(500, 2));
    quantize(fee, currency)
}

/// The nine numbered invariants over a bound disclosure/payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// `payoutGrossAmount = creditorAccountAmount + destinationPspFee`.
    I1PayoutDecomposition,
    /// `senderTotal = senderPrincipal + sourcePspFee + schemeFee`.
    I2SenderDecomposition,
    /// `effectiveRate = creditorAccountAmount / senderTotal`.
    I3EffectiveRate,
    /// `finalRate <= baseRate` whenever the applied spread is non-negative.
    I4SpreadSign,
    /// All amounts strictly positive.
    I5Positivity,
}

/// Inputs to [`assert_invariants`]. Mirrors the fields a disclosure or bound
/// payment carries; all amounts already quantized to their currency's scale.
#[derive(Debug, Clone)]
pub struct InvariantInputs {
    /// Gross destination-currency payout before the destination fee.
    pub payout_gross_amount: Decimal,
    /// Net amount credited to the recipient.
    pub creditor_account_amount: Decimal,
    /// Destination PSP fee.
    pub destination_psp_fee: Decimal,
    /// Source-currency principal the sender instructed.
    pub sender_principal: Decimal,
    /// Source PSP fee.
    pub source_psp_fee: Decimal,
    /// Nexus scheme fee.
    pub scheme_fee: Decimal,
    /// Total the sender is debited: principal + fees.
    pub sender_total: Decimal,
    /// Effective rate: `creditor_account_amount / sender_total`.
    pub effective_rate: Decimal,
    /// Customer (applied) rate.
    pub final_rate: Decimal,
    /// Mid-market rate the quote was built from.
    pub base_rate: Decimal,
    /// Basis points applied as spread; invariant I4 only binds when >= 0.
    pub applied_spread_bps: i64,
}

const TOLERANCE_AMOUNT: &str = "0.01";
const TOLERANCE_RATE: &str = "0.0001";

/// Check I1-I5 and return every violated invariant (empty iff acceptable).
pub fn assert_invariants(inputs: &InvariantInputs) -> Vec<Invariant> {
    let amount_tol = Decimal::from_str(TOLERANCE_AMOUNT).unwrap();
    let rate_tol = Decimal::from_str(TOLERANCE_RATE).unwrap();
    let mut violations = Vec::new();

    if (inputs.payout_gross_amount - (inputs.creditor_account_amount + inputs.destination_psp_fee))
        .abs()
        > amount_tol
    {
        violations.push(Invariant::I1PayoutDecomposition);
    }

    if (inputs.sender_total
        - (inputs.sender_principal + inputs.source_psp_fee + inputs.scheme_fee))
        .abs()
        > amount_tol
    {
        violations.push(Invariant::I2SenderDecomposition);
    }

    if inputs.sender_total != Decimal::ZERO {
        let expected_rate = inputs.creditor_account_amount / inputs.sender_total;
        if (inputs.effective_rate - expected_rate).abs() > rate_tol {
            violations.push(Invariant::I3EffectiveRate);
        }
    } else {
        violations.push(Invariant::I3EffectiveRate);
    }

    if inputs.applied_spread_bps >= 0 && inputs.final_rate > inputs.base_rate {
        violations.push(Invariant::I4SpreadSign);
    }

    let all_positive = [
        inputs.creditor_account_amount,
        inputs.payout_gross_amount,
        inputs.sender_principal,
        inputs.sender_total,
    ]
    .iter()
    .all(|v| *v > Decimal::ZERO);
    if !all_positive {
        violations.push(Invariant::I5Positivity);
    }

    violations
}

/// Run [`assert_invariants`] and turn any violation into a fatal, fail-closed
/// error. Callers must not persist state when this returns `Err`.
pub fn require_invariants(inputs: &InvariantInputs, context: &str) -> Result<()> {
    let violations = assert_invariants(inputs);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::InvariantViolation(format!(
            "{context}: {violations:?}"
        )))
    }
}

/// I6: a payment instruction's bound amounts/rate must match the quote's, to
/// the currency's scale.
pub fn amounts_match(a: Decimal, b: Decimal, currency: &str) -> bool {
    quantize(a, currency) == quantize(b, currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn thb_destination_fee_matches_worked_example() {
        // 1000.00 SGD @ finalRate 25.7207 -> destinationInterbankAmount 25720.70
        let gross = dec!(25720.70);
        let fee = destination_fee(gross, "THB");
        assert_eq!(fee, dec!(35.72));
    }

    #[test]
    fn destination_fee_respects_bounds() {
        let tiny = destination_fee(dec!(1.00), "SGD");
        assert_eq!(tiny, dec!(0.50));
        let huge = destination_fee(dec!(1_000_000.00), "SGD");
        assert_eq!(huge, dec!(5.00));
    }

    #[test]
    fn source_fee_and_scheme_fee_bounds() {
        assert_eq!(source_psp_fee(dec!(0), "USD"), dec!(0.50));
        assert_eq!(source_psp_fee(dec!(100_000), "USD"), dec!(10.00));
        assert_eq!(scheme_fee(dec!(0), "USD"), dec!(0.10));
        assert_eq!(scheme_fee(dec!(100_000), "USD"), dec!(5.00));
    }

    #[test]
    fn invariants_hold_for_consistent_inputs() {
        let inputs = InvariantInputs {
            payout_gross_amount: dec!(25720.70),
            creditor_account_amount: dec!(25684.98),
            destination_psp_fee: dec!(35.72),
            sender_principal: dec!(1000.00),
            source_psp_fee: dec!(1.50),
            scheme_fee: dec!(0.60),
            sender_total: dec!(1002.10),
            effective_rate: dec!(25684.98) / dec!(1002.10),
            final_rate: dec!(25.7207),
            base_rate: dec!(25.85),
            applied_spread_bps: 50,
        };
        assert!(assert_invariants(&inputs).is_empty());
    }

    #[test]
    fn invariant_violation_detected() {
        let mut inputs = InvariantInputs {
            payout_gross_amount: dec!(100.00),
            creditor_account_amount: dec!(50.00),
            destination_psp_fee: dec!(10.00),
            sender_principal: dec!(10.00),
            source_psp_fee: dec!(0.50),
            scheme_fee: dec!(0.10),
            sender_total: dec!(10.60),
            effective_rate: dec!(50.00) / dec!(10.60),
            final_rate: dec!(5.0),
            base_rate: dec!(5.0),
            applied_spread_bps: 0,
        };
        let violations = assert_invariants(&inputs);
        assert!(violations.contains(&Invariant::I1PayoutDecomposition));

        inputs.final_rate = dec!(6.0);
        let violations = assert_invariants(&inputs);
        assert!(violations.contains(&Invariant::I4SpreadSign));
    }
}
