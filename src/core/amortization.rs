//! Fixed-rate loan amortization.
//!
//! The assistant asks the remote model to walk users through this formula;
//! the same computation is exposed locally so answers can be checked
//! without a network round-trip.

use std::fmt;

/// Inputs to the monthly payment formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanParameters {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_years: f64,
    pub processing_fee: f64,
    pub prepayment_penalty: f64,
}

impl LoanParameters {
    pub fn new(principal: f64, annual_rate_percent: f64, term_years: f64) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
            processing_fee: 0.0,
            prepayment_penalty: 0.0,
        }
    }

    pub fn with_processing_fee(mut self, fee: f64) -> Self {
        self.processing_fee = fee;
        self
    }

    pub fn with_prepayment_penalty(mut self, penalty: f64) -> Self {
        self.prepayment_penalty = penalty;
        self
    }

    /// Monthly interest rate as a fraction.
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }

    /// Number of monthly payments over the term.
    pub fn payment_count(&self) -> f64 {
        self.term_years * 12.0
    }

    fn validate(&self) -> Result<(), LoanError> {
        let fields = [
            ("principal", self.principal),
            ("annual rate", self.annual_rate_percent),
            ("term", self.term_years),
            ("processing fee", self.processing_fee),
            ("prepayment penalty", self.prepayment_penalty),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(LoanError::invalid(format!("{name} must be a finite number")));
        }
        if self.principal <= 0.0 {
            return Err(LoanError::invalid("principal must be greater than zero"));
        }
        if self.payment_count() <= 0.0 {
            return Err(LoanError::invalid("term must be greater than zero"));
        }
        if self.annual_rate_percent < 0.0 {
            return Err(LoanError::invalid("annual rate cannot be negative"));
        }
        if self.processing_fee < 0.0 || self.prepayment_penalty < 0.0 {
            return Err(LoanError::invalid("fees cannot be negative"));
        }
        Ok(())
    }
}

/// A computed monthly payment. `value` is unrounded; display rounds to cents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyPayment {
    pub value: f64,
}

impl MonthlyPayment {
    pub fn rounded(&self) -> f64 {
        (self.value * 100.0).round() / 100.0
    }
}

impl fmt::Display for MonthlyPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoanError {
    /// Parameters outside the formula's domain.
    InvalidLoanParameters(String),
}

impl LoanError {
    fn invalid(reason: impl Into<String>) -> Self {
        LoanError::InvalidLoanParameters(reason.into())
    }
}

impl fmt::Display for LoanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanError::InvalidLoanParameters(reason) => {
                write!(f, "Invalid loan parameters: {reason}")
            }
        }
    }
}

impl std::error::Error for LoanError {}

pub fn monthly_payment(params: &LoanParameters) -> Result<MonthlyPayment, LoanError> {
    params.validate()?;

    let i = params.monthly_rate();
    let n = params.payment_count();
    let extras = params.processing_fee + params.prepayment_penalty;

    let straight_line = (params.principal + extras) / n;
    // Subnormal rates cannot be told apart from zero.
    let value = if !i.is_normal() {
        straight_line
    } else {
        // (1 + i)^n through ln_1p/exp_m1 keeps precision for tiny rates.
        let exponent = n * i.ln_1p();
        let growth = exponent.exp();
        let amortized = params.principal * i * growth / exponent.exp_m1() + extras / n;
        // Any interest at all costs at least the interest-free payment.
        amortized.max(straight_line)
    };

    if !value.is_finite() {
        return Err(LoanError::invalid("payment is not representable"));
    }
    Ok(MonthlyPayment { value })
}

/// Totals derived from a monthly payment, for display alongside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanSummary {
    pub monthly: MonthlyPayment,
    pub payments: f64,
    pub total_paid: f64,
    pub total_interest: f64,
}

impl LoanSummary {
    pub fn compute(params: &LoanParameters) -> Result<Self, LoanError> {
        let monthly = monthly_payment(params)?;
        let payments = params.payment_count();
        let total_paid = monthly.value * payments;
        let total_interest = (total_paid
            - params.principal
            - params.processing_fee
            - params.prepayment_penalty)
            .max(0.0);
        Ok(Self {
            monthly,
            payments,
            total_paid,
            total_interest,
        })
    }

    pub fn describe(&self, params: &LoanParameters) -> String {
        let mut out = format!(
            "Monthly payment: {} over {} payments ({:.2}% APR, {} years on {:.2})",
            self.monthly,
            self.payments,
            params.annual_rate_percent,
            params.term_years,
            params.principal,
        );
        out.push_str(&format!(
            "\nTotal paid: {:.2}  Total interest: {:.2}",
            self.total_paid, self.total_interest
        ));
        if params.processing_fee > 0.0 || params.prepayment_penalty > 0.0 {
            out.push_str(&format!(
                "\nIncludes processing fee {:.2} and prepayment penalty {:.2} spread across all payments",
                params.processing_fee, params.prepayment_penalty
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_thirty_year_mortgage() {
        let payment = monthly_payment(&LoanParameters::new(100_000.0, 5.0, 30.0)).unwrap();
        assert_eq!(payment.rounded(), 536.82);
        assert_eq!(payment.to_string(), "536.82");
    }

    #[test]
    fn zero_rate_is_straight_line_and_recovers_principal_plus_fees() {
        let cases = [
            (12_000.0, 1.0, 0.0, 0.0),
            (25_000.0, 5.0, 300.0, 120.0),
            (999.99, 2.5, 10.0, 0.0),
            (1_000_000.0, 30.0, 0.0, 5_000.0),
        ];
        for (principal, years, fee, penalty) in cases {
            let params = LoanParameters::new(principal, 0.0, years)
                .with_processing_fee(fee)
                .with_prepayment_penalty(penalty);
            let payment = monthly_payment(&params).unwrap();
            let n = years * 12.0;
            let recovered = payment.value * n;
            assert!((recovered - (principal + fee + penalty)).abs() < 1e-6);
            // The rounded payment drifts by at most half a cent per payment.
            assert!((payment.rounded() * n - (principal + fee + penalty)).abs() <= 0.005 * n);
        }
    }

    #[test]
    fn fees_are_spread_evenly_over_payments() {
        let base = monthly_payment(&LoanParameters::new(50_000.0, 4.0, 10.0)).unwrap();
        let with_fees = monthly_payment(
            &LoanParameters::new(50_000.0, 4.0, 10.0)
                .with_processing_fee(600.0)
                .with_prepayment_penalty(1_200.0),
        )
        .unwrap();
        assert!((with_fees.value - base.value - 1_800.0 / 120.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_rates_never_undercut_the_interest_free_payment() {
        for rate in [1e-14, 1e-12, 1e-9, 1e-6, 1e-3] {
            for (principal, years, fee) in [(100_000.0, 30.0, 0.0), (2_500.0, 1.0, 75.0)] {
                let params = LoanParameters::new(principal, rate, years).with_processing_fee(fee);
                let payment = monthly_payment(&params).unwrap();
                let straight_line = (principal + fee) / (years * 12.0);
                assert!(payment.value.is_finite());
                assert!(
                    payment.value >= straight_line,
                    "rate {rate}: {} < {straight_line}",
                    payment.value
                );
                assert!(payment.value - straight_line < straight_line * 1e-3);
            }
        }
        let subnormal = LoanParameters::new(100_000.0, f64::MIN_POSITIVE / 2.0, 30.0);
        assert!((monthly_payment(&subnormal).unwrap().value - 100_000.0 / 360.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_domain_inputs() {
        let bad = [
            LoanParameters::new(0.0, 5.0, 30.0),
            LoanParameters::new(-10.0, 5.0, 30.0),
            LoanParameters::new(1_000.0, 5.0, 0.0),
            LoanParameters::new(1_000.0, 5.0, -1.0),
            LoanParameters::new(1_000.0, -1.0, 1.0),
            LoanParameters::new(f64::NAN, 5.0, 1.0),
            LoanParameters::new(1_000.0, 5.0, f64::INFINITY),
            LoanParameters::new(1_000.0, 5.0, 1.0).with_processing_fee(-1.0),
        ];
        for params in bad {
            assert!(
                matches!(
                    monthly_payment(&params),
                    Err(LoanError::InvalidLoanParameters(_))
                ),
                "{params:?} should be rejected"
            );
        }
    }

    #[test]
    fn summary_totals_interest() {
        let params = LoanParameters::new(100_000.0, 5.0, 30.0);
        let summary = LoanSummary::compute(&params).unwrap();
        assert_eq!(summary.payments, 360.0);
        assert!((summary.total_paid - 193_255.0).abs() < 1.0);
        assert!((summary.total_interest - 93_255.0).abs() < 1.0);
        assert!(summary.describe(&params).starts_with("Monthly payment: 536.82"));
    }
}
