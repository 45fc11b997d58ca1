//! Fixed-rate loan amortization.
//!
//! Monthly payment for principal `P`, monthly rate `r` and `n` payments:
//!
//! ```text
//! M = P · r · (1 + r)ⁿ / ((1 + r)ⁿ − 1)      (r > 0)
//! M = P / n                                 (r = 0)
//! ```
//!
//! `(1 + r)ⁿ − 1` is evaluated as `expm1(n · ln1p(r))` so tiny rates do not
//! cancel to zero. Terms are capped at [`MAX_PAYMENTS`] months.

/// 100 years of monthly payments.
pub const MAX_PAYMENTS: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    /// Annual rate in percent, e.g. `5.5`.
    pub annual_rate_percent: f64,
    pub years: f64,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64, years: f64) -> Self {
        Self {
            principal,
            annual_rate_percent,
            years,
        }
    }

    fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }

    /// Number of monthly payments, `None` outside `1..=MAX_PAYMENTS`.
    pub fn payment_count(&self) -> Option<u32> {
        let months = (self.years * 12.0).round();
        (months >= 1.0 && months <= MAX_PAYMENTS as f64).then_some(months as u32)
    }

    fn is_valid(&self) -> bool {
        self.principal > 0.0
            && self.principal.is_finite()
            && self.annual_rate_percent >= 0.0
            && self.annual_rate_percent.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanSummary {
    pub monthly_payment: f64,
    pub payments: u32,
    pub total_paid: f64,
    pub total_interest: f64,
}

/// One row of the amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Installment {
    /// 1-based.
    pub number: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

pub fn monthly_payment(terms: &LoanTerms) -> Option<f64> {
    if !terms.is_valid() {
        return None;
    }
    let n = terms.payment_count()? as f64;
    let r = terms.monthly_rate();
    let growth_minus_one = (n * r.ln_1p()).exp_m1();
    let payment = if growth_minus_one == 0.0 {
        terms.principal / n
    } else {
        terms.principal * r * (growth_minus_one + 1.0) / growth_minus_one
    };
    payment.is_finite().then_some(payment)
}

pub fn summary(terms: &LoanTerms) -> Option<LoanSummary> {
    let monthly_payment = monthly_payment(terms)?;
    let payments = terms.payment_count()?;
    let total_paid = monthly_payment * payments as f64;
    Some(LoanSummary {
        monthly_payment,
        payments,
        total_paid,
        total_interest: total_paid - terms.principal,
    })
}

/// Full month-by-month schedule. The last installment absorbs rounding so
/// the balance ends at exactly zero.
pub fn schedule(terms: &LoanTerms) -> Option<Vec<Installment>> {
    let payment = monthly_payment(terms)?;
    let count = terms.payment_count()?;
    let rate = terms.monthly_rate();
    let mut balance = terms.principal;

    let rows = (1..=count)
        .map(|number| {
            let interest = balance * rate;
            let mut principal = payment - interest;
            let mut this_payment = payment;
            if number == count {
                principal = balance;
                this_payment = balance + interest;
            }
            balance = (balance - principal).max(0.0);
            Installment {
                number,
                payment: this_payment,
                interest,
                principal,
                balance,
            }
        })
        .collect();
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mortgage() -> LoanTerms {
        LoanTerms::new(250_000.0, 5.5, 30.0)
    }

    #[test]
    fn reference_mortgage_payment() {
        let payment = monthly_payment(&mortgage()).unwrap();
        assert!((payment - 1419.47).abs() <= 0.01, "got {payment}");
    }

    #[test]
    fn zero_rate_divides_evenly() {
        let terms = LoanTerms::new(12_000.0, 0.0, 1.0);
        assert_eq!(monthly_payment(&terms), Some(1000.0));
        let s = summary(&terms).unwrap();
        assert_eq!(s.total_interest, 0.0);
    }

    #[test]
    fn summary_totals() {
        let s = summary(&mortgage()).unwrap();
        assert_eq!(s.payments, 360);
        assert!((s.total_paid - 1419.47 * 360.0).abs() < 5.0);
        assert!((s.total_interest - (s.total_paid - 250_000.0)).abs() < 1e-6);
    }

    #[test]
    fn schedule_pays_off_principal() {
        let rows = schedule(&mortgage()).unwrap();
        assert_eq!(rows.len(), 360);
        assert_eq!(rows[0].number, 1);
        // First month interest: 250000 * 0.055 / 12
        assert!((rows[0].interest - 1145.83).abs() < 0.01);
        assert_eq!(rows.last().unwrap().balance, 0.0);
        let principal_paid: f64 = rows.iter().map(|r| r.principal).sum();
        assert!((principal_paid - 250_000.0).abs() < 1e-6);
    }

    #[test]
    fn schedule_balance_decreases() {
        let rows = schedule(&LoanTerms::new(5_000.0, 7.0, 2.0)).unwrap();
        assert!(rows.windows(2).all(|w| w[1].balance < w[0].balance));
    }

    #[test]
    fn tiny_rate_approaches_even_split() {
        let payment = monthly_payment(&LoanTerms::new(250_000.0, 1e-14, 30.0)).unwrap();
        assert!((payment - 250_000.0 / 360.0).abs() < 1e-6, "got {payment}");
        let payment = monthly_payment(&LoanTerms::new(250_000.0, 1e-300, 30.0)).unwrap();
        assert!((payment - 250_000.0 / 360.0).abs() < 1e-6, "got {payment}");
    }

    #[test]
    fn term_is_capped_at_a_century() {
        assert_eq!(LoanTerms::new(1000.0, 5.0, 100.0).payment_count(), Some(MAX_PAYMENTS));
        assert_eq!(schedule(&LoanTerms::new(1000.0, 5.0, 100.0)).unwrap().len(), 1200);
        assert_eq!(LoanTerms::new(1000.0, 5.0, 100.1).payment_count(), None);
        assert!(schedule(&LoanTerms::new(1000.0, 5.0, 300_000_000.0)).is_none());
        assert!(summary(&LoanTerms::new(1000.0, 5.0, 300_000_000.0)).is_none());
    }

    #[test]
    fn degenerate_terms_are_no_result() {
        assert_eq!(monthly_payment(&LoanTerms::new(0.0, 5.0, 10.0)), None);
        assert_eq!(monthly_payment(&LoanTerms::new(1000.0, -1.0, 10.0)), None);
        assert_eq!(monthly_payment(&LoanTerms::new(1000.0, 5.0, 0.0)), None);
        assert!(schedule(&LoanTerms::new(1000.0, 5.0, 0.0)).is_none());
    }
}
