//! Calculators and unit converters.
//!
//! Every tool here is a pure input → formula → output function. Malformed or
//! degenerate input never raises: parsing yields `None` and the formulas
//! return `Option`, which the CLI renders as "no result".
//!
//! | Tool | Module |
//! |---|---|
//! | BMI (metric / imperial) | [`bmi`] |
//! | Loan payment and amortization schedule | [`loan`] |
//! | Percentage formulas | [`percentage`] |
//! | Discount | [`discount`] |
//! | Tip and bill split | [`tip`] |
//! | Length, mass, temperature, volume, data size | [`units`] |

pub mod bmi;
pub mod discount;
pub mod loan;
pub mod percentage;
pub mod tip;
pub mod units;

/// Parse a user-typed number.
///
/// Accepts surrounding whitespace, thousands separators (`1,250.50`) and a
/// leading `+`. Returns `None` for anything else, including NaN and infinity.
pub fn parse_number(input: &str) -> Option<f64> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to a fixed number of decimal places for display.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
