//! Body mass index.
//!
//! ```text
//! metric:   bmi = kg / m²
//! imperial: bmi = 703 × lb / in²
//! ```

use std::fmt;

/// Pounds-per-square-inch to kilograms-per-square-metre factor.
const IMPERIAL_FACTOR: f64 = 703.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Category for an unrounded BMI value.
    pub fn for_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal weight",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bmi {
    pub value: f64,
    pub category: BmiCategory,
}

impl Bmi {
    fn from_value(value: f64) -> Option<Self> {
        value.is_finite().then(|| Self {
            value,
            category: BmiCategory::for_value(value),
        })
    }
}

/// Height in centimetres, weight in kilograms.
pub fn metric(height_cm: f64, weight_kg: f64) -> Option<Bmi> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let metres = height_cm / 100.0;
    Bmi::from_value(weight_kg / (metres * metres))
}

/// Height in inches, weight in pounds.
pub fn imperial(height_in: f64, weight_lb: f64) -> Option<Bmi> {
    if height_in <= 0.0 || weight_lb <= 0.0 {
        return None;
    }
    Bmi::from_value(IMPERIAL_FACTOR * weight_lb / (height_in * height_in))
}
