//! The three everyday percentage questions.

/// "What is `percent`% of `of`?"
pub fn percent_of(percent: f64, of: f64) -> Option<f64> {
    finite(percent / 100.0 * of)
}

/// "`part` is what % of `whole`?"
pub fn what_percent(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        return None;
    }
    finite(part / whole * 100.0)
}

/// Percent change from `from` to `to`. Positive is an increase.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    finite((to - from) / from.abs() * 100.0)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_values() {
        assert_eq!(percent_of(5.0, 200.0), Some(10.0));
        assert_eq!(what_percent(10.0, 200.0), Some(5.0));
        assert_eq!(percent_change(100.0, 150.0), Some(50.0));
    }

    #[test]
    fn decrease_is_negative() {
        assert_eq!(percent_change(200.0, 150.0), Some(-25.0));
    }

    #[test]
    fn change_from_negative_base_keeps_direction() {
        // -100 → -50 is an increase.
        assert_eq!(percent_change(-100.0, -50.0), Some(50.0));
    }

    #[test]
    fn zero_base_is_no_result() {
        assert_eq!(what_percent(10.0, 0.0), None);
        assert_eq!(percent_change(0.0, 5.0), None);
    }
}
