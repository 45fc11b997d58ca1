//! Sale price after a percentage discount.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discount {
    pub saved: f64,
    pub final_price: f64,
}

/// `percent` outside 0–100 or a negative price is no result.
pub fn apply(price: f64, percent: f64) -> Option<Discount> {
    if !(price >= 0.0 && price.is_finite()) || !(0.0..=100.0).contains(&percent) {
        return None;
    }
    let saved = price * percent / 100.0;
    Some(Discount {
        saved,
        final_price: price - saved,
    })
}
