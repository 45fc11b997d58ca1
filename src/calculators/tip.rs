//! Tip and bill split.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipSplit {
    pub tip: f64,
    pub total: f64,
    pub per_person: f64,
}

pub fn split(bill: f64, tip_percent: f64, people: u32) -> Option<TipSplit> {
    if people == 0 || !(bill >= 0.0 && bill.is_finite()) || !(tip_percent >= 0.0) {
        return None;
    }
    let tip = bill * tip_percent / 100.0;
    let total = bill + tip;
    total.is_finite().then(|| TipSplit {
        tip,
        total,
        per_person: total / people as f64,
    })
}
