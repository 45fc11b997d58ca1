//! Spin wheel: pick one segment uniformly at random.

use rand::Rng;
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WheelError {
    #[error("the wheel needs at least one non-empty segment")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wheel {
    segments: Vec<String>,
}

/// Where the wheel stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct Spin<'a> {
    pub index: usize,
    pub label: &'a str,
    /// Clockwise angle of the segment's centre, measured from the pointer.
    pub angle_degrees: f64,
}

impl Wheel {
    /// Blank labels are dropped; duplicates are kept as separate segments.
    pub fn new<I, S>(labels: I) -> Result<Self, WheelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if segments.is_empty() {
            return Err(WheelError::Empty);
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn spin_with(&self, rng: &mut impl Rng) -> Spin<'_> {
        let index = rng.gen_range(0..self.segments.len());
        let slice = 360.0 / self.segments.len() as f64;
        Spin {
            index,
            label: &self.segments[index],
            angle_degrees: (index as f64 + 0.5) * slice,
        }
    }

    pub fn spin(&self) -> Spin<'_> {
        self.spin_with(&mut OsRng)
    }
}
