//! Pure calculation functions for surface dimensions and size deltas.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::ResizeMode;

/// Calculate dimensions that fit inside a bounding box, preserving aspect ratio.
///
/// Never upscales: a source already inside the box keeps its natural size.
/// Both edges are at least 1px so a sliver of an image still has a surface.
///
/// # Arguments
/// * `source` - Natural image dimensions (width, height)
/// * `bounds` - Maximum (width, height)
///
/// # Examples
/// ```
/// # use dp_tools::imaging::calculate_fit_dimensions;
/// // 4000x3000 into a 1000x1000 box → 1000x750
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (1000, 1000)), (1000, 750));
///
/// // Already small enough → unchanged
/// assert_eq!(calculate_fit_dimensions((640, 480), (1000, 1000)), (640, 480));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 {
        return source;
    }
    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Resolve the off-screen surface size for a source and optional resize.
///
/// `None` draws at 1:1, the natural dimensions of the source.
pub fn calculate_surface_dimensions(source: (u32, u32), resize: Option<ResizeMode>) -> (u32, u32) {
    match resize {
        None => source,
        Some(ResizeMode::Fit {
            max_width,
            max_height,
        }) => calculate_fit_dimensions(source, (max_width, max_height)),
        Some(ResizeMode::Exact { width, height }) => (width, height),
    }
}

/// Original vs. encoded byte size, as shown in a tool's result panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeDelta {
    pub original: u64,
    pub encoded: u64,
}

impl SizeDelta {
    pub fn new(original: u64, encoded: u64) -> Self {
        Self { original, encoded }
    }

    /// Signed change relative to the original, in percent.
    ///
    /// Negative when the output is smaller. `None` when the original is empty.
    pub fn percent_change(&self) -> Option<f64> {
        if self.original == 0 {
            return None;
        }
        Some((self.encoded as f64 - self.original as f64) / self.original as f64 * 100.0)
    }

    /// Bytes saved; zero when the output grew.
    pub fn bytes_saved(&self) -> u64 {
        self.original.saturating_sub(self.encoded)
    }
}
