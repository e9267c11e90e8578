//! Text measurement

use crate::Result;
use pdf_core::Typeface;

/// Advance width of text at a size, in native units
///
/// Implementations must measure with the same font program that draws the
/// text, otherwise centered fields drift.
pub trait TextMetrics {
    fn width_of(&self, text: &str, font_size: f64) -> Result<f64>;
}

impl TextMetrics for Typeface {
    fn width_of(&self, text: &str, font_size: f64) -> Result<f64> {
        Ok(self.text_width_points(text, font_size as f32)?)
    }
}
