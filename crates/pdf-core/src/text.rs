//! Text operator generation

use crate::document::Color;
use crate::Align;

/// Context for rendering one text run
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Measured width of the run in points (for alignment)
    pub text_width: f64,
    /// Fill color
    pub color: Color,
}

/// Horizontal shift applied to the insertion point for an alignment
pub fn align_offset(text_width: f64, align: Align) -> f64 {
    match align {
        Align::Left => 0.0,
        Align::Center => -text_width / 2.0,
        Align::Right => -text_width,
    }
}

/// Generate the `BT … ET` operator block for one text run
///
/// # Arguments
/// * `text_hex` - Hex-encoded string operand (e.g., "<48656C6C6F>")
/// * `x` - X coordinate in native points
/// * `y` - Baseline Y coordinate in native points (from bottom)
/// * `align` - Alignment relative to `x`
/// * `ctx` - Font, size, measured width and color
pub fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let start_x = x + align_offset(ctx.text_width, align);
    let Color { r, g, b } = ctx.color;

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!("{r} {g} {b} rg\n"));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{start_x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}
