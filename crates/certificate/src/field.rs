//! Field rendering

use crate::coords::{map_point, NativePoint};
use crate::metrics::TextMetrics;
use crate::style::{check_finite, FieldKind, TextFieldStyle};
use crate::Result;
use pdf_core::{Align, Color, PageSize, PdfDocument};

/// A text run ready to draw: origin is the left end of the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub text: String,
    pub origin: NativePoint,
    pub font_size: f64,
    pub color: Color,
}

/// Lay out a configured text field, centered horizontally on its anchor
///
/// Returns `None` for a disabled field. The anchor's Y is the baseline; there
/// is no vertical centering.
pub fn layout_text_field(
    field: FieldKind,
    value: &str,
    style: &TextFieldStyle,
    page: PageSize,
    metrics: &dyn TextMetrics,
) -> Result<Option<RenderedField>> {
    if !style.enabled {
        return Ok(None);
    }
    style.check(field)?;

    let anchor = map_point(style.x, style.y, page);
    let text_width = metrics.width_of(value, style.font_size)?;
    check_finite(field, "fontSize", text_width)?;

    // Finite percentages can still overflow once scaled to the page
    let origin = NativePoint {
        x: anchor.x - text_width / 2.0,
        y: anchor.y,
    };
    check_finite(field, "x", origin.x)?;
    check_finite(field, "y", origin.y)?;

    Ok(Some(RenderedField {
        text: value.to_string(),
        origin,
        font_size: style.font_size,
        color: style.color,
    }))
}

/// Draw a laid-out field on the first page
pub fn draw_text_field(doc: &mut PdfDocument, field: &RenderedField) -> Result<()> {
    doc.insert_text(
        &field.text,
        1,
        field.origin.x,
        field.origin.y,
        field.font_size as f32,
        field.color,
        Align::Left,
    )?;
    Ok(())
}
