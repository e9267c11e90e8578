//! Fixed placement used when no style configuration is supplied
//!
//! These offsets are hand-tuned against the page center. They are not
//! measured and not derived from percentages; the text starts at the offset
//! point whatever its width.

use crate::coords::NativePoint;
use crate::field::RenderedField;
use crate::record::RecordData;
use pdf_core::{Color, PageSize};

/// A text field placed relative to the page center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyText {
    /// Offset from the horizontal center
    pub dx: f64,
    /// Offset from half the page height
    pub dy: f64,
    pub font_size: f64,
    pub color: Color,
}

impl LegacyText {
    pub fn origin(&self, page: PageSize) -> NativePoint {
        NativePoint {
            x: page.width / 2.0 + self.dx,
            y: page.height / 2.0 + self.dy,
        }
    }

    fn render(&self, text: String, page: PageSize) -> RenderedField {
        RenderedField {
            text,
            origin: self.origin(page),
            font_size: self.font_size,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyDefaults {
    pub name: LegacyText,
    pub course: LegacyText,
    pub date: LegacyText,
    /// Prepended to the issue date
    pub date_label: &'static str,
    /// Mark size relative to its raster
    pub mark_scale: f64,
    /// Mark distance from the right and bottom edges
    pub mark_margin: f64,
}

impl LegacyDefaults {
    pub const STANDARD: LegacyDefaults = LegacyDefaults {
        name: LegacyText {
            dx: -100.0,
            dy: 50.0,
            font_size: 32.0,
            color: Color::black(),
        },
        course: LegacyText {
            dx: -80.0,
            dy: 0.0,
            font_size: 20.0,
            color: Color::gray(0.2),
        },
        date: LegacyText {
            dx: -50.0,
            dy: -40.0,
            font_size: 14.0,
            color: Color::black(),
        },
        date_label: "Date: ",
        mark_scale: 0.5,
        mark_margin: 50.0,
    };

    /// Name, course, and date runs for a record, in draw order
    pub fn layout(&self, record: &RecordData, page: PageSize) -> [RenderedField; 3] {
        [
            self.name.render(record.name.clone(), page),
            self.course.render(record.course.clone(), page),
            self.date
                .render(format!("{}{}", self.date_label, record.issue_date), page),
        ]
    }
}

impl Default for LegacyDefaults {
    fn default() -> Self {
        Self::STANDARD
    }
}
