//! Percentage to native page-space mapping
//!
//! Positions are captured top-left, Y down, as percentages of the page.
//! PDF page space is bottom-left, Y up, in points. Out-of-range percentages
//! are allowed and land off the visible page.

use pdf_core::PageSize;

/// A point in native page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativePoint {
    pub x: f64,
    pub y: f64,
}

pub fn map_x(percent_x: f64, page_width: f64) -> f64 {
    (percent_x / 100.0) * page_width
}

pub fn map_y(percent_y: f64, page_height: f64) -> f64 {
    page_height - (percent_y / 100.0) * page_height
}

pub fn map_point(percent_x: f64, percent_y: f64, page: PageSize) -> NativePoint {
    NativePoint {
        x: map_x(percent_x, page.width),
        y: map_y(percent_y, page.height),
    }
}
