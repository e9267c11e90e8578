//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening existing PDF templates from bytes
//! - Reading native page dimensions
//! - Drawing text with a single shared typeface
//! - Drawing raster images (grayscale XObjects)
//! - Serializing the stamped document
//!
//! All coordinates accepted by this crate are native page-space points
//! (origin bottom-left, Y increasing upward).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pdf_core::{Align, Color, PdfDocument, Typeface};
//!
//! let mut doc = PdfDocument::open_from_bytes(&template_bytes)?;
//! doc.set_typeface(Arc::new(Typeface::helvetica_bold()));
//! doc.insert_text("Hello, World!", 1, 100.0, 700.0, 12.0, Color::black(), Align::Left)?;
//! let output = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod standard;
mod text;

pub use document::{Color, PageSize, PdfDocument};
pub use font::{FontData, Typeface};
pub use self::image::{generate_image_operators, ImageXObject};
pub use standard::StandardFont;
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("No typeface set on document")]
    NoTypeface,

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Character {ch:?} cannot be encoded with font {font}")]
    UnencodableChar { ch: char, font: String },

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment relative to the insertion point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_default() {
        assert_eq!(Align::default(), Align::Left);
    }

    #[test]
    fn test_unencodable_message_names_char_and_font() {
        let err = PdfError::UnencodableChar {
            ch: 'ก',
            font: "Helvetica-Bold".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Character 'ก' cannot be encoded with font Helvetica-Bold"
        );
    }
}
