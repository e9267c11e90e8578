//! Percentage style configuration
//!
//! The JSON form is loose (every key optional, a few aliases). It is
//! validated once into typed per-field styles so the composer never sees a
//! missing position or size.

use crate::{CertificateError, Result};
use pdf_core::Color;
use serde::Deserialize;
use std::fmt;

/// A placeable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Course,
    Date,
    Mark,
}

impl FieldKind {
    /// Key of the field in the JSON configuration
    pub fn key(self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Course => "course",
            FieldKind::Date => "date",
            FieldKind::Mark => "qrCode",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Style of a centered text field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFieldStyle {
    pub enabled: bool,
    /// Percent of page width, from the left
    pub x: f64,
    /// Percent of page height, from the top
    pub y: f64,
    pub font_size: f64,
    pub color: Color,
}

impl TextFieldStyle {
    pub fn new(x: f64, y: f64, font_size: f64, color: Color) -> Self {
        Self {
            enabled: true,
            x,
            y,
            font_size,
            color,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            x: 0.0,
            y: 0.0,
            font_size: 1.0,
            color: Color::black(),
        }
    }

    /// Reject non-finite or non-positive values on an enabled field
    pub fn check(&self, field: FieldKind) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        check_finite(field, "x", self.x)?;
        check_finite(field, "y", self.y)?;
        check_finite(field, "fontSize", self.font_size)?;
        if self.font_size <= 0.0 || self.font_size > f64::from(f32::MAX) {
            return Err(CertificateError::InvalidStyle {
                field,
                reason: format!(
                    "fontSize must be positive and at most {}, got {}",
                    f32::MAX,
                    self.font_size
                ),
            });
        }
        Ok(())
    }
}

/// Style of the verification mark (centered on both axes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkFieldStyle {
    pub enabled: bool,
    pub x: f64,
    pub y: f64,
    /// Multiplier on the raster's pixel size
    pub scale: f64,
}

impl MarkFieldStyle {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self {
            enabled: true,
            x,
            y,
            scale,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }

    pub fn check(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        check_finite(FieldKind::Mark, "x", self.x)?;
        check_finite(FieldKind::Mark, "y", self.y)?;
        check_finite(FieldKind::Mark, "scale", self.scale)?;
        if self.scale <= 0.0 {
            return Err(CertificateError::InvalidStyle {
                field: FieldKind::Mark,
                reason: format!("scale must be positive, got {}", self.scale),
            });
        }
        Ok(())
    }
}

pub(crate) fn check_finite(field: FieldKind, key: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CertificateError::NonFiniteStyle { field, key })
    }
}

/// Per-field styles for the configured (percentage) path
///
/// A missing mark entry means the mark is drawn at its legacy position.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfiguration {
    pub name: TextFieldStyle,
    pub course: TextFieldStyle,
    pub date: TextFieldStyle,
    pub mark: Option<MarkFieldStyle>,
}

impl StyleConfiguration {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawStyleConfiguration = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Parse and validate a configuration read as raw bytes
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        let raw: RawStyleConfiguration = serde_json::from_slice(json)?;
        Self::from_raw(raw)
    }

    /// Check every enabled field
    pub fn validate(&self) -> Result<()> {
        self.name.check(FieldKind::Name)?;
        self.course.check(FieldKind::Course)?;
        self.date.check(FieldKind::Date)?;
        if let Some(mark) = &self.mark {
            mark.check()?;
        }
        Ok(())
    }

    fn from_raw(raw: RawStyleConfiguration) -> Result<Self> {
        let config = Self {
            name: text_style(FieldKind::Name, raw.name)?,
            course: text_style(FieldKind::Course, raw.course)?,
            date: text_style(FieldKind::Date, raw.date)?,
            mark: raw.qr_code.map(mark_style).transpose()?,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldStyle {
    enabled: Option<bool>,
    x: Option<f64>,
    y: Option<f64>,
    #[serde(alias = "size")]
    font_size: Option<f64>,
    color_hex: Option<String>,
    scale: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawStyleConfiguration {
    name: Option<RawFieldStyle>,
    course: Option<RawFieldStyle>,
    #[serde(alias = "issueDate")]
    date: Option<RawFieldStyle>,
    #[serde(rename = "qrCode", alias = "mark", alias = "qr")]
    qr_code: Option<RawFieldStyle>,
}

fn required<T>(field: FieldKind, key: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or(CertificateError::MissingStyleField { field, key })
}

fn text_style(field: FieldKind, raw: Option<RawFieldStyle>) -> Result<TextFieldStyle> {
    let raw = required(field, "entry", raw)?;
    if !required(field, "enabled", raw.enabled)? {
        return Ok(TextFieldStyle::disabled());
    }

    let color_hex = required(field, "colorHex", raw.color_hex)?;
    let color = Color::from_hex(&color_hex).map_err(|_| CertificateError::InvalidStyle {
        field,
        reason: format!("colorHex must be #RRGGBB, got {color_hex:?}"),
    })?;

    Ok(TextFieldStyle::new(
        required(field, "x", raw.x)?,
        required(field, "y", raw.y)?,
        required(field, "fontSize", raw.font_size)?,
        color,
    ))
}

fn mark_style(raw: RawFieldStyle) -> Result<MarkFieldStyle> {
    let field = FieldKind::Mark;
    if !required(field, "enabled", raw.enabled)? {
        return Ok(MarkFieldStyle::disabled());
    }

    Ok(MarkFieldStyle::new(
        required(field, "x", raw.x)?,
        required(field, "y", raw.y)?,
        required(field, "scale", raw.scale)?,
    ))
}
