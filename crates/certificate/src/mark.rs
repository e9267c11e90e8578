//! QR verification marks

use crate::coords::map_point;
use crate::legacy::LegacyDefaults;
use crate::record::CertificateId;
use crate::style::{check_finite, FieldKind, MarkFieldStyle};
use crate::{CertificateError, Result};
use image::{GrayImage, Luma};
use pdf_core::{ImageXObject, PageSize, PdfDocument};
use qrcode::{EcLevel, QrCode};

/// Used when no base address is configured
pub const DEFAULT_BASE_ADDRESS: &str = "http://localhost:3000";

/// Raster pixels per QR module
pub const MODULE_PIXELS: u32 = 4;

/// Light modules around the symbol
pub const QUIET_ZONE_MODULES: u32 = 1;

/// `{base}/verify/{id}`
///
/// A missing or empty base falls back to [`DEFAULT_BASE_ADDRESS`] so the
/// mark is always drawn.
pub fn verification_url(base_address: Option<&str>, id: &CertificateId) -> String {
    let base = base_address
        .map(|base| base.trim().trim_end_matches('/'))
        .filter(|base| !base.is_empty());

    match base {
        Some(base) => format!("{base}/verify/{id}"),
        None => {
            tracing::warn!(
                certificate_id = %id,
                fallback = DEFAULT_BASE_ADDRESS,
                "No base address configured, verification mark uses the local default"
            );
            format!("{DEFAULT_BASE_ADDRESS}/verify/{id}")
        }
    }
}

/// Encoded QR symbol rendered to a grayscale raster
#[derive(Debug, Clone)]
pub struct VerificationMark {
    modules: u32,
    image: GrayImage,
}

impl VerificationMark {
    /// Encode a URL at error correction level M
    pub fn encode(url: &str) -> Result<Self> {
        let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)
            .map_err(|e| CertificateError::MarkEncoding(e.to_string()))?;

        let modules = code.width() as u32;
        let colors = code.to_colors();
        let side = (modules + 2 * QUIET_ZONE_MODULES) * MODULE_PIXELS;

        let image = GrayImage::from_fn(side, side, |px, py| {
            let (mx, my) = (px / MODULE_PIXELS, py / MODULE_PIXELS);
            let inside = QUIET_ZONE_MODULES..QUIET_ZONE_MODULES + modules;
            if !inside.contains(&mx) || !inside.contains(&my) {
                return Luma([255]);
            }
            let index = ((my - QUIET_ZONE_MODULES) * modules + (mx - QUIET_ZONE_MODULES)) as usize;
            match colors[index] {
                qrcode::Color::Dark => Luma([0]),
                qrcode::Color::Light => Luma([255]),
            }
        });

        Ok(Self { modules, image })
    }

    /// Symbol width in modules, without the quiet zone
    pub fn module_count(&self) -> u32 {
        self.modules
    }

    /// Raster side in pixels, quiet zone included
    pub fn side_pixels(&self) -> u32 {
        self.image.width()
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn to_xobject(&self) -> Result<ImageXObject> {
        Ok(ImageXObject::from_luma(&self.image)?)
    }
}

/// Lower-left corner and drawn size of the mark, in native units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Center the mark on its configured anchor, on both axes
///
/// Returns `None` when the mark is disabled.
pub fn place_configured(
    side_pixels: f64,
    style: &MarkFieldStyle,
    page: PageSize,
) -> Result<Option<MarkPlacement>> {
    if !style.enabled {
        return Ok(None);
    }
    style.check()?;

    let anchor = map_point(style.x, style.y, page);
    let size = side_pixels * style.scale;
    check_finite(FieldKind::Mark, "scale", size)?;

    let placement = MarkPlacement {
        x: anchor.x - size / 2.0,
        y: anchor.y - size / 2.0,
        width: size,
        height: size,
    };
    check_finite(FieldKind::Mark, "x", placement.x)?;
    check_finite(FieldKind::Mark, "y", placement.y)?;
    Ok(Some(placement))
}

/// Bottom-right corner, inset by the legacy margin
pub fn place_legacy(side_pixels: f64, page: PageSize, legacy: &LegacyDefaults) -> MarkPlacement {
    let size = side_pixels * legacy.mark_scale;
    MarkPlacement {
        x: page.width - size - legacy.mark_margin,
        y: legacy.mark_margin,
        width: size,
        height: size,
    }
}

/// Draw the mark on the first page
pub fn draw_mark(
    doc: &mut PdfDocument,
    mark: &VerificationMark,
    placement: &MarkPlacement,
) -> Result<()> {
    doc.insert_image(
        &mark.to_xobject()?,
        1,
        placement.x,
        placement.y,
        placement.width,
        placement.height,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> CertificateId {
        CertificateId::parse("CERT-0000ABCD").unwrap()
    }

    #[test]
    fn test_verification_url() {
        assert_eq!(
            verification_url(Some("https://certs.example.org"), &id()),
            "https://certs.example.org/verify/CERT-0000ABCD"
        );
        assert_eq!(
            verification_url(Some("https://certs.example.org/"), &id()),
            "https://certs.example.org/verify/CERT-0000ABCD"
        );
    }

    #[test]
    fn test_verification_url_falls_back() {
        let expected = "http://localhost:3000/verify/CERT-0000ABCD";
        assert_eq!(verification_url(None, &id()), expected);
        assert_eq!(verification_url(Some(""), &id()), expected);
        assert_eq!(verification_url(Some("  "), &id()), expected);
    }

    #[test]
    fn test_encode_raster_geometry() {
        let mark = VerificationMark::encode("http://localhost:3000/verify/CERT-0000ABCD").unwrap();
        let modules = mark.module_count();

        assert!(modules >= 21);
        assert_eq!(mark.side_pixels(), (modules + 2) * MODULE_PIXELS);
        assert_eq!(mark.image().height(), mark.side_pixels());

        // Quiet zone is light, top-left finder pattern corner is dark
        assert_eq!(mark.image().get_pixel(0, 0), &Luma([255]));
        assert_eq!(mark.image().get_pixel(MODULE_PIXELS, MODULE_PIXELS), &Luma([0]));
    }

    #[test]
    fn test_encode_matches_symbol() {
        let url = "https://certs.example.org/verify/CERT-DEADBEEF";
        let mark = VerificationMark::encode(url).unwrap();
        let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M).unwrap();
        let colors = code.to_colors();
        let modules = mark.module_count();

        for my in 0..modules {
            for mx in 0..modules {
                let px = (mx + QUIET_ZONE_MODULES) * MODULE_PIXELS + MODULE_PIXELS / 2;
                let py = (my + QUIET_ZONE_MODULES) * MODULE_PIXELS + MODULE_PIXELS / 2;
                let dark = mark.image().get_pixel(px, py).0[0] == 0;
                assert_eq!(dark, colors[(my * modules + mx) as usize] == qrcode::Color::Dark);
            }
        }
    }

    #[test]
    fn test_encode_too_long_fails() {
        let url = format!("https://example.org/{}", "x".repeat(4000));
        assert!(matches!(
            VerificationMark::encode(&url),
            Err(CertificateError::MarkEncoding(_))
        ));
    }

    #[test]
    fn test_place_configured_centers_both_axes() {
        let page = PageSize {
            width: 600.0,
            height: 800.0,
        };
        let style = MarkFieldStyle::new(50.0, 50.0, 0.5);
        let placement = place_configured(100.0, &style, page).unwrap().unwrap();

        assert_eq!(
            placement,
            MarkPlacement {
                x: 275.0,
                y: 375.0,
                width: 50.0,
                height: 50.0
            }
        );
        assert!(place_configured(100.0, &MarkFieldStyle::disabled(), page)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_place_configured_rejects_overflow() {
        let page = PageSize {
            width: 600.0,
            height: 800.0,
        };

        let huge_scale = MarkFieldStyle::new(50.0, 50.0, 1e307);
        assert!(matches!(
            place_configured(116.0, &huge_scale, page),
            Err(CertificateError::NonFiniteStyle {
                field: FieldKind::Mark,
                key: "scale"
            })
        ));

        let far_anchor = MarkFieldStyle::new(50.0, 1e308, 0.5);
        assert!(matches!(
            place_configured(116.0, &far_anchor, page),
            Err(CertificateError::NonFiniteStyle {
                field: FieldKind::Mark,
                key: "y"
            })
        ));
    }

    #[test]
    fn test_place_legacy_bottom_right() {
        let page = PageSize {
            width: 600.0,
            height: 800.0,
        };
        let placement = place_legacy(124.0, page, &LegacyDefaults::default());

        assert_eq!(
            placement,
            MarkPlacement {
                x: 488.0,
                y: 50.0,
                width: 62.0,
                height: 62.0
            }
        );
    }
}
