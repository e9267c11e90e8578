//! Certificate composition
//!
//! One call stamps one record onto the first page of a template:
//! `load -> fields -> mark -> serialize`. Any failure ends the call; no
//! partial document is returned.

use crate::coords::NativePoint;
use crate::field::{draw_text_field, layout_text_field, RenderedField};
use crate::legacy::LegacyDefaults;
use crate::mark::{draw_mark, place_configured, place_legacy, verification_url, VerificationMark};
use crate::record::RecordData;
use crate::style::{FieldKind, StyleConfiguration};
use crate::{CertificateError, Result, Stage};
use pdf_core::{Color, PageSize, PdfDocument, Typeface};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Anchor of the identifier line, drawn on every certificate
const ID_LINE_ORIGIN: NativePoint = NativePoint { x: 50.0, y: 50.0 };
const ID_LINE_FONT_SIZE: f64 = 10.0;
const ID_LINE_COLOR: Color = Color::gray(0.4);

static DEFAULT_TYPEFACE: OnceLock<Arc<Typeface>> = OnceLock::new();

/// Stamps records onto templates
///
/// Holds only the shared, read-only typeface, so a single composer can be
/// used from many threads at once.
#[derive(Debug, Clone)]
pub struct CertificateComposer {
    typeface: Arc<Typeface>,
    legacy: LegacyDefaults,
}

impl Default for CertificateComposer {
    /// Helvetica-Bold, loaded once per process
    fn default() -> Self {
        let typeface = DEFAULT_TYPEFACE.get_or_init(|| Arc::new(Typeface::helvetica_bold()));
        Self::new(Arc::clone(typeface))
    }
}

impl CertificateComposer {
    pub fn new(typeface: Arc<Typeface>) -> Self {
        Self {
            typeface,
            legacy: LegacyDefaults::STANDARD,
        }
    }

    pub fn typeface(&self) -> &Arc<Typeface> {
        &self.typeface
    }

    /// Compose one certificate
    ///
    /// # Arguments
    /// * `template` - PDF bytes; only the first page is stamped
    /// * `record` - Recipient values and identifier
    /// * `style` - Percentage configuration, or `None` for the legacy layout
    /// * `base_address` - Verification site root, `None` for the local default
    pub fn compose(
        &self,
        template: &[u8],
        record: &RecordData,
        style: Option<&StyleConfiguration>,
        base_address: Option<&str>,
    ) -> Result<Vec<u8>> {
        let id = &record.certificate_id;
        debug!(certificate_id = %id, configured = style.is_some(), "Composing certificate");

        let (mut doc, page) = self.load(template).map_err(|e| e.in_stage(Stage::Load, id))?;
        debug!(certificate_id = %id, width = page.width, height = page.height, "Template loaded");

        self.draw_fields(&mut doc, page, record, style)
            .map_err(|e| e.in_stage(Stage::Fields, id))?;

        self.draw_verification_mark(&mut doc, page, record, style, base_address)
            .map_err(|e| e.in_stage(Stage::Mark, id))?;

        let bytes = doc
            .to_bytes()
            .map_err(|e| CertificateError::from(e).in_stage(Stage::Serialize, id))?;
        debug!(certificate_id = %id, bytes = bytes.len(), "Certificate serialized");

        Ok(bytes)
    }

    fn load(&self, template: &[u8]) -> Result<(PdfDocument, PageSize)> {
        let mut doc = PdfDocument::open_from_bytes(template)?;
        if doc.page_count() == 0 {
            return Err(CertificateError::EmptyTemplate);
        }

        let page = doc.page_size(1)?;
        doc.set_typeface(Arc::clone(&self.typeface));
        Ok((doc, page))
    }

    fn draw_fields(
        &self,
        doc: &mut PdfDocument,
        page: PageSize,
        record: &RecordData,
        style: Option<&StyleConfiguration>,
    ) -> Result<()> {
        match style {
            Some(style) => {
                style.validate()?;
                let fields = [
                    (FieldKind::Name, record.name.as_str(), &style.name),
                    (FieldKind::Course, record.course.as_str(), &style.course),
                    (FieldKind::Date, record.issue_date.as_str(), &style.date),
                ];
                let metrics = self.typeface.as_ref();
                for (kind, value, field_style) in fields {
                    match layout_text_field(kind, value, field_style, page, metrics)? {
                        Some(field) => draw_text_field(doc, &field)?,
                        None => debug!(field = %kind, "Field disabled"),
                    }
                }
            }
            None => {
                for field in self.legacy.layout(record, page) {
                    draw_text_field(doc, &field)?;
                }
            }
        }

        // Unconditional: the identifier links the document to its record
        let id_line = RenderedField {
            text: format!("ID: {}", record.certificate_id),
            origin: ID_LINE_ORIGIN,
            font_size: ID_LINE_FONT_SIZE,
            color: ID_LINE_COLOR,
        };
        draw_text_field(doc, &id_line)
    }

    fn draw_verification_mark(
        &self,
        doc: &mut PdfDocument,
        page: PageSize,
        record: &RecordData,
        style: Option<&StyleConfiguration>,
        base_address: Option<&str>,
    ) -> Result<()> {
        let mark_style = style.and_then(|style| style.mark.as_ref());
        if mark_style.is_some_and(|mark| !mark.enabled) {
            debug!(certificate_id = %record.certificate_id, "Verification mark disabled");
            return Ok(());
        }

        let url = verification_url(base_address, &record.certificate_id);
        let mark = VerificationMark::encode(&url)?;
        let side = mark.side_pixels() as f64;

        let placement = match mark_style {
            Some(mark_style) => place_configured(side, mark_style, page)?,
            None => Some(place_legacy(side, page, &self.legacy)),
        };
        if let Some(placement) = placement {
            draw_mark(doc, &mark, &placement)?;
        }

        Ok(())
    }
}
