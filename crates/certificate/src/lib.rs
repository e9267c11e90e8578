//! Certificate - percentage-positioned stamping of PDF templates
//!
//! This crate provides:
//! - Mapping of top-left percentage positions into native page space
//! - Centered text fields measured with the typeface that draws them
//! - QR verification marks pointing at `{base}/verify/{id}`
//! - The composer that stamps one record onto a template page
//!
//! # Example
//!
//! ```ignore
//! use certificate::{CertificateComposer, CertificateId, RecordData, StyleConfiguration};
//!
//! let composer = CertificateComposer::default();
//! let id = CertificateId::generate();
//! let record = RecordData::new("Aarav Patel", "Rust 101", "2026-01-15", id);
//! let style = StyleConfiguration::from_json(style_json)?;
//! let base = Some("https://certs.example.org");
//! let pdf_bytes = composer.compose(&template, &record, Some(&style), base)?;
//! ```

pub mod composer;
pub mod coords;
pub mod field;
pub mod legacy;
pub mod mark;
pub mod metrics;
pub mod record;
pub mod style;

pub use composer::CertificateComposer;
pub use coords::{map_point, map_x, map_y, NativePoint};
pub use field::RenderedField;
pub use legacy::LegacyDefaults;
pub use mark::{verification_url, MarkPlacement, VerificationMark, DEFAULT_BASE_ADDRESS};
pub use metrics::TextMetrics;
pub use record::{CertificateId, RecordData};
pub use style::{FieldKind, MarkFieldStyle, StyleConfiguration, TextFieldStyle};

use std::fmt;
use thiserror::Error;

/// Composition stage a failure occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Fields,
    Mark,
    Serialize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Fields => "fields",
            Stage::Mark => "mark",
            Stage::Serialize => "serialize",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while composing certificates
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Template has no pages")]
    EmptyTemplate,

    #[error("Style for {field} is missing `{key}`")]
    MissingStyleField { field: FieldKind, key: &'static str },

    #[error("Invalid style for {field}: {reason}")]
    InvalidStyle { field: FieldKind, reason: String },

    #[error("Style for {field} has a non-finite `{key}`")]
    NonFiniteStyle { field: FieldKind, key: &'static str },

    #[error("Invalid certificate identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("No unused certificate identifier after {0} attempts")]
    IdentifierExhausted(usize),

    #[error("Failed to encode verification mark: {0}")]
    MarkEncoding(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Certificate {certificate_id} failed at {stage}: {source}")]
    Compose {
        certificate_id: String,
        stage: Stage,
        #[source]
        source: Box<CertificateError>,
    },
}

impl CertificateError {
    /// Attach the record and stage to a failure
    pub(crate) fn in_stage(self, stage: Stage, certificate_id: &CertificateId) -> Self {
        CertificateError::Compose {
            certificate_id: certificate_id.to_string(),
            stage,
            source: Box::new(self),
        }
    }

    /// Stage of a composition failure, if this is one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            CertificateError::Compose { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type for certificate operations
pub type Result<T> = std::result::Result<T, CertificateError>;
