//! Recipient records and certificate identifiers

use crate::{CertificateError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Literal prefix of every identifier
pub const ID_PREFIX: &str = "CERT-";

/// `CERT-` followed by 8 uppercase hex digits (4 random bytes)
///
/// Identifiers are random, not sequential. Collisions are possible, so
/// callers that persist records should use [`CertificateId::generate_unique`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateId(String);

impl CertificateId {
    /// Draw a fresh identifier from the OS random source
    pub fn generate() -> Self {
        let mut bytes = [0u8; 4];
        OsRng.fill_bytes(&mut bytes);
        Self(format!("{ID_PREFIX}{}", hex::encode_upper(bytes)))
    }

    /// Draw identifiers until one is not taken
    pub fn generate_unique<F>(mut is_taken: F, max_attempts: usize) -> Result<Self>
    where
        F: FnMut(&CertificateId) -> bool,
    {
        for _ in 0..max_attempts {
            let id = Self::generate();
            if !is_taken(&id) {
                return Ok(id);
            }
            tracing::debug!(certificate_id = %id, "Identifier already taken, retrying");
        }
        Err(CertificateError::IdentifierExhausted(max_attempts))
    }

    /// Validate the `CERT-XXXXXXXX` format
    pub fn parse(s: &str) -> Result<Self> {
        let valid = s.strip_prefix(ID_PREFIX).is_some_and(|digits| {
            digits.len() == 8
                && digits
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
        });
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(CertificateError::InvalidIdentifier(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CertificateId {
    type Err = CertificateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CertificateId {
    type Error = CertificateError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<CertificateId> for String {
    fn from(id: CertificateId) -> Self {
        id.0
    }
}

/// One recipient's values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordData {
    pub name: String,
    pub course: String,
    pub issue_date: String,
    pub certificate_id: CertificateId,
}

impl RecordData {
    pub fn new(
        name: impl Into<String>,
        course: impl Into<String>,
        issue_date: impl Into<String>,
        certificate_id: CertificateId,
    ) -> Self {
        Self {
            name: name.into(),
            course: course.into(),
            issue_date: issue_date.into(),
            certificate_id,
        }
    }
}
