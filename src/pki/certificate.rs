use crate::error::ParseError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use x509_parser::pem::parse_x509_pem;

/// One authority-issued certificate, reduced to the fields the reconciler
/// reasons over. Immutable once parsed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CertificateRecord {
    serial: String,
    common_name: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    revocation_time: i64,
    fingerprint: String,
    #[serde(skip)]
    pem: String,
}

impl CertificateRecord {
    /// Decodes the PEM body handed out by the authority. Only the subject
    /// common name and the validity window are read; signatures are not
    /// checked.
    pub fn parse(
        serial: impl Into<String>,
        pem: &str,
        revocation_time: i64,
    ) -> Result<Self, ParseError> {
        let (_, block) =
            parse_x509_pem(pem.as_bytes()).map_err(|e| ParseError::Pem(e.to_string()))?;
        let cert = block
            .parse_x509()
            .map_err(|e| ParseError::Certificate(e.to_string()))?;

        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .ok_or(ParseError::MissingCommonName)?
            .to_string();

        let validity = cert.validity();
        let not_before = DateTime::from_timestamp(validity.not_before.timestamp(), 0)
            .ok_or(ParseError::InvalidValidity)?;
        let not_after = DateTime::from_timestamp(validity.not_after.timestamp(), 0)
            .ok_or(ParseError::InvalidValidity)?;

        Ok(Self {
            serial: serial.into(),
            common_name,
            not_before,
            not_after,
            revocation_time,
            fingerprint: hex::encode(Sha256::digest(&block.contents)),
            pem: pem.to_string(),
        })
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Epoch seconds of revocation, `0` when the certificate is live.
    pub fn revocation_time(&self) -> i64 {
        self.revocation_time
    }

    pub fn is_revoked(&self) -> bool {
        self.revocation_time > 0
    }

    pub fn revocation_date(&self) -> Option<DateTime<Utc>> {
        if self.is_revoked() {
            DateTime::from_timestamp(self.revocation_time, 0)
        } else {
            None
        }
    }

    /// Hex SHA-256 over the DER body.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn pem(&self) -> &str {
        &self.pem
    }
}
