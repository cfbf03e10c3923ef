use super::certificate::CertificateRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Valid,
    Expired,
    Revoked,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Valid => "valid",
            CertificateStatus::Expired => "expired",
            CertificateStatus::Revoked => "revoked",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-way lifecycle classification. Revocation wins over expiry and
/// `not_before` is deliberately ignored, so a not-yet-valid certificate
/// reports `Valid`.
pub fn classify(record: &CertificateRecord, now: DateTime<Utc>) -> CertificateStatus {
    if record.is_revoked() {
        CertificateStatus::Revoked
    } else if now > record.not_after() {
        CertificateStatus::Expired
    } else {
        CertificateStatus::Valid
    }
}

/// A record paired with the status it had at listing time.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClassifiedCertificate {
    #[serde(flatten)]
    pub record: CertificateRecord,
    pub revocation_date: Option<DateTime<Utc>>,
    pub status: CertificateStatus,
}

impl ClassifiedCertificate {
    pub fn new(record: CertificateRecord, now: DateTime<Utc>) -> Self {
        let status = classify(&record, now);
        Self {
            revocation_date: record.revocation_date(),
            record,
            status,
        }
    }
}
