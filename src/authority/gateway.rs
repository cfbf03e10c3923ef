use crate::error::PkiError;
use async_trait::async_trait;
use secrecy::SecretString;

/// One certificate entry as the authority stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCertificate {
    pub pem: String,
    /// Epoch seconds, `0` when not revoked.
    pub revocation_time: i64,
}

/// Result of an issue call: exactly one new certificate and its key.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub serial: String,
    pub certificate: String,
    pub private_key: SecretString,
    pub issuing_ca: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueParams {
    pub role: String,
    pub common_name: String,
    pub ttl: String,
}

/// Remote PKI engine. Keys, signing and the revocation ledger live behind
/// this boundary.
#[async_trait]
pub trait AuthorityGateway: Send + Sync {
    async fn authenticate(&self) -> Result<(), PkiError>;

    async fn list_serials(&self, ca: &str) -> Result<Vec<String>, PkiError>;

    async fn read_certificate(&self, ca: &str, serial: &str) -> Result<RawCertificate, PkiError>;

    async fn issue_certificate(
        &self,
        ca: &str,
        params: &IssueParams,
    ) -> Result<IssuedCredentials, PkiError>;

    /// Revoking an already revoked serial is not an error.
    async fn revoke_certificate(&self, ca: &str, serial: &str) -> Result<(), PkiError>;
}
