use super::gateway::{AuthorityGateway, IssueParams, IssuedCredentials, RawCertificate};
use super::token::VaultToken;
use crate::error::PkiError;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Every Vault response wraps its payload in `data`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CertData {
    certificate: String,
    #[serde(default)]
    revocation_time: i64,
}

#[derive(Debug, Serialize)]
struct IssueRequest<'a> {
    common_name: &'a str,
    ttl: &'a str,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    certificate: String,
    private_key: String,
    serial_number: String,
    #[serde(default)]
    issuing_ca: Option<String>,
}

#[derive(Debug, Serialize)]
struct RevokeRequest<'a> {
    serial_number: &'a str,
}

/// HTTP client for a Vault PKI secrets engine.
pub struct VaultAuthority {
    base_url: String,
    token: Option<VaultToken>,
    http_client: Client,
}

impl VaultAuthority {
    pub fn new(base_url: &str, token: VaultToken, timeout: Duration) -> Result<Self, PkiError> {
        Self::build(base_url, Some(token), timeout)
    }

    /// Client without a token, limited to Vault's unauthenticated read
    /// endpoints such as `cert/{serial}`.
    pub fn anonymous(base_url: &str, timeout: Duration) -> Result<Self, PkiError> {
        Self::build(base_url, None, timeout)
    }

    fn build(base_url: &str, token: Option<VaultToken>, timeout: Duration) -> Result<Self, PkiError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PkiError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http_client,
        })
    }

    /// Builds a request for `/v1/<segments joined by '/'>`. Each segment is
    /// a single path component; anything that could reshape the path is
    /// refused before the token is attached.
    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, PkiError> {
        for segment in segments {
            check_segment(segment)?;
        }
        let builder = self.http_client.request(
            method,
            format!("{}/v1/{}", self.base_url, segments.join("/")),
        );
        Ok(match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token.expose()),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, PkiError> {
        builder
            .send()
            .await
            .map_err(|e| PkiError::TransportFailure(format!("{what}: {}", e.without_url())))
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, PkiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, what));
        }
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| PkiError::TransportFailure(format!("{what}: malformed response: {e}")))?;
        Ok(envelope.data)
    }
}

fn check_segment(segment: &str) -> Result<(), PkiError> {
    let valid = !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '?', '#', '%'])
        && !segment.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(PkiError::InvalidIdentifier(
            segment.escape_default().to_string(),
        ))
    }
}

fn status_error(status: StatusCode, what: &str) -> PkiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PkiError::AuthenticationFailure(format!("{what}: authority answered {status}"))
        }
        _ => PkiError::TransportFailure(format!("{what}: authority answered {status}")),
    }
}

#[async_trait]
impl AuthorityGateway for VaultAuthority {
    async fn authenticate(&self) -> Result<(), PkiError> {
        if self.token.is_none() {
            return Err(PkiError::AuthenticationFailure(
                "no token configured".to_string(),
            ));
        }
        let what = "token lookup";
        let response = self
            .send(self.request(Method::GET, &["auth", "token", "lookup-self"])?, what)
            .await?;
        let status = response.status();
        if status.is_success() {
            debug!("authenticated against {}", self.base_url);
            Ok(())
        } else {
            Err(PkiError::AuthenticationFailure(format!(
                "{what}: authority answered {status}"
            )))
        }
    }

    async fn list_serials(&self, ca: &str) -> Result<Vec<String>, PkiError> {
        let what = format!("list {ca}/certs");
        let response = self
            .send(
                self.request(Method::GET, &[ca, "certs"])?
                    .query(&[("list", "true")]),
                &what,
            )
            .await?;

        // Vault reports an empty listing as 404
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let data: ListData = Self::decode(response, &what).await?;
        Ok(data.keys)
    }

    async fn read_certificate(&self, ca: &str, serial: &str) -> Result<RawCertificate, PkiError> {
        let what = format!("read {ca}/cert/{serial}");
        let response = self
            .send(
                self.request(Method::GET, &[ca, "cert", serial])?,
                &what,
            )
            .await?;
        let data: CertData = Self::decode(response, &what).await?;
        Ok(RawCertificate {
            pem: data.certificate,
            revocation_time: data.revocation_time,
        })
    }

    async fn issue_certificate(
        &self,
        ca: &str,
        params: &IssueParams,
    ) -> Result<IssuedCredentials, PkiError> {
        let what = format!("issue {ca}/issue/{}", params.role);
        let body = IssueRequest {
            common_name: &params.common_name,
            ttl: &params.ttl,
        };
        let response = self
            .send(
                self.request(Method::POST, &[ca, "issue", params.role.as_str()])?
                    .json(&body),
                &what,
            )
            .await?;
        let data: IssueData = Self::decode(response, &what).await?;
        Ok(IssuedCredentials {
            serial: data.serial_number,
            certificate: data.certificate,
            private_key: SecretString::new(data.private_key),
            issuing_ca: data.issuing_ca,
        })
    }

    async fn revoke_certificate(&self, ca: &str, serial: &str) -> Result<(), PkiError> {
        check_segment(serial)?;
        let what = format!("revoke {ca}/{serial}");
        let response = self
            .send(
                self.request(Method::POST, &[ca, "revoke"])?
                    .json(&RevokeRequest {
                        serial_number: serial,
                    }),
                &what,
            )
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status, &what))
        }
    }
}
