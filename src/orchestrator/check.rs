use crate::authority::AuthorityGateway;
use crate::error::{PkiError, ResolutionError};
use crate::pki::{AuthorityMap, ChainEnvironment, resolve_issuer_authority};
use chrono::{DateTime, Utc};
use log::debug;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationVerdict {
    NotRevoked,
    Revoked { at: Option<DateTime<Utc>> },
}

impl RevocationVerdict {
    pub fn exit_code(&self) -> u8 {
        match self {
            RevocationVerdict::NotRevoked => 0,
            RevocationVerdict::Revoked { .. } => 1,
        }
    }
}

/// Why a chain position could not be given a verdict. Every variant makes
/// the verify hook reject the certificate.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("no serial supplied for chain depth {depth}")]
    MissingSerial { depth: u32 },
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Authority(#[from] PkiError),
}

impl CheckError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CheckError::MissingSerial { .. }
            | CheckError::Resolution(ResolutionError::MissingDistinguishedName { .. }) => 255,
            CheckError::Resolution(ResolutionError::UnknownDistinguishedName { .. }) => 3,
            CheckError::Authority(_) => 2,
        }
    }
}

/// Asks `ca` whether `serial` has been revoked. Only the revocation time is
/// consulted; the PEM body is not parsed. Errors are returned, never mapped
/// to a verdict, so the caller decides how to fail closed.
pub async fn check_revocation(
    gateway: &dyn AuthorityGateway,
    ca: &str,
    serial: &str,
) -> Result<RevocationVerdict, PkiError> {
    let raw = gateway.read_certificate(ca, serial).await?;
    debug!(
        "{} in {} has revocation time {}",
        serial, ca, raw.revocation_time
    );

    if raw.revocation_time > 0 {
        Ok(RevocationVerdict::Revoked {
            at: DateTime::from_timestamp(raw.revocation_time, 0),
        })
    } else {
        Ok(RevocationVerdict::NotRevoked)
    }
}

/// Verdict for the certificate at `depth` of a chain under verification.
/// The serial is the one at `depth`; the authority is the issuer's.
pub async fn check_chain_position(
    gateway: &dyn AuthorityGateway,
    chain: &ChainEnvironment,
    depth: u32,
    authorities: &AuthorityMap,
) -> Result<RevocationVerdict, CheckError> {
    let serial = chain
        .serial(depth)
        .ok_or(CheckError::MissingSerial { depth })?;
    let ca = resolve_issuer_authority(depth, &chain.names, authorities)?;
    debug!("depth {}: serial {} checked against {}", depth, serial, ca);

    Ok(check_revocation(gateway, &ca, serial).await?)
}
