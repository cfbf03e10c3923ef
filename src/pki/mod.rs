pub mod certificate;
pub mod chain;
pub mod collision;
pub mod status;

#[cfg(test)]
pub(crate) mod fixtures;

pub use certificate::CertificateRecord;
pub use chain::{
    AuthorityMap, ChainEnvironment, DistinguishedNames, issuer_depth, resolve_issuer_authority,
};
pub use collision::{IssueDecision, may_issue};
pub use status::{CertificateStatus, ClassifiedCertificate, classify};
