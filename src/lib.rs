//! Vault CA - issue, list and revoke X.509 certificates held by a Vault PKI
//! engine.
//!
//! The authority owns every key, signature and revocation record. This crate
//! only reasons over the certificate metadata the authority hands back:
//!
//! - [`pki`]: the pure decision functions. Parsing a record, classifying it
//!   as valid / expired / revoked, the duplicate common name check that gates
//!   issuance, and resolving which authority answers revocation queries for a
//!   given chain depth.
//! - [`authority`]: the [`authority::AuthorityGateway`] boundary and its
//!   Vault implementation.
//! - [`orchestrator`]: the issue, revoke and list flows.
//! - [`web`]: axum routes over the orchestrator.
//!
//! Three binaries sit on top: `vault-ca-ui` (web), `vault-ca-issue` and
//! `vault-ca-check-revocation` (a TLS verify hook for OpenVPN style
//! `tls-verify` scripts).

pub mod artifacts;
pub mod authority;
pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pki;
pub mod report;
pub mod web;

pub use error::{ErrorKind, ParseError, PkiError, ResolutionError};
