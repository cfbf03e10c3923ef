//! Issue, revoke and list flows sequenced around the pure decision functions
//! in [`crate::pki`].
//!
//! Each flow walks forward through a fixed set of [`Stage`]s. A failure stops
//! the flow where it is and surfaces as a [`FlowError`] naming the flow, the
//! last stage reached and the error kind. Nothing is retried; in particular a
//! failed issue call is never repeated, since a retry could mint a second
//! certificate for the same name.

pub mod check;
pub mod inventory;
pub mod issue;
pub mod list;
pub mod revoke;

pub use check::{CheckError, RevocationVerdict, check_chain_position, check_revocation};
pub use inventory::fetch_inventory;
pub use issue::{IssueReport, IssueRequest};
pub use revoke::RevokeReport;

use crate::authority::AuthorityGateway;
use crate::cache::InventoryCache;
use crate::error::{ErrorKind, PkiError};
use log::debug;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Issue,
    Revoke,
    List,
    Download,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flow::Issue => "issue",
            Flow::Revoke => "revoke",
            Flow::List => "list",
            Flow::Download => "download",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    InventoryFetched,
    CollisionChecked,
    Denied,
    Issued,
    ArtifactsWritten,
    Revoked,
    CacheInvalidated,
    Redirected,
    Classified,
    Rendered,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Idle => "idle",
            Stage::InventoryFetched => "inventory_fetched",
            Stage::CollisionChecked => "collision_checked",
            Stage::Denied => "denied",
            Stage::Issued => "issued",
            Stage::ArtifactsWritten => "artifacts_written",
            Stage::Revoked => "revoked",
            Stage::CacheInvalidated => "cache_invalidated",
            Stage::Redirected => "redirected",
            Stage::Classified => "classified",
            Stage::Rendered => "rendered",
            Stage::Done => "done",
        })
    }
}

/// Terminal, non-`Done` state of a flow.
#[derive(Debug, Error)]
#[error("{flow} flow stopped at {stage}: {error}")]
pub struct FlowError {
    pub flow: Flow,
    pub stage: Stage,
    #[source]
    pub error: PkiError,
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

struct Progress {
    flow: Flow,
    stage: Stage,
}

impl Progress {
    fn start(flow: Flow) -> Self {
        debug!("{} flow: {}", flow, Stage::Idle);
        Self {
            flow,
            stage: Stage::Idle,
        }
    }

    fn advance(&mut self, stage: Stage) {
        debug!("{} flow: {} -> {}", self.flow, self.stage, stage);
        self.stage = stage;
    }

    fn fail(&self, error: PkiError) -> FlowError {
        FlowError {
            flow: self.flow,
            stage: self.stage,
            error,
        }
    }
}

/// Entry point shared by the web surface and the issuance tool.
pub struct CertificateOrchestrator {
    gateway: Arc<dyn AuthorityGateway>,
    cache: Arc<InventoryCache>,
}

impl CertificateOrchestrator {
    pub fn new(gateway: Arc<dyn AuthorityGateway>, cache: Arc<InventoryCache>) -> Self {
        Self { gateway, cache }
    }

    pub fn gateway(&self) -> &dyn AuthorityGateway {
        self.gateway.as_ref()
    }

    pub fn cache(&self) -> &InventoryCache {
        &self.cache
    }
}
