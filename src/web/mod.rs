//! Thin HTTP pass-through to the orchestrator.
//!
//! ```text
//! GET /                          authority tree
//! GET /ca/{ca}                   classified listing (cached)
//! GET /ca/{ca}/export            same listing as CSV
//! GET /ca/{ca}/{serial}/{cn}     PEM download
//! GET /cert/revoke/{ca}/{serial} revoke, then redirect to /ca/{ca}
//! ```

mod error;
mod handlers;

pub use error::ApiError;

use crate::config::AuthorityEntry;
use crate::orchestrator::CertificateOrchestrator;
use axum::{Router, routing::get};
use std::collections::HashSet;
use std::sync::Arc;

/// Routes only reach authorities listed in `authorities`; any other `{ca}`
/// is answered with 404 before the authority is contacted.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<CertificateOrchestrator>,
    pub authorities: Arc<Vec<AuthorityEntry>>,
    known_ids: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(orchestrator: Arc<CertificateOrchestrator>, authorities: Vec<AuthorityEntry>) -> Self {
        let mut known_ids = HashSet::new();
        collect_ids(&authorities, &mut known_ids);
        Self {
            orchestrator,
            authorities: Arc::new(authorities),
            known_ids: Arc::new(known_ids),
        }
    }

    pub fn is_known_authority(&self, ca: &str) -> bool {
        self.known_ids.contains(ca)
    }
}

fn collect_ids(entries: &[AuthorityEntry], ids: &mut HashSet<String>) {
    for entry in entries {
        ids.insert(entry.id.clone());
        collect_ids(&entry.children, ids);
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/ca/{ca}", get(handlers::list_certificates))
        .route("/ca/{ca}/export", get(handlers::export_certificates))
        .route("/ca/{ca}/{serial}/{cn}", get(handlers::download_certificate))
        .route("/cert/revoke/{ca}/{serial}", get(handlers::revoke_certificate))
        .with_state(state)
}
