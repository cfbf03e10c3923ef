use super::{CertificateOrchestrator, Flow, FlowError, Progress, Stage};
use log::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeReport {
    /// Listing the caller should land on next.
    pub redirect_to: String,
}

impl CertificateOrchestrator {
    /// Idle → Revoked → CacheInvalidated → Redirected.
    pub async fn revoke(&self, ca: &str, serial: &str) -> Result<RevokeReport, FlowError> {
        let mut progress = Progress::start(Flow::Revoke);

        self.gateway()
            .revoke_certificate(ca, serial)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::Revoked);
        info!("revoked {} in {}", serial, ca);

        self.cache().invalidate(ca).await;
        progress.advance(Stage::CacheInvalidated);

        let redirect_to = format!("/ca/{ca}");
        progress.advance(Stage::Redirected);
        Ok(RevokeReport { redirect_to })
    }
}
