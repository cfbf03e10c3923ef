use super::{CertificateOrchestrator, Flow, FlowError, Progress, Stage, fetch_inventory};
use crate::cache::Listing;
use crate::pki::ClassifiedCertificate;
use chrono::{DateTime, Utc};
use log::debug;
use std::sync::Arc;

impl CertificateOrchestrator {
    /// Idle → InventoryFetched → Classified → Rendered. A cached listing
    /// younger than the cache ttl short-circuits straight to Rendered.
    pub async fn list(&self, ca: &str, now: DateTime<Utc>) -> Result<Listing, FlowError> {
        let mut progress = Progress::start(Flow::List);

        if let Some(listing) = self.cache().get(ca).await {
            debug!(
                "listing for {} served from cache ({:.1}% hit rate)",
                ca,
                self.cache().hit_rate()
            );
            progress.advance(Stage::Rendered);
            return Ok(listing);
        }

        let generation = self.cache().generation(ca).await;
        let inventory = fetch_inventory(self.gateway(), ca)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::InventoryFetched);

        let listing: Listing = Arc::new(
            inventory
                .into_iter()
                .map(|record| ClassifiedCertificate::new(record, now))
                .collect(),
        );
        progress.advance(Stage::Classified);

        self.cache().put(ca, listing.clone(), generation).await;
        progress.advance(Stage::Rendered);
        Ok(listing)
    }

    /// PEM body of one certificate, for download.
    pub async fn certificate_pem(&self, ca: &str, serial: &str) -> Result<String, FlowError> {
        let mut progress = Progress::start(Flow::Download);
        let raw = self
            .gateway()
            .read_certificate(ca, serial)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::Done);
        Ok(raw.pem)
    }
}
