use crate::authority::AuthorityGateway;
use crate::error::PkiError;
use crate::pki::CertificateRecord;
use futures::stream::{self, StreamExt, TryStreamExt};

const MAX_CONCURRENT_READS: usize = 8;

/// Reads and parses every certificate an authority holds.
///
/// All or nothing: one failed read or unparsable record fails the whole
/// inventory, because the collision check is only sound over a complete
/// listing. Reads run concurrently but results keep the listing order.
pub async fn fetch_inventory(
    gateway: &dyn AuthorityGateway,
    ca: &str,
) -> Result<Vec<CertificateRecord>, PkiError> {
    let serials = gateway.list_serials(ca).await?;

    stream::iter(serials)
        .map(|serial| async move {
            let raw = gateway.read_certificate(ca, &serial).await?;
            CertificateRecord::parse(serial.as_str(), &raw.pem, raw.revocation_time)
                .map_err(|source| PkiError::Parse { serial, source })
        })
        .buffered(MAX_CONCURRENT_READS)
        .try_collect()
        .await
}
