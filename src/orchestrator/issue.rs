use super::{CertificateOrchestrator, Flow, FlowError, Progress, Stage, fetch_inventory};
use crate::artifacts::{ArtifactPaths, ArtifactWriter};
use crate::authority::IssueParams;
use crate::error::PkiError;
use crate::pki::{IssueDecision, may_issue};
use log::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub ca: String,
    pub role: String,
    pub common_name: String,
    pub ttl: String,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReport {
    pub serial: String,
    pub decision: IssueDecision,
    pub artifacts: ArtifactPaths,
}

impl CertificateOrchestrator {
    /// Idle → InventoryFetched → CollisionChecked → Issued →
    /// ArtifactsWritten → Done, or Denied on a duplicate common name.
    ///
    /// The inventory is always fetched fresh, never taken from the listing
    /// cache.
    pub async fn issue(
        &self,
        request: &IssueRequest,
        writer: &ArtifactWriter,
    ) -> Result<IssueReport, FlowError> {
        let mut progress = Progress::start(Flow::Issue);

        writer
            .paths_for(&request.common_name)
            .map_err(|e| progress.fail(e))?;
        let template = writer.load_template().map_err(|e| progress.fail(e))?;

        let inventory = fetch_inventory(self.gateway(), &request.ca)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::InventoryFetched);

        let decision = may_issue(&inventory, &request.common_name, request.force);
        progress.advance(Stage::CollisionChecked);
        match &decision {
            IssueDecision::Deny { existing_serial } => {
                error!(
                    "There is already a certificate with common name {} in {} (serial {})",
                    request.common_name, request.ca, existing_serial
                );
                progress.advance(Stage::Denied);
                return Err(progress.fail(PkiError::CollisionDenied {
                    common_name: request.common_name.clone(),
                    serial: existing_serial.clone(),
                }));
            }
            IssueDecision::AllowWithWarning { existing_serial } => {
                warn!(
                    "There is already a certificate with common name {} in {} (serial {}), issuing anyway",
                    request.common_name, request.ca, existing_serial
                );
            }
            IssueDecision::Allow => {}
        }

        let params = IssueParams {
            role: request.role.clone(),
            common_name: request.common_name.clone(),
            ttl: request.ttl.clone(),
        };
        let credentials = self
            .gateway()
            .issue_certificate(&request.ca, &params)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::Issued);
        info!(
            "issued {} for {} from {}",
            credentials.serial, request.common_name, request.ca
        );
        self.cache().invalidate(&request.ca).await;

        let artifacts = writer
            .write(&request.common_name, &credentials, template.as_deref())
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::ArtifactsWritten);
        progress.advance(Stage::Done);

        Ok(IssueReport {
            serial: credentials.serial,
            decision,
            artifacts,
        })
    }
}
