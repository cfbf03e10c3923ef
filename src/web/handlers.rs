use super::AppState;
use super::error::ApiError;
use crate::config::AuthorityEntry;
use crate::pki::ClassifiedCertificate;
use crate::report;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
pub struct ListingResponse {
    pub ca: String,
    pub certificates: Vec<ClassifiedCertificate>,
}

pub async fn index(State(state): State<AppState>) -> Json<Vec<AuthorityEntry>> {
    Json(state.authorities.as_ref().clone())
}

pub async fn list_certificates(
    State(state): State<AppState>,
    Path(ca): Path<String>,
) -> Result<Json<ListingResponse>, ApiError> {
    require_authority(&state, &ca)?;
    let listing = state.orchestrator.list(&ca, Utc::now()).await?;
    Ok(Json(ListingResponse {
        ca,
        certificates: listing.as_ref().clone(),
    }))
}

pub async fn export_certificates(
    State(state): State<AppState>,
    Path(ca): Path<String>,
) -> Result<Response, ApiError> {
    require_authority(&state, &ca)?;
    let listing = state.orchestrator.list(&ca, Utc::now()).await?;
    let body = report::to_csv_string(&listing)
        .map_err(|e| ApiError::Internal(format!("csv export failed: {e}")))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment;filename={}.csv", sanitize_file_name(&ca)?),
            ),
        ],
        body,
    )
        .into_response())
}

pub async fn download_certificate(
    State(state): State<AppState>,
    Path((ca, serial, cn)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    require_authority(&state, &ca)?;
    let file_name = sanitize_file_name(&cn)?;
    let pem = state.orchestrator.certificate_pem(&ca, &serial).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/x-pem-file".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment;filename={file_name}.pem"),
            ),
        ],
        pem,
    )
        .into_response())
}

pub async fn revoke_certificate(
    State(state): State<AppState>,
    Path((ca, serial)): Path<(String, String)>,
) -> Result<Redirect, ApiError> {
    require_authority(&state, &ca)?;
    let report = state.orchestrator.revoke(&ca, &serial).await?;
    Ok(Redirect::to(&report.redirect_to))
}

fn require_authority(state: &AppState, ca: &str) -> Result<(), ApiError> {
    if state.is_known_authority(ca) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!(
            "unknown authority '{}'",
            ca.escape_default()
        )))
    }
}

/// Restricts a name placed in `Content-Disposition` to a conservative
/// character set.
fn sanitize_file_name(name: &str) -> Result<&str, ApiError> {
    let ok = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '@'));
    if ok {
        Ok(name)
    } else {
        Err(ApiError::BadRequest(format!(
            "'{}' is not a valid file name",
            name.escape_default()
        )))
    }
}
