use crate::error::ErrorKind;
use crate::orchestrator::FlowError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Error page for the web surface. Messages come from typed errors that
/// never hold the authority token.
#[derive(Debug)]
pub enum ApiError {
    Flow(FlowError),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        ApiError::Flow(err)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::TransportFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::AuthenticationFailure => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::CollisionDenied => StatusCode::CONFLICT,
        ErrorKind::ResolutionError => StatusCode::NOT_FOUND,
        ErrorKind::InvalidIdentifier => StatusCode::BAD_REQUEST,
        ErrorKind::ParseError | ErrorKind::ArtifactFailure | ErrorKind::ConfigError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Flow(err) => {
                error!("{}", err);
                (
                    status_for(err.kind()),
                    ErrorBody {
                        error: err.kind().as_str(),
                        message: err.to_string(),
                    },
                )
            }
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "bad_request",
                    message,
                },
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "not_found",
                    message,
                },
            ),
            ApiError::Internal(message) => {
                error!("{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal",
                        message,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
