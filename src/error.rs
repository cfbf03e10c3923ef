use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn authority-supplied PEM into a [`crate::pki::CertificateRecord`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("certificate is not valid PEM: {0}")]
    Pem(String),
    #[error("certificate body could not be decoded: {0}")]
    Certificate(String),
    #[error("certificate subject has no common name")]
    MissingCommonName,
    #[error("certificate validity window is out of range")]
    InvalidValidity,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("no distinguished name supplied for chain depth {depth}")]
    MissingDistinguishedName { depth: u32 },
    #[error("distinguished name '{name}' at chain depth {depth} is not mapped to an authority")]
    UnknownDistinguishedName { depth: u32, name: String },
}

#[derive(Debug, Error)]
pub enum PkiError {
    #[error("authentication with the authority failed: {0}")]
    AuthenticationFailure(String),

    #[error("authority request failed: {0}")]
    TransportFailure(String),

    #[error("a certificate with common name '{common_name}' already exists (serial {serial})")]
    CollisionDenied { common_name: String, serial: String },

    #[error("certificate {serial}: {source}")]
    Parse {
        serial: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("artifact {path}: {message}")]
    Artifact { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("'{0}' is not a valid authority, role or serial identifier")]
    InvalidIdentifier(String),
}

/// Fieldless view of [`PkiError`], used to pick exit codes and HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthenticationFailure,
    TransportFailure,
    CollisionDenied,
    ParseError,
    ResolutionError,
    ArtifactFailure,
    ConfigError,
    InvalidIdentifier,
}

impl PkiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PkiError::AuthenticationFailure(_) => ErrorKind::AuthenticationFailure,
            PkiError::TransportFailure(_) => ErrorKind::TransportFailure,
            PkiError::CollisionDenied { .. } => ErrorKind::CollisionDenied,
            PkiError::Parse { .. } => ErrorKind::ParseError,
            PkiError::Resolution(_) => ErrorKind::ResolutionError,
            PkiError::Artifact { .. } => ErrorKind::ArtifactFailure,
            PkiError::Config(_) => ErrorKind::ConfigError,
            PkiError::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
        }
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthenticationFailure => "authentication_failure",
            ErrorKind::TransportFailure => "transport_failure",
            ErrorKind::CollisionDenied => "collision_denied",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::ResolutionError => "resolution_error",
            ErrorKind::ArtifactFailure => "artifact_failure",
            ErrorKind::ConfigError => "config_error",
            ErrorKind::InvalidIdentifier => "invalid_identifier",
        }
    }

    /// Process exit status of `vault-ca-issue` for a failure of this kind.
    pub fn issue_exit_code(&self) -> u8 {
        match self {
            ErrorKind::CollisionDenied => 1,
            ErrorKind::TransportFailure | ErrorKind::ParseError | ErrorKind::ResolutionError => 2,
            ErrorKind::AuthenticationFailure => 3,
            ErrorKind::ArtifactFailure | ErrorKind::ConfigError | ErrorKind::InvalidIdentifier => 4,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
