use crate::error::PkiError;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::fs;
use std::path::Path;

/// Bearer token for the authority, read once at start-up.
#[derive(Clone)]
pub struct VaultToken(SecretString);

impl VaultToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token.into()))
    }

    /// Reads the first line of `path`. A missing, unreadable or empty file
    /// is an authentication failure.
    pub fn load(path: &Path) -> Result<Self, PkiError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            PkiError::AuthenticationFailure(format!(
                "cannot read token file {}: {}",
                path.display(),
                e.kind()
            ))
        })?;

        let token = contents.lines().next().unwrap_or_default().trim();
        if token.is_empty() {
            return Err(PkiError::AuthenticationFailure(format!(
                "token file {} is empty",
                path.display()
            )));
        }
        Ok(Self::new(token))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for VaultToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultToken([REDACTED])")
    }
}
