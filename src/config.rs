use crate::error::PkiError;
use crate::pki::AuthorityMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub authorities: Vec<AuthorityEntry>,
    #[serde(default = "default_dn_mapping")]
    pub dn_mapping: AuthorityMap,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vault: VaultConfig::default(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            authorities: Vec::new(),
            dn_mapping: default_dn_mapping(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_vault_address")]
    pub address: String,
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_issue_ttl")]
    pub issue_ttl: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: default_vault_address(),
            token_path: default_token_path(),
            timeout_secs: default_timeout_secs(),
            issue_ttl: default_issue_ttl(),
        }
    }
}

impl VaultConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_vault_address() -> String {
    "http://127.0.0.1:8200".to_string()
}

fn default_token_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vault-token")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_issue_ttl() -> String {
    "8760h".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            capacity: default_cache_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_cache_capacity() -> usize {
    64
}

/// Node of the authority tree shown on the index page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorityEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AuthorityEntry>,
}

fn default_dn_mapping() -> AuthorityMap {
    [("Root CA", "ca_root"), ("Users CA", "ca_users")]
        .into_iter()
        .collect()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, PkiError> {
        let config_str = fs::read_to_string(path).map_err(|e| {
            PkiError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_str: &str) -> Result<Self, PkiError> {
        toml::from_str(config_str)
            .map_err(|e| PkiError::Config(format!("failed to parse config: {}", e)))
    }

    /// Like [`AppConfig::from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, PkiError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Applies `VAULT_ADDR` when the caller found one in its environment.
    pub fn with_address_override(mut self, address: Option<String>) -> Self {
        if let Some(address) = address.filter(|a| !a.trim().is_empty()) {
            self.vault.address = address;
        }
        self
    }
}
