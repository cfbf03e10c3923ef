use crate::error::ResolutionError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;

/// Common name of the certificate at each chain depth, 0 being the leaf.
pub type DistinguishedNames = BTreeMap<u32, String>;

/// Static table from an issuer's common name to the authority id that keeps
/// its revocation ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuthorityMap(HashMap<String, String>);

impl AuthorityMap {
    pub fn get(&self, common_name: &str) -> Option<&str> {
        self.0.get(common_name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AuthorityMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Returns the authority that must answer revocation queries for the
/// certificate at `depth`.
///
/// A leaf (depth 0) is checked against the authority that signed it, whose
/// name sits one level up, so depth 0 is looked up as depth 1. Unknown or
/// missing names are errors; there is no fallback authority.
pub fn resolve_issuer_authority(
    depth: u32,
    names: &DistinguishedNames,
    authorities: &AuthorityMap,
) -> Result<String, ResolutionError> {
    let depth = issuer_depth(depth);
    let name = names
        .get(&depth)
        .ok_or(ResolutionError::MissingDistinguishedName { depth })?;

    authorities
        .get(name)
        .map(str::to_string)
        .ok_or_else(|| ResolutionError::UnknownDistinguishedName {
            depth,
            name: name.clone(),
        })
}

/// Depth whose name identifies the issuing authority.
pub fn issuer_depth(depth: u32) -> u32 {
    if depth == 0 { 1 } else { depth }
}

/// Chain names and serials handed over by a TLS verification hook,
/// captured once from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainEnvironment {
    pub names: DistinguishedNames,
    pub serials: BTreeMap<u32, String>,
}

impl ChainEnvironment {
    /// Picks `X509_{n}_CN` and `tls_serial_hex_{n}` out of `vars`; everything
    /// else is ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut env = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            if let Some(depth) = key
                .strip_prefix("X509_")
                .and_then(|rest| rest.strip_suffix("_CN"))
                .and_then(|n| n.parse::<u32>().ok())
            {
                env.names.insert(depth, value.into());
            } else if let Some(depth) = key
                .strip_prefix("tls_serial_hex_")
                .and_then(|n| n.parse::<u32>().ok())
            {
                env.serials.insert(depth, value.into());
            }
        }
        env
    }

    /// Same as [`ChainEnvironment::from_vars`] over a raw process
    /// environment. Subject fields may carry non UTF-8 bytes; such values
    /// are converted lossily and such keys are skipped.
    pub fn from_os_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self::from_vars(vars.into_iter().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            let value = value
                .into_string()
                .unwrap_or_else(|raw| raw.to_string_lossy().into_owned());
            Some((key, value))
        }))
    }

    pub fn serial(&self, depth: u32) -> Option<&str> {
        self.serials.get(&depth).map(String::as_str)
    }
}
