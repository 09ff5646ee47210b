//! Policy configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) gives the stock policy.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::node::RoleDomain;

/// Port etcd listens on for clients.
pub const ETCD_CLIENT_PORT: u16 = 2379;

/// Top-level policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub etcd: EtcdConfig,
    pub kube: KubeConfig,
}

/// etcd sizing, removal and client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtcdConfig {
    /// Explicit member count. When unset the count is derived from the
    /// number of kube-masters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masters: Option<usize>,
    /// Port clients connect to.
    pub client_port: u16,
    /// Scheme used in client endpoints.
    pub scheme: String,
    /// Refuse removals that would leave an even number of members.
    pub enforce_odd_size: bool,
    /// Fewest members allowed after a removal with no replacement.
    pub min_members_after_removal: usize,
    pub tls: TlsConfig,
}

impl Default for EtcdConfig {
    fn default() -> Self {
        Self {
            masters: None,
            client_port: ETCD_CLIENT_PORT,
            scheme: "https".into(),
            enforce_odd_size: true,
            min_members_after_removal: 1,
            tls: TlsConfig::default(),
        }
    }
}

/// Client credentials passed to etcdctl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub ca_file: String,
    pub key_file: String,
    pub cert_file: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_file: "/etc/pki/ca.crt".into(),
            key_file: "/etc/pki/minion.key".into(),
            cert_file: "/etc/pki/minion.crt".into(),
        }
    }
}

/// Kubernetes role settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeConfig {
    pub min_masters_after_removal: usize,
    pub min_minions_after_removal: usize,
    /// Look for kube-master/kube-minion replacements when none was
    /// provided or inherited from the etcd pass.
    pub discover_replacements: bool,
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self {
            min_masters_after_removal: 1,
            min_minions_after_removal: 1,
            discover_replacements: false,
        }
    }
}

impl PolicyConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Renders the configuration as TOML (used for `--config-template`).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.etcd.client_port == 0 {
            return Err(ConfigError::Invalid("etcd.client_port must not be 0".into()));
        }
        if self.etcd.scheme.is_empty() {
            return Err(ConfigError::Invalid("etcd.scheme must not be empty".into()));
        }
        for domain in RoleDomain::ALL {
            if self.min_after_removal(domain) == 0 {
                return Err(ConfigError::Invalid(format!(
                    "minimum {domain} members after removal must be at least 1"
                )));
            }
        }
        Ok(())
    }

    /// Fewest members `domain` may keep after losing one with no replacement.
    pub fn min_after_removal(&self, domain: RoleDomain) -> usize {
        match domain {
            RoleDomain::Etcd => self.etcd.min_members_after_removal,
            RoleDomain::KubeMaster => self.kube.min_masters_after_removal,
            RoleDomain::KubeMinion => self.kube.min_minions_after_removal,
        }
    }
}
